//! User, session and profile records.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A registered user row.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct User {
    /// Row id.
    pub id: i64,
    /// Unique login name.
    pub username: String,
    /// Display name.
    pub full_name: String,
    /// Argon2 PHC string. Never serialized.
    pub password_hash: String,
    /// Profile bio.
    pub bio: Option<String>,
    /// Avatar (emoji or URL).
    pub avatar: Option<String>,
    /// Registration time.
    pub created_at: DateTime<Utc>,
}

/// A server-side session row.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct Session {
    /// Opaque token handed to the client.
    pub token: String,
    /// Owning user.
    pub user_id: i64,
    /// Creation time.
    pub created_at: DateTime<Utc>,
    /// Expiry time; the session is invalid at or after this instant.
    pub expires_at: DateTime<Utc>,
}

impl Session {
    /// Whether the session is expired at `now`.
    #[must_use]
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }
}

/// Public profile view.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Profile {
    /// Login name.
    pub username: String,
    /// Display name.
    pub full_name: String,
    /// Profile bio.
    pub bio: Option<String>,
    /// Avatar (emoji or URL).
    pub avatar: Option<String>,
    /// Total posts authored.
    pub total_posts: i64,
    /// Total comments authored.
    pub total_comments: i64,
    /// Users following this profile.
    pub followers: i64,
    /// Users this profile follows.
    pub following: i64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn session_expiry_boundary() {
        let now = Utc::now();
        let session = Session {
            token: "t".to_string(),
            user_id: 1,
            created_at: now - Duration::days(7),
            expires_at: now,
        };

        assert!(session.is_expired(now));
        assert!(!session.is_expired(now - Duration::seconds(1)));
    }
}
