//! Opaque session tokens with server-side storage.
//!
//! Tokens are UUID v4 strings stored in the `sessions` table with a TTL.
//! Expired sessions behave as absent and are purged lazily on lookup.

use chrono::{Duration, Utc};
use uuid::Uuid;

use super::AuthError;
use crate::models::{Session, User};
use crate::persistence::Database;

/// Cookie name carrying the session token.
pub const SESSION_COOKIE: &str = "financhat_session";

/// Username rules: 3-32 chars from `[A-Za-z0-9_]`.
#[must_use]
pub fn validate_username(username: &str) -> bool {
    (3..=32).contains(&username.len())
        && username
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// Password rules: at least 8 characters.
#[must_use]
pub fn validate_password(password: &str) -> bool {
    password.chars().count() >= 8
}

/// Session operations over the database.
pub struct Sessions<'a> {
    database: &'a Database,
    ttl_days: u32,
}

impl<'a> Sessions<'a> {
    /// Create a session handle with the configured TTL.
    #[must_use]
    pub fn new(database: &'a Database, ttl_days: u32) -> Self {
        Self { database, ttl_days }
    }

    /// Create a fresh session for a user and return it.
    pub async fn create(&self, user_id: i64) -> Result<Session, AuthError> {
        let token = Uuid::new_v4().to_string();
        let expires_at = Utc::now() + Duration::days(i64::from(self.ttl_days));
        let session = self
            .database
            .sessions()
            .create(&token, user_id, expires_at)
            .await?;
        Ok(session)
    }

    /// Resolve a token to its user, treating expired sessions as absent.
    ///
    /// Expired rows found on the way are deleted.
    pub async fn resolve(&self, token: &str) -> Result<Option<User>, AuthError> {
        let Some(session) = self.database.sessions().by_token(token).await? else {
            return Ok(None);
        };

        if session.is_expired(Utc::now()) {
            self.database.sessions().delete(token).await?;
            return Ok(None);
        }

        let user = self.database.users().by_id(session.user_id).await?;
        Ok(user)
    }

    /// Delete a session (logout). Unknown tokens are a no-op.
    pub async fn revoke(&self, token: &str) -> Result<(), AuthError> {
        self.database.sessions().delete(token).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn username_rules() {
        assert!(validate_username("ayse"));
        assert!(validate_username("trader_99"));
        assert!(!validate_username("ab"));
        assert!(!validate_username("has space"));
        assert!(!validate_username("emoji🦉"));
        assert!(!validate_username(&"x".repeat(33)));
    }

    #[test]
    fn password_rules() {
        assert!(validate_password("12345678"));
        assert!(!validate_password("1234567"));
    }

    #[tokio::test]
    async fn create_resolve_revoke() {
        let db = Database::open_in_memory().await.unwrap();
        let user = db.users().create("ayse", "", "h").await.unwrap();
        let sessions = Sessions::new(&db, 7);

        let session = sessions.create(user.id).await.unwrap();
        let resolved = sessions.resolve(&session.token).await.unwrap().unwrap();
        assert_eq!(resolved.id, user.id);

        sessions.revoke(&session.token).await.unwrap();
        assert!(sessions.resolve(&session.token).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn expired_session_resolves_to_none_and_is_purged() {
        let db = Database::open_in_memory().await.unwrap();
        let user = db.users().create("ayse", "", "h").await.unwrap();

        // Insert an already-expired row directly
        db.sessions()
            .create("stale-token", user.id, Utc::now() - Duration::seconds(1))
            .await
            .unwrap();

        let sessions = Sessions::new(&db, 7);
        assert!(sessions.resolve("stale-token").await.unwrap().is_none());
        // Lazy purge removed the row
        assert!(db.sessions().by_token("stale-token").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn unknown_token_resolves_to_none() {
        let db = Database::open_in_memory().await.unwrap();
        let sessions = Sessions::new(&db, 7);
        assert!(sessions.resolve("never-issued").await.unwrap().is_none());
    }
}
