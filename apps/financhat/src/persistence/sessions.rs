//! Session repository.

use chrono::{DateTime, Utc};
use sqlx::SqlitePool;

use super::PersistenceError;
use crate::models::Session;

/// Repository for `sessions` rows.
pub struct SessionRepo<'a> {
    pool: &'a SqlitePool,
}

impl<'a> SessionRepo<'a> {
    pub(super) fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// Insert a session.
    pub async fn create(
        &self,
        token: &str,
        user_id: i64,
        expires_at: DateTime<Utc>,
    ) -> Result<Session, PersistenceError> {
        let now = Utc::now();
        sqlx::query(
            "INSERT INTO sessions (token, user_id, created_at, expires_at) VALUES (?, ?, ?, ?)",
        )
        .bind(token)
        .bind(user_id)
        .bind(now)
        .bind(expires_at)
        .execute(self.pool)
        .await?;

        Ok(Session {
            token: token.to_string(),
            user_id,
            created_at: now,
            expires_at,
        })
    }

    /// Fetch a session by token.
    pub async fn by_token(&self, token: &str) -> Result<Option<Session>, PersistenceError> {
        let session = sqlx::query_as::<_, Session>(
            "SELECT token, user_id, created_at, expires_at FROM sessions WHERE token = ?",
        )
        .bind(token)
        .fetch_optional(self.pool)
        .await?;
        Ok(session)
    }

    /// Delete a session (logout).
    pub async fn delete(&self, token: &str) -> Result<(), PersistenceError> {
        sqlx::query("DELETE FROM sessions WHERE token = ?")
            .bind(token)
            .execute(self.pool)
            .await?;
        Ok(())
    }

    /// Remove all sessions that expired before `now`. Returns rows removed.
    pub async fn purge_expired(&self, now: DateTime<Utc>) -> Result<u64, PersistenceError> {
        let result = sqlx::query("DELETE FROM sessions WHERE expires_at <= ?")
            .bind(now)
            .execute(self.pool)
            .await?;
        Ok(result.rows_affected())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::persistence::Database;
    use chrono::Duration;

    #[tokio::test]
    async fn session_lifecycle() {
        let db = Database::open_in_memory().await.unwrap();
        let user = db.users().create("ayse", "", "h").await.unwrap();

        let expires = Utc::now() + Duration::days(7);
        db.sessions().create("tok-1", user.id, expires).await.unwrap();

        let session = db.sessions().by_token("tok-1").await.unwrap().unwrap();
        assert_eq!(session.user_id, user.id);
        assert!(!session.is_expired(Utc::now()));

        db.sessions().delete("tok-1").await.unwrap();
        assert!(db.sessions().by_token("tok-1").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn purge_removes_only_expired() {
        let db = Database::open_in_memory().await.unwrap();
        let user = db.users().create("ayse", "", "h").await.unwrap();
        let now = Utc::now();

        db.sessions()
            .create("old", user.id, now - Duration::hours(1))
            .await
            .unwrap();
        db.sessions()
            .create("live", user.id, now + Duration::hours(1))
            .await
            .unwrap();

        let purged = db.sessions().purge_expired(now).await.unwrap();
        assert_eq!(purged, 1);
        assert!(db.sessions().by_token("old").await.unwrap().is_none());
        assert!(db.sessions().by_token("live").await.unwrap().is_some());
    }
}
