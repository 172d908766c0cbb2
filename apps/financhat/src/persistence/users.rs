//! User repository.

use chrono::Utc;
use sqlx::SqlitePool;

use super::PersistenceError;
use crate::models::User;

/// Repository for `users` rows.
pub struct UserRepo<'a> {
    pool: &'a SqlitePool,
}

impl<'a> UserRepo<'a> {
    pub(super) fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// Insert a new user.
    ///
    /// # Errors
    ///
    /// Returns [`PersistenceError::Conflict`] when the username is taken.
    pub async fn create(
        &self,
        username: &str,
        full_name: &str,
        password_hash: &str,
    ) -> Result<User, PersistenceError> {
        let now = Utc::now();
        let result = sqlx::query(
            "INSERT INTO users (username, full_name, password_hash, created_at)
             VALUES (?, ?, ?, ?)",
        )
        .bind(username)
        .bind(full_name)
        .bind(password_hash)
        .bind(now)
        .execute(self.pool)
        .await?;

        Ok(User {
            id: result.last_insert_rowid(),
            username: username.to_string(),
            full_name: full_name.to_string(),
            password_hash: password_hash.to_string(),
            bio: None,
            avatar: None,
            created_at: now,
        })
    }

    /// Fetch a user by login name.
    pub async fn by_username(&self, username: &str) -> Result<Option<User>, PersistenceError> {
        let user = sqlx::query_as::<_, User>(
            "SELECT id, username, full_name, password_hash, bio, avatar, created_at
             FROM users WHERE username = ?",
        )
        .bind(username)
        .fetch_optional(self.pool)
        .await?;
        Ok(user)
    }

    /// Fetch a user by id.
    pub async fn by_id(&self, id: i64) -> Result<Option<User>, PersistenceError> {
        let user = sqlx::query_as::<_, User>(
            "SELECT id, username, full_name, password_hash, bio, avatar, created_at
             FROM users WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(self.pool)
        .await?;
        Ok(user)
    }

    /// Update bio and avatar.
    pub async fn update_profile(
        &self,
        user_id: i64,
        bio: Option<&str>,
        avatar: Option<&str>,
    ) -> Result<(), PersistenceError> {
        sqlx::query("UPDATE users SET bio = ?, avatar = ? WHERE id = ?")
            .bind(bio)
            .bind(avatar)
            .bind(user_id)
            .execute(self.pool)
            .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use crate::persistence::{Database, PersistenceError};

    #[tokio::test]
    async fn create_and_fetch_roundtrip() {
        let db = Database::open_in_memory().await.unwrap();
        let created = db
            .users()
            .create("ayse", "Ayşe Yılmaz", "$argon2id$stub")
            .await
            .unwrap();

        let fetched = db.users().by_username("ayse").await.unwrap().unwrap();
        assert_eq!(fetched.id, created.id);
        assert_eq!(fetched.full_name, "Ayşe Yılmaz");
        assert!(db.users().by_username("mehmet").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn duplicate_username_conflicts() {
        let db = Database::open_in_memory().await.unwrap();
        db.users().create("ayse", "", "h1").await.unwrap();

        let err = db.users().create("ayse", "", "h2").await.unwrap_err();
        assert!(matches!(err, PersistenceError::Conflict(_)));
    }

    #[tokio::test]
    async fn profile_update() {
        let db = Database::open_in_memory().await.unwrap();
        let user = db.users().create("ayse", "", "h").await.unwrap();

        db.users()
            .update_profile(user.id, Some("markets all day"), Some("🦉"))
            .await
            .unwrap();

        let fetched = db.users().by_id(user.id).await.unwrap().unwrap();
        assert_eq!(fetched.bio.as_deref(), Some("markets all day"));
        assert_eq!(fetched.avatar.as_deref(), Some("🦉"));
    }
}
