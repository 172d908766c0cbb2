//! Follow repository.

use std::collections::HashSet;

use chrono::Utc;
use sqlx::SqlitePool;

use super::PersistenceError;
use crate::models::FollowCounts;

/// Repository for `follows` rows.
pub struct FollowRepo<'a> {
    pool: &'a SqlitePool,
}

impl<'a> FollowRepo<'a> {
    pub(super) fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// Record that `follower_id` follows `followee_id`.
    ///
    /// # Errors
    ///
    /// Returns [`PersistenceError::Conflict`] when the follow already exists.
    pub async fn follow(&self, follower_id: i64, followee_id: i64) -> Result<(), PersistenceError> {
        sqlx::query(
            "INSERT INTO follows (follower_id, followee_id, created_at) VALUES (?, ?, ?)",
        )
        .bind(follower_id)
        .bind(followee_id)
        .bind(Utc::now())
        .execute(self.pool)
        .await?;
        Ok(())
    }

    /// Remove a follow. Returns whether a row was removed.
    pub async fn unfollow(
        &self,
        follower_id: i64,
        followee_id: i64,
    ) -> Result<bool, PersistenceError> {
        let result = sqlx::query(
            "DELETE FROM follows WHERE follower_id = ? AND followee_id = ?",
        )
        .bind(follower_id)
        .bind(followee_id)
        .execute(self.pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Whether `follower_id` follows `followee_id`.
    pub async fn is_following(
        &self,
        follower_id: i64,
        followee_id: i64,
    ) -> Result<bool, PersistenceError> {
        let row: Option<(i64,)> = sqlx::query_as(
            "SELECT 1 FROM follows WHERE follower_id = ? AND followee_id = ?",
        )
        .bind(follower_id)
        .bind(followee_id)
        .fetch_optional(self.pool)
        .await?;
        Ok(row.is_some())
    }

    /// All user ids `follower_id` follows (for viewer-aware feed ranking).
    pub async fn followees_of(&self, follower_id: i64) -> Result<HashSet<i64>, PersistenceError> {
        let rows: Vec<(i64,)> =
            sqlx::query_as("SELECT followee_id FROM follows WHERE follower_id = ?")
                .bind(follower_id)
                .fetch_all(self.pool)
                .await?;
        Ok(rows.into_iter().map(|r| r.0).collect())
    }

    /// Follower/followee counts for a user.
    pub async fn counts(&self, user_id: i64) -> Result<FollowCounts, PersistenceError> {
        let followers: (i64,) =
            sqlx::query_as("SELECT COUNT(*) FROM follows WHERE followee_id = ?")
                .bind(user_id)
                .fetch_one(self.pool)
                .await?;
        let following: (i64,) =
            sqlx::query_as("SELECT COUNT(*) FROM follows WHERE follower_id = ?")
                .bind(user_id)
                .fetch_one(self.pool)
                .await?;
        Ok(FollowCounts {
            followers: followers.0,
            following: following.0,
        })
    }
}

#[cfg(test)]
mod tests {
    use crate::persistence::{Database, PersistenceError};

    #[tokio::test]
    async fn follow_unfollow_roundtrip() {
        let db = Database::open_in_memory().await.unwrap();
        let a = db.users().create("ayse", "", "h").await.unwrap();
        let b = db.users().create("mehmet", "", "h").await.unwrap();

        db.follows().follow(a.id, b.id).await.unwrap();
        assert!(db.follows().is_following(a.id, b.id).await.unwrap());
        // One-directional
        assert!(!db.follows().is_following(b.id, a.id).await.unwrap());

        let counts = db.follows().counts(b.id).await.unwrap();
        assert_eq!(counts.followers, 1);
        assert_eq!(counts.following, 0);

        assert!(db.follows().unfollow(a.id, b.id).await.unwrap());
        assert!(!db.follows().unfollow(a.id, b.id).await.unwrap());
    }

    #[tokio::test]
    async fn duplicate_follow_conflicts() {
        let db = Database::open_in_memory().await.unwrap();
        let a = db.users().create("ayse", "", "h").await.unwrap();
        let b = db.users().create("mehmet", "", "h").await.unwrap();

        db.follows().follow(a.id, b.id).await.unwrap();
        let err = db.follows().follow(a.id, b.id).await.unwrap_err();
        assert!(matches!(err, PersistenceError::Conflict(_)));
    }

    #[tokio::test]
    async fn followees_set() {
        let db = Database::open_in_memory().await.unwrap();
        let a = db.users().create("ayse", "", "h").await.unwrap();
        let b = db.users().create("mehmet", "", "h").await.unwrap();
        let c = db.users().create("zeynep", "", "h").await.unwrap();

        db.follows().follow(a.id, b.id).await.unwrap();
        db.follows().follow(a.id, c.id).await.unwrap();

        let followees = db.follows().followees_of(a.id).await.unwrap();
        assert!(followees.contains(&b.id));
        assert!(followees.contains(&c.id));
        assert_eq!(followees.len(), 2);
    }
}
