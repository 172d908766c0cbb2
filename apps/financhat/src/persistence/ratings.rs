//! Star rating repository.
//!
//! A user rates a given post or comment at most once; rating again replaces
//! the stars. The 1..=5 range is validated at the API boundary and enforced
//! again by a CHECK constraint.

use chrono::Utc;
use sqlx::SqlitePool;

use super::PersistenceError;
use crate::models::RatingSummary;

/// Repository for `star_ratings` rows.
pub struct RatingRepo<'a> {
    pool: &'a SqlitePool,
}

impl<'a> RatingRepo<'a> {
    pub(super) fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// Upsert a user's rating of a post.
    pub async fn rate_post(
        &self,
        user_id: i64,
        post_id: i64,
        stars: u8,
    ) -> Result<(), PersistenceError> {
        sqlx::query(
            "INSERT INTO star_ratings (user_id, post_id, stars, created_at)
             VALUES (?, ?, ?, ?)
             ON CONFLICT (user_id, post_id) DO UPDATE SET stars = excluded.stars",
        )
        .bind(user_id)
        .bind(post_id)
        .bind(i64::from(stars))
        .bind(Utc::now())
        .execute(self.pool)
        .await?;
        Ok(())
    }

    /// Upsert a user's rating of a comment.
    pub async fn rate_comment(
        &self,
        user_id: i64,
        comment_id: i64,
        stars: u8,
    ) -> Result<(), PersistenceError> {
        sqlx::query(
            "INSERT INTO star_ratings (user_id, comment_id, stars, created_at)
             VALUES (?, ?, ?, ?)
             ON CONFLICT (user_id, comment_id) DO UPDATE SET stars = excluded.stars",
        )
        .bind(user_id)
        .bind(comment_id)
        .bind(i64::from(stars))
        .bind(Utc::now())
        .execute(self.pool)
        .await?;
        Ok(())
    }

    /// Aggregate ratings for a post.
    pub async fn post_summary(&self, post_id: i64) -> Result<RatingSummary, PersistenceError> {
        let row: (Option<f64>, i64) = sqlx::query_as(
            "SELECT AVG(stars), COUNT(*) FROM star_ratings WHERE post_id = ?",
        )
        .bind(post_id)
        .fetch_one(self.pool)
        .await?;
        Ok(RatingSummary {
            average: row.0,
            count: row.1,
        })
    }

    /// Aggregate ratings for a comment.
    pub async fn comment_summary(
        &self,
        comment_id: i64,
    ) -> Result<RatingSummary, PersistenceError> {
        let row: (Option<f64>, i64) = sqlx::query_as(
            "SELECT AVG(stars), COUNT(*) FROM star_ratings WHERE comment_id = ?",
        )
        .bind(comment_id)
        .fetch_one(self.pool)
        .await?;
        Ok(RatingSummary {
            average: row.0,
            count: row.1,
        })
    }
}
