//! Post repository.

use chrono::Utc;
use sqlx::SqlitePool;

use super::PersistenceError;
use crate::models::{Post, PostWithMeta};

/// Repository for `posts` rows.
pub struct PostRepo<'a> {
    pool: &'a SqlitePool,
}

impl<'a> PostRepo<'a> {
    pub(super) fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// Insert a new post.
    pub async fn create(&self, user_id: i64, content: &str) -> Result<Post, PersistenceError> {
        let now = Utc::now();
        let result = sqlx::query(
            "INSERT INTO posts (user_id, content, created_at) VALUES (?, ?, ?)",
        )
        .bind(user_id)
        .bind(content)
        .bind(now)
        .execute(self.pool)
        .await?;

        Ok(Post {
            id: result.last_insert_rowid(),
            user_id,
            content: content.to_string(),
            created_at: now,
            edited_at: None,
        })
    }

    /// Fetch a post by id.
    pub async fn by_id(&self, id: i64) -> Result<Option<Post>, PersistenceError> {
        let post = sqlx::query_as::<_, Post>(
            "SELECT id, user_id, content, created_at, edited_at FROM posts WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(self.pool)
        .await?;
        Ok(post)
    }

    /// Replace a post's content and stamp the edit time.
    pub async fn update_content(&self, id: i64, content: &str) -> Result<(), PersistenceError> {
        sqlx::query("UPDATE posts SET content = ?, edited_at = ? WHERE id = ?")
            .bind(content)
            .bind(Utc::now())
            .bind(id)
            .execute(self.pool)
            .await?;
        Ok(())
    }

    /// Delete a post (comments and ratings cascade).
    pub async fn delete(&self, id: i64) -> Result<(), PersistenceError> {
        sqlx::query("DELETE FROM posts WHERE id = ?")
            .bind(id)
            .execute(self.pool)
            .await?;
        Ok(())
    }

    /// Recent posts by one user, newest first.
    pub async fn recent_by_user(
        &self,
        user_id: i64,
        limit: i64,
    ) -> Result<Vec<Post>, PersistenceError> {
        let posts = sqlx::query_as::<_, Post>(
            "SELECT id, user_id, content, created_at, edited_at
             FROM posts WHERE user_id = ?
             ORDER BY created_at DESC, id DESC LIMIT ?",
        )
        .bind(user_id)
        .bind(limit)
        .fetch_all(self.pool)
        .await?;
        Ok(posts)
    }

    /// Count posts by one user.
    pub async fn count_by_user(&self, user_id: i64) -> Result<i64, PersistenceError> {
        let count: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM posts WHERE user_id = ?")
            .bind(user_id)
            .fetch_one(self.pool)
            .await?;
        Ok(count.0)
    }

    /// Feed candidates: recent posts joined with author and engagement
    /// aggregates, newest first. Ranking happens in the caller.
    pub async fn feed_candidates(&self, limit: i64) -> Result<Vec<PostWithMeta>, PersistenceError> {
        let rows = sqlx::query_as::<_, PostWithMeta>(
            "SELECT p.id, p.user_id, u.username, p.content, p.created_at, p.edited_at,
                    (SELECT COUNT(*) FROM comments c WHERE c.post_id = p.id) AS comment_count,
                    (SELECT AVG(r.stars) FROM star_ratings r WHERE r.post_id = p.id) AS avg_stars,
                    (SELECT COUNT(*) FROM star_ratings r WHERE r.post_id = p.id) AS rating_count
             FROM posts p
             JOIN users u ON u.id = p.user_id
             ORDER BY p.created_at DESC, p.id DESC
             LIMIT ?",
        )
        .bind(limit)
        .fetch_all(self.pool)
        .await?;
        Ok(rows)
    }
}

#[cfg(test)]
mod tests {
    use crate::persistence::Database;

    #[tokio::test]
    async fn create_edit_delete_roundtrip() {
        let db = Database::open_in_memory().await.unwrap();
        let user = db.users().create("ayse", "", "h").await.unwrap();

        let post = db.posts().create(user.id, "BTC looks strong").await.unwrap();
        assert!(post.edited_at.is_none());

        db.posts()
            .update_content(post.id, "BTC looks weak actually")
            .await
            .unwrap();
        let edited = db.posts().by_id(post.id).await.unwrap().unwrap();
        assert_eq!(edited.content, "BTC looks weak actually");
        assert!(edited.edited_at.is_some());

        db.posts().delete(post.id).await.unwrap();
        assert!(db.posts().by_id(post.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn feed_candidates_carry_aggregates() {
        let db = Database::open_in_memory().await.unwrap();
        let author = db.users().create("ayse", "", "h").await.unwrap();
        let reader = db.users().create("mehmet", "", "h").await.unwrap();

        let post = db.posts().create(author.id, "gold thread").await.unwrap();
        db.comments()
            .create_post_comment(reader.id, post.id, "agreed")
            .await
            .unwrap();
        db.ratings()
            .rate_post(reader.id, post.id, 4)
            .await
            .unwrap();

        let rows = db.posts().feed_candidates(10).await.unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].username, "ayse");
        assert_eq!(rows[0].comment_count, 1);
        assert_eq!(rows[0].rating_count, 1);
        assert_eq!(rows[0].avg_stars, Some(4.0));
    }

    #[tokio::test]
    async fn delete_cascades_to_comments() {
        let db = Database::open_in_memory().await.unwrap();
        let user = db.users().create("ayse", "", "h").await.unwrap();
        let post = db.posts().create(user.id, "x").await.unwrap();
        let comment = db
            .comments()
            .create_post_comment(user.id, post.id, "y")
            .await
            .unwrap();

        db.posts().delete(post.id).await.unwrap();
        assert!(db.comments().by_id(comment.id).await.unwrap().is_none());
    }
}
