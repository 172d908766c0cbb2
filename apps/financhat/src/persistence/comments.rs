//! Comment repository (post comments and asset-page comments).

use chrono::Utc;
use sqlx::SqlitePool;

use super::PersistenceError;
use crate::models::{Comment, CommentView};

/// Repository for `comments` rows.
pub struct CommentRepo<'a> {
    pool: &'a SqlitePool,
}

impl<'a> CommentRepo<'a> {
    pub(super) fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// Insert a comment on a post.
    pub async fn create_post_comment(
        &self,
        user_id: i64,
        post_id: i64,
        content: &str,
    ) -> Result<Comment, PersistenceError> {
        let now = Utc::now();
        let result = sqlx::query(
            "INSERT INTO comments (user_id, post_id, content, created_at) VALUES (?, ?, ?, ?)",
        )
        .bind(user_id)
        .bind(post_id)
        .bind(content)
        .bind(now)
        .execute(self.pool)
        .await?;

        Ok(Comment {
            id: result.last_insert_rowid(),
            user_id,
            post_id: Some(post_id),
            asset_symbol: None,
            content: content.to_string(),
            created_at: now,
        })
    }

    /// Insert a comment on an asset page.
    pub async fn create_asset_comment(
        &self,
        user_id: i64,
        asset_symbol: &str,
        content: &str,
    ) -> Result<Comment, PersistenceError> {
        let now = Utc::now();
        let result = sqlx::query(
            "INSERT INTO comments (user_id, asset_symbol, content, created_at) VALUES (?, ?, ?, ?)",
        )
        .bind(user_id)
        .bind(asset_symbol)
        .bind(content)
        .bind(now)
        .execute(self.pool)
        .await?;

        Ok(Comment {
            id: result.last_insert_rowid(),
            user_id,
            post_id: None,
            asset_symbol: Some(asset_symbol.to_string()),
            content: content.to_string(),
            created_at: now,
        })
    }

    /// Fetch a comment by id.
    pub async fn by_id(&self, id: i64) -> Result<Option<Comment>, PersistenceError> {
        let comment = sqlx::query_as::<_, Comment>(
            "SELECT id, user_id, post_id, asset_symbol, content, created_at
             FROM comments WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(self.pool)
        .await?;
        Ok(comment)
    }

    /// Delete a comment.
    pub async fn delete(&self, id: i64) -> Result<(), PersistenceError> {
        sqlx::query("DELETE FROM comments WHERE id = ?")
            .bind(id)
            .execute(self.pool)
            .await?;
        Ok(())
    }

    /// Comments on a post, oldest first, joined with the author.
    pub async fn for_post(&self, post_id: i64) -> Result<Vec<CommentView>, PersistenceError> {
        let views = sqlx::query_as::<_, CommentView>(
            "SELECT c.id, u.username, c.content, c.created_at AS timestamp
             FROM comments c JOIN users u ON u.id = c.user_id
             WHERE c.post_id = ?
             ORDER BY c.created_at ASC, c.id ASC",
        )
        .bind(post_id)
        .fetch_all(self.pool)
        .await?;
        Ok(views)
    }

    /// Comments on an asset page, newest first, joined with the author.
    pub async fn for_asset(&self, asset_symbol: &str) -> Result<Vec<CommentView>, PersistenceError> {
        let views = sqlx::query_as::<_, CommentView>(
            "SELECT c.id, u.username, c.content, c.created_at AS timestamp
             FROM comments c JOIN users u ON u.id = c.user_id
             WHERE c.asset_symbol = ?
             ORDER BY c.created_at DESC, c.id DESC",
        )
        .bind(asset_symbol)
        .fetch_all(self.pool)
        .await?;
        Ok(views)
    }

    /// Count comments by one user.
    pub async fn count_by_user(&self, user_id: i64) -> Result<i64, PersistenceError> {
        let count: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM comments WHERE user_id = ?")
            .bind(user_id)
            .fetch_one(self.pool)
            .await?;
        Ok(count.0)
    }
}

#[cfg(test)]
mod tests {
    use crate::persistence::Database;

    #[tokio::test]
    async fn post_and_asset_comments_are_disjoint() {
        let db = Database::open_in_memory().await.unwrap();
        let user = db.users().create("ayse", "", "h").await.unwrap();
        let post = db.posts().create(user.id, "thread").await.unwrap();

        db.comments()
            .create_post_comment(user.id, post.id, "on the post")
            .await
            .unwrap();
        db.comments()
            .create_asset_comment(user.id, "btc", "on the asset")
            .await
            .unwrap();

        let post_comments = db.comments().for_post(post.id).await.unwrap();
        assert_eq!(post_comments.len(), 1);
        assert_eq!(post_comments[0].content, "on the post");

        let asset_comments = db.comments().for_asset("btc").await.unwrap();
        assert_eq!(asset_comments.len(), 1);
        assert_eq!(asset_comments[0].content, "on the asset");

        assert!(db.comments().for_asset("gold").await.unwrap().is_empty());
        assert_eq!(db.comments().count_by_user(user.id).await.unwrap(), 2);
    }

    #[tokio::test]
    async fn delete_removes_comment() {
        let db = Database::open_in_memory().await.unwrap();
        let user = db.users().create("ayse", "", "h").await.unwrap();
        let comment = db
            .comments()
            .create_asset_comment(user.id, "gold", "shiny")
            .await
            .unwrap();

        db.comments().delete(comment.id).await.unwrap();
        assert!(db.comments().by_id(comment.id).await.unwrap().is_none());
    }
}
