//! Comment records.
//!
//! A comment attaches to exactly one of: a post (feed comments) or an asset
//! symbol (asset-page comments). The schema enforces the either/or with a
//! CHECK constraint; these types just carry both options.

use chrono::{DateTime, Utc};
use serde::Serialize;

/// A comment row.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct Comment {
    /// Row id.
    pub id: i64,
    /// Author.
    pub user_id: i64,
    /// Parent post, for post comments.
    pub post_id: Option<i64>,
    /// Asset key, for asset-page comments.
    pub asset_symbol: Option<String>,
    /// Body text.
    pub content: String,
    /// Creation time.
    pub created_at: DateTime<Utc>,
}

/// A comment joined with its author, as served to clients.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct CommentView {
    /// Row id.
    pub id: i64,
    /// Author login name.
    pub username: String,
    /// Body text.
    pub content: String,
    /// Creation time.
    pub timestamp: DateTime<Utc>,
}
