//! Post and feed-event records.

use chrono::{DateTime, Utc};
use serde::Serialize;

/// A post row.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct Post {
    /// Row id.
    pub id: i64,
    /// Author.
    pub user_id: i64,
    /// Body text.
    pub content: String,
    /// Creation time.
    pub created_at: DateTime<Utc>,
    /// Last edit time, if edited.
    pub edited_at: Option<DateTime<Utc>>,
}

/// A post joined with its author and engagement aggregates.
///
/// This is the raw material for feed ranking: one row per post eligible for
/// the feed, with the counts the score formula consumes.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct PostWithMeta {
    /// Row id.
    pub id: i64,
    /// Author id.
    pub user_id: i64,
    /// Author login name.
    pub username: String,
    /// Body text.
    pub content: String,
    /// Creation time.
    pub created_at: DateTime<Utc>,
    /// Last edit time, if edited.
    pub edited_at: Option<DateTime<Utc>>,
    /// Number of comments on the post.
    pub comment_count: i64,
    /// Average star rating, if any ratings exist.
    pub avg_stars: Option<f64>,
    /// Number of star ratings.
    pub rating_count: i64,
}

/// A ranked feed entry as served to clients.
#[derive(Debug, Clone, Serialize)]
pub struct FeedEvent {
    /// Post id.
    pub id: i64,
    /// Author login name.
    pub user: String,
    /// Body text.
    pub content: String,
    /// Creation time.
    pub timestamp: DateTime<Utc>,
    /// Whether the post was edited.
    pub edited: bool,
    /// Number of comments.
    pub comment_count: i64,
    /// Average star rating (absent when unrated).
    pub avg_stars: Option<f64>,
    /// Number of star ratings.
    pub rating_count: i64,
    /// Ranking score used for sort order.
    pub score: f64,
}
