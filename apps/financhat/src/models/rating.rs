//! Star rating aggregates.

use serde::Serialize;

/// Aggregated star ratings for a post or comment.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct RatingSummary {
    /// Average stars, absent when nothing is rated yet.
    pub average: Option<f64>,
    /// Number of ratings.
    pub count: i64,
}
