//! Follow counts.

use serde::Serialize;

/// Follower/followee counts for a user.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct FollowCounts {
    /// Users following this user.
    pub followers: i64,
    /// Users this user follows.
    pub following: i64,
}
