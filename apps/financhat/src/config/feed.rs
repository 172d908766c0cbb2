//! Feed ranking weights.

use serde::{Deserialize, Serialize};

/// Feed ranking configuration.
///
/// The feed score is a linear weighted sum; see [`crate::ranking`] for the
/// formula these weights feed into.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct FeedConfig {
    /// Weight of the recency decay term.
    #[serde(default = "default_w_recency")]
    pub w_recency: f64,
    /// Weight of the comment-count term.
    #[serde(default = "default_w_comments")]
    pub w_comments: f64,
    /// Weight of the star-rating term.
    #[serde(default = "default_w_stars")]
    pub w_stars: f64,
    /// Bonus when the viewer follows the author.
    #[serde(default = "default_w_follow")]
    pub w_follow: f64,
    /// Recency half-life in hours.
    #[serde(default = "default_half_life")]
    pub half_life_hours: f64,
    /// Maximum number of feed events returned per request.
    #[serde(default = "default_page_size")]
    pub page_size: u32,
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            w_recency: default_w_recency(),
            w_comments: default_w_comments(),
            w_stars: default_w_stars(),
            w_follow: default_w_follow(),
            half_life_hours: default_half_life(),
            page_size: default_page_size(),
        }
    }
}

const fn default_w_recency() -> f64 {
    10.0
}

const fn default_w_comments() -> f64 {
    2.0
}

const fn default_w_stars() -> f64 {
    1.5
}

const fn default_w_follow() -> f64 {
    3.0
}

const fn default_half_life() -> f64 {
    6.0
}

const fn default_page_size() -> u32 {
    50
}
