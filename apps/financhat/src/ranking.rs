//! Feed ranking score.
//!
//! Each post is a feed event carrying a numeric score; the feed lists events
//! in descending score order. The score is a linear weighted sum:
//!
//! ```text
//! score = w_recency  * exp(-age_hours / half_life)
//!       + w_comments * ln(1 + comment_count)
//!       + w_stars    * avg_stars * ln(1 + rating_count)
//!       + w_follow   * [viewer follows author]
//! ```
//!
//! Recency decays exponentially so fresh posts lead; the engagement terms are
//! log-damped so a pile-on cannot bury everything else. Ties break by
//! recency, then id.

use std::collections::HashSet;

use chrono::{DateTime, Utc};

use crate::config::FeedConfig;
use crate::models::{FeedEvent, PostWithMeta};

/// Score one post for a viewer at `now`.
///
/// `followees` is the set of user ids the viewer follows; anonymous viewers
/// pass an empty set. Ages in the future (clock skew) are clamped to zero, so
/// the result is always finite.
#[must_use]
pub fn score_post(
    post: &PostWithMeta,
    followees: &HashSet<i64>,
    config: &FeedConfig,
    now: DateTime<Utc>,
) -> f64 {
    let age_hours = ((now - post.created_at).num_seconds().max(0) as f64) / 3600.0;
    let recency = (-age_hours / config.half_life_hours).exp();

    let comments = (1.0 + post.comment_count as f64).ln();
    let stars = post.avg_stars.unwrap_or(0.0) * (1.0 + post.rating_count as f64).ln();
    let follow_bonus = if followees.contains(&post.user_id) {
        1.0
    } else {
        0.0
    };

    config.w_recency * recency
        + config.w_comments * comments
        + config.w_stars * stars
        + config.w_follow * follow_bonus
}

/// Rank feed candidates for a viewer: score, sort descending, convert to
/// [`FeedEvent`]s.
#[must_use]
pub fn rank_feed(
    posts: Vec<PostWithMeta>,
    followees: &HashSet<i64>,
    config: &FeedConfig,
    now: DateTime<Utc>,
) -> Vec<FeedEvent> {
    let mut scored: Vec<(f64, PostWithMeta)> = posts
        .into_iter()
        .map(|post| (score_post(&post, followees, config, now), post))
        .collect();

    scored.sort_by(|(score_a, post_a), (score_b, post_b)| {
        score_b
            .total_cmp(score_a)
            .then_with(|| post_b.created_at.cmp(&post_a.created_at))
            .then_with(|| post_b.id.cmp(&post_a.id))
    });

    scored
        .into_iter()
        .map(|(score, post)| FeedEvent {
            id: post.id,
            user: post.username,
            content: post.content,
            timestamp: post.created_at,
            edited: post.edited_at.is_some(),
            comment_count: post.comment_count,
            avg_stars: post.avg_stars,
            rating_count: post.rating_count,
            score,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn post(id: i64, user_id: i64, age_hours: i64, comments: i64, stars: Option<f64>) -> PostWithMeta {
        PostWithMeta {
            id,
            user_id,
            username: format!("user{user_id}"),
            content: "content".to_string(),
            created_at: Utc::now() - Duration::hours(age_hours),
            edited_at: None,
            comment_count: comments,
            avg_stars: stars,
            rating_count: if stars.is_some() { 3 } else { 0 },
        }
    }

    #[test]
    fn fresh_post_beats_old_post() {
        let config = FeedConfig::default();
        let now = Utc::now();
        let followees = HashSet::new();

        let fresh = score_post(&post(1, 1, 0, 0, None), &followees, &config, now);
        let old = score_post(&post(2, 1, 48, 0, None), &followees, &config, now);
        assert!(fresh > old);
    }

    #[test]
    fn engagement_lifts_old_posts() {
        let config = FeedConfig::default();
        let now = Utc::now();
        let followees = HashSet::new();

        // A day-old post with heavy engagement outranks a quiet day-old post
        let busy = score_post(&post(1, 1, 24, 20, Some(4.5)), &followees, &config, now);
        let quiet = score_post(&post(2, 1, 24, 0, None), &followees, &config, now);
        assert!(busy > quiet);
    }

    #[test]
    fn follow_bonus_applies_only_to_followed_authors() {
        let config = FeedConfig::default();
        let now = Utc::now();
        let followees: HashSet<i64> = [7].into_iter().collect();

        // Same creation instant, only the author differs
        let mut followed_post = post(1, 7, 1, 0, None);
        let mut stranger_post = post(2, 8, 1, 0, None);
        followed_post.created_at = now - Duration::hours(1);
        stranger_post.created_at = followed_post.created_at;

        let followed = score_post(&followed_post, &followees, &config, now);
        let stranger = score_post(&stranger_post, &followees, &config, now);
        assert!((followed - stranger - config.w_follow).abs() < 1e-9);
    }

    #[test]
    fn anonymous_viewer_gets_no_follow_bonus() {
        let config = FeedConfig::default();
        let now = Utc::now();

        let score = score_post(&post(1, 7, 1, 0, None), &HashSet::new(), &config, now);
        let with_follow = score_post(
            &post(1, 7, 1, 0, None),
            &[7].into_iter().collect(),
            &config,
            now,
        );
        assert!(with_follow > score);
    }

    #[test]
    fn future_created_at_is_clamped() {
        let config = FeedConfig::default();
        let now = Utc::now();
        let mut skewed = post(1, 1, 0, 0, None);
        skewed.created_at = now + Duration::hours(2);

        let score = score_post(&skewed, &HashSet::new(), &config, now);
        assert!(score.is_finite());
        // Clamped age means full recency weight, nothing more
        assert!((score - config.w_recency).abs() < 1e-9);
    }

    #[test]
    fn rank_feed_sorts_descending_with_id_tiebreak() {
        let config = FeedConfig::default();
        let now = Utc::now();
        let shared_time = now - Duration::hours(1);

        let mut a = post(1, 1, 0, 0, None);
        let mut b = post(2, 1, 0, 0, None);
        a.created_at = shared_time;
        b.created_at = shared_time;

        let events = rank_feed(vec![a, b], &HashSet::new(), &config, now);
        // Identical scores and timestamps: higher id first
        assert_eq!(events[0].id, 2);
        assert_eq!(events[1].id, 1);
        assert!(events[0].score >= events[1].score);
    }

    #[test]
    fn scores_are_attached_to_events() {
        let config = FeedConfig::default();
        let now = Utc::now();
        let events = rank_feed(
            vec![post(1, 1, 2, 5, Some(4.0))],
            &HashSet::new(),
            &config,
            now,
        );
        assert_eq!(events.len(), 1);
        assert!(events[0].score > 0.0);
        assert_eq!(events[0].comment_count, 5);
    }
}
