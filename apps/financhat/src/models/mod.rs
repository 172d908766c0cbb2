//! Domain records shared between the persistence layer and the API.
//!
//! Row types derive `sqlx::FromRow` and mirror the SQLite schema; view types
//! carry the joined fields handlers actually serve.

mod comment;
mod follow;
mod post;
mod rating;
mod user;

pub use comment::{Comment, CommentView};
pub use follow::FollowCounts;
pub use post::{FeedEvent, Post, PostWithMeta};
pub use rating::RatingSummary;
pub use user::{Profile, Session, User};
