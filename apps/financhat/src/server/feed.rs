//! Feed, post, comment and rating endpoints.

use std::collections::HashSet;
use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, State};
use axum::http::HeaderMap;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{ApiError, AppState, maybe_user, require_user};
use crate::error::{ErrorCode, ServiceError};
use crate::models::{CommentView, FeedEvent, RatingSummary};
use crate::ranking::rank_feed;

/// Maximum post length in characters.
const MAX_POST_CHARS: usize = 2_000;

/// Maximum comment length in characters.
const MAX_COMMENT_CHARS: usize = 1_000;

/// Trim and validate a content body.
fn validate_content(content: &str, max_chars: usize) -> Result<String, ApiError> {
    let trimmed = content.trim();
    if trimmed.is_empty() {
        return Err(ServiceError::new(ErrorCode::InvalidContent, "Content is empty").into());
    }
    if trimmed.chars().count() > max_chars {
        return Err(ServiceError::new(
            ErrorCode::InvalidContent,
            format!("Content exceeds {max_chars} characters"),
        )
        .into());
    }
    Ok(trimmed.to_string())
}

/// A request body carrying only content.
#[derive(Debug, Deserialize)]
pub struct ContentBody {
    /// Body text.
    pub content: String,
}

/// A created or edited post as returned to the author.
#[derive(Debug, Serialize)]
pub struct PostView {
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
}

/// Ranked feed endpoint. Viewer-aware when a session is presented.
pub async fn ranked_feed(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Json<Vec<FeedEvent>>, ApiError> {
    let viewer = maybe_user(&state, &headers).await?;

    let candidates = state
        .database
        .posts()
        .feed_candidates(i64::from(state.config.feed.page_size))
        .await?;

    let followees = match &viewer {
        Some(user) => state.database.follows().followees_of(user.id).await?,
        None => HashSet::new(),
    };

    let events = rank_feed(candidates, &followees, &state.config.feed, Utc::now());
    Ok(Json(events))
}

/// Create-post endpoint.
pub async fn create_post(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(body): Json<ContentBody>,
) -> Result<Json<PostView>, ApiError> {
    let user = require_user(&state, &headers).await?;
    let content = validate_content(&body.content, MAX_POST_CHARS)?;

    let post = state.database.posts().create(user.id, &content).await?;
    tracing::info!(post_id = post.id, username = %user.username, "Post created");

    Ok(Json(PostView {
        id: post.id,
        user: user.username,
        content: post.content,
        timestamp: post.created_at,
        edited: false,
    }))
}

/// Edit-post endpoint. Owner only.
pub async fn edit_post(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    headers: HeaderMap,
    Json(body): Json<ContentBody>,
) -> Result<Json<PostView>, ApiError> {
    let user = require_user(&state, &headers).await?;
    let content = validate_content(&body.content, MAX_POST_CHARS)?;

    let post = state
        .database
        .posts()
        .by_id(id)
        .await?
        .ok_or_else(|| ApiError::from_error(ServiceError::post_not_found(id)))?;

    if post.user_id != user.id {
        return Err(not_owner("post", id));
    }

    state.database.posts().update_content(id, &content).await?;

    Ok(Json(PostView {
        id,
        user: user.username,
        content,
        timestamp: post.created_at,
        edited: true,
    }))
}

/// Delete-post endpoint. Owner only.
pub async fn delete_post(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    headers: HeaderMap,
) -> Result<Json<serde_json::Value>, ApiError> {
    let user = require_user(&state, &headers).await?;

    let post = state
        .database
        .posts()
        .by_id(id)
        .await?
        .ok_or_else(|| ApiError::from_error(ServiceError::post_not_found(id)))?;

    if post.user_id != user.id {
        return Err(not_owner("post", id));
    }

    state.database.posts().delete(id).await?;
    Ok(Json(serde_json::json!({ "deleted": true })))
}

/// List comments on a post, oldest first.
pub async fn post_comments(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<Json<Vec<CommentView>>, ApiError> {
    state
        .database
        .posts()
        .by_id(id)
        .await?
        .ok_or_else(|| ApiError::from_error(ServiceError::post_not_found(id)))?;

    let comments = state.database.comments().for_post(id).await?;
    Ok(Json(comments))
}

/// Comment on a post.
pub async fn create_post_comment(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    headers: HeaderMap,
    Json(body): Json<ContentBody>,
) -> Result<Json<CommentView>, ApiError> {
    let user = require_user(&state, &headers).await?;
    let content = validate_content(&body.content, MAX_COMMENT_CHARS)?;

    state
        .database
        .posts()
        .by_id(id)
        .await?
        .ok_or_else(|| ApiError::from_error(ServiceError::post_not_found(id)))?;

    let comment = state
        .database
        .comments()
        .create_post_comment(user.id, id, &content)
        .await?;

    Ok(Json(CommentView {
        id: comment.id,
        username: user.username,
        content: comment.content,
        timestamp: comment.created_at,
    }))
}

/// Delete a comment (post or asset comment). Owner only.
pub async fn delete_comment(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    headers: HeaderMap,
) -> Result<Json<serde_json::Value>, ApiError> {
    let user = require_user(&state, &headers).await?;

    let comment = state
        .database
        .comments()
        .by_id(id)
        .await?
        .ok_or_else(|| ApiError::from_error(ServiceError::comment_not_found(id)))?;

    if comment.user_id != user.id {
        return Err(not_owner("comment", id));
    }

    state.database.comments().delete(id).await?;
    Ok(Json(serde_json::json!({ "deleted": true })))
}

/// List comments on an asset page, newest first.
pub async fn asset_comments(
    State(state): State<Arc<AppState>>,
    Path(symbol): Path<String>,
) -> Result<Json<Vec<CommentView>>, ApiError> {
    let asset = require_asset(&symbol)?;
    let comments = state.database.comments().for_asset(asset).await?;
    Ok(Json(comments))
}

/// Asset comment creation body.
#[derive(Debug, Deserialize)]
pub struct AssetCommentBody {
    /// Asset key.
    pub symbol: String,
    /// Body text.
    pub content: String,
}

/// Comment on an asset page.
pub async fn create_asset_comment(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(body): Json<AssetCommentBody>,
) -> Result<Json<CommentView>, ApiError> {
    let user = require_user(&state, &headers).await?;
    let asset = require_asset(&body.symbol)?;
    let content = validate_content(&body.content, MAX_COMMENT_CHARS)?;

    let comment = state
        .database
        .comments()
        .create_asset_comment(user.id, asset, &content)
        .await?;

    Ok(Json(CommentView {
        id: comment.id,
        username: user.username,
        content: comment.content,
        timestamp: comment.created_at,
    }))
}

/// Star rating body.
#[derive(Debug, Deserialize)]
pub struct RatingBody {
    /// Stars, 1..=5.
    pub stars: u8,
}

fn validate_stars(stars: u8) -> Result<(), ApiError> {
    if (1..=5).contains(&stars) {
        Ok(())
    } else {
        Err(ServiceError::new(
            ErrorCode::InvalidRating,
            format!("Stars must be between 1 and 5, got {stars}"),
        )
        .into())
    }
}

/// Rate a post. Re-rating replaces the previous stars.
pub async fn rate_post(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    headers: HeaderMap,
    Json(body): Json<RatingBody>,
) -> Result<Json<RatingSummary>, ApiError> {
    let user = require_user(&state, &headers).await?;
    validate_stars(body.stars)?;

    state
        .database
        .posts()
        .by_id(id)
        .await?
        .ok_or_else(|| ApiError::from_error(ServiceError::post_not_found(id)))?;

    state.database.ratings().rate_post(user.id, id, body.stars).await?;
    let summary = state.database.ratings().post_summary(id).await?;
    Ok(Json(summary))
}

/// Rate a comment. Re-rating replaces the previous stars.
pub async fn rate_comment(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    headers: HeaderMap,
    Json(body): Json<RatingBody>,
) -> Result<Json<RatingSummary>, ApiError> {
    let user = require_user(&state, &headers).await?;
    validate_stars(body.stars)?;

    state
        .database
        .comments()
        .by_id(id)
        .await?
        .ok_or_else(|| ApiError::from_error(ServiceError::comment_not_found(id)))?;

    state
        .database
        .ratings()
        .rate_comment(user.id, id, body.stars)
        .await?;
    let summary = state.database.ratings().comment_summary(id).await?;
    Ok(Json(summary))
}

/// Resolve an asset key or fail with 404.
fn require_asset(symbol: &str) -> Result<&'static str, ApiError> {
    crate::marketdata::find_asset(symbol)
        .map(|asset| asset.key)
        .ok_or_else(|| {
            ApiError::from_error(
                ServiceError::new(ErrorCode::AssetNotFound, format!("Unknown asset {symbol}"))
                    .with_context("symbol", symbol),
            )
        })
}

fn not_owner(kind: &str, id: i64) -> ApiError {
    ApiError::from_error(
        ServiceError::new(ErrorCode::NotOwner, format!("Not the owner of this {kind}"))
            .with_context(format!("{kind}_id"), id.to_string()),
    )
}
