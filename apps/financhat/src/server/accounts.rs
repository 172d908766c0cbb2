//! Account, session and profile endpoints.

use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, State};
use axum::http::{HeaderMap, header};
use axum::response::{AppendHeaders, IntoResponse};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{ApiError, AppState, clear_session_cookie, maybe_user, require_user, session_cookie, session_token};
use crate::auth::{hash_password, validate_password, validate_username, verify_password};
use crate::error::{ErrorCode, ServiceError};
use crate::models::Profile;
use crate::persistence::PersistenceError;

/// Request to register a new account.
#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    /// Login name.
    pub username: String,
    /// Display name.
    #[serde(default)]
    pub full_name: String,
    /// Plaintext password.
    pub password: String,
}

/// Request to log in.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    /// Login name.
    pub username: String,
    /// Plaintext password.
    pub password: String,
}

/// Response after register/login.
#[derive(Debug, Serialize)]
pub struct SessionResponse {
    /// Session token (also set as a cookie).
    pub token: String,
    /// Logged-in username.
    pub username: String,
}

/// Register endpoint.
pub async fn register(
    State(state): State<Arc<AppState>>,
    Json(req): Json<RegisterRequest>,
) -> Result<impl IntoResponse, ApiError> {
    if !validate_username(&req.username) {
        return Err(ServiceError::new(
            ErrorCode::InvalidUsername,
            "Username must be 3-32 characters from [A-Za-z0-9_]",
        )
        .into());
    }
    if !validate_password(&req.password) {
        return Err(ServiceError::new(
            ErrorCode::WeakPassword,
            "Password must be at least 8 characters",
        )
        .into());
    }

    let password_hash =
        hash_password(&req.password).map_err(|e| ApiError::internal(e.to_string()))?;

    let user = match state
        .database
        .users()
        .create(&req.username, &req.full_name, &password_hash)
        .await
    {
        Ok(user) => user,
        Err(PersistenceError::Conflict(_)) => {
            return Err(ServiceError::new(
                ErrorCode::UsernameTaken,
                format!("Username {} is taken", req.username),
            )
            .with_context("username", &req.username)
            .into());
        }
        Err(e) => return Err(e.into()),
    };

    tracing::info!(username = %user.username, "User registered");

    let session = state
        .sessions()
        .create(user.id)
        .await
        .map_err(|e| ApiError::internal(e.to_string()))?;

    let cookie = session_cookie(&session.token, state.config.server.session_ttl_days);
    Ok((
        AppendHeaders([(header::SET_COOKIE, cookie)]),
        Json(SessionResponse {
            token: session.token,
            username: user.username,
        }),
    ))
}

/// Login endpoint.
pub async fn login(
    State(state): State<Arc<AppState>>,
    Json(req): Json<LoginRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let user = state.database.users().by_username(&req.username).await?;

    // Verify against a user that may not exist; same error either way so the
    // response does not leak which usernames are registered.
    let Some(user) = user.filter(|u| verify_password(&req.password, &u.password_hash)) else {
        return Err(
            ServiceError::new(ErrorCode::BadCredentials, "Bad username or password").into(),
        );
    };

    let session = state
        .sessions()
        .create(user.id)
        .await
        .map_err(|e| ApiError::internal(e.to_string()))?;

    tracing::info!(username = %user.username, "User logged in");

    let cookie = session_cookie(&session.token, state.config.server.session_ttl_days);
    Ok((
        AppendHeaders([(header::SET_COOKIE, cookie)]),
        Json(SessionResponse {
            token: session.token,
            username: user.username,
        }),
    ))
}

/// Logout endpoint. Always succeeds, even without a session.
pub async fn logout(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<impl IntoResponse, ApiError> {
    if let Some(token) = session_token(&headers) {
        state
            .sessions()
            .revoke(&token)
            .await
            .map_err(|e| ApiError::internal(e.to_string()))?;
    }

    Ok((
        AppendHeaders([(header::SET_COOKIE, clear_session_cookie())]),
        Json(serde_json::json!({ "logged_out": true })),
    ))
}

/// Session check response.
#[derive(Debug, Serialize)]
pub struct CheckSessionResponse {
    /// Whether a valid session was presented.
    pub logged_in: bool,
    /// Username, when logged in.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    /// Avatar, when logged in.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,
}

/// Session check endpoint.
pub async fn check_session(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Json<CheckSessionResponse>, ApiError> {
    let user = maybe_user(&state, &headers).await?;

    Ok(Json(match user {
        Some(user) => CheckSessionResponse {
            logged_in: true,
            username: Some(user.username),
            avatar: user.avatar,
        },
        None => CheckSessionResponse {
            logged_in: false,
            username: None,
            avatar: None,
        },
    }))
}

/// One post on a profile page.
#[derive(Debug, Serialize)]
pub struct ProfilePost {
    /// Post id.
    pub id: i64,
    /// Body text.
    pub content: String,
    /// Creation time.
    pub timestamp: DateTime<Utc>,
    /// Whether the post was edited.
    pub edited: bool,
}

/// Profile response: public profile plus recent posts.
#[derive(Debug, Serialize)]
pub struct ProfileResponse {
    /// Public profile fields.
    #[serde(flatten)]
    pub profile: Profile,
    /// Recent posts, newest first.
    pub posts: Vec<ProfilePost>,
}

/// Number of recent posts shown on a profile.
const PROFILE_POST_LIMIT: i64 = 20;

/// Profile endpoint.
pub async fn profile(
    State(state): State<Arc<AppState>>,
    Path(username): Path<String>,
) -> Result<Json<ProfileResponse>, ApiError> {
    let user = state
        .database
        .users()
        .by_username(&username)
        .await?
        .ok_or_else(|| ApiError::from_error(ServiceError::user_not_found(&username)))?;

    let total_posts = state.database.posts().count_by_user(user.id).await?;
    let total_comments = state.database.comments().count_by_user(user.id).await?;
    let counts = state.database.follows().counts(user.id).await?;
    let recent = state
        .database
        .posts()
        .recent_by_user(user.id, PROFILE_POST_LIMIT)
        .await?;

    Ok(Json(ProfileResponse {
        profile: Profile {
            username: user.username,
            full_name: user.full_name,
            bio: user.bio,
            avatar: user.avatar,
            total_posts,
            total_comments,
            followers: counts.followers,
            following: counts.following,
        },
        posts: recent
            .into_iter()
            .map(|p| ProfilePost {
                id: p.id,
                content: p.content,
                timestamp: p.created_at,
                edited: p.edited_at.is_some(),
            })
            .collect(),
    }))
}

/// Follow endpoint.
pub async fn follow(
    State(state): State<Arc<AppState>>,
    Path(username): Path<String>,
    headers: HeaderMap,
) -> Result<Json<serde_json::Value>, ApiError> {
    let user = require_user(&state, &headers).await?;

    let target = state
        .database
        .users()
        .by_username(&username)
        .await?
        .ok_or_else(|| ApiError::from_error(ServiceError::user_not_found(&username)))?;

    if target.id == user.id {
        return Err(
            ServiceError::new(ErrorCode::SelfFollow, "Users cannot follow themselves").into(),
        );
    }

    match state.database.follows().follow(user.id, target.id).await {
        Ok(()) => Ok(Json(serde_json::json!({ "following": true }))),
        Err(PersistenceError::Conflict(_)) => Err(ServiceError::new(
            ErrorCode::AlreadyFollowing,
            format!("Already following {username}"),
        )
        .into()),
        Err(e) => Err(e.into()),
    }
}

/// Unfollow endpoint. Unfollowing someone not followed is a no-op.
pub async fn unfollow(
    State(state): State<Arc<AppState>>,
    Path(username): Path<String>,
    headers: HeaderMap,
) -> Result<Json<serde_json::Value>, ApiError> {
    let user = require_user(&state, &headers).await?;

    let target = state
        .database
        .users()
        .by_username(&username)
        .await?
        .ok_or_else(|| ApiError::from_error(ServiceError::user_not_found(&username)))?;

    let removed = state.database.follows().unfollow(user.id, target.id).await?;
    Ok(Json(serde_json::json!({ "following": false, "removed": removed })))
}
