//! HTTP/JSON API server.
//!
//! Routes mirror the original frontend's API surface: a market section served
//! straight from the price cache, and a social section backed by SQLite.
//! All handlers return `Result<Json<_>, ApiError>`; `ApiError` renders the
//! service error as a JSON body with the mapped status code.

mod accounts;
mod feed;
mod market;

use std::sync::Arc;

use axum::Json;
use axum::http::{HeaderMap, header};
use axum::response::IntoResponse;
use axum::routing::{delete, get, post, put};
use axum::Router;
use tower_http::cors::{Any, CorsLayer};

use crate::auth::{SESSION_COOKIE, Sessions};
use crate::cache::MarketCache;
use crate::config::Config;
use crate::error::ServiceError;
use crate::models::User;
use crate::persistence::Database;

/// Shared state for the HTTP server.
pub struct AppState {
    /// Service database.
    pub database: Arc<Database>,
    /// Shared price cache.
    pub cache: Arc<MarketCache>,
    /// Service configuration.
    pub config: Arc<Config>,
}

impl AppState {
    /// Create the shared state.
    #[must_use]
    pub fn new(database: Arc<Database>, cache: Arc<MarketCache>, config: Arc<Config>) -> Self {
        Self {
            database,
            cache,
            config,
        }
    }

    /// Session operations bound to this state's database and TTL.
    #[must_use]
    pub fn sessions(&self) -> Sessions<'_> {
        Sessions::new(&self.database, self.config.server.session_ttl_days)
    }
}

/// Create the Axum router with all endpoints.
///
/// CORS is wide open, matching the original deployment where the frontend is
/// served from a different origin.
#[must_use]
pub fn create_router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(health_check))
        // Accounts
        .route("/api/register", post(accounts::register))
        .route("/api/login", post(accounts::login))
        .route("/api/logout", post(accounts::logout))
        .route("/api/check-session", get(accounts::check_session))
        .route("/api/profile/{username}", get(accounts::profile))
        .route("/api/follow/{username}", post(accounts::follow))
        .route("/api/follow/{username}", delete(accounts::unfollow))
        // Market
        .route("/api/market-data", get(market::market_data))
        .route("/api/prices", get(market::prices))
        .route("/api/economic-calendar", get(market::economic_calendar))
        .route("/api/candlestick/{symbol}", get(market::candlestick))
        // Asset comments
        .route("/api/asset-comments/{symbol}", get(feed::asset_comments))
        .route("/api/asset-comment", post(feed::create_asset_comment))
        .route("/api/asset-comment/{id}", delete(feed::delete_comment))
        // Feed
        .route("/api/feed", get(feed::ranked_feed))
        .route("/api/post", post(feed::create_post))
        .route("/api/post/{id}", put(feed::edit_post))
        .route("/api/post/{id}", delete(feed::delete_post))
        .route("/api/post/{id}/comments", get(feed::post_comments))
        .route("/api/post/{id}/comment", post(feed::create_post_comment))
        .route("/api/comment/{id}", delete(feed::delete_comment))
        .route("/api/post/{id}/rate", post(feed::rate_post))
        .route("/api/comment/{id}/rate", post(feed::rate_comment))
        .layer(cors)
        .with_state(state)
}

/// Health check endpoint.
async fn health_check() -> &'static str {
    "OK"
}

/// Extract the session token from `Authorization: Bearer` or the session
/// cookie.
#[must_use]
pub fn session_token(headers: &HeaderMap) -> Option<String> {
    if let Some(value) = headers.get(header::AUTHORIZATION) {
        if let Ok(text) = value.to_str() {
            if let Some(token) = text.strip_prefix("Bearer ") {
                return Some(token.trim().to_string());
            }
        }
    }

    let cookies = headers.get(header::COOKIE)?.to_str().ok()?;
    for pair in cookies.split(';') {
        let pair = pair.trim();
        if let Some(value) = pair.strip_prefix(SESSION_COOKIE) {
            if let Some(token) = value.strip_prefix('=') {
                return Some(token.to_string());
            }
        }
    }
    None
}

/// Resolve the current user, or fail with 401.
pub(crate) async fn require_user(
    state: &AppState,
    headers: &HeaderMap,
) -> Result<User, ApiError> {
    maybe_user(state, headers)
        .await?
        .ok_or_else(|| ApiError::from_error(ServiceError::unauthenticated()))
}

/// Resolve the current user if a valid session is presented.
pub(crate) async fn maybe_user(
    state: &AppState,
    headers: &HeaderMap,
) -> Result<Option<User>, ApiError> {
    let Some(token) = session_token(headers) else {
        return Ok(None);
    };
    let user = state
        .sessions()
        .resolve(&token)
        .await
        .map_err(|e| ApiError::internal(e.to_string()))?;
    Ok(user)
}

/// API error type mapping service errors onto HTTP responses.
#[derive(Debug)]
pub struct ApiError(ServiceError);

impl ApiError {
    /// Create from a service error.
    #[must_use]
    pub fn from_error(error: ServiceError) -> Self {
        Self(error)
    }

    /// Create an internal error.
    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self(ServiceError::internal(message))
    }
}

impl From<ServiceError> for ApiError {
    fn from(error: ServiceError) -> Self {
        Self(error)
    }
}

impl From<crate::persistence::PersistenceError> for ApiError {
    fn from(error: crate::persistence::PersistenceError) -> Self {
        Self(ServiceError::from(error))
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let status = self.0.code().http_status();

        if status.is_server_error() {
            tracing::error!(code = %self.0.code(), message = self.0.message(), "Request failed");
        }

        (status, Json(self.0.to_http_response())).into_response()
    }
}

/// Build a `Set-Cookie` value for a session token.
#[must_use]
pub(crate) fn session_cookie(token: &str, max_age_days: u32) -> String {
    let max_age = u64::from(max_age_days) * 86_400;
    format!("{SESSION_COOKIE}={token}; Path=/; HttpOnly; SameSite=Lax; Max-Age={max_age}")
}

/// A `Set-Cookie` value that clears the session cookie.
#[must_use]
pub(crate) fn clear_session_cookie() -> String {
    format!("{SESSION_COOKIE}=; Path=/; HttpOnly; SameSite=Lax; Max-Age=0")
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn token_from_bearer_header() {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::AUTHORIZATION,
            HeaderValue::from_static("Bearer abc-123"),
        );
        assert_eq!(session_token(&headers).as_deref(), Some("abc-123"));
    }

    #[test]
    fn token_from_cookie() {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::COOKIE,
            HeaderValue::from_static("theme=dark; financhat_session=tok-9; lang=tr"),
        );
        assert_eq!(session_token(&headers).as_deref(), Some("tok-9"));
    }

    #[test]
    fn bearer_wins_over_cookie() {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::AUTHORIZATION,
            HeaderValue::from_static("Bearer from-bearer"),
        );
        headers.insert(
            header::COOKIE,
            HeaderValue::from_static("financhat_session=from-cookie"),
        );
        assert_eq!(session_token(&headers).as_deref(), Some("from-bearer"));
    }

    #[test]
    fn no_token_is_none() {
        assert!(session_token(&HeaderMap::new()).is_none());
    }

    #[test]
    fn cookie_format() {
        let cookie = session_cookie("tok", 7);
        assert!(cookie.starts_with("financhat_session=tok;"));
        assert!(cookie.contains("Max-Age=604800"));
        assert!(clear_session_cookie().contains("Max-Age=0"));
    }
}
