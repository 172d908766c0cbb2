//! Rich error handling for the Financhat service.
//!
//! This module provides structured error types shared by the HTTP layer and
//! the application services. Errors carry a machine-readable code plus
//! key/value context for debugging and client-side handling.
//!
//! # HTTP Status Codes
//!
//! | Status | Usage |
//! |--------|-------|
//! | 400 | Malformed request, invalid field values |
//! | 401 | Missing or expired session |
//! | 403 | Acting on another user's content |
//! | 404 | Unknown post/comment/user/asset |
//! | 409 | Duplicate username, duplicate follow |
//! | 500 | Unexpected server error |

use std::collections::HashMap;

use axum::http::StatusCode;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Error codes for the Financhat service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    // Validation errors (400)
    /// Invalid request format or missing fields.
    InvalidRequest,
    /// Invalid username (length or character set).
    InvalidUsername,
    /// Password does not meet the minimum requirements.
    WeakPassword,
    /// Invalid star rating (must be 1..=5).
    InvalidRating,
    /// Empty or oversized content body.
    InvalidContent,
    /// Unknown candlestick period.
    InvalidPeriod,

    // Auth errors (401)
    /// No session token presented, or the token is unknown or expired.
    Unauthenticated,
    /// Bad username/password combination.
    BadCredentials,

    // Ownership errors (403)
    /// Content belongs to a different user.
    NotOwner,

    // Not found errors (404)
    /// Post not found.
    PostNotFound,
    /// Comment not found.
    CommentNotFound,
    /// User not found.
    UserNotFound,
    /// Asset symbol is not tracked.
    AssetNotFound,

    // Conflict errors (409)
    /// Username already registered.
    UsernameTaken,
    /// Already following this user.
    AlreadyFollowing,
    /// Users cannot follow themselves.
    SelfFollow,

    // Internal errors
    /// Database error.
    DatabaseError,
    /// Internal server error.
    InternalError,
}

impl ErrorCode {
    /// Get the HTTP status code for this error.
    #[must_use]
    pub const fn http_status(&self) -> StatusCode {
        match self {
            Self::InvalidRequest
            | Self::InvalidUsername
            | Self::WeakPassword
            | Self::InvalidRating
            | Self::InvalidContent
            | Self::InvalidPeriod => StatusCode::BAD_REQUEST,

            Self::Unauthenticated | Self::BadCredentials => StatusCode::UNAUTHORIZED,

            Self::NotOwner => StatusCode::FORBIDDEN,

            Self::PostNotFound
            | Self::CommentNotFound
            | Self::UserNotFound
            | Self::AssetNotFound => StatusCode::NOT_FOUND,

            Self::UsernameTaken | Self::AlreadyFollowing | Self::SelfFollow => {
                StatusCode::CONFLICT
            }

            Self::DatabaseError | Self::InternalError => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Get the error reason string.
    #[must_use]
    pub const fn reason(&self) -> &'static str {
        match self {
            Self::InvalidRequest => "INVALID_REQUEST",
            Self::InvalidUsername => "INVALID_USERNAME",
            Self::WeakPassword => "WEAK_PASSWORD",
            Self::InvalidRating => "INVALID_RATING",
            Self::InvalidContent => "INVALID_CONTENT",
            Self::InvalidPeriod => "INVALID_PERIOD",
            Self::Unauthenticated => "UNAUTHENTICATED",
            Self::BadCredentials => "BAD_CREDENTIALS",
            Self::NotOwner => "NOT_OWNER",
            Self::PostNotFound => "POST_NOT_FOUND",
            Self::CommentNotFound => "COMMENT_NOT_FOUND",
            Self::UserNotFound => "USER_NOT_FOUND",
            Self::AssetNotFound => "ASSET_NOT_FOUND",
            Self::UsernameTaken => "USERNAME_TAKEN",
            Self::AlreadyFollowing => "ALREADY_FOLLOWING",
            Self::SelfFollow => "SELF_FOLLOW",
            Self::DatabaseError => "DATABASE_ERROR",
            Self::InternalError => "INTERNAL_ERROR",
        }
    }
}

impl std::fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.reason())
    }
}

/// A rich error with context for the Financhat service.
#[derive(Debug, Error)]
pub struct ServiceError {
    /// Error code.
    code: ErrorCode,
    /// Human-readable message.
    message: String,
    /// Additional context (key-value pairs).
    context: Vec<(String, String)>,
}

impl ServiceError {
    /// Create a new service error.
    #[must_use]
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            context: Vec::new(),
        }
    }

    /// Add context to the error.
    #[must_use]
    pub fn with_context(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.context.push((key.into(), value.into()));
        self
    }

    /// Get the error code.
    #[must_use]
    pub const fn code(&self) -> ErrorCode {
        self.code
    }

    /// Get the message.
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Get the context.
    #[must_use]
    pub fn context(&self) -> &[(String, String)] {
        &self.context
    }

    /// Convert to an HTTP-compatible error response body.
    #[must_use]
    pub fn to_http_response(&self) -> HttpErrorResponse {
        HttpErrorResponse {
            code: self.code.reason().to_string(),
            message: self.message.clone(),
            details: self.context.iter().cloned().collect(),
        }
    }
}

impl std::fmt::Display for ServiceError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}", self.code.reason(), self.message)
    }
}

/// HTTP-compatible error response body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpErrorResponse {
    /// Error code string.
    pub code: String,
    /// Human-readable message.
    pub message: String,
    /// Additional details.
    pub details: HashMap<String, String>,
}

/// Convenience constructors for common errors.
impl ServiceError {
    /// Invalid request format.
    #[must_use]
    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InvalidRequest, message)
    }

    /// No valid session.
    #[must_use]
    pub fn unauthenticated() -> Self {
        Self::new(ErrorCode::Unauthenticated, "Login required")
    }

    /// Post not found.
    #[must_use]
    pub fn post_not_found(post_id: i64) -> Self {
        Self::new(ErrorCode::PostNotFound, format!("Post {post_id} not found"))
            .with_context("post_id", post_id.to_string())
    }

    /// Comment not found.
    #[must_use]
    pub fn comment_not_found(comment_id: i64) -> Self {
        Self::new(
            ErrorCode::CommentNotFound,
            format!("Comment {comment_id} not found"),
        )
        .with_context("comment_id", comment_id.to_string())
    }

    /// User not found.
    #[must_use]
    pub fn user_not_found(username: &str) -> Self {
        Self::new(
            ErrorCode::UserNotFound,
            format!("User {username} not found"),
        )
        .with_context("username", username)
    }

    /// Internal error.
    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InternalError, message)
    }

    /// Database error.
    #[must_use]
    pub fn database(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::DatabaseError, message)
    }
}

impl From<crate::persistence::PersistenceError> for ServiceError {
    fn from(err: crate::persistence::PersistenceError) -> Self {
        Self::database(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_code_http_mapping() {
        assert_eq!(
            ErrorCode::InvalidRequest.http_status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ErrorCode::Unauthenticated.http_status(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(ErrorCode::NotOwner.http_status(), StatusCode::FORBIDDEN);
        assert_eq!(ErrorCode::PostNotFound.http_status(), StatusCode::NOT_FOUND);
        assert_eq!(ErrorCode::UsernameTaken.http_status(), StatusCode::CONFLICT);
        assert_eq!(
            ErrorCode::InternalError.http_status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_service_error_creation() {
        let error = ServiceError::new(ErrorCode::InvalidRequest, "Bad request")
            .with_context("field", "content")
            .with_context("value", "");

        assert_eq!(error.code(), ErrorCode::InvalidRequest);
        assert_eq!(error.message(), "Bad request");
        assert_eq!(error.context().len(), 2);
    }

    #[test]
    fn test_to_http_response() {
        let error = ServiceError::post_not_found(42);
        let response = error.to_http_response();

        assert_eq!(response.code, "POST_NOT_FOUND");
        assert!(response.details.contains_key("post_id"));
    }

    #[test]
    fn test_error_display() {
        let error = ServiceError::invalid_request("Missing field");
        assert_eq!(error.to_string(), "[INVALID_REQUEST] Missing field");
    }
}
