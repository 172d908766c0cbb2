//! Password hashing and session management.

mod password;
mod session;

use thiserror::Error;

pub use password::{hash_password, verify_password};
pub use session::{SESSION_COOKIE, Sessions, validate_password, validate_username};

/// Authentication errors.
#[derive(Debug, Error)]
pub enum AuthError {
    /// Password hashing failed.
    #[error("Password hashing error: {0}")]
    Hashing(String),

    /// Session storage failed.
    #[error(transparent)]
    Persistence(#[from] crate::persistence::PersistenceError),
}
