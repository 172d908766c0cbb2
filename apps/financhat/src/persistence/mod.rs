//! SQLite persistence layer.
//!
//! One [`Database`] owns the connection pool and hands out per-aggregate
//! repositories. The schema is created at startup; SQLite keeps deployment
//! single-node, which is all this service needs.

mod comments;
mod follows;
mod history;
mod posts;
mod ratings;
mod sessions;
mod users;

use sqlx::sqlite::{SqlitePool, SqlitePoolOptions};
use thiserror::Error;
use tracing::info;

pub use comments::CommentRepo;
pub use follows::FollowRepo;
pub use history::{Candle, HistoryRepo, PriceSample};
pub use posts::PostRepo;
pub use ratings::RatingRepo;
pub use sessions::SessionRepo;
pub use users::UserRepo;

use crate::config::DatabaseConfig;

/// Errors from persistence operations.
#[derive(Debug, Error)]
pub enum PersistenceError {
    /// Database connection error.
    #[error("Database connection error: {0}")]
    Connection(String),

    /// Query execution error.
    #[error("Query error: {0}")]
    Query(String),

    /// A uniqueness constraint was violated.
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Stored value could not be parsed back into its domain type.
    #[error("Stored value parse error: {0}")]
    Parse(String),
}

impl From<sqlx::Error> for PersistenceError {
    fn from(err: sqlx::Error) -> Self {
        if let sqlx::Error::Database(db) = &err {
            if db.message().contains("UNIQUE constraint failed") {
                return Self::Conflict(db.message().to_string());
            }
        }
        Self::Query(err.to_string())
    }
}

/// Schema bootstrap statements, executed in order at startup.
const SCHEMA: &[&str] = &[
    "CREATE TABLE IF NOT EXISTS users (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        username TEXT NOT NULL UNIQUE,
        full_name TEXT NOT NULL DEFAULT '',
        password_hash TEXT NOT NULL,
        bio TEXT,
        avatar TEXT,
        created_at TEXT NOT NULL
    )",
    "CREATE TABLE IF NOT EXISTS sessions (
        token TEXT PRIMARY KEY,
        user_id INTEGER NOT NULL REFERENCES users(id) ON DELETE CASCADE,
        created_at TEXT NOT NULL,
        expires_at TEXT NOT NULL
    )",
    "CREATE TABLE IF NOT EXISTS posts (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        user_id INTEGER NOT NULL REFERENCES users(id) ON DELETE CASCADE,
        content TEXT NOT NULL,
        created_at TEXT NOT NULL,
        edited_at TEXT
    )",
    "CREATE TABLE IF NOT EXISTS comments (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        user_id INTEGER NOT NULL REFERENCES users(id) ON DELETE CASCADE,
        post_id INTEGER REFERENCES posts(id) ON DELETE CASCADE,
        asset_symbol TEXT,
        content TEXT NOT NULL,
        created_at TEXT NOT NULL,
        CHECK ((post_id IS NULL) != (asset_symbol IS NULL))
    )",
    "CREATE TABLE IF NOT EXISTS star_ratings (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        user_id INTEGER NOT NULL REFERENCES users(id) ON DELETE CASCADE,
        post_id INTEGER REFERENCES posts(id) ON DELETE CASCADE,
        comment_id INTEGER REFERENCES comments(id) ON DELETE CASCADE,
        stars INTEGER NOT NULL CHECK (stars BETWEEN 1 AND 5),
        created_at TEXT NOT NULL,
        CHECK ((post_id IS NULL) != (comment_id IS NULL)),
        UNIQUE (user_id, post_id),
        UNIQUE (user_id, comment_id)
    )",
    "CREATE TABLE IF NOT EXISTS follows (
        follower_id INTEGER NOT NULL REFERENCES users(id) ON DELETE CASCADE,
        followee_id INTEGER NOT NULL REFERENCES users(id) ON DELETE CASCADE,
        created_at TEXT NOT NULL,
        PRIMARY KEY (follower_id, followee_id),
        CHECK (follower_id != followee_id)
    )",
    "CREATE TABLE IF NOT EXISTS price_history (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        symbol TEXT NOT NULL,
        price TEXT NOT NULL,
        recorded_at TEXT NOT NULL
    )",
    "CREATE INDEX IF NOT EXISTS idx_price_history_symbol_time
        ON price_history(symbol, recorded_at)",
    "CREATE INDEX IF NOT EXISTS idx_comments_post ON comments(post_id)",
    "CREATE INDEX IF NOT EXISTS idx_comments_asset ON comments(asset_symbol)",
    "CREATE INDEX IF NOT EXISTS idx_posts_user ON posts(user_id)",
];

/// The service database.
pub struct Database {
    pool: SqlitePool,
}

impl Database {
    /// Open the database from configuration and bootstrap the schema.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be connected or the schema
    /// cannot be created.
    pub async fn open(config: &DatabaseConfig) -> Result<Self, PersistenceError> {
        let pool = SqlitePoolOptions::new()
            .max_connections(config.max_connections)
            .connect(&config.url)
            .await
            .map_err(|e| PersistenceError::Connection(e.to_string()))?;

        let database = Self { pool };
        database.bootstrap().await?;

        info!(url = %config.url, "Database ready");
        Ok(database)
    }

    /// Open an in-memory database (tests).
    ///
    /// A single connection keeps every query on the same in-memory instance.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be opened.
    pub async fn open_in_memory() -> Result<Self, PersistenceError> {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .map_err(|e| PersistenceError::Connection(e.to_string()))?;

        let database = Self { pool };
        database.bootstrap().await?;
        Ok(database)
    }

    async fn bootstrap(&self) -> Result<(), PersistenceError> {
        // sqlx enables foreign_keys per connection; cascades rely on it
        for statement in SCHEMA {
            sqlx::query(statement).execute(&self.pool).await?;
        }
        Ok(())
    }

    /// User repository.
    #[must_use]
    pub fn users(&self) -> UserRepo<'_> {
        UserRepo::new(&self.pool)
    }

    /// Session repository.
    #[must_use]
    pub fn sessions(&self) -> SessionRepo<'_> {
        SessionRepo::new(&self.pool)
    }

    /// Post repository.
    #[must_use]
    pub fn posts(&self) -> PostRepo<'_> {
        PostRepo::new(&self.pool)
    }

    /// Comment repository.
    #[must_use]
    pub fn comments(&self) -> CommentRepo<'_> {
        CommentRepo::new(&self.pool)
    }

    /// Star rating repository.
    #[must_use]
    pub fn ratings(&self) -> RatingRepo<'_> {
        RatingRepo::new(&self.pool)
    }

    /// Follow repository.
    #[must_use]
    pub fn follows(&self) -> FollowRepo<'_> {
        FollowRepo::new(&self.pool)
    }

    /// Price history repository.
    #[must_use]
    pub fn history(&self) -> HistoryRepo<'_> {
        HistoryRepo::new(&self.pool)
    }
}
