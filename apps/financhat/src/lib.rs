// Allow unwrap/expect in tests - tests should panic on unexpected errors
#![cfg_attr(
    test,
    allow(
        clippy::unwrap_used,
        clippy::expect_used,
        clippy::float_cmp,
        clippy::too_many_lines,
        clippy::default_trait_access,
        clippy::items_after_statements
    )
)]

//! Financhat - Finance-news social backend
//!
//! A small web backend that serves a finance-news social feed. Third-party
//! market prices (crypto, metals, forex, an equity index) are refreshed in
//! the background into a shared last-known-good snapshot, so request handlers
//! never wait on upstream HTTP. On top of that sits a lightweight social
//! network: users, posts, comments, star ratings, follows and a ranked feed,
//! persisted to SQLite.
//!
//! # Modules
//!
//! - [`marketdata`]: upstream price providers (Binance, Alpha Vantage,
//!   metals.live, Yahoo Finance) behind the [`marketdata::PriceProvider`] port
//! - [`cache`]: the shared price cache and its background refresher
//! - [`persistence`]: SQLite repositories for the social layer
//! - [`ranking`]: the feed scoring formula
//! - [`server`]: the axum HTTP/JSON API
//! - [`auth`]: password hashing and session tokens
//! - [`config`]: YAML configuration with environment interpolation

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::pedantic)]

/// Password hashing and session management.
pub mod auth;

/// Shared price cache and background refresher.
pub mod cache;

/// Economic calendar served from configuration.
pub mod calendar;

/// Configuration loading and validation.
pub mod config;

/// Service-level error codes and rich errors.
pub mod error;

/// Upstream market data providers.
pub mod marketdata;

/// Domain records shared between persistence and the API.
pub mod models;

/// SQLite persistence layer.
pub mod persistence;

/// Feed ranking score.
pub mod ranking;

/// HTTP/JSON API server.
pub mod server;

pub use cache::{MarketCache, Refresher};
pub use config::{Config, load_config};
pub use error::{ErrorCode, ServiceError};
pub use marketdata::{MockPriceProvider, PriceProvider, ProviderError};
pub use persistence::Database;
pub use server::{AppState, create_router};
