//! Upstream market data providers.
//!
//! Each tracked asset is priced by one of four upstreams (Binance, Alpha
//! Vantage, metals.live, Yahoo Finance). The adapters share a retrying HTTP
//! client and sit behind the [`PriceProvider`] port so the cache refresher
//! and the tests never care which upstream a price came from.

mod alpha_vantage;
mod assets;
mod binance;
mod client;
mod metals;
mod mock;
mod yahoo;

use async_trait::async_trait;
use rust_decimal::Decimal;

pub use alpha_vantage::AlphaVantageProvider;
pub use assets::{Asset, AssetSource, TRACKED_ASSETS, find_asset};
pub use binance::BinanceProvider;
pub use client::{HttpClient, RetryPolicy};
pub use metals::MetalsProvider;
pub use mock::MockPriceProvider;
pub use yahoo::YahooProvider;

use crate::config::ProvidersConfig;

/// Provider error.
#[derive(Debug, Clone, thiserror::Error)]
pub enum ProviderError {
    /// Network-level failure (DNS, connect, timeout).
    #[error("Network error: {0}")]
    Network(String),

    /// Upstream returned a non-success status.
    #[error("Upstream API error {status}: {message}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Response body or status text.
        message: String,
    },

    /// Response body could not be parsed.
    #[error("JSON parse error: {0}")]
    JsonParse(String),

    /// Response parsed but the expected field was absent.
    #[error("Missing field in upstream response: {0}")]
    MissingField(String),

    /// Rate limited after exhausting retries.
    #[error("Rate limited, retry after {retry_after_secs}s")]
    RateLimited {
        /// Server-suggested delay.
        retry_after_secs: u64,
    },

    /// Retries exhausted on transient errors.
    #[error("Max retries exceeded after {attempts} attempts")]
    MaxRetriesExceeded {
        /// Attempts made.
        attempts: u32,
    },

    /// The asset key is not tracked.
    #[error("Unknown asset: {0}")]
    UnknownAsset(String),
}

/// Port for fetching a single asset price from upstream.
#[async_trait]
pub trait PriceProvider: Send + Sync {
    /// Fetch the current price for a tracked asset.
    async fn fetch_price(&self, asset: &Asset) -> Result<Decimal, ProviderError>;
}

/// The production provider set, routing each asset to its upstream.
pub struct UpstreamProviders {
    binance: BinanceProvider,
    alpha_vantage: AlphaVantageProvider,
    metals: MetalsProvider,
    yahoo: YahooProvider,
}

impl UpstreamProviders {
    /// Build all four adapters from configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying HTTP client cannot be constructed.
    pub fn new(config: &ProvidersConfig) -> Result<Self, ProviderError> {
        Ok(Self {
            binance: BinanceProvider::new(config)?,
            alpha_vantage: AlphaVantageProvider::new(config)?,
            metals: MetalsProvider::new(config)?,
            yahoo: YahooProvider::new(config)?,
        })
    }
}

#[async_trait]
impl PriceProvider for UpstreamProviders {
    async fn fetch_price(&self, asset: &Asset) -> Result<Decimal, ProviderError> {
        match asset.source {
            AssetSource::CryptoUsdt { symbol } => self.binance.ticker_price(symbol).await,
            AssetSource::Forex { from, to } => self.alpha_vantage.exchange_rate(from, to).await,
            AssetSource::MetalSpot { symbol } => self.metals.spot_price(symbol).await,
            AssetSource::EquityIndex { symbol } => self.yahoo.index_price(symbol).await,
        }
    }
}
