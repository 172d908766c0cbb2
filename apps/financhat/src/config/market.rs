//! Price cache and refresher configuration.

use serde::{Deserialize, Serialize};

/// Price cache and refresher configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MarketConfig {
    /// Whether the background refresher runs.
    #[serde(default = "default_enabled")]
    pub refresh_enabled: bool,
    /// Seconds between refresh cycles.
    #[serde(default = "default_refresh_interval")]
    pub refresh_interval_secs: u64,
    /// Age in seconds after which a cached price is reported stale.
    #[serde(default = "default_stale_after")]
    pub stale_after_secs: u64,
    /// Placeholder prices served until the first successful fetch.
    ///
    /// Keys are asset keys (`btc`, `gold`, ...); values decimal strings.
    #[serde(default = "default_fallbacks")]
    pub fallbacks: Vec<FallbackPrice>,
}

/// A single configured fallback price.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FallbackPrice {
    /// Asset key.
    pub asset: String,
    /// Placeholder price as a decimal string.
    pub price: String,
}

impl Default for MarketConfig {
    fn default() -> Self {
        Self {
            refresh_enabled: default_enabled(),
            refresh_interval_secs: default_refresh_interval(),
            stale_after_secs: default_stale_after(),
            fallbacks: default_fallbacks(),
        }
    }
}

const fn default_enabled() -> bool {
    true
}

const fn default_refresh_interval() -> u64 {
    30
}

const fn default_stale_after() -> u64 {
    300
}

fn default_fallbacks() -> Vec<FallbackPrice> {
    // Placeholder values from the era the service launched; only served
    // until the first fetch succeeds.
    [
        ("btc", "104250.50"),
        ("gold", "2785.40"),
        ("silver", "30.25"),
        ("copper", "4.15"),
        ("usd_try", "35.45"),
        ("eur_try", "36.82"),
        ("bist100", "10245.67"),
    ]
    .into_iter()
    .map(|(asset, price)| FallbackPrice {
        asset: asset.to_string(),
        price: price.to_string(),
    })
    .collect()
}
