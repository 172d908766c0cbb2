//! Shared price cache.
//!
//! The cache holds the last-known-good price per tracked asset behind a
//! read/write lock. Request handlers only ever read the cache; the background
//! [`Refresher`] is the single writer. Readers never block on upstream I/O.
//!
//! Invariants:
//! - an entry's `fetched_at` is monotonic (writes only move it forward)
//! - a `Live` entry is never replaced by a `Fallback` one
//! - a failed refresh leaves the previous entry untouched

mod refresher;

use std::collections::HashMap;

use chrono::{DateTime, Duration, Utc};
use parking_lot::RwLock;
use rust_decimal::Decimal;
use serde::Serialize;

pub use refresher::Refresher;

use crate::config::MarketConfig;
use crate::marketdata::find_asset;

/// Where a cached price came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PriceSource {
    /// Fetched from the upstream provider.
    Live,
    /// Configured placeholder, no fetch has succeeded yet.
    Fallback,
}

/// A single cached price.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct PriceEntry {
    /// Last-known-good price.
    pub price: Decimal,
    /// Live or fallback.
    pub source: PriceSource,
    /// When this value was recorded.
    pub fetched_at: DateTime<Utc>,
}

/// A point-in-time copy of the cache.
#[derive(Debug, Clone, Serialize)]
pub struct MarketSnapshot {
    /// Entries by asset key.
    pub entries: HashMap<String, PriceEntry>,
    /// When the snapshot was taken.
    pub taken_at: DateTime<Utc>,
}

impl MarketSnapshot {
    /// Look up an entry by asset key.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&PriceEntry> {
        self.entries.get(key)
    }
}

/// The shared last-known-good price cache.
pub struct MarketCache {
    entries: RwLock<HashMap<String, PriceEntry>>,
    stale_after: Duration,
}

impl MarketCache {
    /// Create a cache seeded from the configured fallback prices.
    ///
    /// Fallbacks for unknown asset keys or with unparsable prices are skipped
    /// with a warning; the asset then stays absent until its first fetch.
    #[must_use]
    pub fn new(config: &MarketConfig) -> Self {
        let now = Utc::now();
        let mut entries = HashMap::new();

        for fallback in &config.fallbacks {
            if find_asset(&fallback.asset).is_none() {
                tracing::warn!(asset = %fallback.asset, "Fallback for untracked asset, skipping");
                continue;
            }
            match fallback.price.parse::<Decimal>() {
                Ok(price) => {
                    entries.insert(
                        fallback.asset.clone(),
                        PriceEntry {
                            price,
                            source: PriceSource::Fallback,
                            fetched_at: now,
                        },
                    );
                }
                Err(e) => {
                    tracing::warn!(
                        asset = %fallback.asset,
                        price = %fallback.price,
                        error = %e,
                        "Unparsable fallback price, skipping"
                    );
                }
            }
        }

        Self {
            entries: RwLock::new(entries),
            stale_after: Duration::seconds(config.stale_after_secs as i64),
        }
    }

    /// Record a successful fetch for an asset.
    pub fn update_live(&self, key: &str, price: Decimal) {
        let mut entries = self.entries.write();
        let now = Utc::now();
        let entry = PriceEntry {
            price,
            source: PriceSource::Live,
            fetched_at: now,
        };
        match entries.get(key) {
            // Clock skew guard: never move fetched_at backwards
            Some(previous) if previous.fetched_at > now => {}
            _ => {
                entries.insert(key.to_string(), entry);
            }
        }
    }

    /// Take a point-in-time copy of the cache.
    #[must_use]
    pub fn snapshot(&self) -> MarketSnapshot {
        MarketSnapshot {
            entries: self.entries.read().clone(),
            taken_at: Utc::now(),
        }
    }

    /// Whether an entry is older than the configured staleness threshold.
    #[must_use]
    pub fn is_stale(&self, entry: &PriceEntry) -> bool {
        Utc::now() - entry.fetched_at > self.stale_after
    }

    /// Age of an entry in seconds, clamped at zero.
    #[must_use]
    pub fn age_secs(entry: &PriceEntry) -> i64 {
        (Utc::now() - entry.fetched_at).num_seconds().max(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::MarketConfig;
    use rust_decimal_macros::dec;

    #[test]
    fn seeded_from_fallbacks() {
        let cache = MarketCache::new(&MarketConfig::default());
        let snapshot = cache.snapshot();

        let btc = snapshot.get("btc").unwrap();
        assert_eq!(btc.price, dec!(104250.50));
        assert_eq!(btc.source, PriceSource::Fallback);
    }

    #[test]
    fn unknown_fallback_asset_skipped() {
        let mut config = MarketConfig::default();
        config.fallbacks.push(crate::config::FallbackPrice {
            asset: "dogecoin".to_string(),
            price: "0.10".to_string(),
        });

        let cache = MarketCache::new(&config);
        assert!(cache.snapshot().get("dogecoin").is_none());
    }

    #[test]
    fn live_update_replaces_fallback() {
        let cache = MarketCache::new(&MarketConfig::default());
        cache.update_live("btc", dec!(99000));

        let snapshot = cache.snapshot();
        let btc = snapshot.get("btc").unwrap();
        assert_eq!(btc.price, dec!(99000));
        assert_eq!(btc.source, PriceSource::Live);
    }

    #[test]
    fn fresh_entry_is_not_stale() {
        let cache = MarketCache::new(&MarketConfig::default());
        let snapshot = cache.snapshot();
        let btc = snapshot.get("btc").unwrap();

        assert!(!cache.is_stale(btc));
        assert!(MarketCache::age_secs(btc) <= 1);
    }

    #[test]
    fn old_entry_is_stale() {
        let cache = MarketCache::new(&MarketConfig::default());
        let old = PriceEntry {
            price: dec!(1),
            source: PriceSource::Live,
            fetched_at: Utc::now() - Duration::seconds(3600),
        };
        assert!(cache.is_stale(&old));
    }
}
