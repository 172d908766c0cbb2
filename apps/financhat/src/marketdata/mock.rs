//! Mock price provider for testing.

use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;
use rust_decimal::Decimal;

use super::{Asset, PriceProvider, ProviderError};

/// Mock price provider for testing.
///
/// Prices are settable per asset key; assets marked as failing return a
/// network error so callers can exercise the last-known-good path.
#[derive(Debug, Default)]
pub struct MockPriceProvider {
    prices: RwLock<HashMap<String, Decimal>>,
    failing: RwLock<Vec<String>>,
}

impl MockPriceProvider {
    /// Create a new mock provider.
    #[must_use]
    pub fn new() -> Self {
        Self {
            prices: RwLock::new(HashMap::new()),
            failing: RwLock::new(vec![]),
        }
    }

    /// Set the price for an asset key.
    #[allow(clippy::unwrap_used)]
    pub fn set_price(&self, key: &str, price: Decimal) {
        let mut prices = self.prices.write().unwrap();
        prices.insert(key.to_string(), price);
    }

    /// Make fetches for an asset key fail.
    #[allow(clippy::unwrap_used)]
    pub fn set_failing(&self, key: &str, failing: bool) {
        let mut list = self.failing.write().unwrap();
        if failing {
            if !list.contains(&key.to_string()) {
                list.push(key.to_string());
            }
        } else {
            list.retain(|k| k != key);
        }
    }
}

#[async_trait]
impl PriceProvider for MockPriceProvider {
    #[allow(clippy::unwrap_used)]
    async fn fetch_price(&self, asset: &Asset) -> Result<Decimal, ProviderError> {
        if self.failing.read().unwrap().contains(&asset.key.to_string()) {
            return Err(ProviderError::Network(format!(
                "mock failure for {}",
                asset.key
            )));
        }

        self.prices
            .read()
            .unwrap()
            .get(asset.key)
            .copied()
            .ok_or_else(|| ProviderError::UnknownAsset(asset.key.to_string()))
    }
}
