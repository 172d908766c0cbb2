//! Background price refresher.
//!
//! Periodically fetches every tracked asset from its upstream provider and
//! merges the results into the shared [`MarketCache`]. Fetches run
//! concurrently with a short per-request timeout, so one slow upstream cannot
//! hold the whole cycle hostage. A failed fetch keeps the previous cached
//! value; only the symbols that succeeded are updated.

use std::sync::Arc;

use tokio::task::{JoinHandle, JoinSet};
use tokio_util::sync::CancellationToken;

use super::MarketCache;
use crate::config::MarketConfig;
use crate::marketdata::{PriceProvider, TRACKED_ASSETS};
use crate::persistence::Database;

/// History samples older than this are pruned after each refresh cycle.
/// Comfortably past the weekly candle lookback of one year.
const HISTORY_RETENTION_DAYS: i64 = 400;

/// Outcome of one refresh cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RefreshOutcome {
    /// Assets updated with a live price.
    pub updated: usize,
    /// Assets whose fetch failed (previous value kept).
    pub failed: usize,
}

/// The background refresher task.
pub struct Refresher {
    cache: Arc<MarketCache>,
    provider: Arc<dyn PriceProvider>,
    database: Arc<Database>,
    interval_secs: u64,
    shutdown: CancellationToken,
}

impl Refresher {
    /// Create a new refresher.
    #[must_use]
    pub fn new(
        cache: Arc<MarketCache>,
        provider: Arc<dyn PriceProvider>,
        database: Arc<Database>,
        config: &MarketConfig,
        shutdown: CancellationToken,
    ) -> Self {
        Self {
            cache,
            provider,
            database,
            interval_secs: config.refresh_interval_secs,
            shutdown,
        }
    }

    /// Run one refresh cycle: fetch every tracked asset concurrently and
    /// merge the successes into the cache and the price history.
    pub async fn refresh_once(&self) -> RefreshOutcome {
        let mut set = JoinSet::new();

        for asset in TRACKED_ASSETS {
            let provider = Arc::clone(&self.provider);
            set.spawn(async move {
                let result = provider.fetch_price(asset).await;
                (asset, result)
            });
        }

        let mut outcome = RefreshOutcome {
            updated: 0,
            failed: 0,
        };

        while let Some(joined) = set.join_next().await {
            let Ok((asset, result)) = joined else {
                outcome.failed += 1;
                continue;
            };

            match result {
                Ok(price) => {
                    self.cache.update_live(asset.key, price);
                    outcome.updated += 1;

                    // History sampling feeds the candlestick endpoint; a
                    // write failure must not fail the refresh.
                    if let Err(e) = self.database.history().record(asset.key, price).await {
                        tracing::warn!(asset = asset.key, error = %e, "Price history write failed");
                    }
                }
                Err(e) => {
                    outcome.failed += 1;
                    tracing::warn!(
                        asset = asset.key,
                        error = %e,
                        "Price fetch failed, keeping last known value"
                    );
                }
            }
        }

        let cutoff = chrono::Utc::now() - chrono::Duration::days(HISTORY_RETENTION_DAYS);
        if let Err(e) = self.database.history().prune_before(cutoff).await {
            tracing::warn!(error = %e, "Price history prune failed");
        }

        tracing::debug!(
            updated = outcome.updated,
            failed = outcome.failed,
            "Refresh cycle complete"
        );

        outcome
    }

    /// Spawn the refresh loop. Runs until the shutdown token is cancelled.
    ///
    /// The first cycle runs immediately so a cold start serves live prices as
    /// soon as the upstreams answer.
    pub fn spawn(self) -> JoinHandle<()> {
        tokio::spawn(async move {
            let mut interval =
                tokio::time::interval(std::time::Duration::from_secs(self.interval_secs));

            loop {
                tokio::select! {
                    () = self.shutdown.cancelled() => {
                        tracing::info!("Refresher shutting down");
                        break;
                    }
                    _ = interval.tick() => {
                        self.refresh_once().await;
                    }
                }
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::PriceSource;
    use crate::config::MarketConfig;
    use crate::marketdata::MockPriceProvider;
    use rust_decimal_macros::dec;

    async fn test_database() -> Arc<Database> {
        Arc::new(Database::open_in_memory().await.unwrap())
    }

    fn refresher(provider: Arc<MockPriceProvider>, database: Arc<Database>) -> Refresher {
        let config = MarketConfig::default();
        Refresher::new(
            Arc::new(MarketCache::new(&config)),
            provider,
            database,
            &config,
            CancellationToken::new(),
        )
    }

    #[tokio::test]
    async fn partial_failure_updates_only_successes() {
        let provider = Arc::new(MockPriceProvider::new());
        for asset in TRACKED_ASSETS {
            provider.set_price(asset.key, dec!(100));
        }
        provider.set_failing("btc", true);

        let database = test_database().await;
        let refresher = refresher(Arc::clone(&provider), database);

        let outcome = refresher.refresh_once().await;
        assert_eq!(outcome.updated, TRACKED_ASSETS.len() - 1);
        assert_eq!(outcome.failed, 1);

        let snapshot = refresher.cache.snapshot();
        // btc keeps its fallback; gold went live
        assert_eq!(snapshot.get("btc").unwrap().source, PriceSource::Fallback);
        assert_eq!(snapshot.get("gold").unwrap().source, PriceSource::Live);
        assert_eq!(snapshot.get("gold").unwrap().price, dec!(100));
    }

    #[tokio::test]
    async fn successful_refresh_records_history() {
        let provider = Arc::new(MockPriceProvider::new());
        for asset in TRACKED_ASSETS {
            provider.set_price(asset.key, dec!(42.5));
        }

        let database = test_database().await;
        let refresher = refresher(Arc::clone(&provider), Arc::clone(&database));
        refresher.refresh_once().await;

        let samples = database
            .history()
            .samples_since("btc", chrono::Utc::now() - chrono::Duration::hours(1))
            .await
            .unwrap();
        assert_eq!(samples.len(), 1);
        assert_eq!(samples[0].price, dec!(42.5));
    }

    #[tokio::test]
    async fn all_failing_keeps_cache_intact() {
        let provider = Arc::new(MockPriceProvider::new());
        for asset in TRACKED_ASSETS {
            provider.set_failing(asset.key, true);
        }

        let database = test_database().await;
        let refresher = refresher(Arc::clone(&provider), database);
        let before = refresher.cache.snapshot();

        let outcome = refresher.refresh_once().await;
        assert_eq!(outcome.updated, 0);
        assert_eq!(outcome.failed, TRACKED_ASSETS.len());

        let after = refresher.cache.snapshot();
        for asset in TRACKED_ASSETS {
            assert_eq!(
                before.get(asset.key).map(|e| e.price),
                after.get(asset.key).map(|e| e.price)
            );
        }
    }
}
