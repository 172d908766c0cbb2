//! Price history repository.
//!
//! The background refresher appends one sample per asset per successful
//! fetch; the candlestick endpoint aggregates those samples into OHLC
//! buckets. Prices are stored as TEXT and re-parsed into `Decimal` (sqlx has
//! no native Decimal codec for SQLite).

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use sqlx::{Row, SqlitePool};

use super::PersistenceError;

/// One recorded price sample.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PriceSample {
    /// Asset key.
    pub symbol: String,
    /// Sampled price.
    pub price: Decimal,
    /// Sample time.
    pub recorded_at: DateTime<Utc>,
}

/// One OHLC bucket.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Candle {
    /// Bucket start (unix seconds).
    pub time: i64,
    /// First price in the bucket.
    pub open: Decimal,
    /// Highest price in the bucket.
    pub high: Decimal,
    /// Lowest price in the bucket.
    pub low: Decimal,
    /// Last price in the bucket.
    pub close: Decimal,
}

/// Repository for `price_history` rows.
pub struct HistoryRepo<'a> {
    pool: &'a SqlitePool,
}

impl<'a> HistoryRepo<'a> {
    pub(super) fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// Append a sample.
    pub async fn record(&self, symbol: &str, price: Decimal) -> Result<(), PersistenceError> {
        sqlx::query("INSERT INTO price_history (symbol, price, recorded_at) VALUES (?, ?, ?)")
            .bind(symbol)
            .bind(price.to_string())
            .bind(Utc::now())
            .execute(self.pool)
            .await?;
        Ok(())
    }

    /// Samples for a symbol since a point in time, oldest first.
    pub async fn samples_since(
        &self,
        symbol: &str,
        since: DateTime<Utc>,
    ) -> Result<Vec<PriceSample>, PersistenceError> {
        let rows = sqlx::query(
            "SELECT symbol, price, recorded_at FROM price_history
             WHERE symbol = ? AND recorded_at >= ?
             ORDER BY recorded_at ASC, id ASC",
        )
        .bind(symbol)
        .bind(since)
        .fetch_all(self.pool)
        .await?;

        rows.iter().map(Self::row_to_sample).collect()
    }

    /// OHLC buckets for a symbol: samples since `since`, grouped into
    /// `bucket_secs`-wide buckets, oldest first. Empty buckets are omitted.
    pub async fn candles(
        &self,
        symbol: &str,
        bucket_secs: i64,
        since: DateTime<Utc>,
    ) -> Result<Vec<Candle>, PersistenceError> {
        let samples = self.samples_since(symbol, since).await?;

        let mut candles: Vec<Candle> = Vec::new();
        for sample in samples {
            let bucket = sample.recorded_at.timestamp().div_euclid(bucket_secs) * bucket_secs;
            match candles.last_mut() {
                Some(candle) if candle.time == bucket => {
                    candle.high = candle.high.max(sample.price);
                    candle.low = candle.low.min(sample.price);
                    candle.close = sample.price;
                }
                _ => {
                    candles.push(Candle {
                        time: bucket,
                        open: sample.price,
                        high: sample.price,
                        low: sample.price,
                        close: sample.price,
                    });
                }
            }
        }

        Ok(candles)
    }

    /// Drop samples older than `cutoff`. Returns rows removed.
    pub async fn prune_before(&self, cutoff: DateTime<Utc>) -> Result<u64, PersistenceError> {
        let result = sqlx::query("DELETE FROM price_history WHERE recorded_at < ?")
            .bind(cutoff)
            .execute(self.pool)
            .await?;
        Ok(result.rows_affected())
    }

    fn row_to_sample(row: &sqlx::sqlite::SqliteRow) -> Result<PriceSample, PersistenceError> {
        let price_text: String = row
            .try_get("price")
            .map_err(|e| PersistenceError::Query(e.to_string()))?;
        let price = price_text
            .parse::<Decimal>()
            .map_err(|e| PersistenceError::Parse(format!("price '{price_text}': {e}")))?;

        Ok(PriceSample {
            symbol: row
                .try_get("symbol")
                .map_err(|e| PersistenceError::Query(e.to_string()))?,
            price,
            recorded_at: row
                .try_get("recorded_at")
                .map_err(|e| PersistenceError::Query(e.to_string()))?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::persistence::Database;
    use chrono::Duration;
    use rust_decimal_macros::dec;

    #[tokio::test]
    async fn record_and_read_back() {
        let db = Database::open_in_memory().await.unwrap();
        db.history().record("btc", dec!(104250.50)).await.unwrap();
        db.history().record("btc", dec!(104300.00)).await.unwrap();
        db.history().record("gold", dec!(2785.40)).await.unwrap();

        let since = Utc::now() - Duration::hours(1);
        let samples = db.history().samples_since("btc", since).await.unwrap();
        assert_eq!(samples.len(), 2);
        assert_eq!(samples[0].price, dec!(104250.50));
        assert_eq!(samples[1].price, dec!(104300.00));
    }

    #[tokio::test]
    async fn candles_aggregate_within_bucket() {
        let db = Database::open_in_memory().await.unwrap();
        for price in ["100", "105", "95", "102"] {
            db.history()
                .record("btc", price.parse().unwrap())
                .await
                .unwrap();
        }

        let since = Utc::now() - Duration::hours(1);
        // One very wide bucket swallows all four samples
        let candles = db.history().candles("btc", 86_400, since).await.unwrap();
        assert_eq!(candles.len(), 1);

        let candle = &candles[0];
        assert_eq!(candle.open, dec!(100));
        assert_eq!(candle.high, dec!(105));
        assert_eq!(candle.low, dec!(95));
        assert_eq!(candle.close, dec!(102));
    }

    #[tokio::test]
    async fn candles_empty_without_samples() {
        let db = Database::open_in_memory().await.unwrap();
        let since = Utc::now() - Duration::hours(1);
        let candles = db.history().candles("btc", 3600, since).await.unwrap();
        assert!(candles.is_empty());
    }

    #[tokio::test]
    async fn prune_drops_old_samples() {
        let db = Database::open_in_memory().await.unwrap();
        db.history().record("btc", dec!(100)).await.unwrap();

        // Everything is newer than this cutoff
        let removed = db
            .history()
            .prune_before(Utc::now() - Duration::days(30))
            .await
            .unwrap();
        assert_eq!(removed, 0);

        let removed = db
            .history()
            .prune_before(Utc::now() + Duration::seconds(1))
            .await
            .unwrap();
        assert_eq!(removed, 1);
    }
}
