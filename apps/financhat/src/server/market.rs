//! Market data endpoints, served straight from the price cache.
//!
//! These handlers never call upstream: the background refresher is the only
//! writer, so a slow or dead provider costs requests nothing.

use std::collections::BTreeMap;
use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, Query, State};
use chrono::{DateTime, Duration, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::{ApiError, AppState};
use crate::cache::{MarketCache, PriceSource};
use crate::calendar::{IndicatorView, indicator_views};
use crate::error::{ErrorCode, ServiceError};
use crate::marketdata::{TRACKED_ASSETS, find_asset};
use crate::persistence::Candle;

/// One asset card on the market page.
#[derive(Debug, Serialize)]
pub struct AssetCard {
    /// Display name.
    pub name: String,
    /// Display logo.
    pub logo: String,
    /// Formatted display value.
    pub value: String,
    /// Raw price.
    pub price: Decimal,
    /// Live or fallback.
    pub source: PriceSource,
    /// Whether the cached value exceeded the staleness threshold.
    pub stale: bool,
    /// Seconds since the value was recorded.
    pub age_secs: i64,
}

/// Market page endpoint: display-oriented cards per tracked asset.
pub async fn market_data(
    State(state): State<Arc<AppState>>,
) -> Json<BTreeMap<String, AssetCard>> {
    let snapshot = state.cache.snapshot();

    let mut cards = BTreeMap::new();
    for asset in TRACKED_ASSETS {
        if let Some(entry) = snapshot.get(asset.key) {
            cards.insert(
                asset.key.to_string(),
                AssetCard {
                    name: asset.name.to_string(),
                    logo: asset.logo.to_string(),
                    value: entry.price.round_dp(asset.display_decimals).to_string(),
                    price: entry.price,
                    source: entry.source,
                    stale: state.cache.is_stale(entry),
                    age_secs: MarketCache::age_secs(entry),
                },
            );
        }
    }

    Json(cards)
}

/// Raw prices response.
#[derive(Debug, Serialize)]
pub struct PricesResponse {
    /// Price per asset key.
    #[serde(flatten)]
    pub prices: BTreeMap<String, Decimal>,
    /// When the snapshot was taken.
    pub timestamp: DateTime<Utc>,
}

/// Raw prices endpoint, mirroring the cached snapshot.
pub async fn prices(State(state): State<Arc<AppState>>) -> Json<PricesResponse> {
    let snapshot = state.cache.snapshot();

    Json(PricesResponse {
        prices: snapshot
            .entries
            .iter()
            .map(|(key, entry)| (key.clone(), entry.price))
            .collect(),
        timestamp: snapshot.taken_at,
    })
}

/// Economic calendar endpoint.
pub async fn economic_calendar(State(state): State<Arc<AppState>>) -> Json<Vec<IndicatorView>> {
    Json(indicator_views(&state.config.calendar))
}

/// Candlestick query parameters.
#[derive(Debug, Deserialize)]
pub struct CandlestickQuery {
    /// Bucket period: hourly, daily or weekly. Defaults to daily.
    pub period: Option<String>,
}

/// Candlestick response.
#[derive(Debug, Serialize)]
pub struct CandlestickResponse {
    /// Asset key.
    pub symbol: String,
    /// Effective period.
    pub period: String,
    /// OHLC buckets, oldest first.
    pub data: Vec<Candle>,
}

/// Candlestick endpoint: OHLC buckets aggregated from sampled history.
pub async fn candlestick(
    State(state): State<Arc<AppState>>,
    Path(symbol): Path<String>,
    Query(query): Query<CandlestickQuery>,
) -> Result<Json<CandlestickResponse>, ApiError> {
    let asset = find_asset(&symbol).ok_or_else(|| {
        ApiError::from_error(
            ServiceError::new(ErrorCode::AssetNotFound, format!("Unknown asset {symbol}"))
                .with_context("symbol", &symbol),
        )
    })?;

    let period = query.period.as_deref().unwrap_or("daily");
    let (bucket_secs, lookback) = match period {
        "hourly" => (3_600, Duration::days(7)),
        "daily" => (86_400, Duration::days(90)),
        "weekly" => (604_800, Duration::days(365)),
        other => {
            return Err(ServiceError::new(
                ErrorCode::InvalidPeriod,
                format!("Unknown period '{other}', expected hourly, daily or weekly"),
            )
            .into());
        }
    };

    let data = state
        .database
        .history()
        .candles(asset.key, bucket_secs, Utc::now() - lookback)
        .await?;

    Ok(Json(CandlestickResponse {
        symbol: asset.key.to_string(),
        period: period.to_string(),
        data,
    }))
}
