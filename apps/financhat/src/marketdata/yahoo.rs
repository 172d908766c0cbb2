//! Yahoo Finance chart adapter (equity index price).

use rust_decimal::Decimal;
use serde::Deserialize;

use super::{HttpClient, ProviderError};
use crate::config::ProvidersConfig;

/// Yahoo Finance chart API adapter.
#[derive(Debug, Clone)]
pub struct YahooProvider {
    http: HttpClient,
    base_url: String,
}

#[derive(Debug, Deserialize)]
struct ChartResponse {
    chart: Chart,
}

#[derive(Debug, Deserialize)]
struct Chart {
    result: Option<Vec<ChartResult>>,
}

#[derive(Debug, Deserialize)]
struct ChartResult {
    meta: ChartMeta,
}

#[derive(Debug, Deserialize)]
struct ChartMeta {
    #[serde(rename = "regularMarketPrice")]
    regular_market_price: Option<Decimal>,
}

impl YahooProvider {
    /// Create a new adapter from provider configuration.
    pub fn new(config: &ProvidersConfig) -> Result<Self, ProviderError> {
        Ok(Self {
            http: HttpClient::new(config)?,
            base_url: config.endpoints.yahoo.trim_end_matches('/').to_string(),
        })
    }

    /// Fetch the regular market price for an index symbol.
    pub async fn index_price(&self, symbol: &str) -> Result<Decimal, ProviderError> {
        let url = format!("{}/v8/finance/chart/{symbol}", self.base_url);
        let response: ChartResponse = self.http.get_json(&url).await?;
        response
            .chart
            .result
            .and_then(|mut results| {
                if results.is_empty() {
                    None
                } else {
                    results.swap_remove(0).meta.regular_market_price
                }
            })
            .ok_or_else(|| ProviderError::MissingField("chart.result[0].meta.regularMarketPrice".into()))
    }
}
