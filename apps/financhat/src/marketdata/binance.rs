//! Binance spot ticker adapter (crypto prices).

use rust_decimal::Decimal;
use serde::Deserialize;

use super::{HttpClient, ProviderError};
use crate::config::ProvidersConfig;

/// Binance REST adapter.
#[derive(Debug, Clone)]
pub struct BinanceProvider {
    http: HttpClient,
    base_url: String,
}

/// Ticker price payload. Binance returns the price as a JSON string.
#[derive(Debug, Deserialize)]
struct TickerPrice {
    #[allow(dead_code)]
    symbol: String,
    price: Decimal,
}

impl BinanceProvider {
    /// Create a new adapter from provider configuration.
    pub fn new(config: &ProvidersConfig) -> Result<Self, ProviderError> {
        Ok(Self {
            http: HttpClient::new(config)?,
            base_url: config.endpoints.binance.trim_end_matches('/').to_string(),
        })
    }

    /// Fetch the spot price of `{symbol}USDT`.
    pub async fn ticker_price(&self, symbol: &str) -> Result<Decimal, ProviderError> {
        let url = format!(
            "{}/api/v3/ticker/price?symbol={}USDT",
            self.base_url,
            symbol.to_uppercase()
        );
        let ticker: TickerPrice = self.http.get_json(&url).await?;
        Ok(ticker.price)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ProvidersConfig;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn config_for(server: &MockServer) -> ProvidersConfig {
        let mut config = ProvidersConfig::default();
        config.endpoints.binance = server.uri();
        config.retry.max_attempts = 2;
        config.retry.initial_backoff_ms = 1;
        config
    }

    #[tokio::test]
    async fn parses_string_price() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/v3/ticker/price"))
            .and(query_param("symbol", "BTCUSDT"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "symbol": "BTCUSDT",
                "price": "104250.50"
            })))
            .mount(&server)
            .await;

        let provider = BinanceProvider::new(&config_for(&server)).unwrap();
        let price = provider.ticker_price("BTC").await.unwrap();
        assert_eq!(price.to_string(), "104250.50");
    }

    #[tokio::test]
    async fn non_retryable_status_fails_fast() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(400).set_body_string("bad symbol"))
            .expect(1)
            .mount(&server)
            .await;

        let provider = BinanceProvider::new(&config_for(&server)).unwrap();
        let err = provider.ticker_price("NOPE").await.unwrap_err();
        assert!(matches!(err, ProviderError::Api { status: 400, .. }));
    }

    #[tokio::test]
    async fn retries_then_succeeds_on_transient_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(503))
            .up_to_n_times(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "symbol": "BTCUSDT",
                "price": "104000.00"
            })))
            .mount(&server)
            .await;

        let provider = BinanceProvider::new(&config_for(&server)).unwrap();
        let price = provider.ticker_price("BTC").await.unwrap();
        assert_eq!(price.to_string(), "104000.00");
    }
}
