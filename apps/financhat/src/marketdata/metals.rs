//! metals.live spot price adapter (gold, silver, copper).

use rust_decimal::Decimal;
use serde::Deserialize;

use super::{HttpClient, ProviderError};
use crate::config::ProvidersConfig;

/// metals.live REST adapter.
#[derive(Debug, Clone)]
pub struct MetalsProvider {
    http: HttpClient,
    base_url: String,
}

/// One entry of the spot response array.
#[derive(Debug, Deserialize)]
struct SpotEntry {
    price: Decimal,
}

impl MetalsProvider {
    /// Create a new adapter from provider configuration.
    pub fn new(config: &ProvidersConfig) -> Result<Self, ProviderError> {
        Ok(Self {
            http: HttpClient::new(config)?,
            base_url: config.endpoints.metals.trim_end_matches('/').to_string(),
        })
    }

    /// Fetch the spot price for a metal symbol (XAU, XAG, COPPER).
    ///
    /// The upstream returns an array of spot entries; the first one is the
    /// current price.
    pub async fn spot_price(&self, symbol: &str) -> Result<Decimal, ProviderError> {
        let url = format!("{}/v1/spot/{symbol}", self.base_url);
        let entries: Vec<SpotEntry> = self.http.get_json(&url).await?;
        entries
            .first()
            .map(|e| e.price)
            .ok_or_else(|| ProviderError::MissingField(format!("spot entry for {symbol}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn config_for(server: &MockServer) -> ProvidersConfig {
        let mut config = ProvidersConfig::default();
        config.endpoints.metals = server.uri();
        config.retry.max_attempts = 2;
        config.retry.initial_backoff_ms = 1;
        config
    }

    #[tokio::test]
    async fn first_entry_wins() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v1/spot/XAU"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
                { "price": 2785.40, "timestamp": 1738000000 },
                { "price": 2784.90, "timestamp": 1737990000 }
            ])))
            .mount(&server)
            .await;

        let provider = MetalsProvider::new(&config_for(&server)).unwrap();
        let price = provider.spot_price("XAU").await.unwrap();
        // JSON float loses trailing zeros on the way into Decimal
        assert_eq!(price.to_string(), "2785.4");
    }

    #[tokio::test]
    async fn empty_array_is_missing_field() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([])))
            .mount(&server)
            .await;

        let provider = MetalsProvider::new(&config_for(&server)).unwrap();
        let err = provider.spot_price("XAG").await.unwrap_err();
        assert!(matches!(err, ProviderError::MissingField(_)));
    }
}
