//! Alpha Vantage currency exchange rate adapter (forex prices).

use rust_decimal::Decimal;
use serde::Deserialize;

use super::{HttpClient, ProviderError};
use crate::config::ProvidersConfig;

/// Alpha Vantage REST adapter.
#[derive(Debug, Clone)]
pub struct AlphaVantageProvider {
    http: HttpClient,
    base_url: String,
    api_key: String,
}

/// Envelope around the realtime exchange rate block.
///
/// Alpha Vantage reports rate-limit exhaustion as HTTP 200 with a "Note"
/// body and no rate block, so the block is optional.
#[derive(Debug, Deserialize)]
struct ExchangeRateResponse {
    #[serde(rename = "Realtime Currency Exchange Rate")]
    rate: Option<RealtimeExchangeRate>,
}

#[derive(Debug, Deserialize)]
struct RealtimeExchangeRate {
    #[serde(rename = "5. Exchange Rate")]
    exchange_rate: Decimal,
}

impl AlphaVantageProvider {
    /// Create a new adapter from provider configuration.
    pub fn new(config: &ProvidersConfig) -> Result<Self, ProviderError> {
        Ok(Self {
            http: HttpClient::new(config)?,
            base_url: config
                .endpoints
                .alpha_vantage
                .trim_end_matches('/')
                .to_string(),
            api_key: config.alpha_vantage_key.clone(),
        })
    }

    /// Fetch the exchange rate from one currency to another.
    pub async fn exchange_rate(&self, from: &str, to: &str) -> Result<Decimal, ProviderError> {
        let url = format!(
            "{}/query?function=CURRENCY_EXCHANGE_RATE&from_currency={from}&to_currency={to}&apikey={}",
            self.base_url, self.api_key
        );
        let response: ExchangeRateResponse = self.http.get_json(&url).await?;
        response
            .rate
            .map(|r| r.exchange_rate)
            .ok_or_else(|| ProviderError::MissingField("Realtime Currency Exchange Rate".into()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn config_for(server: &MockServer) -> ProvidersConfig {
        let mut config = ProvidersConfig::default();
        config.endpoints.alpha_vantage = server.uri();
        config.alpha_vantage_key = "demo".to_string();
        config.retry.max_attempts = 2;
        config.retry.initial_backoff_ms = 1;
        config
    }

    #[tokio::test]
    async fn parses_nested_rate() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/query"))
            .and(query_param("function", "CURRENCY_EXCHANGE_RATE"))
            .and(query_param("from_currency", "USD"))
            .and(query_param("to_currency", "TRY"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "Realtime Currency Exchange Rate": {
                    "1. From_Currency Code": "USD",
                    "3. To_Currency Code": "TRY",
                    "5. Exchange Rate": "35.4500"
                }
            })))
            .mount(&server)
            .await;

        let provider = AlphaVantageProvider::new(&config_for(&server)).unwrap();
        let rate = provider.exchange_rate("USD", "TRY").await.unwrap();
        assert_eq!(rate.to_string(), "35.4500");
    }

    #[tokio::test]
    async fn quota_note_is_missing_field() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "Note": "Thank you for using Alpha Vantage! Our standard API rate limit is 25 requests per day."
            })))
            .mount(&server)
            .await;

        let provider = AlphaVantageProvider::new(&config_for(&server)).unwrap();
        let err = provider.exchange_rate("USD", "TRY").await.unwrap_err();
        assert!(matches!(err, ProviderError::MissingField(_)));
    }
}
