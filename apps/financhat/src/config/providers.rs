//! Market data provider endpoints and credentials.
//!
//! Base URLs are configurable so tests can point adapters at a local mock
//! server; production defaults match the real upstream hosts.

use serde::{Deserialize, Serialize};

/// Market data providers configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProvidersConfig {
    /// HTTP request timeout in seconds (applies to every provider).
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    /// Retry policy for transient upstream failures.
    #[serde(default)]
    pub retry: RetrySettings,
    /// Alpha Vantage API key (from environment variable).
    #[serde(default)]
    pub alpha_vantage_key: String,
    /// Upstream base URLs.
    #[serde(default)]
    pub endpoints: ProviderEndpoints,
}

impl Default for ProvidersConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_timeout_secs(),
            retry: RetrySettings::default(),
            alpha_vantage_key: String::new(),
            endpoints: ProviderEndpoints::default(),
        }
    }
}

/// Upstream base URLs, one per provider.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderEndpoints {
    /// Binance REST API base URL.
    #[serde(default = "default_binance_url")]
    pub binance: String,
    /// Alpha Vantage base URL.
    #[serde(default = "default_alpha_vantage_url")]
    pub alpha_vantage: String,
    /// metals.live spot API base URL.
    #[serde(default = "default_metals_url")]
    pub metals: String,
    /// Yahoo Finance chart API base URL.
    #[serde(default = "default_yahoo_url")]
    pub yahoo: String,
}

impl Default for ProviderEndpoints {
    fn default() -> Self {
        Self {
            binance: default_binance_url(),
            alpha_vantage: default_alpha_vantage_url(),
            metals: default_metals_url(),
            yahoo: default_yahoo_url(),
        }
    }
}

/// Retry policy for upstream calls.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetrySettings {
    /// Maximum number of attempts (including the first).
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
    /// Initial backoff in milliseconds.
    #[serde(default = "default_initial_backoff_ms")]
    pub initial_backoff_ms: u64,
    /// Maximum backoff in milliseconds.
    #[serde(default = "default_max_backoff_ms")]
    pub max_backoff_ms: u64,
    /// Backoff multiplier.
    #[serde(default = "default_multiplier")]
    pub multiplier: f64,
}

impl Default for RetrySettings {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            initial_backoff_ms: default_initial_backoff_ms(),
            max_backoff_ms: default_max_backoff_ms(),
            multiplier: default_multiplier(),
        }
    }
}

fn default_binance_url() -> String {
    "https://api.binance.com".to_string()
}

fn default_alpha_vantage_url() -> String {
    "https://www.alphavantage.co".to_string()
}

fn default_metals_url() -> String {
    "https://api.metals.live".to_string()
}

fn default_yahoo_url() -> String {
    "https://query1.finance.yahoo.com".to_string()
}

const fn default_timeout_secs() -> u64 {
    5
}

const fn default_max_attempts() -> u32 {
    3
}

const fn default_initial_backoff_ms() -> u64 {
    100
}

const fn default_max_backoff_ms() -> u64 {
    2_000
}

const fn default_multiplier() -> f64 {
    2.0
}
