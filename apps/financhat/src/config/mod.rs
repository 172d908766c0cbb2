//! Configuration module for the Financhat service.
//!
//! Provides configuration loading, validation, and environment variable
//! interpolation for all service components.
//!
//! # Usage
//!
//! ```rust,ignore
//! use financhat::config::{Config, load_config};
//!
//! // Load from default path (config.yaml)
//! let config = load_config(None)?;
//!
//! // Load from custom path
//! let config = load_config(Some("custom/config.yaml"))?;
//!
//! // Access configuration values
//! println!("HTTP port: {}", config.server.http_port);
//! ```

mod calendar;
mod database;
mod feed;
mod market;
mod observability;
mod providers;
mod server;

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use calendar::{CalendarConfig, CalendarEntry};
pub use database::DatabaseConfig;
pub use feed::FeedConfig;
pub use market::{FallbackPrice, MarketConfig};
pub use observability::{LoggingConfig, ObservabilityConfig};
pub use providers::{ProviderEndpoints, ProvidersConfig, RetrySettings};
pub use server::ServerConfig;

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read configuration file.
    #[error("Failed to read config file '{path}': {source}")]
    ReadError {
        /// Path to the config file.
        path: String,
        /// The underlying IO error.
        source: std::io::Error,
    },

    /// Failed to parse YAML configuration.
    #[error("Failed to parse config YAML: {0}")]
    ParseError(#[from] serde_yaml_bw::Error),

    /// Configuration validation failed.
    #[error("Config validation failed: {0}")]
    ValidationError(String),
}

/// Root configuration structure.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// Server configuration.
    #[serde(default)]
    pub server: ServerConfig,
    /// Database configuration.
    #[serde(default)]
    pub database: DatabaseConfig,
    /// Market data provider endpoints and credentials.
    #[serde(default)]
    pub providers: ProvidersConfig,
    /// Price cache and refresher configuration.
    #[serde(default)]
    pub market: MarketConfig,
    /// Feed ranking weights.
    #[serde(default)]
    pub feed: FeedConfig,
    /// Economic calendar entries.
    #[serde(default)]
    pub calendar: CalendarConfig,
    /// Observability configuration.
    #[serde(default)]
    pub observability: ObservabilityConfig,
}

// ============================================
// Configuration Loading
// ============================================

/// Load configuration from a YAML file with environment variable interpolation.
///
/// # Arguments
///
/// * `path` - Optional path to the config file. Defaults to "config.yaml".
///   A missing default file yields the built-in defaults.
///
/// # Errors
///
/// Returns a `ConfigError` if the file cannot be read, parsed, or validated.
pub fn load_config(path: Option<&str>) -> Result<Config, ConfigError> {
    let explicit = path.is_some();
    let path = path.unwrap_or("config.yaml");

    let contents = match std::fs::read_to_string(path) {
        Ok(contents) => contents,
        // The default config file is optional; an explicit path is not.
        Err(e) if !explicit && e.kind() == std::io::ErrorKind::NotFound => {
            let config = Config::default();
            validate_config(&config)?;
            return Ok(config);
        }
        Err(e) => {
            return Err(ConfigError::ReadError {
                path: path.to_string(),
                source: e,
            });
        }
    };

    // Interpolate environment variables
    let interpolated = interpolate_env_vars(&contents);

    // Parse YAML
    let config: Config = serde_yaml_bw::from_str(&interpolated)?;

    // Validate configuration
    validate_config(&config)?;

    Ok(config)
}

/// Load configuration from a YAML string (useful for testing).
///
/// # Errors
///
/// Returns a `ConfigError` if the YAML cannot be parsed or validated.
pub fn load_config_from_string(yaml: &str) -> Result<Config, ConfigError> {
    let interpolated = interpolate_env_vars(yaml);
    let config: Config = serde_yaml_bw::from_str(&interpolated)?;
    validate_config(&config)?;
    Ok(config)
}

/// Interpolate environment variables in a string.
///
/// Supports both `${VAR}` and `${VAR:-default}` syntax.
#[allow(clippy::expect_used)] // Regex is compile-time constant; expect() is safe here
fn interpolate_env_vars(input: &str) -> String {
    use std::sync::OnceLock;

    static ENV_VAR_REGEX: OnceLock<regex::Regex> = OnceLock::new();

    let mut result = input.to_string();

    // Match ${VAR} or ${VAR:-default} patterns
    let re = ENV_VAR_REGEX.get_or_init(|| {
        // This regex pattern is compile-time constant and always valid
        regex::Regex::new(r"\$\{([A-Za-z_][A-Za-z0-9_]*)(?::-([^}]*))?\}")
            .expect("env var regex is valid")
    });

    for cap in re.captures_iter(input) {
        let Some(full_match) = cap.get(0) else {
            continue;
        };
        let Some(var_match) = cap.get(1) else {
            continue;
        };
        let full_match = full_match.as_str();
        let var_name = var_match.as_str();
        let default_value = cap.get(2).map(|m| m.as_str());

        let value = match std::env::var(var_name) {
            Ok(v) if !v.is_empty() => v,
            _ => default_value.map_or_else(String::new, str::to_string),
        };

        result = result.replace(full_match, &value);
    }

    result
}

/// Validate configuration values.
fn validate_config(config: &Config) -> Result<(), ConfigError> {
    if config.market.refresh_interval_secs == 0 {
        return Err(ConfigError::ValidationError(
            "market.refresh_interval_secs must be positive".to_string(),
        ));
    }

    if config.market.stale_after_secs < config.market.refresh_interval_secs {
        return Err(ConfigError::ValidationError(
            "market.stale_after_secs must be at least market.refresh_interval_secs".to_string(),
        ));
    }

    if config.providers.timeout_secs == 0 {
        return Err(ConfigError::ValidationError(
            "providers.timeout_secs must be positive".to_string(),
        ));
    }

    if config.feed.half_life_hours <= 0.0 {
        return Err(ConfigError::ValidationError(
            "feed.half_life_hours must be positive".to_string(),
        ));
    }

    if config.feed.w_recency < 0.0
        || config.feed.w_comments < 0.0
        || config.feed.w_stars < 0.0
        || config.feed.w_follow < 0.0
    {
        return Err(ConfigError::ValidationError(
            "feed weights must be non-negative".to_string(),
        ));
    }

    if config.server.session_ttl_days == 0 {
        return Err(ConfigError::ValidationError(
            "server.session_ttl_days must be positive".to_string(),
        ));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_validate() {
        let config = load_config_from_string("server:\n  http_port: 8080\n").unwrap();
        assert_eq!(config.server.http_port, 8080);
        assert!(config.market.refresh_interval_secs > 0);
    }

    #[test]
    fn empty_path_uses_defaults() {
        let config = load_config(None).unwrap_or_default();
        assert!(!config.market.fallbacks.is_empty());
    }

    #[test]
    fn interpolation_with_default() {
        // Unset variable falls back to the default clause
        let yaml = "server:\n  bind_address: \"${FINCHAT_TEST_UNSET_BIND:-127.0.0.1}\"\n";
        let config = load_config_from_string(yaml).unwrap();
        assert_eq!(config.server.bind_address, "127.0.0.1");
    }

    #[test]
    fn interpolation_unset_without_default_is_empty() {
        let out = interpolate_env_vars("value: \"${FINCHAT_TEST_UNSET_VAR}\"");
        assert_eq!(out, "value: \"\"");
    }

    #[test]
    fn zero_refresh_interval_rejected() {
        let yaml = "market:\n  refresh_interval_secs: 0\n";
        let err = load_config_from_string(yaml).unwrap_err();
        assert!(matches!(err, ConfigError::ValidationError(_)));
    }

    #[test]
    fn negative_weight_rejected() {
        let yaml = "feed:\n  w_recency: -1.0\n";
        let err = load_config_from_string(yaml).unwrap_err();
        assert!(matches!(err, ConfigError::ValidationError(_)));
    }
}
