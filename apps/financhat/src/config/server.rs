//! Server configuration for the HTTP endpoint.

use serde::{Deserialize, Serialize};

/// Server configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// HTTP server port for the JSON API.
    #[serde(default = "default_http_port")]
    pub http_port: u16,
    /// Bind address.
    #[serde(default = "default_bind_address")]
    pub bind_address: String,
    /// Session time-to-live in days.
    #[serde(default = "default_session_ttl_days")]
    pub session_ttl_days: u32,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            http_port: default_http_port(),
            bind_address: default_bind_address(),
            session_ttl_days: default_session_ttl_days(),
        }
    }
}

pub(crate) const fn default_http_port() -> u16 {
    5000
}

pub(crate) fn default_bind_address() -> String {
    "0.0.0.0".to_string()
}

pub(crate) const fn default_session_ttl_days() -> u32 {
    7
}
