//! Configuration schema definitions.
//!
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};

use crate::resolver::config::{DEFAULT_HEADER_NAME, DEFAULT_SEPARATORS};
use crate::resolver::ResolverConfig;

/// Root configuration for the telemetry server.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct AppConfig {
    /// Listener configuration (bind address).
    pub listener: ListenerConfig,

    /// Timeout configuration.
    pub timeouts: TimeoutConfig,

    /// Client IP resolution settings.
    pub client_ip: ClientIpConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:8080").
    pub bind_address: String,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8080".to_string(),
        }
    }
}

/// Timeout configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Request timeout in seconds.
    pub request_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self { request_secs: 30 }
    }
}

/// Client IP resolution configuration.
///
/// ```toml
/// [client_ip]
/// header_names = ["CF-Connecting-IP", "X-Forwarded-For"]
/// header_value_separators = ",;"
/// use_first_ip = false
/// ```
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ClientIpConfig {
    /// Headers to inspect, in priority order.
    pub header_names: Vec<String>,

    /// Characters splitting multi-valued headers. Empty keeps the default.
    pub header_value_separators: String,

    /// Use the first (true) or last (false) address in a header.
    pub use_first_ip: bool,
}

impl Default for ClientIpConfig {
    fn default() -> Self {
        Self {
            header_names: vec![DEFAULT_HEADER_NAME.to_string()],
            header_value_separators: DEFAULT_SEPARATORS.iter().collect(),
            use_first_ip: true,
        }
    }
}

impl ClientIpConfig {
    /// Build the resolver settings. An empty separator string keeps the default set.
    pub fn to_resolver_config(&self) -> ResolverConfig {
        let mut config = ResolverConfig::new();
        config.set_header_names(self.header_names.iter().cloned());
        if !config.set_header_value_separators(&self.header_value_separators) {
            tracing::warn!(
                default = %config.header_value_separators(),
                "Empty header_value_separators ignored, keeping default"
            );
        }
        config.set_use_first_ip(self.use_first_ip);
        config
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Emit logs as JSON lines instead of human-readable text.
    pub json_logs: bool,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            json_logs: false,
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}
