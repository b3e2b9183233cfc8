//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the client.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::time::Duration;

/// One hour, the lifetime of a cached domain configuration.
pub const ONE_HOUR_SECS: u64 = 60 * 60;

/// Flag mapping a cluster name to its regional base URL.
pub const REGIONAL_ORIGIN_FLAG: &str = "crossRegion.clusterToRegionalDomainUrl";

/// Root configuration for the client.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct ClientConfig {
    /// Transport settings (page origin, timeouts).
    pub transport: TransportConfig,

    /// Domain config cache settings.
    pub cache: CacheConfig,

    /// Service endpoints used for topology lookups.
    pub endpoints: EndpointConfig,

    /// Headers sent with every request unless the caller overrides them.
    pub headers: DefaultHeaders,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Transport configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TransportConfig {
    /// Origin relative URLs are resolved against (e.g., "https://web.example.com").
    pub origin: String,

    /// Total time for a single request/response in seconds.
    pub request_timeout_secs: u64,

    /// User-Agent sent by the reqwest transport.
    pub user_agent: String,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            origin: "http://localhost:8088".to_string(),
            request_timeout_secs: 30,
            user_agent: concat!("xregion-http/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

impl TransportConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

/// Cache configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Lifetime of a cached domain configuration in seconds.
    pub domain_config_ttl_secs: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            domain_config_ttl_secs: ONE_HOUR_SECS,
        }
    }
}

impl CacheConfig {
    pub fn domain_config_ttl(&self) -> Duration {
        Duration::from_secs(self.domain_config_ttl_secs)
    }
}

/// Endpoint configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct EndpointConfig {
    /// Prefix of the domain description endpoint; the domain name is appended.
    pub domains_path: String,

    /// Prefix of the feature flag endpoint; the flag name is appended.
    pub feature_flags_path: String,

    /// Flag consulted to turn a cluster name into a regional origin.
    pub regional_origin_flag: String,
}

impl Default for EndpointConfig {
    fn default() -> Self {
        Self {
            domains_path: "/api/domains".to_string(),
            feature_flags_path: "/api/feature-flags".to_string(),
            regional_origin_flag: REGIONAL_ORIGIN_FLAG.to_string(),
        }
    }
}

/// Default request headers, name → value.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(transparent)]
pub struct DefaultHeaders(pub BTreeMap<String, String>);

impl Default for DefaultHeaders {
    fn default() -> Self {
        let mut headers = BTreeMap::new();
        headers.insert("Accepts".to_string(), "application/json".to_string());
        Self(headers)
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Output format for log lines.
    pub log_format: LogFormat,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_format: LogFormat::Pretty,
        }
    }
}
