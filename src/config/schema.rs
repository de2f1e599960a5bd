//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the proxy.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};

/// Root configuration for the path proxy.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct ProxyConfig {
    /// Listener configuration (bind address).
    pub listener: ListenerConfig,

    /// How the target URL is recovered from the inbound path.
    pub extraction: ExtractionConfig,

    /// Outbound fetch settings.
    pub upstream: UpstreamConfig,

    /// Egress filtering.
    pub security: SecurityConfig,

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

/// Path-parsing strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ExtractionMode {
    /// `/<marker>/<encoded-url>`
    #[default]
    Prefix,
    /// `/<encoded-url>`
    Bare,
}

impl std::str::FromStr for ExtractionMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "prefix" => Ok(ExtractionMode::Prefix),
            "bare" => Ok(ExtractionMode::Bare),
            other => Err(format!("unknown extraction mode '{}' (expected prefix or bare)", other)),
        }
    }
}

/// Target extraction configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ExtractionConfig {
    /// Which path shape the deployment accepts.
    pub mode: ExtractionMode,

    /// Routing marker segment, without slashes. Ignored in bare mode.
    pub marker: String,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            mode: ExtractionMode::Prefix,
            marker: "proxx".to_string(),
        }
    }
}

/// Outbound fetch configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct UpstreamConfig {
    /// Deadline for the upstream to produce response headers, in seconds.
    pub timeout_secs: u64,

    /// TCP/TLS connection establishment timeout in seconds.
    pub connect_timeout_secs: u64,

    /// Maximum redirect hops followed before the 3xx is relayed as-is.
    pub max_redirects: usize,

    /// Forward the inbound `Host` header verbatim.
    ///
    /// When false the header is dropped and the transport derives it from
    /// the target URL.
    pub preserve_host: bool,

    /// Route upstream fetches through the proxies named by `HTTP_PROXY`,
    /// `HTTPS_PROXY` and `NO_PROXY`.
    pub use_env_proxy: bool,
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            timeout_secs: 30,
            connect_timeout_secs: 10,
            max_redirects: 10,
            preserve_host: true,
            use_env_proxy: false,
        }
    }
}

/// Egress filtering configuration.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct SecurityConfig {
    /// Hosts the proxy may reach. Empty allows every host.
    /// Entries match exactly or as `*.domain` wildcards.
    pub allowed_hosts: Vec<String>,

    /// Refuse `localhost` and literal loopback/private/link-local addresses.
    pub block_private_addresses: bool,
}

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

impl std::str::FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "pretty" => Ok(LogFormat::Pretty),
            "json" => Ok(LogFormat::Json),
            other => Err(format!("unknown log format '{}' (expected pretty or json)", other)),
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Log output format.
    pub log_format: LogFormat,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_format: LogFormat::Pretty,
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}
