//! Configuration data structures for the oai2claude gateway.
//!
//! Two kinds of settings live here: process settings (`AppConfig`, loaded once
//! at startup) and routing data (`RoutingConfig`, served per request by a
//! [`ConfigStore`](super::ConfigStore) snapshot).

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// The root configuration object for the application.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AppConfig {
    /// HTTP server settings (host, port, workers).
    #[serde(default)]
    pub server: ServerConfig,

    /// Logging and observability settings.
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Outbound provider call settings.
    #[serde(default)]
    pub upstream: UpstreamConfig,

    /// Where the provider list is persisted.
    #[serde(default)]
    pub routing: RoutingSource,
}

/// Settings for the built-in HTTP server.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Default: `127.0.0.1`
    #[serde(default = "default_host")]
    pub host: String,

    /// Default: `3029`
    #[serde(default = "default_port")]
    pub port: u16,

    /// Number of tokio worker threads.
    /// Default: Number of logical CPU cores.
    #[serde(default = "default_workers")]
    pub workers: usize,
}

/// Settings for application logging and output format.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Minimum log level (`trace`, `debug`, `info`, `warn`, `error`).
    /// Default: `info`
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Output format for logs (`pretty`, `json`).
    /// Default: `pretty`
    #[serde(default = "default_log_format")]
    pub format: String,

    /// Dump (sanitized, truncated) request and response bodies at debug level.
    /// Default: `false`
    #[serde(default)]
    pub log_payloads: bool,
}

/// Settings for calls to upstream providers.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpstreamConfig {
    /// Whole-call deadline used when a provider sets `timeout: 0`.
    /// Default: `300`
    #[serde(default = "default_timeout")]
    pub default_timeout_seconds: u64,

    /// Default: `10`
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_seconds: u64,

    /// Apply the provider deadline to streaming calls too. The deadline covers
    /// the full stream lifetime, so a long generation can be cut off mid-stream.
    /// Setting this to `false` leaves streaming calls bounded only by the
    /// connect timeout and client disconnect.
    /// Default: `true`
    #[serde(default = "default_true")]
    pub stream_deadline: bool,

    /// Value of the `anthropic-version` header.
    /// Default: `2023-06-01`
    #[serde(default = "default_anthropic_version")]
    pub anthropic_version: String,

    /// Default: `10`
    #[serde(default = "default_pool_size")]
    pub pool_max_idle_per_host: usize,
}

/// Location of the persisted provider list.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoutingSource {
    /// Default: `~/.oai2claude/providers.json`
    #[serde(default = "default_providers_path")]
    pub providers_path: String,
}

/// Routing data: the configured providers, in scan order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RoutingConfig {
    #[serde(default)]
    pub providers: Vec<Provider>,
}

/// Wire format a provider speaks natively. Any `type` other than `anthropic`
/// is read as OpenAI-compatible.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", from = "String")]
pub enum ProviderKind {
    /// Any endpoint speaking OpenAI Chat Completions.
    #[default]
    OpenAI,
    Anthropic,
}

impl From<String> for ProviderKind {
    fn from(value: String) -> Self {
        match value.to_ascii_lowercase().as_str() {
            "anthropic" => ProviderKind::Anthropic,
            "openai" | "openai-compatible" => ProviderKind::OpenAI,
            other => {
                tracing::warn!("Unknown provider type '{}', treating as openai", other);
                ProviderKind::OpenAI
            }
        }
    }
}

impl ProviderKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ProviderKind::OpenAI => "openai",
            ProviderKind::Anthropic => "anthropic",
        }
    }
}

/// A configured backend account.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Provider {
    pub id: String,

    #[serde(default)]
    pub name: String,

    #[serde(rename = "type", default)]
    pub kind: ProviderKind,

    pub base_url: String,

    #[serde(default)]
    pub api_key: String,

    /// Selection weight; `<= 0` takes the provider out of rotation.
    #[serde(default)]
    pub weight: i64,

    /// Whole-call deadline in seconds; `0` uses the upstream default.
    #[serde(default)]
    pub timeout: u64,

    /// Routes, matched in declared order.
    #[serde(default)]
    pub models: Vec<ModelRoute>,
}

impl Provider {
    pub fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.base_url.trim_end_matches('/'), path)
    }

    pub fn timeout_or(&self, default: Duration) -> Duration {
        if self.timeout == 0 {
            default
        } else {
            Duration::from_secs(self.timeout)
        }
    }
}

/// Maps a client-visible model pattern to a backend model name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelRoute {
    /// Glob pattern; `*` matches every model.
    pub from: String,
    /// Literal backend model name.
    pub to: String,
    #[serde(default)]
    pub enabled: bool,
}

impl ModelRoute {
    pub fn new(from: &str, to: &str) -> Self {
        Self {
            from: from.to_string(),
            to: to.to_string(),
            enabled: true,
        }
    }
}

// Default trait implementations linking to custom logic

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            workers: default_workers(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
            log_payloads: false,
        }
    }
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            default_timeout_seconds: default_timeout(),
            connect_timeout_seconds: default_connect_timeout(),
            stream_deadline: true,
            anthropic_version: default_anthropic_version(),
            pool_max_idle_per_host: default_pool_size(),
        }
    }
}

impl Default for RoutingSource {
    fn default() -> Self {
        Self {
            providers_path: default_providers_path(),
        }
    }
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    3029
}

fn default_workers() -> usize {
    num_cpus::get()
}

fn default_true() -> bool {
    true
}

fn default_timeout() -> u64 {
    300
}

fn default_connect_timeout() -> u64 {
    10
}

fn default_anthropic_version() -> String {
    "2023-06-01".to_string()
}

fn default_pool_size() -> usize {
    10
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

fn default_providers_path() -> String {
    super::home_path("providers.json")
}
