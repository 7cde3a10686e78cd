//! Structured logging and credential redaction.
//!
//! Configures the `tracing` subscriber and provides helpers that keep
//! provider keys out of log sinks when request or response bodies are dumped.

use crate::config::LoggingConfig;
use crate::error::Result;
use lazy_static::lazy_static;
use regex::Regex;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Longest body excerpt written by [`payload_excerpt`].
pub const PAYLOAD_LOG_LIMIT: usize = 1000;

lazy_static! {
    static ref BEARER_TOKEN: Regex = Regex::new(r"(?i)bearer\s+[A-Za-z0-9._~+/=-]+").unwrap();
    static ref API_KEY: Regex = Regex::new(r"sk-(?:ant-)?[A-Za-z0-9_-]{8,}").unwrap();
}

/// Initializes the global tracing subscriber.
///
/// `json` gives structured output, anything else the human-readable pretty
/// format. `RUST_LOG` overrides the configured level.
pub fn init(config: &LoggingConfig) -> Result<()> {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.level));

    match config.format.as_str() {
        "json" => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer().json())
                .init();
        }
        _ => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer().pretty())
                .init();
        }
    }

    Ok(())
}

/// Replaces bearer tokens and `sk-`/`sk-ant-` style keys with placeholders.
pub fn sanitize(input: &str) -> String {
    let result = BEARER_TOKEN.replace_all(input, "Bearer [REDACTED_TOKEN]");
    API_KEY.replace_all(&result, "[REDACTED_API_KEY]").into_owned()
}

/// Sanitized body prefix suitable for a debug log line.
pub fn payload_excerpt(body: &[u8]) -> String {
    let text = String::from_utf8_lossy(body);
    let mut excerpt: String = text.chars().take(PAYLOAD_LOG_LIMIT).collect();
    if text.chars().count() > PAYLOAD_LOG_LIMIT {
        excerpt.push_str("...");
    }
    sanitize(&excerpt)
}
