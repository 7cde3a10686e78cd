// Configuration module

mod models;
mod store;

pub use models::*;
pub use store::{ConfigStore, FileConfigStore};

use crate::error::{ProxyError, Result};
use config::{Config, Environment, File};
use std::path::PathBuf;

impl AppConfig {
    /// Load configuration from multiple sources with precedence:
    /// 1. Environment variables (highest; CLI flags are applied by the caller)
    /// 2. Config file (`path`, or `~/.oai2claude/config.toml`)
    /// 3. Defaults (lowest)
    pub fn load(path: Option<&str>) -> Result<Self> {
        let file = path
            .map(str::to_string)
            .unwrap_or_else(|| home_path("config.toml"));

        let config = Config::builder()
            // Start with defaults
            .add_source(Config::try_from(&Self::default())?)
            // Load from config file if it exists
            .add_source(File::with_name(&file).required(path.is_some()))
            // Override with environment variables, e.g. OAI2CLAUDE_SERVER__PORT
            .add_source(
                Environment::with_prefix("OAI2CLAUDE")
                    .prefix_separator("_")
                    .separator("__"),
            )
            .build()
            .map_err(|e| ProxyError::Config(e.to_string()))?;

        config
            .try_deserialize()
            .map_err(|e| ProxyError::Config(e.to_string()))
    }
}

/// `~/.oai2claude/<name>`, falling back to the working directory.
pub(crate) fn home_path(name: &str) -> String {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".oai2claude")
        .join(name)
        .to_string_lossy()
        .to_string()
}
