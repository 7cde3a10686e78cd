// CLI module for oai2claude

use crate::config::AppConfig;
use clap::Parser;

/// oai2claude - OpenAI Chat Completions gateway for Anthropic and OpenAI-compatible providers
#[derive(Parser, Debug, Default)]
#[command(name = "oai2claude", version, about, long_about = None)]
pub struct Args {
    /// Config file (TOML); defaults to ~/.oai2claude/config.toml when present
    #[arg(short, long)]
    pub config: Option<String>,

    /// Bind address
    #[arg(long)]
    pub host: Option<String>,

    /// Listen port
    #[arg(short, long)]
    pub port: Option<u16>,

    /// Provider list (JSON); created empty if missing
    #[arg(long, env = "OAI2CLAUDE_PROVIDERS")]
    pub providers: Option<String>,
}

impl Args {
    /// Flags take precedence over every other configuration source.
    pub fn apply(&self, config: &mut AppConfig) {
        if let Some(host) = &self.host {
            config.server.host = host.clone();
        }
        if let Some(port) = self.port {
            config.server.port = port;
        }
        if let Some(providers) = &self.providers {
            config.routing.providers_path = providers.clone();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flags_override_config() {
        let args = Args::parse_from(["oai2claude", "--port", "8080", "--providers", "/tmp/p.json"]);
        let mut config = AppConfig::default();
        args.apply(&mut config);

        assert_eq!(config.server.port, 8080);
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.routing.providers_path, "/tmp/p.json");
    }
}
