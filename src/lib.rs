// oai2claude - OpenAI Chat Completions gateway for Anthropic and OpenAI-compatible providers

pub mod cli;
pub mod config;
pub mod error;
pub mod metrics;
pub mod models;
pub mod proxy;
pub mod routing;
pub mod server;
pub mod translation;
pub mod upstream;
pub mod utils;
