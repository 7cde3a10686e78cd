// Error types for the oai2claude gateway

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ProxyError {
    /// No enabled route on any weighted provider matches the requested model.
    #[error("no provider for model {0}")]
    NoProvider(String),

    #[error("invalid request: {0}")]
    InvalidRequest(String),

    #[error("upstream connection failed: {0}")]
    UpstreamConnect(String),

    #[error("decode error: {0}")]
    UpstreamDecode(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid request: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Config parsing error: {0}")]
    ConfigParsing(#[from] config::ConfigError),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl ProxyError {
    pub fn status(&self) -> StatusCode {
        match self {
            ProxyError::NoProvider(_) | ProxyError::InvalidRequest(_) | ProxyError::Json(_) => {
                StatusCode::BAD_REQUEST
            }
            ProxyError::UpstreamConnect(_) | ProxyError::UpstreamDecode(_) => {
                StatusCode::BAD_GATEWAY
            }
            ProxyError::Config(_)
            | ProxyError::ConfigParsing(_)
            | ProxyError::Io(_)
            | ProxyError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<reqwest::Error> for ProxyError {
    fn from(err: reqwest::Error) -> Self {
        ProxyError::UpstreamConnect(err.to_string())
    }
}

// Convert ProxyError to the gateway's `{"error": "..."}` envelope
impl IntoResponse for ProxyError {
    fn into_response(self) -> Response {
        let status = self.status();
        crate::metrics::record_error(status.as_u16());

        let body = json!({ "error": self.to_string() });
        (status, axum::Json(body)).into_response()
    }
}

pub type Result<T> = std::result::Result<T, ProxyError>;
