// Verbatim forwarding helpers
//
// Bodies forwarded without translation are edited as raw JSON maps so every
// field the gateway does not model survives untouched.

use crate::error::{ProxyError, Result};
use crate::models::null_as_default;
use crate::translation::max_tokens_floor;
use axum::body::Body;
use axum::http::{header, HeaderMap, HeaderValue};
use axum::response::Response;
use serde::Deserialize;
use serde_json::{Map, Value};

/// Top-level fields read before choosing a code path.
#[derive(Debug, Default, Deserialize)]
pub struct RequestProbe {
    #[serde(default, deserialize_with = "null_as_default")]
    pub model: String,

    /// Presence marks a body already in Messages format; `null` counts as absent.
    #[serde(default)]
    pub system: Option<Value>,

    #[serde(default, deserialize_with = "null_as_default")]
    pub stream: bool,
}

impl RequestProbe {
    pub fn parse(body: &[u8]) -> Result<Self> {
        serde_json::from_slice(body)
            .map_err(|e| ProxyError::InvalidRequest(format!("malformed request body: {}", e)))
    }

    pub fn has_native_system(&self) -> bool {
        self.system.is_some()
    }
}

/// Re-encode `body` with `model` replaced. With `floor_max_tokens`, a missing,
/// non-integer or too small `max_tokens` is raised to the minimum.
pub fn rewrite_body(body: &[u8], model: &str, floor_max_tokens: bool) -> Result<Vec<u8>> {
    let mut raw: Map<String, Value> = serde_json::from_slice(body)
        .map_err(|e| ProxyError::InvalidRequest(format!("malformed request body: {}", e)))?;

    raw.insert("model".to_string(), Value::String(model.to_string()));

    if floor_max_tokens {
        let requested = raw.get("max_tokens").and_then(Value::as_i64);
        raw.insert("max_tokens".to_string(), Value::from(max_tokens_floor(requested)));
    }

    Ok(serde_json::to_vec(&raw)?)
}

/// Headers that describe one connection or the original framing and must not be
/// copied onto a re-framed response.
fn is_hop_by_hop(name: &header::HeaderName) -> bool {
    matches!(
        name.as_str(),
        "connection"
            | "keep-alive"
            | "proxy-authenticate"
            | "proxy-authorization"
            | "te"
            | "trailer"
            | "transfer-encoding"
            | "upgrade"
            | "content-length"
    )
}

pub fn copy_headers(from: &HeaderMap, to: &mut HeaderMap) {
    for (name, value) in from {
        if !is_hop_by_hop(name) {
            to.append(name.clone(), value.clone());
        }
    }
}

/// Relay an upstream response as-is: status, end-to-end headers, and the body
/// streamed through one chunk at a time.
pub fn relay(upstream: reqwest::Response) -> Result<Response> {
    let status = upstream.status();
    let mut response = Response::builder()
        .status(status)
        .body(Body::empty())
        .map_err(|e| ProxyError::Internal(e.to_string()))?;
    copy_headers(upstream.headers(), response.headers_mut());

    *response.body_mut() = Body::from_stream(upstream.bytes_stream());
    Ok(response)
}

/// Pass a non-success upstream reply through with its status and body bytes.
pub async fn relay_error(upstream: reqwest::Response) -> Result<Response> {
    let status = upstream.status();
    let content_type = upstream
        .headers()
        .get(header::CONTENT_TYPE)
        .cloned()
        .unwrap_or_else(|| HeaderValue::from_static("application/json"));
    let body = upstream.bytes().await?;

    tracing::warn!(
        "Upstream returned {}: {}",
        status,
        crate::utils::logging::payload_excerpt(&body)
    );

    Response::builder()
        .status(status)
        .header(header::CONTENT_TYPE, content_type)
        .body(Body::from(body))
        .map_err(|e| ProxyError::Internal(e.to_string()))
}

pub fn is_event_stream(headers: &HeaderMap) -> bool {
    headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(|v| v.contains("event-stream"))
        .unwrap_or(false)
}
