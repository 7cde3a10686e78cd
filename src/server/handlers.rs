// HTTP request handlers

use super::routes::AppState;
use crate::error::Result;
use crate::models::openai::ModelList;
use axum::{
    body::Bytes,
    extract::State,
    http::header,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use std::time::Instant;

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
}

pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
    })
}

/// Handler for /v1/chat/completions (OpenAI Chat Completions compatible)
pub async fn chat_completions_handler(State(state): State<AppState>, body: Bytes) -> Response {
    let start = Instant::now();
    let result = state.dispatcher.chat_completions(body).await;
    finish("/v1/chat/completions", start, result)
}

/// Handler for /v1/messages (Anthropic Messages API, relayed)
pub async fn messages_handler(State(state): State<AppState>, body: Bytes) -> Response {
    let start = Instant::now();
    let result = state.dispatcher.messages(body).await;
    finish("/v1/messages", start, result)
}

pub async fn models_handler(State(state): State<AppState>) -> Json<ModelList> {
    Json(state.dispatcher.models())
}

pub async fn metrics_handler() -> impl IntoResponse {
    (
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        crate::metrics::gather_metrics(),
    )
}

// Streamed bodies are still in flight here, so the duration covers time to
// response headers.
fn finish(endpoint: &str, start: Instant, result: Result<Response>) -> Response {
    let response = result.unwrap_or_else(IntoResponse::into_response);
    crate::metrics::record_request(
        endpoint,
        response.status().as_u16(),
        start.elapsed().as_secs_f64(),
    );
    response
}
