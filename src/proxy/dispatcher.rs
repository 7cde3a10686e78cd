// Request dispatcher
//
// Resolves the requested model, picks one provider, and runs the matching
// forwarding path. One provider per request; no retries, no failover.

use super::passthrough::{self, RequestProbe};
use crate::config::{ConfigStore, Provider, ProviderKind, RoutingConfig};
use crate::error::{ProxyError, Result};
use crate::models::anthropic::MessagesResponse;
use crate::models::openai::{ChatCompletionRequest, ModelEntry, ModelList};
use crate::routing::{resolve_model, weighted_select, ResolvedTarget};
use crate::translation::streaming::sse_body;
use crate::translation::{translate_request, translate_response, StreamTranscoder};
use crate::upstream::{sse_events, UpstreamClient};
use crate::utils::clock::Clock;
use crate::utils::logging::payload_excerpt;
use axum::body::{Body, Bytes};
use axum::http::{header, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use parking_lot::Mutex;
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{debug, error, info};

pub struct ProxyDispatcher {
    store: Arc<dyn ConfigStore>,
    upstream: UpstreamClient,
    clock: Arc<dyn Clock>,
    rng: Mutex<StdRng>,
    log_payloads: bool,
}

impl ProxyDispatcher {
    pub fn new(store: Arc<dyn ConfigStore>, upstream: UpstreamClient, clock: Arc<dyn Clock>) -> Self {
        Self {
            store,
            upstream,
            clock,
            rng: Mutex::new(StdRng::from_entropy()),
            log_payloads: false,
        }
    }

    /// Replace the selection random source, e.g. with a seeded one.
    pub fn with_rng(mut self, rng: StdRng) -> Self {
        self.rng = Mutex::new(rng);
        self
    }

    /// Dump sanitized request/response bodies at debug level.
    pub fn with_payload_logging(mut self, enabled: bool) -> Self {
        self.log_payloads = enabled;
        self
    }

    /// `POST /v1/chat/completions`
    pub async fn chat_completions(&self, body: Bytes) -> Result<Response> {
        self.dump("Inbound chat request", &body);

        let probe = RequestProbe::parse(&body)?;
        let snapshot = self.store.get_config();
        let (backend_model, provider) = self.route(&probe.model, &snapshot)?;

        if provider.kind == ProviderKind::Anthropic && probe.has_native_system() {
            debug!("Body already in Messages format, forwarding near-verbatim");
            let forwarded = passthrough::rewrite_body(&body, &backend_model, true)?;
            self.dump("Forwarded Messages request", &forwarded);
            return self
                .forward_native(&provider, forwarded, probe.stream, &probe.model)
                .await;
        }

        let req: ChatCompletionRequest = serde_json::from_slice(&body)?;

        match provider.kind {
            ProviderKind::Anthropic => self.forward_translated(&provider, &req, &backend_model).await,
            ProviderKind::OpenAI => {
                let forwarded = passthrough::rewrite_body(&body, &backend_model, false)?;
                let upstream = self
                    .upstream
                    .send_chat_completions(&provider, forwarded, req.stream)
                    .await?;
                passthrough::relay(upstream)
            }
        }
    }

    /// `POST /v1/messages`: model rewritten, everything else relayed untouched.
    pub async fn messages(&self, body: Bytes) -> Result<Response> {
        self.dump("Inbound Messages request", &body);

        let probe = RequestProbe::parse(&body)?;
        let snapshot = self.store.get_config();
        let (backend_model, provider) = self.route(&probe.model, &snapshot)?;

        let forwarded = passthrough::rewrite_body(&body, &backend_model, false)?;
        let upstream = self
            .upstream
            .send_messages(&provider, forwarded, probe.stream)
            .await?;
        passthrough::relay(upstream)
    }

    /// `GET /v1/models`: enabled route patterns across all providers, first
    /// occurrence wins.
    pub fn models(&self) -> ModelList {
        let snapshot = self.store.get_config();
        let created = self.clock.now();
        let mut seen = HashSet::new();

        let data = snapshot
            .providers
            .iter()
            .flat_map(|p| p.models.iter())
            .filter(|route| route.enabled && seen.insert(route.from.clone()))
            .map(|route| ModelEntry {
                id: route.from.clone(),
                object: "model".to_string(),
                created,
                owned_by: "proxy".to_string(),
            })
            .collect();

        ModelList {
            object: "list".to_string(),
            data,
        }
    }

    /// Resolve `model` and pick one provider from the candidate pool.
    fn route(&self, model: &str, snapshot: &RoutingConfig) -> Result<(String, Provider)> {
        let Some(ResolvedTarget {
            backend_model,
            providers,
        }) = resolve_model(model, &snapshot.providers)
        else {
            info!("No provider for model: {}", model);
            crate::metrics::record_resolution_failure();
            return Err(ProxyError::NoProvider(model.to_string()));
        };

        let provider = weighted_select(&providers, &mut *self.rng.lock())
            .cloned()
            .ok_or_else(|| ProxyError::NoProvider(model.to_string()))?;

        info!("{} -> {} (provider: {})", model, backend_model, provider.id);
        Ok((backend_model, provider))
    }

    async fn forward_translated(
        &self,
        provider: &Provider,
        req: &ChatCompletionRequest,
        backend_model: &str,
    ) -> Result<Response> {
        let translated = translate_request(req, backend_model)?;
        let body = serde_json::to_vec(&translated)?;
        self.dump("Translated Messages request", &body);

        let upstream = self
            .upstream
            .send_messages(provider, body, req.stream)
            .await?;
        if !upstream.status().is_success() {
            return passthrough::relay_error(upstream).await;
        }

        if req.stream {
            Ok(self.stream_response(upstream, provider, &req.model))
        } else {
            self.completion_response(upstream, &req.model).await
        }
    }

    /// A Messages-format body sent on the Chat Completions endpoint: the reply
    /// still goes back in Chat Completions shape, chosen by content type.
    async fn forward_native(
        &self,
        provider: &Provider,
        body: Vec<u8>,
        streaming: bool,
        client_model: &str,
    ) -> Result<Response> {
        let upstream = self.upstream.send_messages(provider, body, streaming).await?;
        if !upstream.status().is_success() {
            return passthrough::relay_error(upstream).await;
        }

        if passthrough::is_event_stream(upstream.headers()) {
            Ok(self.stream_response(upstream, provider, client_model))
        } else {
            self.completion_response(upstream, client_model).await
        }
    }

    async fn completion_response(&self, upstream: reqwest::Response, model: &str) -> Result<Response> {
        let body = upstream.bytes().await?;
        self.dump("Upstream Messages response", &body);

        let parsed: MessagesResponse = serde_json::from_slice(&body).map_err(|e| {
            error!("Failed to decode upstream response: {}", e);
            ProxyError::UpstreamDecode(e.to_string())
        })?;

        let completion = translate_response(parsed, model, self.clock.now());
        Ok((StatusCode::OK, Json(completion)).into_response())
    }

    fn stream_response(&self, upstream: reqwest::Response, provider: &Provider, model: &str) -> Response {
        let transcoder = StreamTranscoder::new(model, self.clock.clone());
        let events = sse_events(upstream.bytes_stream());
        let body = sse_body(events, transcoder, provider.id.clone());
        let mut response = Body::from_stream(body).into_response();

        let headers = response.headers_mut();
        headers.insert(header::CONTENT_TYPE, HeaderValue::from_static("text/event-stream"));
        headers.insert(header::CACHE_CONTROL, HeaderValue::from_static("no-cache"));
        headers.insert(header::CONNECTION, HeaderValue::from_static("keep-alive"));
        headers.insert("x-accel-buffering", HeaderValue::from_static("no"));
        response
    }

    fn dump(&self, label: &str, body: &[u8]) {
        if self.log_payloads {
            debug!("{}: {}", label, payload_excerpt(body));
        }
    }
}
