// Provider HTTP client
//
// One pooled `reqwest::Client` for every provider; per-provider deadlines are
// applied per request.

use crate::config::{Provider, ProviderKind, UpstreamConfig};
use crate::error::{ProxyError, Result};
use reqwest::{Client, Response};
use std::time::{Duration, Instant};
use tracing::{debug, error};

/// Client for provider endpoints.
///
/// Dropping a returned future or `Response` (for instance because the
/// downstream client went away) aborts the upstream call.
#[derive(Clone)]
pub struct UpstreamClient {
    http_client: Client,
    config: UpstreamConfig,
}

impl UpstreamClient {
    pub fn new(config: &UpstreamConfig) -> Result<Self> {
        let http_client = Client::builder()
            .connect_timeout(Duration::from_secs(config.connect_timeout_seconds))
            .pool_max_idle_per_host(config.pool_max_idle_per_host)
            .pool_idle_timeout(Duration::from_secs(90))
            .tcp_keepalive(Some(Duration::from_secs(60)))
            .tcp_nodelay(true)
            .use_rustls_tls()
            .build()
            .map_err(|e| ProxyError::Internal(format!("Failed to create HTTP client: {}", e)))?;

        debug!("Created upstream HTTP client with connection pooling");

        Ok(Self {
            http_client,
            config: config.clone(),
        })
    }

    /// POST a Messages body to `<base_url>/v1/messages`.
    pub async fn send_messages(
        &self,
        provider: &Provider,
        body: Vec<u8>,
        streaming: bool,
    ) -> Result<Response> {
        let request = self
            .http_client
            .post(provider.endpoint("/v1/messages"))
            .header("content-type", "application/json")
            .header("x-api-key", &provider.api_key)
            .header("anthropic-version", &self.config.anthropic_version)
            .body(body);

        self.send(provider, ProviderKind::Anthropic, request, streaming)
            .await
    }

    /// POST a Chat Completions body to `<base_url>/v1/chat/completions`.
    pub async fn send_chat_completions(
        &self,
        provider: &Provider,
        body: Vec<u8>,
        streaming: bool,
    ) -> Result<Response> {
        let request = self
            .http_client
            .post(provider.endpoint("/v1/chat/completions"))
            .header("content-type", "application/json")
            .bearer_auth(&provider.api_key)
            .body(body);

        self.send(provider, ProviderKind::OpenAI, request, streaming)
            .await
    }

    /// Whole-call deadline for a request, if any. It spans connect, headers
    /// and the complete body, streamed or not, unless streaming deadlines are
    /// switched off.
    pub fn deadline(&self, provider: &Provider, streaming: bool) -> Option<Duration> {
        if streaming && !self.config.stream_deadline {
            return None;
        }
        Some(provider.timeout_or(Duration::from_secs(self.config.default_timeout_seconds)))
    }

    async fn send(
        &self,
        provider: &Provider,
        wire: ProviderKind,
        mut request: reqwest::RequestBuilder,
        streaming: bool,
    ) -> Result<Response> {
        if let Some(deadline) = self.deadline(provider, streaming) {
            request = request.timeout(deadline);
        }

        let start = Instant::now();
        let response = request.send().await.map_err(|e| {
            error!("Request to provider {} failed: {}", provider.id, e);
            crate::metrics::record_upstream_call(&provider.id, wire, 0, start.elapsed().as_secs_f64());
            ProxyError::UpstreamConnect(e.to_string())
        })?;

        let status = response.status();
        crate::metrics::record_upstream_call(
            &provider.id,
            wire,
            status.as_u16(),
            start.elapsed().as_secs_f64(),
        );
        debug!(
            "Provider {} responded with {} in {:?}",
            provider.id,
            status,
            start.elapsed()
        );

        Ok(response)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn provider(timeout: u64) -> Provider {
        Provider {
            id: "p".into(),
            name: String::new(),
            kind: ProviderKind::Anthropic,
            base_url: "http://localhost:1".into(),
            api_key: "k".into(),
            weight: 1,
            timeout,
            models: vec![],
        }
    }

    #[test]
    fn test_deadline_rules() {
        let client = UpstreamClient::new(&UpstreamConfig::default()).unwrap();
        assert_eq!(client.deadline(&provider(0), false), Some(Duration::from_secs(300)));
        assert_eq!(client.deadline(&provider(30), true), Some(Duration::from_secs(30)));

        let relaxed = UpstreamClient::new(&UpstreamConfig {
            stream_deadline: false,
            ..UpstreamConfig::default()
        })
        .unwrap();
        assert_eq!(relaxed.deadline(&provider(30), true), None);
        assert_eq!(relaxed.deadline(&provider(30), false), Some(Duration::from_secs(30)));
    }

    #[tokio::test]
    async fn test_connection_failure_is_upstream_connect() {
        let client = UpstreamClient::new(&UpstreamConfig::default()).unwrap();
        let result = client.send_messages(&provider(1), b"{}".to_vec(), false).await;
        assert!(matches!(result, Err(ProxyError::UpstreamConnect(_))));
    }
}
