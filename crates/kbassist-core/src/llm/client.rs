//! HTTP client for OpenAI-compatible chat-completion endpoints (DeepSeek etc.)

use super::stream::drive_stream;
use super::{CompletionOptions, Message, StreamEnd, TextCompletionProvider};
use crate::config::ChatServiceConfig;
use crate::error::{KbAssistError, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

const CONNECT_TIMEOUT: Duration = Duration::from_secs(15);

/// API metrics for monitoring
#[derive(Debug, Default)]
pub struct APIMetrics {
    pub total_requests: AtomicU64,
    pub total_errors: AtomicU64,
    pub streamed_chunks: AtomicU64,
    pub cancelled_streams: AtomicU64,
    pub total_latency_ms: AtomicU64,
}

/// Snapshot of API metrics
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetricsSnapshot {
    pub total_requests: u64,
    pub total_errors: u64,
    pub streamed_chunks: u64,
    pub cancelled_streams: u64,
    pub avg_latency_ms: f64,
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: &'a [Message],
    temperature: f32,
    max_tokens: u32,
    stream: bool,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChoiceMessage,
}

#[derive(Deserialize)]
struct ChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

/// Chat-completion client with bearer-token auth
pub struct ChatClient {
    http_client: reqwest::Client,
    config: ChatServiceConfig,
    metrics: Arc<APIMetrics>,
}

impl ChatClient {
    /// Create new client from configuration
    ///
    /// `timeout_secs` bounds each read, not the whole response, so long
    /// streamed answers are not cut off while deltas keep arriving.
    pub fn new(config: ChatServiceConfig) -> Result<Self> {
        let http_client = reqwest::Client::builder()
            .connect_timeout(CONNECT_TIMEOUT)
            .read_timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            http_client,
            config,
            metrics: Arc::new(APIMetrics::default()),
        })
    }

    /// Create from environment variables
    pub fn from_env() -> Result<Self> {
        Self::new(ChatServiceConfig::default())
    }

    /// Get current API metrics
    pub fn metrics(&self) -> MetricsSnapshot {
        let total = self.metrics.total_requests.load(Ordering::Relaxed);
        MetricsSnapshot {
            total_requests: total,
            total_errors: self.metrics.total_errors.load(Ordering::Relaxed),
            streamed_chunks: self.metrics.streamed_chunks.load(Ordering::Relaxed),
            cancelled_streams: self.metrics.cancelled_streams.load(Ordering::Relaxed),
            avg_latency_ms: if total > 0 {
                self.metrics.total_latency_ms.load(Ordering::Relaxed) as f64 / total as f64
            } else {
                0.0
            },
        }
    }

    /// Send the request and turn non-2xx statuses into transport errors
    async fn send(
        &self,
        messages: &[Message],
        options: &CompletionOptions,
        stream: bool,
    ) -> Result<reqwest::Response> {
        let request = ChatRequest {
            model: options.model.as_deref().unwrap_or(&self.config.model),
            messages,
            temperature: options.temperature.unwrap_or(self.config.temperature),
            max_tokens: options.max_tokens.unwrap_or(self.config.max_tokens),
            stream,
        };

        tracing::debug!(
            "Chat completion: model={} messages={} stream={}",
            request.model,
            messages.len(),
            stream
        );

        let mut req = self.http_client.post(&self.config.url).json(&request);
        if let Some(ref api_key) = self.config.api_key {
            req = req.bearer_auth(api_key);
        }

        let response = req.send().await.map_err(|e| {
            self.metrics.total_errors.fetch_add(1, Ordering::Relaxed);
            KbAssistError::Http(e)
        })?;

        if !response.status().is_success() {
            self.metrics.total_errors.fetch_add(1, Ordering::Relaxed);
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(KbAssistError::Transport { status, body });
        }

        Ok(response)
    }

    fn record_latency(&self, start: Instant) {
        let elapsed = start.elapsed().as_millis() as u64;
        self.metrics
            .total_latency_ms
            .fetch_add(elapsed, Ordering::Relaxed);
    }
}

#[async_trait]
impl TextCompletionProvider for ChatClient {
    async fn complete(&self, messages: &[Message], options: &CompletionOptions) -> Result<String> {
        let start = Instant::now();
        self.metrics.total_requests.fetch_add(1, Ordering::Relaxed);

        let response = self.send(messages, options, false).await?;
        let chat_response: ChatResponse = response.json().await.map_err(|e| {
            self.metrics.total_errors.fetch_add(1, Ordering::Relaxed);
            KbAssistError::Http(e)
        })?;

        let content = chat_response
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| {
                self.metrics.total_errors.fetch_add(1, Ordering::Relaxed);
                KbAssistError::Parse("No choices in chat completion response".to_string())
            })?
            .message
            .content
            .unwrap_or_default();

        self.record_latency(start);
        Ok(content)
    }

    async fn complete_stream(
        &self,
        messages: &[Message],
        on_chunk: &mut (dyn for<'c> FnMut(&'c str) + Send),
        options: &CompletionOptions,
    ) -> Result<StreamEnd> {
        let start = Instant::now();
        self.metrics.total_requests.fetch_add(1, Ordering::Relaxed);

        if options.is_cancelled() {
            self.metrics.cancelled_streams.fetch_add(1, Ordering::Relaxed);
            return Ok(StreamEnd::Cancelled);
        }

        let response = self.send(messages, options, true).await?;

        let metrics = self.metrics.clone();
        let mut counting = |chunk: &str| {
            metrics.streamed_chunks.fetch_add(1, Ordering::Relaxed);
            on_chunk(chunk);
        };

        let end = drive_stream(response.bytes_stream(), &mut counting, options.cancel.as_ref())
            .await
            .inspect_err(|_| {
                self.metrics.total_errors.fetch_add(1, Ordering::Relaxed);
            })?;

        if end == StreamEnd::Cancelled {
            self.metrics.cancelled_streams.fetch_add(1, Ordering::Relaxed);
            tracing::info!("Stream aborted by user");
        }

        self.record_latency(start);
        Ok(end)
    }

    fn model_name(&self) -> &str {
        &self.config.model
    }
}
