//! LLM trait definitions

use crate::error::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio_util::sync::CancellationToken;

/// Text completion capability backing classification, ranking and answering
///
/// The HTTP [`ChatClient`](super::ChatClient) is the production implementation;
/// tests substitute scripted stubs.
#[async_trait]
pub trait TextCompletionProvider: Send + Sync {
    /// Run one completion and return the first choice's text
    async fn complete(&self, messages: &[Message], options: &CompletionOptions) -> Result<String>;

    /// Run a streamed completion, handing each decoded delta to `on_chunk`
    ///
    /// Returns how the stream ended. A triggered cancellation token ends the
    /// stream with [`StreamEnd::Cancelled`], not an error.
    async fn complete_stream(
        &self,
        messages: &[Message],
        on_chunk: &mut (dyn for<'c> FnMut(&'c str) + Send),
        options: &CompletionOptions,
    ) -> Result<StreamEnd>;

    /// Get model name
    fn model_name(&self) -> &str;
}

/// Conversation role
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

/// Chat message for completion requests
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    pub content: String,
}

impl Message {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }
}

/// Per-call completion settings
///
/// Unset fields fall back to the provider's configured defaults.
#[derive(Debug, Clone, Default)]
pub struct CompletionOptions {
    pub model: Option<String>,
    pub temperature: Option<f32>,
    pub max_tokens: Option<u32>,
    /// Polled between stream reads
    pub cancel: Option<CancellationToken>,
}

impl CompletionOptions {
    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    pub fn with_cancel(mut self, cancel: Option<CancellationToken>) -> Self {
        self.cancel = cancel;
        self
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel.as_ref().is_some_and(|c| c.is_cancelled())
    }
}

/// How a streamed completion finished
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StreamEnd {
    /// The `[DONE]` sentinel arrived
    Done,
    /// The caller's cancellation token fired
    Cancelled,
    /// The body ended without a sentinel
    Eof,
}

impl StreamEnd {
    /// True only when the `[DONE]` sentinel was reached
    pub fn is_complete(self) -> bool {
        self == StreamEnd::Done
    }
}
