//! KbAssist Core Library
//!
//! Retrieval-augmented assistant for an enterprise knowledge base.
//!
//! # Features
//! - Intent classification of user questions (chat, QA, search, help)
//! - Keyword search and detail lookup against a remote knowledge service
//! - Bounded, deduplicated prompt context with per-document excerpt budgets
//! - Batch and streamed (SSE) chat completions with cancellation
//! - Model-assisted relevance ranking, keyword extraction and query enhancement

pub mod config;
pub mod error;
pub mod knowledge;
pub mod llm;
pub mod rag;

pub use config::{AssistantDefaults, ChatServiceConfig, Config, KnowledgeServiceConfig};
pub use error::{Error, KbAssistError, Result};
pub use knowledge::{Document, DocumentId, DocumentRef, HttpKnowledgeGateway, KnowledgeGateway};
pub use llm::{
    ChatClient, CompletionOptions, EnhancedQuery, Intent, IntentClassifier, IntentLabel,
    KeywordExtractor, Message, MetricsSnapshot, RelevanceRanker, Role, StreamEnd,
    TextCompletionProvider,
};
pub use rag::{AnswerSink, AskOptions, Assistant, AssistantResult, ContextBuilder, FnSink};

/// Default chat model name
pub const DEFAULT_CHAT_MODEL: &str = "deepseek-chat";

/// Default config directory name
pub const CONFIG_DIR_NAME: &str = "kbassist";
