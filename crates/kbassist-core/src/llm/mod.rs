//! LLM integration
//!
//! Provides the completion provider abstraction and the model-backed helpers
//! built on it:
//! - Chat completion over HTTP, single-shot and streamed
//! - Intent classification
//! - Relevance ranking
//! - Keyword extraction and query enhancement

mod client;
mod extract;
mod intent;
mod keywords;
mod reranker;
pub mod stream;
mod traits;

pub use client::{ChatClient, MetricsSnapshot};
pub use intent::{Intent, IntentClassifier, IntentLabel};
pub use keywords::{EnhancedQuery, KeywordExtractor};
pub use reranker::{reorder, RelevanceRanker};
pub use traits::*;
