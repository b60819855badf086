//! Retrieval-augmented answering over the knowledge base
//!
//! - [`ContextBuilder`] turns search keywords into a bounded document context
//! - [`Assistant`] classifies, retrieves and answers, batch or streamed

mod assistant;
mod context;
pub mod prompts;
mod sink;

pub use assistant::{AskOptions, Assistant, AssistantResult, HISTORY_WINDOW};
pub use context::{
    excerpt, per_document_budget, render_context, BuiltContext, ContextBuilder,
    MULTI_DOCUMENT_BUDGET, SEARCH_KEYWORD_LIMIT, SINGLE_DOCUMENT_BUDGET,
};
pub use sink::{AnswerSink, FnSink};
