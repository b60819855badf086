//! Retrieval and rendering of document context for answer prompts

use crate::knowledge::{Document, KnowledgeGateway};
use std::collections::HashSet;
use std::sync::Arc;

/// Excerpt cap when the context holds a single document
pub const SINGLE_DOCUMENT_BUDGET: usize = 8000;

/// Total excerpt budget shared by several documents
pub const MULTI_DOCUMENT_BUDGET: usize = 6000;

/// Only the leading keywords are searched
pub const SEARCH_KEYWORD_LIMIT: usize = 2;

const TRUNCATION_MARKER: &str = "...(content truncated)";
const EMPTY_CONTENT: &str = "(no content)";

/// Resolved documents plus their rendered prompt block
#[derive(Debug, Clone, Default)]
pub struct BuiltContext {
    pub documents: Vec<Document>,
    pub block: String,
}

/// Turns search keywords into a bounded, deduplicated document context
pub struct ContextBuilder {
    gateway: Arc<dyn KnowledgeGateway>,
}

impl ContextBuilder {
    pub fn new(gateway: Arc<dyn KnowledgeGateway>) -> Self {
        Self { gateway }
    }

    /// Search, fetch full content and render in one go
    pub async fn build(
        &self,
        question: &str,
        keywords: &[String],
        max_documents: usize,
    ) -> BuiltContext {
        tracing::debug!("Building context for '{}' from {:?}", question, keywords);
        let documents = self.resolve(keywords, max_documents).await;
        let documents = self.hydrate(documents).await;
        let block = render_context(&documents);
        BuiltContext { documents, block }
    }

    /// Search the first keywords; dedupe by id in first-seen order, cap at `max_documents`
    pub async fn resolve(&self, keywords: &[String], max_documents: usize) -> Vec<Document> {
        let mut candidates = Vec::new();
        for keyword in keywords.iter().take(SEARCH_KEYWORD_LIMIT) {
            candidates.extend(self.gateway.search(keyword, max_documents).await);
        }

        let mut seen = HashSet::new();
        let documents: Vec<Document> = candidates
            .into_iter()
            .filter(|doc| seen.insert(doc.id))
            .take(max_documents)
            .collect();

        tracing::info!(
            "Resolved {} documents from {} keywords",
            documents.len(),
            keywords.len().min(SEARCH_KEYWORD_LIMIT)
        );
        documents
    }

    /// Replace search summaries with full detail records where available
    pub async fn hydrate(&self, documents: Vec<Document>) -> Vec<Document> {
        let mut hydrated = Vec::with_capacity(documents.len());
        for doc in documents {
            match self.gateway.get_detail(doc.id).await {
                Some(detail) => hydrated.push(doc.merge_detail(detail)),
                None => {
                    tracing::debug!("No detail for document {}, using search summary", doc.id);
                    hydrated.push(doc);
                }
            }
        }
        hydrated
    }
}

/// Excerpt length for each of `count` documents
pub fn per_document_budget(count: usize) -> usize {
    if count <= 1 {
        SINGLE_DOCUMENT_BUDGET
    } else {
        MULTI_DOCUMENT_BUDGET / count
    }
}

/// First `budget` characters of `content` and whether anything was cut
pub fn excerpt(content: &str, budget: usize) -> (&str, bool) {
    match content.char_indices().nth(budget) {
        Some((byte_idx, _)) => (&content[..byte_idx], true),
        None => (content, false),
    }
}

/// Numbered document sections; empty for no documents
pub fn render_context(documents: &[Document]) -> String {
    let budget = per_document_budget(documents.len());
    let mut block = String::new();

    for (index, doc) in documents.iter().enumerate() {
        let body = if doc.content.trim().is_empty() {
            doc.summary.as_deref().unwrap_or("")
        } else {
            doc.content.as_str()
        };

        block.push_str(&format!("[Document {}] {}\n", index + 1, doc.title));
        if body.is_empty() {
            block.push_str(&format!("Content: {}\n", EMPTY_CONTENT));
        } else {
            let (text, truncated) = excerpt(body, budget);
            block.push_str("Content: ");
            block.push_str(text);
            if truncated {
                block.push_str(TRUNCATION_MARKER);
            }
            block.push('\n');
        }
        if let Some(ref keywords) = doc.keywords {
            block.push_str(&format!("Keywords: {}\n", keywords));
        }
        block.push_str("\n---\n\n");
    }

    block
}
