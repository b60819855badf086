//! Knowledge-base access
//!
//! Documents are owned by the remote knowledge service; the assistant only
//! holds request-scoped copies returned through a [`KnowledgeGateway`].

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

mod http;

pub use http::HttpKnowledgeGateway;

/// Backend identifier of a knowledge item
pub type DocumentId = i64;

/// Read-only copy of a knowledge item
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    pub id: DocumentId,
    pub title: String,
    /// Full text, possibly empty when only a search summary is known
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub summary: Option<String>,
    #[serde(default)]
    pub keywords: Option<String>,
}

impl Document {
    pub fn new(id: DocumentId, title: impl Into<String>) -> Self {
        Self {
            id,
            title: title.into(),
            content: String::new(),
            summary: None,
            keywords: None,
        }
    }

    pub fn with_content(mut self, content: impl Into<String>) -> Self {
        self.content = content.into();
        self
    }

    pub fn with_summary(mut self, summary: impl Into<String>) -> Self {
        self.summary = non_empty(Some(summary.into()));
        self
    }

    pub fn with_keywords(mut self, keywords: impl Into<String>) -> Self {
        self.keywords = non_empty(Some(keywords.into()));
        self
    }

    /// Overlay a fetched detail record; empty detail fields keep the summary values
    pub fn merge_detail(self, detail: Document) -> Document {
        Document {
            id: self.id,
            title: if detail.title.is_empty() {
                self.title
            } else {
                detail.title
            },
            content: if detail.content.is_empty() {
                self.content
            } else {
                detail.content
            },
            summary: detail.summary.or(self.summary),
            keywords: detail.keywords.or(self.keywords),
        }
    }

    /// Citation view without content
    pub fn to_ref(&self) -> DocumentRef {
        DocumentRef {
            id: self.id,
            title: self.title.clone(),
            keywords: self.keywords.clone(),
        }
    }
}

/// Document citation surfaced to callers; never carries content
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentRef {
    pub id: DocumentId,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub keywords: Option<String>,
}

/// Document search and detail lookup
///
/// Implementations fail soft: transport or parse problems yield an empty
/// list or `None`, never an error.
#[async_trait]
pub trait KnowledgeGateway: Send + Sync {
    /// Approved documents matching `keyword`, first page of `limit` entries
    async fn search(&self, keyword: &str, limit: usize) -> Vec<Document>;

    /// Full document, or `None` when unavailable
    async fn get_detail(&self, id: DocumentId) -> Option<Document>;
}

pub(crate) fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}
