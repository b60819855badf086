//! Knowledge gateway over the knowledge-base REST API

use super::{non_empty, Document, DocumentId, KnowledgeGateway};
use crate::config::KnowledgeServiceConfig;
use crate::error::{KbAssistError, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

const SUCCESS_CODE: i64 = 200;
const APPROVED_STATUS: &str = "APPROVED";

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SearchRequest<'a> {
    keyword: &'a str,
    page_num: u32,
    page_size: usize,
    status: &'a str,
}

/// `{code, message, data}` wrapper used by every knowledge endpoint
#[derive(Deserialize)]
struct Envelope<T> {
    code: i64,
    #[serde(default)]
    message: Option<String>,
    data: Option<T>,
}

#[derive(Deserialize)]
struct SearchPage {
    #[serde(default)]
    results: Vec<KnowledgeRecord>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct KnowledgeRecord {
    #[serde(default)]
    id: Option<DocumentId>,
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    content: Option<String>,
    #[serde(default)]
    content_text: Option<String>,
    #[serde(default)]
    summary: Option<String>,
    #[serde(default)]
    keywords: Option<String>,
    #[serde(default)]
    file_id: Option<i64>,
}

impl KnowledgeRecord {
    fn into_document(self, id: DocumentId) -> Document {
        Document {
            id,
            title: self.title.unwrap_or_default(),
            content: non_empty(self.content_text)
                .or_else(|| non_empty(self.content))
                .unwrap_or_default(),
            summary: non_empty(self.summary),
            keywords: non_empty(self.keywords),
        }
    }
}

/// Gateway backed by `POST /knowledge/search` and `GET /knowledge/{id}`
pub struct HttpKnowledgeGateway {
    client: Client,
    config: KnowledgeServiceConfig,
}

impl HttpKnowledgeGateway {
    /// Create from configuration
    pub fn new(config: KnowledgeServiceConfig) -> Result<Self> {
        let client = Client::builder()
            .user_agent(concat!("kbassist/", env!("CARGO_PKG_VERSION")))
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;
        Ok(Self { client, config })
    }

    /// Create from environment variables
    pub fn from_env() -> Result<Self> {
        Self::new(KnowledgeServiceConfig::default())
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.config.base_url.trim_end_matches('/'), path)
    }

    fn authorize(&self, req: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match self.config.token {
            Some(ref token) => req.bearer_auth(token),
            None => req,
        }
    }

    async fn try_search(&self, keyword: &str, limit: usize) -> Result<Vec<Document>> {
        let request = SearchRequest {
            keyword,
            page_num: 1,
            page_size: limit,
            status: APPROVED_STATUS,
        };
        let req = self.client.post(self.url("/knowledge/search")).json(&request);
        let body = read_json(self.authorize(req)).await?;
        parse_search_envelope(body)
    }

    async fn try_get_detail(&self, id: DocumentId) -> Result<Option<Document>> {
        let req = self.client.get(self.url(&format!("/knowledge/{}", id)));
        let body = read_json(self.authorize(req)).await?;
        parse_detail_envelope(body, id)
    }
}

#[async_trait]
impl KnowledgeGateway for HttpKnowledgeGateway {
    async fn search(&self, keyword: &str, limit: usize) -> Vec<Document> {
        match self.try_search(keyword, limit).await {
            Ok(documents) => {
                tracing::debug!("Search '{}' returned {} documents", keyword, documents.len());
                documents
            }
            Err(e) => {
                tracing::warn!("Knowledge search failed for '{}': {}", keyword, e);
                Vec::new()
            }
        }
    }

    async fn get_detail(&self, id: DocumentId) -> Option<Document> {
        match self.try_get_detail(id).await {
            Ok(detail) => detail,
            Err(e) => {
                tracing::warn!("Failed to fetch knowledge detail {}: {}", id, e);
                None
            }
        }
    }
}

async fn read_json(req: reqwest::RequestBuilder) -> Result<serde_json::Value> {
    let response = req.send().await?;
    if !response.status().is_success() {
        let status = response.status().as_u16();
        let body = response.text().await.unwrap_or_default();
        return Err(KbAssistError::Transport { status, body });
    }
    Ok(response.json().await?)
}

/// Approved results with a file attached; anything but `code == 200` is an error
fn parse_search_envelope(body: serde_json::Value) -> Result<Vec<Document>> {
    let envelope: Envelope<SearchPage> = serde_json::from_value(body)?;
    if envelope.code != SUCCESS_CODE {
        return Err(KbAssistError::Parse(format!(
            "search returned code {}: {}",
            envelope.code,
            envelope.message.unwrap_or_default()
        )));
    }

    Ok(envelope
        .data
        .map(|page| page.results)
        .unwrap_or_default()
        .into_iter()
        .filter(|record| record.file_id.is_some())
        .filter_map(|record| {
            let id = record.id?;
            Some(record.into_document(id))
        })
        .collect())
}

fn parse_detail_envelope(body: serde_json::Value, id: DocumentId) -> Result<Option<Document>> {
    let envelope: Envelope<KnowledgeRecord> = serde_json::from_value(body)?;
    if envelope.code != SUCCESS_CODE {
        return Ok(None);
    }
    Ok(envelope.data.map(|record| record.into_document(id)))
}
