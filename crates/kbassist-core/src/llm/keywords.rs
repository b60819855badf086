//! Search keyword extraction and query enhancement

use super::{extract, CompletionOptions, Message, TextCompletionProvider};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

const KEYWORD_PROMPT: &str = r#"You are a keyword extraction assistant. The user enters a question; extract the keywords best suited for searching documents.

Rules:
1. Return 1-3 core search keywords
2. Keywords should be nouns or core concepts
3. Drop filler words such as "what", "how", "help me"
4. Return only a JSON array, no other text

Example input: "Help me find documents about project management"
Example output: ["project management"]

Example input: "What is the company's leave process"
Example output: ["leave process", "leave"]"#;

const ENHANCE_PROMPT: &str = r#"You are a search optimization assistant. The user enters a search query; help improve it.

Return a JSON result:
{
  "keywords": ["keyword 1", "keyword 2", "keyword 3"],
  "suggestions": ["more precise query 1", "more precise query 2"],
  "intent": "description of what the user is probably looking for"
}

Return only JSON, no other text."#;

/// Improved form of a raw search query
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnhancedQuery {
    #[serde(default)]
    pub keywords: Vec<String>,
    #[serde(default)]
    pub suggestions: Vec<String>,
    #[serde(default)]
    pub intent: String,
}

impl EnhancedQuery {
    fn fallback(query: &str) -> Self {
        Self {
            keywords: vec![query.to_string()],
            suggestions: Vec::new(),
            intent: query.to_string(),
        }
    }
}

/// Standalone keyword helpers outside the main answer flow
pub struct KeywordExtractor {
    client: Arc<dyn TextCompletionProvider>,
}

impl KeywordExtractor {
    /// Create from completion provider
    pub fn new(client: Arc<dyn TextCompletionProvider>) -> Self {
        Self { client }
    }

    /// 1-3 search keywords; the question itself when extraction fails
    pub async fn extract_keywords(&self, question: &str) -> Vec<String> {
        let messages = vec![Message::system(KEYWORD_PROMPT), Message::user(question)];
        let options = CompletionOptions::default()
            .with_temperature(0.3)
            .with_max_tokens(100);

        match self.client.complete(&messages, &options).await {
            Ok(response) => parse_keywords(&response, question),
            Err(e) => {
                tracing::warn!("Keyword extraction failed: {}", e);
                vec![question.to_string()]
            }
        }
    }

    /// Keywords, refined queries and a short intent description
    pub async fn enhance_query(&self, query: &str) -> EnhancedQuery {
        let messages = vec![
            Message::system(ENHANCE_PROMPT),
            Message::user(format!("Please optimize this search query: {}", query)),
        ];
        let options = CompletionOptions::default().with_temperature(0.3);

        match self.client.complete(&messages, &options).await {
            Ok(response) => parse_enhanced(&response, query),
            Err(e) => {
                tracing::warn!("Search optimization failed: {}", e);
                EnhancedQuery::fallback(query)
            }
        }
    }
}

fn parse_keywords(response: &str, question: &str) -> Vec<String> {
    let keywords: Vec<String> = extract::json_array(response)
        .and_then(|array| serde_json::from_str::<Vec<String>>(array).ok())
        .unwrap_or_default()
        .into_iter()
        .map(|k| k.trim().to_string())
        .filter(|k| !k.is_empty())
        .collect();

    if keywords.is_empty() {
        vec![question.to_string()]
    } else {
        keywords
    }
}

fn parse_enhanced(response: &str, query: &str) -> EnhancedQuery {
    extract::json_object(response)
        .and_then(|json| serde_json::from_str::<EnhancedQuery>(json).ok())
        .map(|mut enhanced| {
            if enhanced.keywords.is_empty() {
                enhanced.keywords.push(query.to_string());
            }
            if enhanced.intent.is_empty() {
                enhanced.intent = query.to_string();
            }
            enhanced
        })
        .unwrap_or_else(|| EnhancedQuery::fallback(query))
}
