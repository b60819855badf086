//! Intent classification for incoming questions

use super::{extract, CompletionOptions, Message, TextCompletionProvider};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

const CLASSIFIER_TEMPERATURE: f32 = 0.3;
const CLASSIFIER_MAX_TOKENS: u32 = 150;

const CLASSIFIER_PROMPT: &str = r#"You are an intent analysis assistant. Classify the user's question.

Intent types:
- SEARCH: the user wants to find or look up documents
- QA: the user wants an answer to a question
- CHAT: the user is making small talk or greeting
- HELP: the user wants to know how to use this system

Return JSON in this format:
{
  "intent": "intent type",
  "needSearch": true/false,
  "keywords": ["keyword array"]
}

Return only JSON, no other text."#;

/// Purpose of a question
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum IntentLabel {
    Chat,
    Qa,
    Search,
    Help,
}

impl std::fmt::Display for IntentLabel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            IntentLabel::Chat => "CHAT",
            IntentLabel::Qa => "QA",
            IntentLabel::Search => "SEARCH",
            IntentLabel::Help => "HELP",
        };
        f.write_str(label)
    }
}

/// Classified question
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Intent {
    #[serde(rename = "intent")]
    pub label: IntentLabel,
    #[serde(default)]
    pub need_search: bool,
    #[serde(default)]
    pub keywords: Vec<String>,
}

impl Intent {
    /// Search-backed QA over the raw question
    pub fn fallback(question: &str) -> Self {
        Self {
            label: IntentLabel::Qa,
            need_search: true,
            keywords: vec![question.to_string()],
        }
    }

    /// Whether the orchestrator should consult the knowledge base
    pub fn wants_search(&self) -> bool {
        match self.label {
            IntentLabel::Search => true,
            IntentLabel::Qa => self.need_search,
            IntentLabel::Chat | IntentLabel::Help => false,
        }
    }
}

/// Labels questions with a single low-temperature completion
pub struct IntentClassifier {
    client: Arc<dyn TextCompletionProvider>,
}

impl IntentClassifier {
    /// Create from completion provider
    pub fn new(client: Arc<dyn TextCompletionProvider>) -> Self {
        Self { client }
    }

    /// Classify a question; never fails
    pub async fn classify(&self, question: &str) -> Intent {
        let messages = vec![Message::system(CLASSIFIER_PROMPT), Message::user(question)];
        let options = CompletionOptions::default()
            .with_temperature(CLASSIFIER_TEMPERATURE)
            .with_max_tokens(CLASSIFIER_MAX_TOKENS);

        match self.client.complete(&messages, &options).await {
            Ok(response) => parse_intent_response(&response, question),
            Err(e) => {
                tracing::warn!("Intent analysis failed: {}, using fallback", e);
                Intent::fallback(question)
            }
        }
    }
}

fn parse_intent_response(response: &str, question: &str) -> Intent {
    let Some(json_str) = extract::json_object(response) else {
        tracing::warn!("No JSON in intent response, using fallback");
        return Intent::fallback(question);
    };

    match serde_json::from_str::<Intent>(json_str) {
        Ok(intent) => intent,
        Err(e) => {
            tracing::warn!("Failed to parse intent JSON: {}, using fallback", e);
            tracing::debug!("Raw LLM response: {}", response);
            Intent::fallback(question)
        }
    }
}
