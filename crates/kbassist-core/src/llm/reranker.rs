//! LLM-driven relevance ordering of candidate documents

use super::{extract, CompletionOptions, Message, TextCompletionProvider};
use crate::knowledge::{Document, DocumentId};
use std::sync::Arc;

const RANKER_TEMPERATURE: f32 = 0.3;
const RANKER_MAX_TOKENS: u32 = 100;

/// Reorders candidates by asking the model for an ID ranking
pub struct RelevanceRanker {
    client: Arc<dyn TextCompletionProvider>,
}

impl RelevanceRanker {
    /// Create from completion provider
    pub fn new(client: Arc<dyn TextCompletionProvider>) -> Self {
        Self { client }
    }

    /// Most relevant first; always a permutation of `candidates`
    pub async fn rank(&self, question: &str, candidates: Vec<Document>) -> Vec<Document> {
        if candidates.len() <= 1 {
            return candidates;
        }

        let messages = vec![Message::system(build_ranking_prompt(question, &candidates))];
        let options = CompletionOptions::default()
            .with_temperature(RANKER_TEMPERATURE)
            .with_max_tokens(RANKER_MAX_TOKENS);

        let response = match self.client.complete(&messages, &options).await {
            Ok(response) => response,
            Err(e) => {
                tracing::warn!("Document ranking failed: {}, keeping input order", e);
                return candidates;
            }
        };

        match parse_ranking_response(&response) {
            Some(ordered_ids) => reorder(candidates, &ordered_ids),
            None => {
                tracing::warn!("No usable ID array in ranking response, keeping input order");
                tracing::debug!("Raw LLM response: {}", response);
                candidates
            }
        }
    }
}

fn build_ranking_prompt(question: &str, candidates: &[Document]) -> String {
    let mut prompt = format!(
        "You are a document relevance assistant. The user asks a question and provides a list of \
         candidate documents. Judge how relevant each document is to the question and return the \
         document IDs sorted by relevance.\n\nUser question: {}\n\nCandidate documents:\n",
        question
    );

    for (idx, doc) in candidates.iter().enumerate() {
        let blurb = doc
            .summary
            .as_deref()
            .or(doc.keywords.as_deref())
            .unwrap_or("no summary");
        prompt.push_str(&format!("{}. [ID:{}] {} - {}\n", idx + 1, doc.id, doc.title, blurb));
    }

    prompt.push_str(
        "\nReturn only a JSON array of document IDs ordered from most to least relevant, \
         for example: [3, 1, 5, 2, 4]\nReturn only the JSON array, no other text.",
    );
    prompt
}

fn parse_ranking_response(response: &str) -> Option<Vec<DocumentId>> {
    let array = extract::id_array(response)?;
    serde_json::from_str(array).ok()
}

/// Emit candidates in `ordered_ids` order, each at most once, then the rest
/// in their input order
pub fn reorder(candidates: Vec<Document>, ordered_ids: &[DocumentId]) -> Vec<Document> {
    let mut slots: Vec<Option<Document>> = candidates.into_iter().map(Some).collect();
    let mut sorted = Vec::with_capacity(slots.len());

    for id in ordered_ids {
        let hit = slots
            .iter_mut()
            .find(|slot| slot.as_ref().is_some_and(|doc| doc.id == *id));
        if let Some(doc) = hit.and_then(Option::take) {
            sorted.push(doc);
        }
    }

    sorted.extend(slots.into_iter().flatten());
    sorted
}
