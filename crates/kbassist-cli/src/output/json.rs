//! JSON output formatter

use kbassist_core::{AssistantResult, Document, DocumentRef};
use serde::Serialize;

pub fn to_pretty<T: Serialize + ?Sized>(value: &T) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|_| "null".to_string()) + "\n"
}

pub fn format_answer(result: &AssistantResult) -> String {
    to_pretty(result)
}

pub fn format_text(answer: &str) -> String {
    to_pretty(&serde_json::json!({ "answer": answer }))
}

pub fn format_sources(documents: &[DocumentRef]) -> String {
    to_pretty(&serde_json::json!({ "documents": documents }))
}

pub fn format_documents(documents: &[Document]) -> String {
    let output: Vec<serde_json::Value> = documents
        .iter()
        .map(|d| {
            serde_json::json!({
                "id": d.id,
                "title": d.title,
                "summary": d.summary,
                "keywords": d.keywords,
            })
        })
        .collect();
    to_pretty(&output)
}
