//! End-to-end tests of the assistant against a scripted model and an in-memory knowledge base
//!
//! Tests:
//! 1. Batch and streamed answers agree
//! 2. HELP never reaches the model
//! 3. Documents are announced once, before any answer chunk
//! 4. History windowing for search-backed prompts
//! 5. Explicit-document variants and general questions
//! 6. Cancellation

use async_trait::async_trait;
use kbassist_core::llm::{CompletionOptions, Message, Role, StreamEnd, TextCompletionProvider};
use kbassist_core::rag::{prompts, AnswerSink, AskOptions, Assistant, ContextBuilder, FnSink};
use kbassist_core::{Document, DocumentId, DocumentRef, IntentLabel, KnowledgeGateway, Result};
use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tokio_util::sync::CancellationToken;

/// Replays canned replies in order and records every request
#[derive(Default)]
struct ScriptedModel {
    replies: Mutex<VecDeque<String>>,
    requests: Mutex<Vec<Vec<Message>>>,
}

impl ScriptedModel {
    fn new(replies: &[&str]) -> Arc<Self> {
        Arc::new(Self {
            replies: Mutex::new(replies.iter().map(|r| r.to_string()).collect()),
            requests: Mutex::new(Vec::new()),
        })
    }

    fn next_reply(&self, messages: &[Message]) -> String {
        self.requests.lock().unwrap().push(messages.to_vec());
        self.replies.lock().unwrap().pop_front().unwrap_or_default()
    }

    fn request_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    fn request(&self, index: usize) -> Vec<Message> {
        self.requests.lock().unwrap()[index].clone()
    }
}

#[async_trait]
impl TextCompletionProvider for ScriptedModel {
    async fn complete(&self, messages: &[Message], _options: &CompletionOptions) -> Result<String> {
        Ok(self.next_reply(messages))
    }

    async fn complete_stream(
        &self,
        messages: &[Message],
        on_chunk: &mut (dyn for<'c> FnMut(&'c str) + Send),
        options: &CompletionOptions,
    ) -> Result<StreamEnd> {
        let reply = self.next_reply(messages);
        for word in reply.split_inclusive(' ') {
            if options.is_cancelled() {
                return Ok(StreamEnd::Cancelled);
            }
            on_chunk(word);
        }
        Ok(StreamEnd::Done)
    }

    fn model_name(&self) -> &str {
        "scripted"
    }
}

#[derive(Default)]
struct MemoryKnowledgeBase {
    results: HashMap<String, Vec<Document>>,
    details: HashMap<DocumentId, Document>,
    detail_calls: AtomicUsize,
}

impl MemoryKnowledgeBase {
    fn leave_policies() -> Arc<Self> {
        let mut kb = Self::default();
        kb.results.insert(
            "leave policy".into(),
            vec![
                Document::new(1, "Annual leave policy").with_summary("15 days a year"),
                Document::new(2, "Sick leave"),
            ],
        );
        kb.results.insert(
            "leave".into(),
            vec![Document::new(2, "Sick leave"), Document::new(3, "Parental leave")],
        );
        kb.details.insert(
            1,
            Document::new(1, "Annual leave policy")
                .with_content("Employees receive 15 days of paid leave.")
                .with_keywords("leave,hr"),
        );
        kb.details.insert(
            2,
            Document::new(2, "Sick leave").with_content("Sick leave needs a certificate."),
        );
        Arc::new(kb)
    }
}

#[async_trait]
impl KnowledgeGateway for MemoryKnowledgeBase {
    async fn search(&self, keyword: &str, limit: usize) -> Vec<Document> {
        let mut docs = self.results.get(keyword).cloned().unwrap_or_default();
        docs.truncate(limit);
        docs
    }

    async fn get_detail(&self, id: DocumentId) -> Option<Document> {
        self.detail_calls.fetch_add(1, Ordering::SeqCst);
        self.details.get(&id).cloned()
    }
}

#[derive(Debug, Clone, PartialEq)]
enum Event {
    Documents(Vec<DocumentId>),
    Chunk(String),
}

#[derive(Default)]
struct RecordingSink {
    events: Vec<Event>,
    cancel_on_first_chunk: Option<CancellationToken>,
}

impl RecordingSink {
    fn answer(&self) -> String {
        self.events
            .iter()
            .filter_map(|e| match e {
                Event::Chunk(text) => Some(text.as_str()),
                Event::Documents(_) => None,
            })
            .collect()
    }

    fn document_events(&self) -> usize {
        self.events
            .iter()
            .filter(|e| matches!(e, Event::Documents(_)))
            .count()
    }
}

impl AnswerSink for RecordingSink {
    fn on_chunk(&mut self, text: &str) {
        if let Some(token) = &self.cancel_on_first_chunk {
            token.cancel();
        }
        self.events.push(Event::Chunk(text.to_string()));
    }

    fn on_documents(&mut self, documents: &[DocumentRef]) {
        self.events
            .push(Event::Documents(documents.iter().map(|d| d.id).collect()));
    }
}

const QA_INTENT: &str =
    r#"{"intent":"QA","needSearch":true,"keywords":["leave policy","leave","unused"]}"#;

fn history(n: usize) -> Vec<Message> {
    (0..n)
        .map(|i| {
            if i % 2 == 0 {
                Message::user(format!("question {}", i))
            } else {
                Message::assistant(format!("answer {}", i))
            }
        })
        .collect()
}

#[tokio::test]
async fn test_qa_batch_answer_uses_retrieved_context() {
    let model = ScriptedModel::new(&[QA_INTENT, "You get 15 days."]);
    let kb = MemoryKnowledgeBase::leave_policies();
    let assistant = Assistant::new(model.clone(), kb.clone());

    let result = assistant
        .ask("How many leave days do I get?", &[], &AskOptions::default())
        .await
        .unwrap();

    assert_eq!(result.answer, "You get 15 days.");
    assert_eq!(result.intent, IntentLabel::Qa);
    let ids: Vec<_> = result.documents.iter().map(|d| d.id).collect();
    assert_eq!(ids, vec![1, 2, 3]);
    assert_eq!(result.search_keywords.len(), 3);

    let answer_request = model.request(1);
    assert_eq!(answer_request[0].role, Role::System);
    assert!(answer_request[0]
        .content
        .contains("Employees receive 15 days of paid leave."));
    assert!(answer_request[0].content.contains("[Document 3] Parental leave"));
    assert_eq!(
        answer_request.last().unwrap(),
        &Message::user("How many leave days do I get?")
    );
}

#[tokio::test]
async fn test_stream_matches_batch_answer() {
    let reply = "Annual leave is 15 days per year.";
    let batch_model = ScriptedModel::new(&[QA_INTENT, reply]);
    let stream_model = ScriptedModel::new(&[QA_INTENT, reply]);
    let kb = MemoryKnowledgeBase::leave_policies();

    let batch = Assistant::new(batch_model, kb.clone())
        .ask("leave?", &[], &AskOptions::default())
        .await
        .unwrap();

    let mut sink = RecordingSink::default();
    let end = Assistant::new(stream_model, kb)
        .ask_stream("leave?", &[], &mut sink, &AskOptions::default())
        .await
        .unwrap();

    assert_eq!(end, StreamEnd::Done);
    assert_eq!(sink.answer(), batch.answer);
}

#[tokio::test]
async fn test_documents_announced_once_before_chunks() {
    let model = ScriptedModel::new(&[QA_INTENT, "one two three"]);
    let assistant = Assistant::new(model, MemoryKnowledgeBase::leave_policies());

    let mut sink = RecordingSink::default();
    assistant
        .ask_stream("leave?", &[], &mut sink, &AskOptions::default())
        .await
        .unwrap();

    assert_eq!(sink.document_events(), 1);
    assert_eq!(sink.events[0], Event::Documents(vec![1, 2, 3]));
    assert!(sink.events[1..]
        .iter()
        .all(|e| matches!(e, Event::Chunk(_))));
}

#[tokio::test]
async fn test_help_never_calls_answer_model() {
    let model = ScriptedModel::new(&[r#"{"intent":"HELP","needSearch":false,"keywords":[]}"#]);
    let kb = MemoryKnowledgeBase::leave_policies();
    let assistant = Assistant::new(model.clone(), kb.clone());

    let result = assistant
        .ask("what can you do?", &[], &AskOptions::default())
        .await
        .unwrap();
    assert_eq!(result.intent, IntentLabel::Help);
    assert_eq!(result.answer, prompts::HELP_MESSAGE);
    assert!(result.documents.is_empty());
    assert_eq!(model.request_count(), 1);
    assert_eq!(kb.detail_calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_help_stream_emits_help_then_empty_documents() {
    let model = ScriptedModel::new(&[r#"{"intent":"HELP"}"#]);
    let assistant = Assistant::new(model.clone(), MemoryKnowledgeBase::leave_policies());

    let mut sink = RecordingSink::default();
    let end = assistant
        .ask_stream("help", &[], &mut sink, &AskOptions::default())
        .await
        .unwrap();

    assert_eq!(end, StreamEnd::Done);
    assert_eq!(
        sink.events,
        vec![
            Event::Chunk(prompts::HELP_MESSAGE.to_string()),
            Event::Documents(vec![])
        ]
    );
    assert_eq!(model.request_count(), 1);
}

#[tokio::test]
async fn test_chat_passes_full_history_without_documents() {
    let model = ScriptedModel::new(&[r#"{"intent":"CHAT","needSearch":false}"#, "Hello!"]);
    let kb = MemoryKnowledgeBase::leave_policies();
    let assistant = Assistant::new(model.clone(), kb.clone());

    let result = assistant
        .ask("hi", &history(10), &AskOptions::default())
        .await
        .unwrap();

    assert_eq!(result.answer, "Hello!");
    assert!(result.documents.is_empty());
    assert!(result.search_keywords.is_empty());
    assert_eq!(model.request(1).len(), 12);
    assert_eq!(kb.detail_calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_search_backed_history_keeps_last_six() {
    let model = ScriptedModel::new(&[QA_INTENT, "ok"]);
    let assistant = Assistant::new(model.clone(), MemoryKnowledgeBase::leave_policies());

    assistant
        .ask("leave?", &history(10), &AskOptions::default())
        .await
        .unwrap();

    let request = model.request(1);
    assert_eq!(request.len(), 8);
    assert_eq!(request[1], Message::user("question 4"));
    assert_eq!(request[6], Message::assistant("answer 9"));
}

#[tokio::test]
async fn test_qa_without_search_answers_with_empty_context() {
    let model = ScriptedModel::new(&[
        r#"{"intent":"QA","needSearch":false,"keywords":["leave"]}"#,
        "General answer",
    ]);
    let kb = MemoryKnowledgeBase::leave_policies();
    let assistant = Assistant::new(model.clone(), kb.clone());

    let result = assistant
        .ask("leave?", &[], &AskOptions::default())
        .await
        .unwrap();

    assert!(result.documents.is_empty());
    assert!(!model.request(1)[0].content.contains("Relevant documents"));
    assert_eq!(kb.detail_calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_include_content_false_skips_detail_lookup() {
    let model = ScriptedModel::new(&[QA_INTENT, "ok"]);
    let kb = MemoryKnowledgeBase::leave_policies();
    let assistant = Assistant::new(model.clone(), kb.clone());
    let options = AskOptions {
        max_documents: 2,
        include_content: false,
        cancel: None,
    };

    let result = assistant.ask("leave?", &[], &options).await.unwrap();

    assert_eq!(result.documents.len(), 2);
    assert_eq!(kb.detail_calls.load(Ordering::SeqCst), 0);
    assert!(!model.request(1)[0].content.contains("Relevant documents"));
}

#[tokio::test]
async fn test_unparseable_intent_falls_back_to_search() {
    let model = ScriptedModel::new(&["no json here", "fallback answer"]);
    let mut kb = MemoryKnowledgeBase::default();
    kb.results
        .insert("sick leave".into(), vec![Document::new(2, "Sick leave")]);
    let assistant = Assistant::new(model, Arc::new(kb));

    let result = assistant
        .ask("sick leave", &[], &AskOptions::default())
        .await
        .unwrap();

    assert_eq!(result.intent, IntentLabel::Qa);
    assert_eq!(result.search_keywords, vec!["sick leave".to_string()]);
    assert_eq!(result.documents.len(), 1);
}

#[tokio::test]
async fn test_cancelled_before_start() {
    let model = ScriptedModel::new(&[QA_INTENT, "never"]);
    let assistant = Assistant::new(model.clone(), MemoryKnowledgeBase::leave_policies());
    let token = CancellationToken::new();
    token.cancel();
    let options = AskOptions {
        cancel: Some(token),
        ..AskOptions::default()
    };

    let mut sink = RecordingSink::default();
    let end = assistant
        .ask_stream("leave?", &[], &mut sink, &options)
        .await
        .unwrap();

    assert_eq!(end, StreamEnd::Cancelled);
    assert_eq!(sink.events, vec![Event::Documents(vec![])]);
    assert_eq!(model.request_count(), 0);
}

#[tokio::test]
async fn test_cancel_mid_stream_stops_chunks() {
    let model = ScriptedModel::new(&[QA_INTENT, "one two three four"]);
    let assistant = Assistant::new(model, MemoryKnowledgeBase::leave_policies());
    let token = CancellationToken::new();
    let options = AskOptions {
        cancel: Some(token.clone()),
        ..AskOptions::default()
    };

    let mut sink = RecordingSink {
        cancel_on_first_chunk: Some(token),
        ..RecordingSink::default()
    };
    let end = assistant
        .ask_stream("leave?", &[], &mut sink, &options)
        .await
        .unwrap();

    assert_eq!(end, StreamEnd::Cancelled);
    assert_eq!(sink.answer(), "one ");
    assert_eq!(sink.document_events(), 1);
}

#[tokio::test]
async fn test_fn_sink_adapter() {
    let model = ScriptedModel::new(&[r#"{"intent":"CHAT"}"#, "hey there"]);
    let assistant = Assistant::new(model, MemoryKnowledgeBase::leave_policies());

    let mut text = String::new();
    let mut doc_calls = 0;
    {
        let mut sink = FnSink::new(|chunk: &str| text.push_str(chunk), |_: &[DocumentRef]| {
            doc_calls += 1
        });
        assistant
            .ask_stream("hi", &[], &mut sink, &AskOptions::default())
            .await
            .unwrap();
    }

    assert_eq!(text, "hey there");
    assert_eq!(doc_calls, 1);
}

#[tokio::test]
async fn test_ask_about_document_by_id() {
    let model = ScriptedModel::new(&["It needs a certificate."]);
    let assistant = Assistant::new(model.clone(), MemoryKnowledgeBase::leave_policies());

    let answer = assistant
        .ask_about_document_by_id(2, "What do I need?", &[])
        .await
        .unwrap();
    assert_eq!(answer, "It needs a certificate.");
    assert!(model.request(0)[0]
        .content
        .contains("Sick leave needs a certificate."));

    let missing = assistant
        .ask_about_document_by_id(99, "anything", &[])
        .await
        .unwrap();
    assert_eq!(missing, prompts::DOCUMENT_UNAVAILABLE_MESSAGE);
    assert_eq!(model.request_count(), 1);
}

#[tokio::test]
async fn test_ask_about_documents_requires_selection() {
    let model = ScriptedModel::new(&[]);
    let assistant = Assistant::new(model.clone(), MemoryKnowledgeBase::leave_policies());

    let answer = assistant.ask_about_documents(&[], "q", &[]).await.unwrap();
    assert_eq!(answer, prompts::SELECT_DOCUMENTS_MESSAGE);

    let mut streamed = String::new();
    let end = assistant
        .ask_about_documents_stream(&[], "q", &[], &mut |c: &str| streamed.push_str(c), None)
        .await
        .unwrap();
    assert_eq!(end, StreamEnd::Done);
    assert_eq!(streamed, prompts::SELECT_DOCUMENTS_MESSAGE);
    assert_eq!(model.request_count(), 0);
}

#[tokio::test]
async fn test_ask_about_documents_synthesises() {
    let model = ScriptedModel::new(&["Both agree."]);
    let assistant = Assistant::new(model.clone(), MemoryKnowledgeBase::leave_policies());
    let docs = vec![
        Document::new(1, "A").with_content("alpha"),
        Document::new(2, "B").with_content("beta"),
    ];

    let answer = assistant
        .ask_about_documents(&docs, "compare", &history(8))
        .await
        .unwrap();

    assert_eq!(answer, "Both agree.");
    let request = model.request(0);
    assert_eq!(request.len(), 8);
    assert!(request[0].content.contains("[Document 2] B"));
}

#[tokio::test]
async fn test_ask_general_skips_classification_and_retrieval() {
    let model = ScriptedModel::new(&["Tag documents by department."]);
    let kb = MemoryKnowledgeBase::leave_policies();
    let assistant = Assistant::new(model.clone(), kb.clone());

    let answer = assistant
        .ask_general("How should I organise documents?", &history(8))
        .await
        .unwrap();

    assert_eq!(answer, "Tag documents by department.");
    assert_eq!(model.request_count(), 1);
    assert_eq!(kb.detail_calls.load(Ordering::SeqCst), 0);

    let request = model.request(0);
    assert_eq!(request.len(), 10);
    assert_eq!(request[0], Message::system(prompts::general_assistant_prompt()));
    assert_eq!(request[1], Message::user("question 0"));
    assert_eq!(request[8], Message::assistant("answer 7"));
    assert_eq!(request[9], Message::user("How should I organise documents?"));
}

#[tokio::test]
async fn test_rank_reorders_candidates() {
    let model = ScriptedModel::new(&["[3, 1]"]);
    let assistant = Assistant::new(model, MemoryKnowledgeBase::leave_policies());
    let candidates = (1..=4)
        .map(|id| Document::new(id, format!("doc {}", id)))
        .collect();

    let ranked = assistant.rank("leave", candidates).await;
    let ids: Vec<_> = ranked.iter().map(|d| d.id).collect();
    assert_eq!(ids, vec![3, 1, 2, 4]);
}

mod dedup {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn resolved_documents_are_unique_and_bounded(
            first in proptest::collection::vec(0i64..10, 0..8),
            second in proptest::collection::vec(0i64..10, 0..8),
            max in 1usize..6,
        ) {
            let mut kb = MemoryKnowledgeBase::default();
            kb.results.insert("a".into(), first.iter().map(|&id| Document::new(id, "x")).collect());
            kb.results.insert("b".into(), second.iter().map(|&id| Document::new(id, "y")).collect());
            let builder = ContextBuilder::new(Arc::new(kb));

            let runtime = tokio::runtime::Builder::new_current_thread().build().unwrap();
            let docs = runtime.block_on(builder.resolve(&["a".to_string(), "b".to_string()], max));

            let ids: Vec<_> = docs.iter().map(|d| d.id).collect();
            let mut expected = Vec::new();
            for id in first.iter().take(max).chain(second.iter().take(max)) {
                if !expected.contains(id) {
                    expected.push(*id);
                }
            }
            expected.truncate(max);
            prop_assert_eq!(ids, expected);
        }
    }
}
