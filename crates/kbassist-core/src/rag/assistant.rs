//! Retrieval-augmented answering
//!
//! Every request is classified first, then routed:
//! 1. CHAT → direct answer with the general prompt
//! 2. HELP → fixed help text, no model call
//! 3. anything else → resolve documents, render context, answer from it

use super::context::{render_context, ContextBuilder};
use super::prompts;
use super::sink::AnswerSink;
use crate::config::{AssistantDefaults, Config};
use crate::error::Result;
use crate::knowledge::{Document, DocumentId, DocumentRef, HttpKnowledgeGateway, KnowledgeGateway};
use crate::llm::{
    ChatClient, CompletionOptions, Intent, IntentClassifier, IntentLabel, Message,
    RelevanceRanker, StreamEnd, TextCompletionProvider,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

/// Most recent history messages kept in search-backed prompts
pub const HISTORY_WINDOW: usize = 6;

/// Per-request options
#[derive(Debug, Clone)]
pub struct AskOptions {
    pub max_documents: usize,
    /// Fetch document bodies into the prompt context
    pub include_content: bool,
    /// Stops streamed answers; ignored by batch calls
    pub cancel: Option<CancellationToken>,
}

impl Default for AskOptions {
    fn default() -> Self {
        Self::from(&AssistantDefaults::default())
    }
}

impl From<&AssistantDefaults> for AskOptions {
    fn from(defaults: &AssistantDefaults) -> Self {
        Self {
            max_documents: defaults.max_documents,
            include_content: defaults.include_content,
            cancel: None,
        }
    }
}

impl AskOptions {
    fn is_cancelled(&self) -> bool {
        self.cancel.as_ref().is_some_and(|c| c.is_cancelled())
    }
}

/// Batch answer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssistantResult {
    pub answer: String,
    pub documents: Vec<DocumentRef>,
    pub intent: IntentLabel,
    pub search_keywords: Vec<String>,
}

/// Where a classified question goes next
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Route {
    DirectAnswer,
    HelpAnswer,
    SearchThenAnswer,
}

impl Route {
    fn for_intent(intent: &Intent) -> Self {
        match intent.label {
            IntentLabel::Chat => Route::DirectAnswer,
            IntentLabel::Help => Route::HelpAnswer,
            IntentLabel::Qa | IntentLabel::Search => Route::SearchThenAnswer,
        }
    }
}

/// Knowledge-base assistant tying classification, retrieval and answering together
pub struct Assistant {
    client: Arc<dyn TextCompletionProvider>,
    gateway: Arc<dyn KnowledgeGateway>,
    classifier: IntentClassifier,
    context: ContextBuilder,
    ranker: RelevanceRanker,
}

impl Assistant {
    pub fn new(
        client: Arc<dyn TextCompletionProvider>,
        gateway: Arc<dyn KnowledgeGateway>,
    ) -> Self {
        Self {
            classifier: IntentClassifier::new(client.clone()),
            context: ContextBuilder::new(gateway.clone()),
            ranker: RelevanceRanker::new(client.clone()),
            client,
            gateway,
        }
    }

    /// Create with HTTP clients for both services
    pub fn from_config(config: &Config) -> Result<Self> {
        let client = ChatClient::new(config.chat.clone())?;
        let gateway = HttpKnowledgeGateway::new(config.knowledge.clone())?;
        Ok(Self::new(Arc::new(client), Arc::new(gateway)))
    }

    pub fn gateway(&self) -> &dyn KnowledgeGateway {
        self.gateway.as_ref()
    }

    /// Answer a question and return the full result
    pub async fn ask(
        &self,
        question: &str,
        history: &[Message],
        options: &AskOptions,
    ) -> Result<AssistantResult> {
        let intent = self.classifier.classify(question).await;
        log_intent(&intent);

        match Route::for_intent(&intent) {
            Route::DirectAnswer => {
                let messages = compose(prompts::GENERAL_CHAT_PROMPT, history, None, question);
                let answer = self
                    .client
                    .complete(&messages, &CompletionOptions::default())
                    .await?;
                Ok(AssistantResult {
                    answer,
                    documents: Vec::new(),
                    intent: intent.label,
                    search_keywords: Vec::new(),
                })
            }
            Route::HelpAnswer => Ok(AssistantResult {
                answer: prompts::HELP_MESSAGE.to_string(),
                documents: Vec::new(),
                intent: intent.label,
                search_keywords: Vec::new(),
            }),
            Route::SearchThenAnswer => {
                let documents = self.resolve_documents(&intent, options).await;
                let context_block = self.context_block(&documents, options).await;

                let system = prompts::retrieval_prompt(&context_block);
                let messages = compose(&system, history, Some(HISTORY_WINDOW), question);
                let answer = self
                    .client
                    .complete(&messages, &CompletionOptions::default())
                    .await?;

                Ok(AssistantResult {
                    answer,
                    documents: documents.iter().map(Document::to_ref).collect(),
                    intent: intent.label,
                    search_keywords: intent.keywords,
                })
            }
        }
    }

    /// Answer a question as a token stream
    ///
    /// The sink receives exactly one documents notification. Cancellation
    /// ends the call with [`StreamEnd::Cancelled`].
    pub async fn ask_stream(
        &self,
        question: &str,
        history: &[Message],
        sink: &mut dyn AnswerSink,
        options: &AskOptions,
    ) -> Result<StreamEnd> {
        if options.is_cancelled() {
            sink.on_documents(&[]);
            return Ok(StreamEnd::Cancelled);
        }

        let intent = self.classifier.classify(question).await;
        log_intent(&intent);

        match Route::for_intent(&intent) {
            Route::HelpAnswer => {
                sink.on_chunk(prompts::HELP_MESSAGE);
                sink.on_documents(&[]);
                Ok(StreamEnd::Done)
            }
            Route::DirectAnswer => {
                sink.on_documents(&[]);
                let messages = compose(prompts::GENERAL_CHAT_PROMPT, history, None, question);
                self.stream_into(&messages, sink, options.cancel.clone()).await
            }
            Route::SearchThenAnswer => {
                let documents = if options.is_cancelled() {
                    Vec::new()
                } else {
                    self.resolve_documents(&intent, options).await
                };
                let refs: Vec<DocumentRef> = documents.iter().map(Document::to_ref).collect();
                sink.on_documents(&refs);

                if options.is_cancelled() {
                    return Ok(StreamEnd::Cancelled);
                }

                let context_block = self.context_block(&documents, options).await;
                let system = prompts::retrieval_prompt(&context_block);
                let messages = compose(&system, history, Some(HISTORY_WINDOW), question);
                self.stream_into(&messages, sink, options.cancel.clone()).await
            }
        }
    }

    /// Question about one explicitly supplied document
    pub async fn ask_about_document(
        &self,
        document: &Document,
        question: &str,
        history: &[Message],
    ) -> Result<String> {
        let system = prompts::single_document_prompt(document);
        let messages = compose(&system, history, None, question);
        self.client
            .complete(&messages, &CompletionOptions::default())
            .await
    }

    /// Streamed variant of [`ask_about_document`](Self::ask_about_document)
    pub async fn ask_about_document_stream(
        &self,
        document: &Document,
        question: &str,
        history: &[Message],
        on_chunk: &mut (dyn for<'c> FnMut(&'c str) + Send),
        cancel: Option<CancellationToken>,
    ) -> Result<StreamEnd> {
        let system = prompts::single_document_prompt(document);
        let messages = compose(&system, history, None, question);
        let options = CompletionOptions::default().with_cancel(cancel);
        self.client
            .complete_stream(&messages, on_chunk, &options)
            .await
    }

    /// Fetch a document by id and answer from it; a fixed apology when it is unavailable
    pub async fn ask_about_document_by_id(
        &self,
        id: DocumentId,
        question: &str,
        history: &[Message],
    ) -> Result<String> {
        match self.gateway.get_detail(id).await {
            Some(document) => self.ask_about_document(&document, question, history).await,
            None => Ok(prompts::DOCUMENT_UNAVAILABLE_MESSAGE.to_string()),
        }
    }

    /// Question answered from several explicitly supplied documents
    pub async fn ask_about_documents(
        &self,
        documents: &[Document],
        question: &str,
        history: &[Message],
    ) -> Result<String> {
        if documents.is_empty() {
            return Ok(prompts::SELECT_DOCUMENTS_MESSAGE.to_string());
        }
        let system = prompts::multi_document_prompt(documents);
        let messages = compose(&system, history, Some(HISTORY_WINDOW), question);
        self.client
            .complete(&messages, &CompletionOptions::default())
            .await
    }

    /// Streamed variant of [`ask_about_documents`](Self::ask_about_documents)
    pub async fn ask_about_documents_stream(
        &self,
        documents: &[Document],
        question: &str,
        history: &[Message],
        on_chunk: &mut (dyn for<'c> FnMut(&'c str) + Send),
        cancel: Option<CancellationToken>,
    ) -> Result<StreamEnd> {
        if documents.is_empty() {
            on_chunk(prompts::SELECT_DOCUMENTS_MESSAGE);
            return Ok(StreamEnd::Done);
        }
        let system = prompts::multi_document_prompt(documents);
        let messages = compose(&system, history, Some(HISTORY_WINDOW), question);
        let options = CompletionOptions::default().with_cancel(cancel);
        self.client
            .complete_stream(&messages, on_chunk, &options)
            .await
    }

    /// General knowledge-management question without retrieval
    pub async fn ask_general(&self, question: &str, history: &[Message]) -> Result<String> {
        let messages = compose(prompts::general_assistant_prompt(), history, None, question);
        self.client
            .complete(&messages, &CompletionOptions::default())
            .await
    }

    /// Reorder candidates by relevance to `question`
    pub async fn rank(&self, question: &str, candidates: Vec<Document>) -> Vec<Document> {
        self.ranker.rank(question, candidates).await
    }

    async fn resolve_documents(&self, intent: &Intent, options: &AskOptions) -> Vec<Document> {
        if !intent.wants_search() || intent.keywords.is_empty() {
            tracing::debug!("No search for this question");
            return Vec::new();
        }
        self.context
            .resolve(&intent.keywords, options.max_documents)
            .await
    }

    async fn context_block(&self, documents: &[Document], options: &AskOptions) -> String {
        if !options.include_content || documents.is_empty() {
            return String::new();
        }
        let hydrated = self.context.hydrate(documents.to_vec()).await;
        render_context(&hydrated)
    }

    async fn stream_into(
        &self,
        messages: &[Message],
        sink: &mut dyn AnswerSink,
        cancel: Option<CancellationToken>,
    ) -> Result<StreamEnd> {
        let options = CompletionOptions::default().with_cancel(cancel);
        let end = self
            .client
            .complete_stream(messages, &mut |chunk: &str| sink.on_chunk(chunk), &options)
            .await?;
        tracing::debug!("Answer stream ended: {:?}", end);
        Ok(end)
    }
}

fn log_intent(intent: &Intent) {
    tracing::info!(
        "Intent {} (need_search: {}, keywords: {:?})",
        intent.label,
        intent.need_search,
        intent.keywords
    );
}

/// `system` + history (optionally only its last `window` messages) + question
fn compose(
    system: &str,
    history: &[Message],
    window: Option<usize>,
    question: &str,
) -> Vec<Message> {
    let history = match window {
        Some(window) => &history[history.len().saturating_sub(window)..],
        None => history,
    };

    let mut messages = Vec::with_capacity(history.len() + 2);
    messages.push(Message::system(system));
    messages.extend_from_slice(history);
    messages.push(Message::user(question));
    messages
}
