//! Search command

use super::assistant;
use crate::app::{OutputFormat, SearchArgs};
use crate::output;
use crate::progress::StatusLine;
use anyhow::Result;
use kbassist_core::{Config, KbAssistError, KnowledgeGateway};

pub async fn run(args: SearchArgs, config: &Config, format: OutputFormat) -> Result<()> {
    let keyword = args.keyword.trim();
    if keyword.is_empty() {
        return Err(KbAssistError::InvalidInput("keyword must not be empty".to_string()).into());
    }

    let assistant = assistant(config)?;
    let mut status = StatusLine::new();
    status.set_message("Searching...");
    let mut documents = assistant.gateway().search(keyword, args.limit).await;

    if let Some(ref question) = args.rank {
        status.set_message("Ranking...");
        documents = assistant.rank(question, documents).await;
    }
    status.clear();

    tracing::debug!("Search '{}' returned {} documents", keyword, documents.len());
    output::print_documents(&documents, format)
}
