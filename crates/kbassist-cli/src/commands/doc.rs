//! Document Q&A command

use super::{assistant, cancel_on_ctrl_c, joined};
use crate::app::{DocArgs, OutputFormat};
use crate::output;
use anyhow::Result;
use kbassist_core::{
    Assistant, Config, Document, DocumentId, KbAssistError, KnowledgeGateway, StreamEnd,
};
use std::collections::HashSet;
use std::io::Write;
use tokio_util::sync::CancellationToken;

pub async fn run(args: DocArgs, config: &Config, format: OutputFormat) -> Result<()> {
    let question = joined(&args.question)?;
    let assistant = assistant(config)?;

    let ids = document_ids(args.id, &args.with);
    let documents = fetch_all(&assistant, &ids).await?;

    if !args.stream {
        let answer = if documents.len() == 1 {
            assistant.ask_about_document(&documents[0], &question, &[]).await?
        } else {
            assistant.ask_about_documents(&documents, &question, &[]).await?
        };
        return output::print_text(&answer, format);
    }

    let token = CancellationToken::new();
    let ctrl_c = cancel_on_ctrl_c(token.clone());

    let mut answer = String::new();
    let live = format != OutputFormat::Json;
    let mut on_chunk = |chunk: &str| {
        answer.push_str(chunk);
        if live {
            let mut out = std::io::stdout().lock();
            let _ = out.write_all(chunk.as_bytes());
            let _ = out.flush();
        }
    };

    let end = if documents.len() == 1 {
        assistant
            .ask_about_document_stream(&documents[0], &question, &[], &mut on_chunk, Some(token))
            .await
    } else {
        assistant
            .ask_about_documents_stream(&documents, &question, &[], &mut on_chunk, Some(token))
            .await
    };
    ctrl_c.abort();
    let end = end?;

    if live {
        println!();
        match end {
            StreamEnd::Cancelled => eprintln!("(cancelled)"),
            StreamEnd::Eof => eprintln!("(answer ended without completion marker)"),
            StreamEnd::Done => {}
        }
        Ok(())
    } else {
        output::print_text(&answer, format)
    }
}

/// Primary id first, then each `--with` id once in the order given
fn document_ids(primary: DocumentId, with: &[DocumentId]) -> Vec<DocumentId> {
    let mut seen = HashSet::new();
    std::iter::once(primary)
        .chain(with.iter().copied())
        .filter(|id| seen.insert(*id))
        .collect()
}

async fn fetch_all(assistant: &Assistant, ids: &[DocumentId]) -> Result<Vec<Document>> {
    let mut documents = Vec::with_capacity(ids.len());
    for &id in ids {
        match assistant.gateway().get_detail(id).await {
            Some(doc) => documents.push(doc),
            None => return Err(KbAssistError::DocumentNotFound(id).into()),
        }
    }
    Ok(documents)
}
