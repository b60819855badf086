//! Output formatters

pub mod json;
pub mod markdown;
pub mod terminal;

use crate::app::OutputFormat;
use anyhow::Result;
use kbassist_core::{AssistantResult, Document, DocumentRef, EnhancedQuery, Intent};
use std::io::Write;
use termcolor::{ColorChoice, StandardStream};

fn stdout() -> StandardStream {
    StandardStream::stdout(ColorChoice::Auto)
}

/// Write an already formatted string to stdout
fn emit(text: &str) -> Result<()> {
    let mut out = std::io::stdout().lock();
    out.write_all(text.as_bytes())?;
    out.flush()?;
    Ok(())
}

pub fn print_answer(result: &AssistantResult, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Json => emit(&json::format_answer(result)),
        OutputFormat::Md => emit(&markdown::format_answer(&result.answer, &result.documents)),
        OutputFormat::Cli => terminal::write_answer(&mut stdout(), result),
    }
}

/// Answer text without retrieval metadata
pub fn print_text(answer: &str, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Json => emit(&json::format_text(answer)),
        OutputFormat::Md => emit(&markdown::format_answer(answer, &[])),
        OutputFormat::Cli => emit(&format!("{}\n", answer)),
    }
}

/// Source list printed after a streamed answer
pub fn print_sources(documents: &[DocumentRef], format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Json => emit(&json::format_sources(documents)),
        OutputFormat::Md => emit(&markdown::format_sources(documents)),
        OutputFormat::Cli => terminal::write_sources(&mut stdout(), documents),
    }
}

pub fn print_documents(documents: &[Document], format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Json => emit(&json::format_documents(documents)),
        OutputFormat::Md => emit(&markdown::format_documents(documents)),
        OutputFormat::Cli => terminal::write_documents(&mut stdout(), documents),
    }
}

pub fn print_intent(intent: &Intent, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Json => emit(&json::to_pretty(intent)),
        OutputFormat::Md => emit(&markdown::format_intent(intent)),
        OutputFormat::Cli => terminal::write_intent(&mut stdout(), intent),
    }
}

pub fn print_keywords(keywords: &[String], format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Json => emit(&json::to_pretty(&keywords)),
        OutputFormat::Md => emit(&markdown::format_list("Keywords", keywords)),
        OutputFormat::Cli => emit(&format!("{}\n", keywords.join(", "))),
    }
}

pub fn print_enhanced(query: &EnhancedQuery, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Json => emit(&json::to_pretty(query)),
        OutputFormat::Md => emit(&markdown::format_enhanced(query)),
        OutputFormat::Cli => terminal::write_enhanced(&mut stdout(), query),
    }
}
