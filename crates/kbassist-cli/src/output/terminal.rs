//! Terminal output formatter

use anyhow::Result;
use kbassist_core::{AssistantResult, Document, DocumentRef, EnhancedQuery, Intent};
use std::io::Write;
use termcolor::{Color, ColorSpec, WriteColor};

const SUMMARY_PREVIEW_CHARS: usize = 120;

fn heading<W: WriteColor>(out: &mut W, text: &str) -> Result<()> {
    out.set_color(ColorSpec::new().set_fg(Some(Color::Cyan)).set_bold(true))?;
    write!(out, "{}", text)?;
    out.reset()?;
    writeln!(out)?;
    Ok(())
}

fn dim<W: WriteColor>(out: &mut W, text: &str) -> Result<()> {
    out.set_color(ColorSpec::new().set_dimmed(true))?;
    write!(out, "{}", text)?;
    out.reset()?;
    Ok(())
}

pub fn write_answer<W: WriteColor>(out: &mut W, result: &AssistantResult) -> Result<()> {
    writeln!(out, "{}", result.answer.trim_end())?;
    write_sources(out, &result.documents)
}

pub fn write_sources<W: WriteColor>(out: &mut W, documents: &[DocumentRef]) -> Result<()> {
    if documents.is_empty() {
        return Ok(());
    }
    writeln!(out)?;
    heading(out, "Sources")?;
    for doc in documents {
        write!(out, "  #{:<6} {}", doc.id, doc.title)?;
        if let Some(ref keywords) = doc.keywords {
            dim(out, &format!("  [{}]", keywords))?;
        }
        writeln!(out)?;
    }
    out.flush()?;
    Ok(())
}

pub fn write_documents<W: WriteColor>(out: &mut W, documents: &[Document]) -> Result<()> {
    if documents.is_empty() {
        dim(out, "No documents found")?;
        writeln!(out)?;
        return Ok(());
    }

    for doc in documents {
        out.set_color(ColorSpec::new().set_fg(Some(Color::Green)))?;
        write!(out, "#{:<6}", doc.id)?;
        out.reset()?;
        writeln!(out, " {}", doc.title)?;

        if let Some(ref summary) = doc.summary {
            let preview: String = summary.chars().take(SUMMARY_PREVIEW_CHARS).collect();
            let ellipsis = if summary.chars().count() > SUMMARY_PREVIEW_CHARS {
                "..."
            } else {
                ""
            };
            writeln!(out, "        {}{}", preview, ellipsis)?;
        }
        if let Some(ref keywords) = doc.keywords {
            write!(out, "        ")?;
            dim(out, keywords)?;
            writeln!(out)?;
        }
    }
    out.flush()?;
    Ok(())
}

pub fn write_intent<W: WriteColor>(out: &mut W, intent: &Intent) -> Result<()> {
    out.set_color(ColorSpec::new().set_bold(true))?;
    write!(out, "{}", intent.label)?;
    out.reset()?;
    writeln!(
        out,
        " (needs search: {})",
        if intent.need_search { "yes" } else { "no" }
    )?;
    if !intent.keywords.is_empty() {
        writeln!(out, "keywords: {}", intent.keywords.join(", "))?;
    }
    Ok(())
}

pub fn write_enhanced<W: WriteColor>(out: &mut W, query: &EnhancedQuery) -> Result<()> {
    heading(out, "Intent")?;
    writeln!(out, "  {}", query.intent)?;
    heading(out, "Keywords")?;
    for keyword in &query.keywords {
        writeln!(out, "  - {}", keyword)?;
    }
    if !query.suggestions.is_empty() {
        heading(out, "Suggestions")?;
        for suggestion in &query.suggestions {
            writeln!(out, "  - {}", suggestion)?;
        }
    }
    Ok(())
}
