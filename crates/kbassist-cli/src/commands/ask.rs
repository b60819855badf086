//! Ask command

use super::{assistant, cancel_on_ctrl_c, joined};
use crate::app::{AskArgs, OutputFormat};
use crate::output;
use crate::progress::StatusLine;
use anyhow::Result;
use kbassist_core::{AnswerSink, AskOptions, Config, DocumentRef, StreamEnd};
use std::io::Write;
use tokio_util::sync::CancellationToken;

pub async fn run(args: AskArgs, config: &Config, format: OutputFormat) -> Result<()> {
    let question = joined(&args.question)?;
    let assistant = assistant(config)?;

    if args.general {
        let answer = assistant.ask_general(&question, &[]).await?;
        return output::print_text(&answer, format);
    }

    let mut options = AskOptions::from(&config.assistant);
    if let Some(max) = args.max_documents {
        options.max_documents = max.max(1);
    }
    if args.no_content {
        options.include_content = false;
    }

    if !args.stream {
        let mut status = StatusLine::new();
        status.set_message("Thinking...");
        let result = assistant.ask(&question, &[], &options).await;
        status.clear();
        return output::print_answer(&result?, format);
    }

    let token = CancellationToken::new();
    options.cancel = Some(token.clone());
    let ctrl_c = cancel_on_ctrl_c(token);

    let mut printer = StreamPrinter::new(format);
    let end = assistant.ask_stream(&question, &[], &mut printer, &options).await;
    ctrl_c.abort();

    printer.finish(end?)
}

/// Prints chunks as they arrive; buffers them for JSON output
pub(crate) struct StreamPrinter {
    format: OutputFormat,
    answer: String,
    documents: Vec<DocumentRef>,
}

impl StreamPrinter {
    pub(crate) fn new(format: OutputFormat) -> Self {
        Self {
            format,
            answer: String::new(),
            documents: Vec::new(),
        }
    }

    fn live(&self) -> bool {
        self.format != OutputFormat::Json
    }

    pub(crate) fn finish(self, end: StreamEnd) -> Result<()> {
        if self.format == OutputFormat::Json {
            let value = serde_json::json!({
                "answer": self.answer,
                "documents": self.documents,
                "end": end,
            });
            print!("{}", output::json::to_pretty(&value));
            return Ok(());
        }

        println!();
        match end {
            StreamEnd::Cancelled => eprintln!("(cancelled)"),
            StreamEnd::Eof => eprintln!("(answer ended without completion marker)"),
            StreamEnd::Done => {}
        }
        output::print_sources(&self.documents, self.format)
    }
}

impl AnswerSink for StreamPrinter {
    fn on_chunk(&mut self, text: &str) {
        self.answer.push_str(text);
        if self.live() {
            let mut out = std::io::stdout().lock();
            let _ = out.write_all(text.as_bytes());
            let _ = out.flush();
        }
    }

    fn on_documents(&mut self, documents: &[DocumentRef]) {
        self.documents = documents.to_vec();
    }
}
