//! Question analysis commands: intent, keywords, enhance

use super::{chat_client, joined};
use crate::app::{OutputFormat, TextArgs};
use crate::output;
use anyhow::Result;
use kbassist_core::{Config, IntentClassifier, KeywordExtractor};

pub async fn run_intent(args: TextArgs, config: &Config, format: OutputFormat) -> Result<()> {
    let question = joined(&args.text)?;
    let classifier = IntentClassifier::new(chat_client(config)?);
    let intent = classifier.classify(&question).await;
    output::print_intent(&intent, format)
}

pub async fn run_keywords(args: TextArgs, config: &Config, format: OutputFormat) -> Result<()> {
    let question = joined(&args.text)?;
    let extractor = KeywordExtractor::new(chat_client(config)?);
    let keywords = extractor.extract_keywords(&question).await;
    output::print_keywords(&keywords, format)
}

pub async fn run_enhance(args: TextArgs, config: &Config, format: OutputFormat) -> Result<()> {
    let query = joined(&args.text)?;
    let extractor = KeywordExtractor::new(chat_client(config)?);
    let enhanced = extractor.enhance_query(&query).await;
    output::print_enhanced(&enhanced, format)
}
