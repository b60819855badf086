//! KbAssist CLI
//!
//! Retrieval-augmented answers from your enterprise knowledge base.

use anyhow::Result;
use clap::Parser;
use kbassist_core::error::exit_codes;
use kbassist_core::{Config, KbAssistError};

mod app;
mod commands;
mod output;
mod progress;

use app::{Cli, Commands};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let level = if cli.verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::WARN
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into()),
        )
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = run(cli).await {
        eprintln!("Error: {:#}", e);
        std::process::exit(exit_code(&e));
    }
}

async fn run(cli: Cli) -> Result<()> {
    let config = Config::load()?;

    match cli.command {
        Commands::Ask(args) => commands::ask::run(args, &config, cli.format).await,
        Commands::Doc(args) => commands::doc::run(args, &config, cli.format).await,
        Commands::Search(args) => commands::search::run(args, &config, cli.format).await,
        Commands::Intent(args) => commands::analyze::run_intent(args, &config, cli.format).await,
        Commands::Keywords(args) => {
            commands::analyze::run_keywords(args, &config, cli.format).await
        }
        Commands::Enhance(args) => commands::analyze::run_enhance(args, &config, cli.format).await,
        Commands::Config(args) => commands::config::run(args, &config, cli.format).await,
    }
}

fn exit_code(error: &anyhow::Error) -> i32 {
    error
        .downcast_ref::<KbAssistError>()
        .map(KbAssistError::exit_code)
        .unwrap_or(exit_codes::GENERAL_ERROR)
}
