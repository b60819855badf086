//! CLI command handlers

pub mod analyze;
pub mod ask;
pub mod config;
pub mod doc;
pub mod search;

use kbassist_core::{Assistant, ChatClient, Config, KbAssistError};
use std::sync::Arc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

pub(crate) fn assistant(config: &Config) -> anyhow::Result<Assistant> {
    Ok(Assistant::from_config(config)?)
}

pub(crate) fn chat_client(config: &Config) -> anyhow::Result<Arc<ChatClient>> {
    Ok(Arc::new(ChatClient::new(config.chat.clone())?))
}

pub(crate) fn joined(words: &[String]) -> anyhow::Result<String> {
    let text = words.join(" ");
    if text.trim().is_empty() {
        return Err(KbAssistError::InvalidInput("question must not be empty".to_string()).into());
    }
    Ok(text)
}

/// Cancels `token` on Ctrl-C until the returned task is aborted
pub(crate) fn cancel_on_ctrl_c(token: CancellationToken) -> JoinHandle<()> {
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::debug!("Ctrl-C received, cancelling stream");
            token.cancel();
        }
    })
}
