//! Error types for kbassist

use thiserror::Error;

/// Result type alias using KbAssistError
pub type Result<T> = std::result::Result<T, KbAssistError>;

/// Error type alias for convenience
pub type Error = KbAssistError;

/// Exit codes for CLI
pub mod exit_codes {
    pub const SUCCESS: i32 = 0;
    pub const GENERAL_ERROR: i32 = 1;
    pub const NOT_FOUND: i32 = 2;
    pub const INVALID_INPUT: i32 = 3;
    pub const SERVICE_UNAVAILABLE: i32 = 4;
}

/// Main error type for kbassist
#[derive(Debug, Error)]
pub enum KbAssistError {
    /// Remote service answered with a non-2xx status
    #[error("Transport error (HTTP {status}): {body}")]
    Transport { status: u16, body: String },

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Model or service output could not be interpreted
    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Document not found: {0}")]
    DocumentNotFound(i64),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("{0}")]
    Other(#[from] anyhow::Error),
}

impl KbAssistError {
    /// Get the exit code for this error
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::DocumentNotFound(_) => exit_codes::NOT_FOUND,
            Self::InvalidInput(_) | Self::Config(_) => exit_codes::INVALID_INPUT,
            Self::Transport { .. } | Self::Http(_) => exit_codes::SERVICE_UNAVAILABLE,
            _ => exit_codes::GENERAL_ERROR,
        }
    }

    /// True for failures of the network round trip itself
    pub fn is_transport(&self) -> bool {
        matches!(self, Self::Transport { .. } | Self::Http(_))
    }
}
