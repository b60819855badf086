//! Configuration management

use crate::error::{KbAssistError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// Chat-completion service configuration
    #[serde(default)]
    pub chat: ChatServiceConfig,

    /// Knowledge-search service configuration
    #[serde(default)]
    pub knowledge: KnowledgeServiceConfig,

    /// Defaults applied to every assistant request
    #[serde(default)]
    pub assistant: AssistantDefaults,
}

/// Chat-completion endpoint configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatServiceConfig {
    /// Full URL of the chat/completions endpoint
    pub url: String,

    /// Model name sent with every request unless overridden per call
    #[serde(default = "default_chat_model")]
    pub model: String,

    /// Bearer token for the endpoint
    #[serde(default)]
    pub api_key: Option<String>,

    /// Sampling temperature for answer generation (0.0 - 2.0)
    #[serde(default = "default_temperature")]
    pub temperature: f32,

    /// Upper bound on generated tokens per answer
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,

    /// Idle timeout in seconds for each read of the response
    #[serde(default = "default_chat_timeout")]
    pub timeout_secs: u64,
}

impl Default for ChatServiceConfig {
    fn default() -> Self {
        Self {
            url: std::env::var("KBASSIST_CHAT_URL")
                .unwrap_or_else(|_| "https://api.deepseek.com/chat/completions".to_string()),
            model: default_chat_model(),
            api_key: std::env::var("KBASSIST_API_KEY").ok(),
            temperature: default_temperature(),
            max_tokens: default_max_tokens(),
            timeout_secs: default_chat_timeout(),
        }
    }
}

fn default_chat_model() -> String {
    std::env::var("KBASSIST_CHAT_MODEL").unwrap_or_else(|_| crate::DEFAULT_CHAT_MODEL.to_string())
}

fn default_temperature() -> f32 {
    0.7
}

fn default_max_tokens() -> u32 {
    2048
}

fn default_chat_timeout() -> u64 {
    120
}

/// Knowledge-search service configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KnowledgeServiceConfig {
    /// Base URL of the knowledge API (search and detail routes hang off it)
    pub base_url: String,

    /// Session token forwarded as a bearer header
    #[serde(default)]
    pub token: Option<String>,

    /// Request timeout in seconds
    #[serde(default = "default_knowledge_timeout")]
    pub timeout_secs: u64,
}

impl Default for KnowledgeServiceConfig {
    fn default() -> Self {
        Self {
            base_url: std::env::var("KBASSIST_KB_URL")
                .unwrap_or_else(|_| "http://localhost:8080/api".to_string()),
            token: std::env::var("KBASSIST_KB_TOKEN").ok(),
            timeout_secs: default_knowledge_timeout(),
        }
    }
}

fn default_knowledge_timeout() -> u64 {
    10
}

/// Per-request assistant defaults
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssistantDefaults {
    /// Maximum number of documents retrieved for one answer
    #[serde(default = "default_max_documents")]
    pub max_documents: usize,

    /// Fetch full document bodies for the prompt context
    #[serde(default = "default_include_content")]
    pub include_content: bool,
}

impl Default for AssistantDefaults {
    fn default() -> Self {
        Self {
            max_documents: default_max_documents(),
            include_content: default_include_content(),
        }
    }
}

fn default_max_documents() -> usize {
    3
}

fn default_include_content() -> bool {
    true
}

impl Config {
    /// Load config from default path
    pub fn load() -> Result<Self> {
        let path = Self::default_path();
        Self::load_from(&path)
    }

    /// Load config from an explicit path, falling back to defaults when missing
    pub fn load_from(path: &Path) -> Result<Self> {
        if path.exists() {
            let content = std::fs::read_to_string(path)?;
            let config: Config = serde_yaml::from_str(&content)?;
            config.validate()?;
            Ok(config)
        } else {
            Ok(Config::default())
        }
    }

    /// Save config to default path
    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::default_path())
    }

    /// Save config to an explicit path
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = serde_yaml::to_string(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Get default config path
    pub fn default_path() -> PathBuf {
        if let Ok(path) = std::env::var("KBASSIST_CONFIG") {
            return PathBuf::from(path);
        }
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(crate::CONFIG_DIR_NAME)
            .join("config.yml")
    }

    /// Reject values the services would refuse anyway
    pub fn validate(&self) -> Result<()> {
        if !(0.0..=2.0).contains(&self.chat.temperature) {
            return Err(KbAssistError::Config(format!(
                "chat.temperature must be within 0.0..=2.0, got {}",
                self.chat.temperature
            )));
        }
        if self.chat.max_tokens == 0 {
            return Err(KbAssistError::Config(
                "chat.max_tokens must be positive".to_string(),
            ));
        }
        if self.assistant.max_documents == 0 {
            return Err(KbAssistError::Config(
                "assistant.max_documents must be positive".to_string(),
            ));
        }
        Ok(())
    }

    /// Copy of the config safe to print: secrets are masked
    pub fn redacted(&self) -> Self {
        let mut copy = self.clone();
        copy.chat.api_key = copy.chat.api_key.as_deref().map(mask_secret);
        copy.knowledge.token = copy.knowledge.token.as_deref().map(mask_secret);
        copy
    }
}

fn mask_secret(secret: &str) -> String {
    let visible: String = secret.chars().take(3).collect();
    format!("{}***", visible)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_partial_yaml_uses_defaults() {
        let yaml = r#"
chat:
  url: http://llm.internal/v1/chat/completions
  model: qwen-max
knowledge:
  base_url: http://kb.internal/api
"#;
        let config: Config = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.chat.model, "qwen-max");
        assert_eq!(config.chat.max_tokens, 2048);
        assert!((config.chat.temperature - 0.7).abs() < f32::EPSILON);
        assert_eq!(config.knowledge.timeout_secs, 10);
        assert_eq!(config.assistant.max_documents, 3);
        assert!(config.assistant.include_content);
    }

    #[test]
    fn test_save_and_load_roundtrip() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("config.yml");

        let mut config = Config::default();
        config.assistant.max_documents = 5;
        config.chat.api_key = Some("sk-test".to_string());
        config.save_to(&path).unwrap();

        let loaded = Config::load_from(&path).unwrap();
        assert_eq!(loaded.assistant.max_documents, 5);
        assert_eq!(loaded.chat.api_key.as_deref(), Some("sk-test"));
    }

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = TempDir::new().unwrap();
        let config = Config::load_from(&dir.path().join("absent.yml")).unwrap();
        assert_eq!(config.assistant.max_documents, 3);
    }

    #[test]
    fn test_validate_rejects_temperature() {
        let mut config = Config::default();
        config.chat.temperature = 3.5;
        assert!(matches!(config.validate(), Err(KbAssistError::Config(_))));
    }

    #[test]
    fn test_redacted_masks_secrets() {
        let mut config = Config::default();
        config.chat.api_key = Some("sk-abcdef".to_string());
        config.knowledge.token = Some("eyJhbGciOi".to_string());

        let shown = config.redacted();
        assert_eq!(shown.chat.api_key.as_deref(), Some("sk-***"));
        assert_eq!(shown.knowledge.token.as_deref(), Some("eyJ***"));
    }
}
