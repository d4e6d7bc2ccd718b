//! Startup configuration.
//!
//! The API credential is read once from the environment before any
//! processing begins; its absence is a fatal configuration error.

use std::path::PathBuf;

use crate::error::{ProcessError, Result};

/// Model invocation parameters forwarded to the gateway client.
#[derive(Debug, Clone)]
pub struct LlmConfig {
    pub model_name: String,
    pub temperature: f64,
    pub max_tokens: u32,
    pub top_p: f64,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            model_name: "gpt-4o-mini".to_string(),
            temperature: 0.7,
            max_tokens: 2000,
            top_p: 1.0,
        }
    }
}

/// Application configuration
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// API credential for the backing model service
    pub api_key: String,

    /// Directory generated artifacts are written into (created on first use)
    pub workspace_dir: PathBuf,

    /// Interpreter the sandbox launches generated scripts with
    pub interpreter: String,

    /// Model parameters
    pub llm: LlmConfig,
}

impl AppConfig {
    /// Reads the configuration from the environment.
    ///
    /// Fails fast when `OPENAI_API_KEY` is unset - nothing downstream can
    /// work without it.
    pub fn from_env() -> Result<Self> {
        let api_key = std::env::var("OPENAI_API_KEY")
            .map_err(|_| ProcessError::Config("OPENAI_API_KEY environment variable not set".into()))?;

        Ok(Self {
            api_key,
            workspace_dir: PathBuf::from("generated_code"),
            interpreter: "python3".to_string(),
            llm: LlmConfig::default(),
        })
    }

    pub fn with_workspace_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.workspace_dir = dir.into();
        self
    }

    pub fn with_interpreter(mut self, interpreter: impl Into<String>) -> Self {
        self.interpreter = interpreter.into();
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_llm_config_matches_service_defaults() {
        let config = LlmConfig::default();
        assert_eq!(config.model_name, "gpt-4o-mini");
        assert_eq!(config.max_tokens, 2000);
    }

    #[test]
    fn config_builder() {
        let config = AppConfig {
            api_key: "k".into(),
            workspace_dir: PathBuf::from("generated_code"),
            interpreter: "python3".into(),
            llm: LlmConfig::default(),
        }
        .with_workspace_dir("scratch")
        .with_interpreter("python3.12");

        assert_eq!(config.workspace_dir, PathBuf::from("scratch"));
        assert_eq!(config.interpreter, "python3.12");
    }
}
