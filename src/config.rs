//! Runtime configuration
//!
//! Loaded from a TOML file (path from `KESHER_CONFIG`, default `kesher.toml`)
//! with environment variables layered on top. Every field has a default, so a
//! missing file or a partial file is fine.

use crate::error::KesherError;
use serde::{Deserialize, Serialize};
use std::{env, path::Path};

pub const CONFIG_PATH_VAR: &str = "KESHER_CONFIG";
pub const DEFAULT_CONFIG_PATH: &str = "kesher.toml";

pub const API_KEY_VAR: &str = "OPENAI_API_KEY";
pub const ENDPOINT_VAR: &str = "KESHER_CHAT_ENDPOINT";
pub const MODEL_VAR: &str = "KESHER_CHAT_MODEL";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub chat: ChatConfig,
}

/// Chat companion settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChatConfig {
    /// Full URL of an OpenAI-compatible chat completions endpoint
    pub endpoint: String,
    pub model: String,
    pub system_prompt: String,
    /// First companion message of a new session
    pub greeting: String,
    /// Reply shown when the completion request fails
    pub fallback_message: String,
    /// Only ever read from the environment
    #[serde(skip)]
    pub api_key: Option<String>,
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            endpoint: "https://api.openai.com/v1/chat/completions".to_string(),
            model: "gpt-3.5-turbo".to_string(),
            system_prompt: "You are a supportive friend responding in Hebrew.".to_string(),
            greeting: "שלום, אנחנו כאן בשבילך. איך אני יכול לעזור לך היום?".to_string(),
            fallback_message: "מצטער, לא הצלחתי לקבל תשובה.".to_string(),
            api_key: None,
        }
    }
}

impl Config {
    /// Load from the configured file if it exists, then apply env overrides
    pub fn load() -> Result<Self, KesherError> {
        let path = env::var(CONFIG_PATH_VAR).unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());
        if Path::new(&path).exists() {
            Self::load_file(&path)
        } else {
            Ok(Self::from_env())
        }
    }

    pub fn load_file(path: &str) -> Result<Self, KesherError> {
        let contents = std::fs::read_to_string(path).map_err(|source| KesherError::IoError {
            path: path.to_string(),
            source,
        })?;
        Ok(Self::from_toml_str(&contents)?.override_from_env())
    }

    pub fn from_toml_str(contents: &str) -> Result<Self, KesherError> {
        Ok(toml::from_str(contents)?)
    }

    pub fn from_env() -> Self {
        Self::default().override_from_env()
    }

    pub fn override_from_env(self) -> Self {
        self.override_with(|key| env::var(key).ok())
    }

    /// Apply overrides from an arbitrary variable lookup
    pub fn override_with(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        if let Some(key) = lookup(API_KEY_VAR).filter(|k| !k.trim().is_empty()) {
            self.chat.api_key = Some(key);
        }
        if let Some(endpoint) = lookup(ENDPOINT_VAR) {
            self.chat.endpoint = endpoint;
        }
        if let Some(model) = lookup(MODEL_VAR) {
            self.chat.model = model;
        }
        self
    }
}
