//! LLM client module for API interactions.
//!
//! This module provides the completion backend abstraction, the Gemini
//! implementation of it, and the rotating client that fails over between
//! API keys when one runs out of quota.

mod gemini;
mod provider;
mod rotation;

pub use gemini::GeminiProvider;
pub use provider::{CompletionBackend, ProviderError, ProviderResult};
pub use rotation::{CredentialPool, PoolState, RotatingClient, RotationEvent};

use serde::{Deserialize, Serialize};

/// Default Gemini API base URL.
pub const DEFAULT_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Default Gemini model.
pub const DEFAULT_MODEL: &str = "gemini-2.0-flash";

/// Who authored a chat message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    User,
    Model,
}

/// Chat message for API requests.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: ChatRole,
    pub content: String,
}

impl ChatMessage {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::User,
            content: content.into(),
        }
    }

    pub fn model(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::Model,
            content: content.into(),
        }
    }
}

/// A complete request for one completion: system instruction plus the
/// conversation so far.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CompletionRequest {
    pub system: String,
    pub messages: Vec<ChatMessage>,
}

impl CompletionRequest {
    /// Create a request with the given system instruction and no messages.
    pub fn new(system: impl Into<String>) -> Self {
        Self {
            system: system.into(),
            messages: Vec::new(),
        }
    }

    /// Append a message, merging it into the previous one when both come
    /// from the same role. Gemini expects roles to alternate.
    pub fn push(&mut self, message: ChatMessage) {
        match self.messages.last_mut() {
            Some(last) if last.role == message.role => {
                last.content.push_str("\n\n");
                last.content.push_str(&message.content);
            }
            _ => self.messages.push(message),
        }
    }

    /// Builder form of [`push`](Self::push).
    pub fn with_message(mut self, message: ChatMessage) -> Self {
        self.push(message);
        self
    }
}

/// LLM client configuration.
#[derive(Debug, Clone)]
pub struct LlmConfig {
    pub api_base: String,
    pub model: String,
    pub temperature: Option<f32>,
    pub max_tokens: Option<u32>,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            api_base: DEFAULT_API_BASE.to_string(),
            model: DEFAULT_MODEL.to_string(),
            temperature: Some(0.7),
            max_tokens: Some(256),
        }
    }
}

impl LlmConfig {
    /// Load from environment variables, with file config as fallback.
    pub fn from_env_and_config(file_config: Option<&crate::config::LlmConfigFile>) -> Self {
        let mut config = Self::default();

        if let Some(fc) = file_config {
            config.api_base = fc.api_base.clone();
            config.model = fc.model.clone();
            config.temperature = fc.temperature;
            config.max_tokens = fc.max_tokens;
        }

        // Environment variables override file config
        if let Ok(base) = std::env::var("GEMINI_API_BASE") {
            if !base.trim().is_empty() {
                config.api_base = base.trim().to_string();
            }
        }

        if let Ok(model) = std::env::var("GEMINI_MODEL") {
            if !model.trim().is_empty() {
                config.model = model.trim().to_string();
            }
        }

        config
    }
}
