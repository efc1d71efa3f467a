use std::fmt::Debug;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

#[cfg(test)]
use mockall::automock;

use super::Message;
use crate::domain::DomainError;

/// Canonical result of a generation call, whatever the backend
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Generation {
    /// Answer text
    pub text: String,
    /// Backend response as received
    pub raw: serde_json::Value,
}

impl Generation {
    pub fn new(text: impl Into<String>, raw: serde_json::Value) -> Self {
        Self {
            text: text.into(),
            raw,
        }
    }

    /// Generation with no backend payload
    pub fn text_only(text: impl Into<String>) -> Self {
        Self::new(text, serde_json::Value::Null)
    }
}

/// Produces answers for a conversation (Groq, Ollama, OpenAI-compatible)
#[cfg_attr(test, automock)]
#[async_trait]
pub trait GenerationBackend: Send + Sync + Debug {
    /// Generate an answer for the conversation
    async fn generate(&self, conversation: &[Message]) -> Result<Generation, DomainError>;

    /// Model the backend generates with
    fn model(&self) -> &str;
}
