//! Chat request and response bodies

use serde::Deserialize;

use crate::domain::answer_cache::RequestContext;
use crate::domain::generation::Message;

/// POST /api/chat
#[derive(Debug, Clone, Deserialize)]
pub struct ChatRequest {
    /// Cache partition; blank or missing means "default"
    #[serde(default)]
    pub usecase: Option<String>,
    pub message: String,
    /// Earlier turns, oldest first
    #[serde(default)]
    pub history: Vec<Message>,
}

impl ChatRequest {
    pub fn context(&self) -> RequestContext {
        RequestContext::new(self.usecase.clone())
    }

    /// History followed by the new user message
    pub fn conversation(&self) -> Vec<Message> {
        let mut conversation = self.history.clone();
        conversation.push(Message::user(self.message.clone()));
        conversation
    }
}

/// The response body is `Reply` serialized as-is
pub use crate::infrastructure::services::Reply as ChatResponse;
