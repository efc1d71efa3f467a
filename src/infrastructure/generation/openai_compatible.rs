//! Chat completions against any OpenAI-compatible endpoint (Groq, Ollama, OpenAI)

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::domain::generation::{Generation, GenerationBackend, Message, MessageRole};
use crate::domain::DomainError;
use crate::infrastructure::http_client::HttpClientTrait;

pub const DEFAULT_GENERATION_BASE_URL: &str = "https://api.groq.com/openai";

/// Generation backend speaking the `/v1/chat/completions` protocol
#[derive(Debug)]
pub struct OpenAiCompatibleGenerator<C: HttpClientTrait> {
    client: C,
    base_url: String,
    auth_header: Option<String>,
    model: String,
    system_prompt: Option<String>,
    temperature: Option<f32>,
}

impl<C: HttpClientTrait> OpenAiCompatibleGenerator<C> {
    pub fn new(client: C, base_url: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            auth_header: None,
            model: model.into(),
            system_prompt: None,
            temperature: None,
        }
    }

    /// Send a bearer token; blank keys are ignored (local Ollama needs none)
    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        let api_key = api_key.into();
        self.auth_header = (!api_key.trim().is_empty()).then(|| format!("Bearer {}", api_key));
        self
    }

    /// Prepend a system message unless the conversation carries its own
    pub fn with_system_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.system_prompt = Some(prompt.into());
        self
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature.clamp(0.0, 2.0));
        self
    }

    fn chat_completions_url(&self) -> String {
        format!("{}/v1/chat/completions", self.base_url)
    }

    fn headers(&self) -> Vec<(&str, &str)> {
        let mut headers = vec![("Content-Type", "application/json")];

        if let Some(ref auth) = self.auth_header {
            headers.push(("Authorization", auth.as_str()));
        }

        headers
    }

    fn build_request(&self, conversation: &[Message]) -> serde_json::Value {
        let has_system = conversation.iter().any(|m| m.role == MessageRole::System);

        let mut messages: Vec<ChatMessage<'_>> = Vec::with_capacity(conversation.len() + 1);

        if let (Some(prompt), false) = (self.system_prompt.as_deref(), has_system) {
            messages.push(ChatMessage {
                role: MessageRole::System,
                content: prompt,
            });
        }

        messages.extend(conversation.iter().map(|m| ChatMessage {
            role: m.role,
            content: &m.content,
        }));

        let mut body = serde_json::json!({
            "model": self.model,
            "messages": messages,
            "stream": false,
        });

        if let Some(temperature) = self.temperature {
            body["temperature"] = serde_json::json!(temperature);
        }

        body
    }

    fn parse_response(&self, json: serde_json::Value) -> Result<Generation, DomainError> {
        let response: ChatCompletionResponse = serde_json::from_value(json.clone()).map_err(|e| {
            DomainError::provider("generation", format!("Failed to parse response: {}", e))
        })?;

        let text = response
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or_else(|| DomainError::provider("generation", "No choices in response"))?;

        Ok(Generation::new(text, json))
    }
}

#[async_trait]
impl<C: HttpClientTrait> GenerationBackend for OpenAiCompatibleGenerator<C> {
    async fn generate(&self, conversation: &[Message]) -> Result<Generation, DomainError> {
        let body = self.build_request(conversation);

        let response = self
            .client
            .post_json(&self.chat_completions_url(), self.headers(), &body)
            .await?;

        self.parse_response(response)
    }

    fn model(&self) -> &str {
        &self.model
    }
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: MessageRole,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChatChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}
