//! Conversation responder with an optional answer cache

use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, info};

use super::CacheDecisionEngine;
use crate::domain::answer_cache::{Metadata, RequestContext};
use crate::domain::generation::{last_user_message, GenerationBackend, Message};
use crate::domain::DomainError;

/// Answer returned to the caller
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Reply {
    pub content: String,
    pub from_cache: bool,
    /// Vector score of the cached answer served
    #[serde(skip_serializing_if = "Option::is_none")]
    pub score: Option<f32>,
}

/// Answers conversations, consulting the cache first when one is attached
#[derive(Debug, Clone)]
pub struct Responder {
    generator: Arc<dyn GenerationBackend>,
    cache: Option<Arc<CacheDecisionEngine>>,
}

impl Responder {
    /// Responder that always generates
    pub fn new(generator: Arc<dyn GenerationBackend>) -> Self {
        Self {
            generator,
            cache: None,
        }
    }

    pub fn with_cache(mut self, cache: Arc<CacheDecisionEngine>) -> Self {
        self.cache = Some(cache);
        self
    }

    pub fn cache(&self) -> Option<&Arc<CacheDecisionEngine>> {
        self.cache.as_ref()
    }

    /// Answer the latest user message of `conversation`
    pub async fn respond(
        &self,
        ctx: &RequestContext,
        conversation: &[Message],
    ) -> Result<Reply, DomainError> {
        if conversation.is_empty() {
            return Err(DomainError::validation("Conversation has no messages"));
        }

        let question = last_user_message(conversation)
            .ok_or_else(|| DomainError::validation("Conversation has no user message"))?;

        let Some(cache) = self.cache.as_ref() else {
            let generation = self.generator.generate(conversation).await?;
            return Ok(Reply {
                content: generation.text,
                from_cache: false,
                score: None,
            });
        };

        if let Some(hit) = cache.lookup(ctx, question).await {
            return Ok(Reply {
                content: format!("{}{}", hit.answer, cache.config().provenance_marker),
                from_cache: true,
                score: Some(hit.vector_score),
            });
        }

        info!(usecase = %ctx.usecase(), "No cached answer, generating");
        let generation = self.generator.generate(conversation).await?;

        let mut metadata = Metadata::new();
        metadata.insert("model".to_string(), self.generator.model().into());
        metadata.insert("method".to_string(), "llm_generated".into());

        if !cache.record(ctx, question, &generation.text, metadata).await {
            debug!(usecase = %ctx.usecase(), "Generated answer was not cached");
        }

        Ok(Reply {
            content: generation.text,
            from_cache: false,
            score: None,
        })
    }
}
