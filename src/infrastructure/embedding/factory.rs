//! Embedding provider selection and dimension probing

use std::sync::Arc;

use tracing::{info, warn};

use super::{OllamaEmbeddingProvider, OpenAiEmbeddingProvider};
use crate::config::EmbeddingConfig;
use crate::domain::embedding::{
    fallback_dimension, EmbeddingBackend, EmbeddingProvider, DIMENSION_PROBE_TEXT,
};
use crate::domain::DomainError;
use crate::infrastructure::http_client::HttpClient;

/// Build the provider selected by configuration.
///
/// `auto` is resolved here, once, from the model name. A remote backend
/// without an API key is a configuration error.
pub fn create_embedding_provider(
    config: &EmbeddingConfig,
    client: HttpClient,
) -> Result<Arc<dyn EmbeddingProvider>, DomainError> {
    let backend = config.backend.resolve(&config.model);

    info!(
        configured = %config.backend,
        resolved = %backend,
        model = %config.model,
        "Selecting embedding backend"
    );

    match backend {
        EmbeddingBackend::OpenAi => {
            let api_key = config
                .api_key
                .as_deref()
                .filter(|key| !key.trim().is_empty())
                .ok_or_else(|| {
                    DomainError::configuration(
                        "OpenAI embeddings require an API key (embedding.api_key or OPENAI_API_KEY)",
                    )
                })?;

            let provider = match config.base_url.as_deref() {
                Some(base_url) => OpenAiEmbeddingProvider::with_base_url(
                    client,
                    api_key,
                    config.model.clone(),
                    base_url,
                ),
                None => OpenAiEmbeddingProvider::new(client, api_key, config.model.clone()),
            };

            Ok(Arc::new(provider))
        }
        EmbeddingBackend::Ollama | EmbeddingBackend::Auto => {
            let provider = match config.base_url.as_deref() {
                Some(base_url) => {
                    OllamaEmbeddingProvider::with_base_url(client, config.model.clone(), base_url)
                }
                None => OllamaEmbeddingProvider::new(client, config.model.clone()),
            };

            Ok(Arc::new(provider))
        }
    }
}

/// Discover the vector dimension by embedding a fixed probe text.
///
/// Falls back to the static model table when the backend cannot be reached.
pub async fn probe_dimension(provider: &dyn EmbeddingProvider) -> usize {
    match provider.embed(DIMENSION_PROBE_TEXT).await {
        Ok(vector) if !vector.is_empty() => {
            info!(
                provider = provider.provider_name(),
                model = provider.model(),
                dimension = vector.len(),
                "Detected embedding dimension"
            );
            vector.len()
        }
        Ok(_) => {
            let dimension = fallback_dimension(provider.model());
            warn!(
                model = provider.model(),
                dimension, "Probe returned an empty embedding, using fallback dimension"
            );
            dimension
        }
        Err(e) => {
            let dimension = fallback_dimension(provider.model());
            warn!(
                model = provider.model(),
                dimension,
                error = %e,
                "Could not probe embedding dimension, using fallback"
            );
            dimension
        }
    }
}
