//! QA Semantic Cache
//!
//! Answers questions through an LLM and remembers every answer in a vector
//! store, so that later questions with the same meaning are served from the
//! cache instead of being generated again:
//! - Embeddings from Ollama or OpenAI, auto-detected from the model name
//! - Qdrant collections partitioned by usecase
//! - Vector similarity re-ranked with keyword overlap
//! - HTTP API and command line front ends

pub mod api;
pub mod cli;
pub mod config;
pub mod domain;
pub mod infrastructure;

pub use crate::config::AppConfig;

use std::sync::Arc;
use std::time::Duration;

use tracing::{info, warn};

use api::state::AppState;
use crate::config::VectorStoreBackend;
use domain::answer_cache::{CollectionSpec, VectorStore};
use domain::generation::GenerationBackend;
use infrastructure::embedding::{create_embedding_provider, probe_dimension};
use infrastructure::generation::OpenAiCompatibleGenerator;
use infrastructure::services::{CacheDecisionEngine, Responder};
use infrastructure::vector_store::{InMemoryVectorStore, QdrantVectorStore};
use infrastructure::HttpClient;

/// Create the application state from configuration.
///
/// The answer cache is only wired in when `cache.enabled` is set. Failing to
/// provision the collection aborts startup.
pub async fn create_app_state(config: &AppConfig) -> anyhow::Result<AppState> {
    let client = HttpClient::with_timeout(Duration::from_secs(config.http_timeout_secs))?;

    let generator = build_generator(config, client.clone());
    let mut responder = Responder::new(generator);

    if config.cache.enabled {
        let engine = build_cache_engine_with_client(config, client).await?;
        responder = responder.with_cache(Arc::new(engine));
    } else {
        info!("Answer cache disabled, every question will be generated");
    }

    Ok(AppState::new(responder))
}

/// Build a cache engine bound to the configured collection.
///
/// The collection is provisioned before the engine is returned.
pub async fn build_cache_engine(config: &AppConfig) -> anyhow::Result<CacheDecisionEngine> {
    let client = HttpClient::with_timeout(Duration::from_secs(config.http_timeout_secs))?;
    build_cache_engine_with_client(config, client).await
}

async fn build_cache_engine_with_client(
    config: &AppConfig,
    client: HttpClient,
) -> anyhow::Result<CacheDecisionEngine> {
    let provider = create_embedding_provider(&config.embedding, client.clone())?;
    let dimension = probe_dimension(provider.as_ref()).await;

    let spec = CollectionSpec::new(config.qdrant.collection.clone(), dimension);

    let store: Arc<dyn VectorStore> = match config.vector_store.backend {
        VectorStoreBackend::Qdrant => {
            let mut store = QdrantVectorStore::new(client, config.qdrant.url.clone(), spec);

            if let Some(ref api_key) = config.qdrant.api_key {
                store = store.with_api_key(api_key.clone());
            }

            info!(url = %config.qdrant.url, "Using Qdrant vector store");
            Arc::new(store)
        }
        VectorStoreBackend::Memory => {
            warn!("Using in-memory vector store, cached answers are lost on restart");
            Arc::new(InMemoryVectorStore::new(spec))
        }
    };

    store.ensure_collection().await?;

    info!(
        collection = %config.qdrant.collection,
        dimension,
        "Answer cache ready"
    );

    Ok(CacheDecisionEngine::with_config(store, provider, config.cache.clone()))
}

/// Build the chat completion backend answers are generated with
pub fn build_generator(config: &AppConfig, client: HttpClient) -> Arc<dyn GenerationBackend> {
    let settings = &config.generation;

    let mut generator =
        OpenAiCompatibleGenerator::new(client, settings.base_url.clone(), settings.model.clone());

    if let Some(ref api_key) = settings.api_key {
        generator = generator.with_api_key(api_key.clone());
    }

    if let Some(ref prompt) = settings.system_prompt {
        generator = generator.with_system_prompt(prompt.clone());
    }

    if let Some(temperature) = settings.temperature {
        generator = generator.with_temperature(temperature);
    }

    info!(
        base_url = %settings.base_url,
        model = %settings.model,
        "Using OpenAI-compatible generation backend"
    );

    Arc::new(generator)
}
