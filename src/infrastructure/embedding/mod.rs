//! Embedding provider implementations

mod factory;
mod ollama;
mod openai;

pub use factory::{create_embedding_provider, probe_dimension};
pub use ollama::{OllamaEmbeddingProvider, DEFAULT_OLLAMA_BASE_URL};
pub use openai::{OpenAiEmbeddingProvider, DEFAULT_OPENAI_BASE_URL};
