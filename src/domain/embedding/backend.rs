//! Embedding backend selection and dimension fallbacks

use serde::{Deserialize, Serialize};

/// Text embedded once at startup to discover the vector dimension
pub const DIMENSION_PROBE_TEXT: &str = "sample text for dimension detection";

/// Dimension used when the model is unknown and probing failed
pub const DEFAULT_DIMENSION: usize = 768;

/// Known embedding models and their output dimensions
const KNOWN_DIMENSIONS: &[(&str, usize)] = &[
    ("nomic-embed-text", 768),
    ("text-embedding-ada-002", 1536),
    ("text-embedding-3-small", 1536),
    ("text-embedding-3-large", 3072),
    ("llama3.2:1b", 384),
    ("llama3:8b", 4096),
];

/// Model-name fragments that identify a remote OpenAI-style model
const REMOTE_MODEL_MARKERS: &[&str] = &["gpt", "openai", "text-embedding"];

/// Which embedding backend serves the cache
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EmbeddingBackend {
    /// Pick a backend from the model name once at startup
    #[default]
    Auto,
    /// Locally hosted Ollama model endpoint
    Ollama,
    /// Remote API-key authenticated OpenAI endpoint
    OpenAi,
}

impl EmbeddingBackend {
    /// Resolve `Auto` into a concrete backend for the given model
    pub fn resolve(self, model: &str) -> EmbeddingBackend {
        match self {
            EmbeddingBackend::Auto => {
                let model = model.to_lowercase();

                if REMOTE_MODEL_MARKERS.iter().any(|m| model.contains(m)) {
                    EmbeddingBackend::OpenAi
                } else {
                    EmbeddingBackend::Ollama
                }
            }
            concrete => concrete,
        }
    }
}

impl std::fmt::Display for EmbeddingBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EmbeddingBackend::Auto => write!(f, "auto"),
            EmbeddingBackend::Ollama => write!(f, "ollama"),
            EmbeddingBackend::OpenAi => write!(f, "openai"),
        }
    }
}

/// Static dimension for a model, used when probing the backend fails
pub fn fallback_dimension(model: &str) -> usize {
    KNOWN_DIMENSIONS
        .iter()
        .find(|(name, _)| *name == model)
        .map(|(_, dims)| *dims)
        .unwrap_or(DEFAULT_DIMENSION)
}
