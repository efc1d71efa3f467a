//! Embedding provider domain models and traits

mod backend;
mod provider;
mod similarity;

pub use backend::{fallback_dimension, EmbeddingBackend, DEFAULT_DIMENSION, DIMENSION_PROBE_TEXT};
pub use provider::EmbeddingProvider;
pub use similarity::cosine_similarity;

#[cfg(test)]
pub use provider::mock::MockEmbeddingProvider;
