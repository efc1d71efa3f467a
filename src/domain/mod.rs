//! Domain layer - Core business logic and entities

pub mod answer_cache;
pub mod embedding;
pub mod error;
pub mod generation;

pub use answer_cache::{
    CacheConfig, CachedAnswer, CollectionSpec, CollectionStats, DistanceMetric, IdentityHasher,
    Metadata, RequestContext, SearchResult, Usecase, VectorStore,
};
pub use embedding::{EmbeddingBackend, EmbeddingProvider};
pub use error::DomainError;
pub use generation::{Generation, GenerationBackend, Message, MessageRole};
