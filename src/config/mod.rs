//! Application configuration

mod app_config;

pub use app_config::{
    AppConfig, EmbeddingConfig, GenerationConfig, LogFormat, LoggingConfig, QdrantConfig,
    ServerConfig, VectorStoreBackend, VectorStoreConfig,
};
