use serde::Deserialize;

use crate::domain::answer_cache::CacheConfig;
use crate::domain::embedding::EmbeddingBackend;
use crate::infrastructure::generation::DEFAULT_GENERATION_BASE_URL;
use crate::infrastructure::vector_store::DEFAULT_QDRANT_URL;

/// Application configuration
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub vector_store: VectorStoreConfig,
    #[serde(default)]
    pub qdrant: QdrantConfig,
    #[serde(default)]
    pub embedding: EmbeddingConfig,
    #[serde(default)]
    pub cache: CacheConfig,
    #[serde(default)]
    pub generation: GenerationConfig,
    /// Upper bound for every outbound HTTP call
    #[serde(default = "default_http_timeout_secs")]
    pub http_timeout_secs: u64,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub format: LogFormat,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
    /// Single-line output on stderr, for one-shot commands
    Compact,
}

/// Where cached answers live
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VectorStoreBackend {
    #[default]
    Qdrant,
    /// Process-local store; answers are lost on restart
    Memory,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct VectorStoreConfig {
    pub backend: VectorStoreBackend,
}

#[derive(Debug, Clone, Deserialize)]
pub struct QdrantConfig {
    #[serde(default = "default_qdrant_url")]
    pub url: String,
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default = "default_collection")]
    pub collection: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct EmbeddingConfig {
    #[serde(default)]
    pub backend: EmbeddingBackend,
    #[serde(default = "default_embedding_model")]
    pub model: String,
    /// Endpoint override; each backend has its own default
    #[serde(default)]
    pub base_url: Option<String>,
    #[serde(default)]
    pub api_key: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GenerationConfig {
    #[serde(default = "default_generation_base_url")]
    pub base_url: String,
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default = "default_generation_model")]
    pub model: String,
    #[serde(default)]
    pub system_prompt: Option<String>,
    #[serde(default)]
    pub temperature: Option<f32>,
}

fn default_http_timeout_secs() -> u64 {
    30
}

fn default_qdrant_url() -> String {
    DEFAULT_QDRANT_URL.to_string()
}

fn default_collection() -> String {
    "qa_collection".to_string()
}

fn default_embedding_model() -> String {
    "nomic-embed-text".to_string()
}

fn default_generation_base_url() -> String {
    DEFAULT_GENERATION_BASE_URL.to_string()
}

fn default_generation_model() -> String {
    "llama-3.1-8b-instant".to_string()
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            logging: LoggingConfig::default(),
            vector_store: VectorStoreConfig::default(),
            qdrant: QdrantConfig::default(),
            embedding: EmbeddingConfig::default(),
            cache: CacheConfig::default(),
            generation: GenerationConfig::default(),
            http_timeout_secs: default_http_timeout_secs(),
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::default(),
        }
    }
}

impl Default for QdrantConfig {
    fn default() -> Self {
        Self {
            url: default_qdrant_url(),
            api_key: None,
            collection: default_collection(),
        }
    }
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            backend: EmbeddingBackend::default(),
            model: default_embedding_model(),
            base_url: None,
            api_key: None,
        }
    }
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            base_url: default_generation_base_url(),
            api_key: None,
            model: default_generation_model(),
            system_prompt: None,
            temperature: None,
        }
    }
}

impl AppConfig {
    /// Load `.env`, config files and `APP__*` variables, then legacy names
    pub fn load() -> Result<Self, config::ConfigError> {
        dotenvy::dotenv().ok();

        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name("config/local").required(false))
            .add_source(
                config::Environment::with_prefix("APP")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        let mut app_config: AppConfig = config.try_deserialize()?;
        app_config.apply_legacy_env(|name| std::env::var(name).ok());
        app_config.validate()?;

        Ok(app_config)
    }

    /// Reject values serde accepts but the cache cannot work with
    pub fn validate(&self) -> Result<(), config::ConfigError> {
        self.cache
            .validate()
            .map_err(|e| config::ConfigError::Message(e.to_string()))?;

        if self.http_timeout_secs == 0 {
            return Err(config::ConfigError::Message(
                "http_timeout_secs must be at least 1".to_string(),
            ));
        }

        Ok(())
    }

    /// Fill unset fields from the variable names older deployments use
    pub fn apply_legacy_env(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        let lookup = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        if let Some(url) = lookup("QDRANT_URL") {
            if self.qdrant.url == DEFAULT_QDRANT_URL {
                self.qdrant.url = url;
            }
        }

        fill(&mut self.qdrant.api_key, lookup("QDRANT_API_KEY"));
        fill(&mut self.embedding.api_key, lookup("OPENAI_API_KEY"));
        fill(&mut self.generation.api_key, lookup("GROQ_API_KEY"));

        if self.embedding.base_url.is_none()
            && self.embedding.backend.resolve(&self.embedding.model) == EmbeddingBackend::Ollama
        {
            self.embedding.base_url = lookup("OLLAMA_BASE_URL");
        }
    }
}

fn fill(slot: &mut Option<String>, value: Option<String>) {
    if slot.as_deref().is_none_or(|s| s.trim().is_empty()) {
        if let Some(value) = value {
            *slot = Some(value);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = AppConfig::default();

        assert_eq!(config.server.port, 8080);
        assert_eq!(config.vector_store.backend, VectorStoreBackend::Qdrant);
        assert_eq!(config.qdrant.url, "http://localhost:6333");
        assert_eq!(config.qdrant.collection, "qa_collection");
        assert_eq!(config.embedding.backend, EmbeddingBackend::Auto);
        assert_eq!(config.embedding.model, "nomic-embed-text");
        assert_eq!(config.cache.acceptance_threshold, 0.8);
        assert_eq!(config.http_timeout_secs, 30);
    }

    #[test]
    fn test_deserialize_partial_sections() {
        let config: AppConfig = config::Config::builder()
            .set_override("embedding.backend", "openai")
            .unwrap()
            .set_override("embedding.model", "text-embedding-3-small")
            .unwrap()
            .set_override("cache.max_age_hours", 24)
            .unwrap()
            .set_override("logging.level", "debug")
            .unwrap()
            .set_override("logging.format", "json")
            .unwrap()
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap();

        assert_eq!(config.embedding.backend, EmbeddingBackend::OpenAi);
        assert_eq!(config.cache.max_age_hours, Some(24));
        assert_eq!(config.cache.retrieval_threshold, 0.7);
        assert_eq!(config.logging.format, LogFormat::Json);
        assert_eq!(config.http_timeout_secs, 30);
        assert_eq!(config.generation.model, "llama-3.1-8b-instant");
    }

    fn with_overrides(pairs: &[(&str, i64)]) -> AppConfig {
        let mut builder = config::Config::builder();

        for (key, value) in pairs {
            builder = builder.set_override(*key, *value).unwrap();
        }

        builder.build().unwrap().try_deserialize().unwrap()
    }

    #[test]
    fn test_select_memory_store() {
        let config: AppConfig = config::Config::builder()
            .set_override("vector_store.backend", "memory")
            .unwrap()
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap();

        assert_eq!(config.vector_store.backend, VectorStoreBackend::Memory);
    }

    #[test]
    fn test_validate_accepts_defaults() {
        assert!(AppConfig::default().validate().is_ok());
        assert!(with_overrides(&[("cache.max_age_hours", 24)]).validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_zero_search_limit() {
        let config = with_overrides(&[("cache.search_limit", 0)]);

        let err = config.validate().unwrap_err();

        assert!(err.to_string().contains("search_limit"));
    }

    #[test]
    fn test_validate_rejects_threshold_out_of_range() {
        let config = with_overrides(&[("cache.acceptance_threshold", 80)]);

        let err = config.validate().unwrap_err();

        assert!(err.to_string().contains("acceptance_threshold"));
    }

    #[test]
    fn test_validate_rejects_unreasonable_max_age() {
        let config = with_overrides(&[("cache.max_age_hours", 4_000_000_000)]);

        let err = config.validate().unwrap_err();

        assert!(err.to_string().contains("max_age_hours"));
    }

    #[test]
    fn test_validate_rejects_zero_timeout() {
        let config = with_overrides(&[("http_timeout_secs", 0)]);

        assert!(config.validate().is_err());
    }

    #[test]
    fn test_legacy_env_fills_missing_values() {
        let mut config = AppConfig::default();

        config.apply_legacy_env(env(&[
            ("QDRANT_URL", "http://qdrant:6333"),
            ("QDRANT_API_KEY", "q-key"),
            ("OPENAI_API_KEY", "sk-test"),
            ("GROQ_API_KEY", "gsk-test"),
            ("OLLAMA_BASE_URL", "http://ollama:11434"),
        ]));

        assert_eq!(config.qdrant.url, "http://qdrant:6333");
        assert_eq!(config.qdrant.api_key.as_deref(), Some("q-key"));
        assert_eq!(config.embedding.api_key.as_deref(), Some("sk-test"));
        assert_eq!(config.generation.api_key.as_deref(), Some("gsk-test"));
        assert_eq!(config.embedding.base_url.as_deref(), Some("http://ollama:11434"));
    }

    #[test]
    fn test_legacy_env_does_not_override_explicit_values() {
        let mut config = AppConfig::default();
        config.qdrant.url = "http://configured:6333".to_string();
        config.generation.api_key = Some("explicit".to_string());

        config.apply_legacy_env(env(&[
            ("QDRANT_URL", "http://qdrant:6333"),
            ("GROQ_API_KEY", "gsk-test"),
        ]));

        assert_eq!(config.qdrant.url, "http://configured:6333");
        assert_eq!(config.generation.api_key.as_deref(), Some("explicit"));
    }

    #[test]
    fn test_ollama_url_ignored_for_remote_embeddings() {
        let mut config = AppConfig::default();
        config.embedding.model = "text-embedding-3-small".to_string();

        config.apply_legacy_env(env(&[("OLLAMA_BASE_URL", "http://ollama:11434")]));

        assert!(config.embedding.base_url.is_none());
    }
}
