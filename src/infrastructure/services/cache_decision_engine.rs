//! Semantic answer cache decision engine
//!
//! Decides hit or miss for a question by embedding it, retrieving similar
//! answers from the usecase partition, re-ranking them with a lexical signal
//! and gating the best one on its raw vector score.

use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, info, warn};

use crate::domain::answer_cache::{
    extract_keywords, filter_by_recency, normalize_query, rank_by_relevance, CacheConfig,
    CachedAnswer, CollectionStats, Metadata, RequestContext, SearchResult, Usecase, VectorStore,
    DEFAULT_MAX_KEYWORDS,
};
use crate::domain::embedding::EmbeddingProvider;
use crate::domain::DomainError;

/// An accepted cached answer
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CacheHit {
    pub question: String,
    pub answer: String,
    pub vector_score: f32,
    pub combined_score: f32,
    pub metadata: Metadata,
}

impl From<SearchResult> for CacheHit {
    fn from(result: SearchResult) -> Self {
        Self {
            combined_score: result.combined_score.unwrap_or(result.vector_score),
            question: result.question,
            answer: result.answer,
            vector_score: result.vector_score,
            metadata: result.metadata,
        }
    }
}

/// Orchestrates embed, search, re-rank, accept and store
#[derive(Debug)]
pub struct CacheDecisionEngine {
    store: Arc<dyn VectorStore>,
    embedding_provider: Arc<dyn EmbeddingProvider>,
    config: CacheConfig,
}

impl CacheDecisionEngine {
    pub fn new(store: Arc<dyn VectorStore>, embedding_provider: Arc<dyn EmbeddingProvider>) -> Self {
        Self::with_config(store, embedding_provider, CacheConfig::default())
    }

    pub fn with_config(
        store: Arc<dyn VectorStore>,
        embedding_provider: Arc<dyn EmbeddingProvider>,
        config: CacheConfig,
    ) -> Self {
        Self {
            store,
            embedding_provider,
            config,
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.config.enabled
    }

    pub fn config(&self) -> &CacheConfig {
        &self.config
    }

    pub fn store(&self) -> &Arc<dyn VectorStore> {
        &self.store
    }

    async fn embed(&self, text: &str) -> Option<Vec<f32>> {
        match self.embedding_provider.embed(text).await {
            Ok(vector) => Some(vector),
            Err(e) => {
                warn!(
                    provider = self.embedding_provider.provider_name(),
                    error = %e,
                    "Failed to generate embedding"
                );
                None
            }
        }
    }

    /// Candidates for `query` in the usecase partition, best first.
    ///
    /// Retrieval uses the loose threshold; stale results are dropped when a
    /// maximum age is configured. Nothing here decides acceptance.
    pub async fn search(&self, usecase: &Usecase, query: &str, limit: usize) -> Vec<SearchResult> {
        let normalized = normalize_query(query);

        let Some(vector) = self.embed(query).await else {
            return Vec::new();
        };

        let mut results = self
            .store
            .search(&vector, usecase.as_str(), limit, self.config.retrieval_threshold)
            .await;

        if let Some(max_age_hours) = self.config.max_age_hours {
            let before = results.len();
            results = filter_by_recency(results, max_age_hours);

            if results.len() < before {
                debug!(
                    dropped = before - results.len(),
                    max_age_hours, "Dropped stale cache candidates"
                );
            }
        }

        rank_by_relevance(results, &normalized)
    }

    /// Cached answer for `query`, if one is close enough to serve
    pub async fn lookup(&self, ctx: &RequestContext, query: &str) -> Option<CacheHit> {
        if !self.config.enabled {
            return None;
        }

        debug!(
            usecase = %ctx.usecase(),
            keywords = ?extract_keywords(query, DEFAULT_MAX_KEYWORDS),
            "Looking up cached answer"
        );

        let candidates = self
            .search(ctx.usecase(), query, self.config.search_limit)
            .await;

        let Some(top) = candidates.into_iter().next() else {
            debug!(usecase = %ctx.usecase(), "Cache miss: no candidates");
            return None;
        };

        if top.vector_score >= self.config.acceptance_threshold {
            info!(
                usecase = %ctx.usecase(),
                vector_score = top.vector_score,
                combined_score = ?top.combined_score,
                "Cache hit"
            );
            Some(CacheHit::from(top))
        } else {
            debug!(
                usecase = %ctx.usecase(),
                vector_score = top.vector_score,
                threshold = self.config.acceptance_threshold,
                "Cache miss: best candidate below acceptance threshold"
            );
            None
        }
    }

    /// Store an answer for later lookups; `false` when nothing was stored.
    ///
    /// Request metadata is merged first and `metadata` overrides it.
    pub async fn record(
        &self,
        ctx: &RequestContext,
        question: &str,
        answer: &str,
        metadata: Metadata,
    ) -> bool {
        if !self.config.enabled {
            return false;
        }

        let Some(vector) = self.embed(question).await else {
            return false;
        };

        let mut merged = ctx.metadata().clone();
        merged.extend(metadata);

        let point = CachedAnswer::new(question, answer, ctx.usecase().as_str(), vector)
            .with_metadata(merged);
        let id = point.id().to_string();

        let stored = self.store.upsert(point).await;

        if stored {
            debug!(usecase = %ctx.usecase(), id = %id, "Recorded answer");
        }

        stored
    }

    pub async fn stats(&self) -> CollectionStats {
        self.store.stats().await
    }

    /// Drop every cached answer and leave the collection ready for use
    pub async fn clear(&self) -> Result<(), DomainError> {
        self.store.clear_collection().await?;
        info!(collection = %self.store.spec().name, "Cleared answer cache");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::answer_cache::CollectionSpec;
    use crate::domain::embedding::{cosine_similarity, MockEmbeddingProvider};
    use crate::infrastructure::vector_store::InMemoryVectorStore;
    use serde_json::json;

    async fn create_store(dimension: usize) -> Arc<InMemoryVectorStore> {
        let store = Arc::new(InMemoryVectorStore::new(CollectionSpec::new(
            "qa_collection",
            dimension,
        )));
        store.ensure_collection().await.unwrap();
        store
    }

    fn provider() -> MockEmbeddingProvider {
        MockEmbeddingProvider::new("mock", 3)
            .with_vector("What is AI?", vec![1.0, 0.0, 0.0])
            .with_vector("what is ai", vec![0.99, 0.1, 0.0])
            .with_vector("How do plants grow?", vec![0.0, 1.0, 0.0])
    }

    async fn create_engine(config: CacheConfig) -> (CacheDecisionEngine, Arc<InMemoryVectorStore>) {
        let store = create_store(3).await;
        let engine = CacheDecisionEngine::with_config(store.clone(), Arc::new(provider()), config);
        (engine, store)
    }

    #[tokio::test]
    async fn test_end_to_end_hit_and_partition_miss() {
        let (engine, _) = create_engine(CacheConfig::default()).await;
        let chatbot = RequestContext::new("Basic Chatbot");

        assert!(
            engine
                .record(&chatbot, "What is AI?", "Artificial Intelligence is...", Metadata::new())
                .await
        );

        let hit = engine.lookup(&chatbot, "what is ai").await.unwrap();
        assert_eq!(hit.answer, "Artificial Intelligence is...");
        assert_eq!(hit.question, "What is AI?");
        assert!(hit.vector_score >= 0.8);

        let news = RequestContext::new("AI News");
        assert!(engine.lookup(&news, "what is ai").await.is_none());
        assert!(engine.search(news.usecase(), "what is ai", 5).await.is_empty());
    }

    #[tokio::test]
    async fn test_record_is_idempotent_per_question_and_usecase() {
        let (engine, store) = create_engine(CacheConfig::default()).await;
        let ctx = RequestContext::new("Basic Chatbot");
        let mut first = Metadata::new();
        first.insert("model".to_string(), json!("a"));
        let mut second = Metadata::new();
        second.insert("model".to_string(), json!("b"));

        engine.record(&ctx, "What is AI?", "old", first).await;
        engine.record(&ctx, "What is AI?", "new", second).await;

        assert_eq!(store.stats().await.points_count, 1);
        let hit = engine.lookup(&ctx, "What is AI?").await.unwrap();
        assert_eq!(hit.answer, "new");
        assert_eq!(hit.metadata.get("model"), Some(&json!("b")));
    }

    #[tokio::test]
    async fn test_acceptance_threshold_is_inclusive() {
        let exact = cosine_similarity(&[0.99, 0.1, 0.0], &[1.0, 0.0, 0.0]);
        let ctx = RequestContext::new("u");

        let (engine, _) = create_engine(
            CacheConfig::default()
                .with_retrieval_threshold(0.5)
                .with_acceptance_threshold(exact),
        )
        .await;
        engine.record(&ctx, "What is AI?", "answer", Metadata::new()).await;
        assert!(engine.lookup(&ctx, "what is ai").await.is_some());

        let just_above = f32::from_bits(exact.to_bits() + 1);
        let (engine, _) = create_engine(
            CacheConfig::default()
                .with_retrieval_threshold(0.5)
                .with_acceptance_threshold(just_above),
        )
        .await;
        engine.record(&ctx, "What is AI?", "answer", Metadata::new()).await;
        assert!(engine.lookup(&ctx, "what is ai").await.is_none());
    }

    #[tokio::test]
    async fn test_retrieved_but_not_accepted_is_miss() {
        let provider = MockEmbeddingProvider::new("mock", 2)
            .with_vector("stored", vec![1.0, 0.0])
            .with_vector("query", vec![0.75, 0.66]);
        let store = create_store(2).await;
        let engine =
            CacheDecisionEngine::with_config(store, Arc::new(provider), CacheConfig::default());
        let ctx = RequestContext::new("u");
        engine.record(&ctx, "stored", "answer", Metadata::new()).await;

        // cos ~= 0.75: above retrieval (0.7), below acceptance (0.8)
        assert_eq!(engine.search(ctx.usecase(), "query", 3).await.len(), 1);
        assert!(engine.lookup(&ctx, "query").await.is_none());
    }

    #[tokio::test]
    async fn test_lexical_signal_reorders_but_does_not_accept() {
        let provider = MockEmbeddingProvider::new("mock", 2)
            .with_vector("the capital of france", vec![0.75, 0.661438])
            .with_vector("unrelated wording entirely", vec![0.8, 0.6])
            .with_vector("capital of france", vec![1.0, 0.0]);
        let store = create_store(2).await;
        let engine = CacheDecisionEngine::with_config(
            store,
            Arc::new(provider),
            CacheConfig::default().with_retrieval_threshold(0.5),
        );
        let ctx = RequestContext::new("u");
        engine.record(&ctx, "the capital of france", "Paris", Metadata::new()).await;
        engine.record(&ctx, "unrelated wording entirely", "Other", Metadata::new()).await;

        let ranked = engine.search(ctx.usecase(), "capital of france", 3).await;
        assert_eq!(ranked[0].question, "the capital of france");
        assert_eq!(ranked[1].question, "unrelated wording entirely");

        // The lexically closer candidate ranks first but its raw score is 0.75
        assert!(engine.lookup(&ctx, "capital of france").await.is_none());
    }

    #[tokio::test]
    async fn test_embedding_failure_is_miss_and_not_recorded() {
        let store = create_store(3).await;
        let engine = CacheDecisionEngine::new(
            store.clone(),
            Arc::new(MockEmbeddingProvider::new("mock", 3).with_error("unreachable")),
        );
        let ctx = RequestContext::default();

        assert!(!engine.record(&ctx, "What is AI?", "answer", Metadata::new()).await);
        assert!(engine.lookup(&ctx, "What is AI?").await.is_none());
        assert_eq!(store.stats().await.points_count, 0);
    }

    #[tokio::test]
    async fn test_disabled_engine_never_touches_store() {
        let (engine, store) = create_engine(CacheConfig::default().with_enabled(false)).await;
        let ctx = RequestContext::default();

        assert!(!engine.record(&ctx, "What is AI?", "answer", Metadata::new()).await);
        assert!(engine.lookup(&ctx, "What is AI?").await.is_none());
        assert_eq!(store.stats().await.points_count, 0);
    }

    #[tokio::test]
    async fn test_empty_query_still_searches_by_vector() {
        let provider = MockEmbeddingProvider::new("mock", 2)
            .with_vector("", vec![1.0, 0.0])
            .with_vector("What is AI?", vec![1.0, 0.0]);
        let store = create_store(2).await;
        let engine = CacheDecisionEngine::new(store, Arc::new(provider));
        let ctx = RequestContext::default();
        engine.record(&ctx, "What is AI?", "answer", Metadata::new()).await;

        let hit = engine.lookup(&ctx, "").await.unwrap();

        assert_eq!(hit.answer, "answer");
        assert!((hit.combined_score - 0.7 * hit.vector_score).abs() < 1e-6);
    }

    #[tokio::test]
    async fn test_stale_answers_are_filtered() {
        let store = create_store(3).await;
        let engine = CacheDecisionEngine::with_config(
            store.clone(),
            Arc::new(provider()),
            CacheConfig::default().with_max_age_hours(24),
        );
        let ctx = RequestContext::new("AI News");
        store
            .upsert(
                CachedAnswer::new("What is AI?", "stale", "AI News", vec![1.0, 0.0, 0.0])
                    .with_timestamp("2020-01-01T00:00:00Z"),
            )
            .await;

        assert!(engine.lookup(&ctx, "What is AI?").await.is_none());

        engine.record(&ctx, "What is AI?", "fresh", Metadata::new()).await;
        assert_eq!(engine.lookup(&ctx, "What is AI?").await.unwrap().answer, "fresh");
    }

    #[tokio::test]
    async fn test_context_metadata_is_stored_and_overridden() {
        let (engine, _) = create_engine(CacheConfig::default()).await;
        let ctx = RequestContext::new("u")
            .with_metadata("source", "ui")
            .with_metadata("model", "from-context");
        let mut extra = Metadata::new();
        extra.insert("model".to_string(), json!("llama3"));
        extra.insert("question".to_string(), json!("shadowed"));

        engine.record(&ctx, "What is AI?", "answer", extra).await;
        let hit = engine.lookup(&ctx, "What is AI?").await.unwrap();

        assert_eq!(hit.question, "What is AI?");
        assert_eq!(hit.metadata.get("source"), Some(&json!("ui")));
        assert_eq!(hit.metadata.get("model"), Some(&json!("llama3")));
        assert_eq!(hit.metadata.get("usecase"), Some(&json!("u")));
    }

    #[tokio::test]
    async fn test_clear_empties_cache_and_keeps_it_usable() {
        let (engine, _) = create_engine(CacheConfig::default()).await;
        let ctx = RequestContext::new("u");
        engine.record(&ctx, "What is AI?", "answer", Metadata::new()).await;

        engine.clear().await.unwrap();

        assert_eq!(engine.stats().await.points_count, 0);
        assert!(engine.lookup(&ctx, "What is AI?").await.is_none());
        assert!(engine.record(&ctx, "What is AI?", "again", Metadata::new()).await);
        assert_eq!(engine.lookup(&ctx, "What is AI?").await.unwrap().answer, "again");
    }
}
