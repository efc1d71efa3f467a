//! Vector store trait and collection schema

use std::fmt::Debug;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::entry::{CachedAnswer, CollectionStats, SearchResult};
use crate::domain::DomainError;

/// Distance metric a collection is created with
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum DistanceMetric {
    /// Cosine similarity, higher is closer
    #[default]
    Cosine,
    /// Dot product, higher is closer
    Dot,
}

impl DistanceMetric {
    /// Name used on the wire
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Cosine => "Cosine",
            Self::Dot => "Dot",
        }
    }
}

impl std::fmt::Display for DistanceMetric {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Schema a store provisions its collection with
#[derive(Debug, Clone, PartialEq)]
pub struct CollectionSpec {
    pub name: String,
    pub dimension: usize,
    pub distance: DistanceMetric,
}

impl CollectionSpec {
    /// Cosine collection with the given name and dimension
    pub fn new(name: impl Into<String>, dimension: usize) -> Self {
        Self {
            name: name.into(),
            dimension,
            distance: DistanceMetric::Cosine,
        }
    }

    pub fn with_distance(mut self, distance: DistanceMetric) -> Self {
        self.distance = distance;
        self
    }
}

/// Persistent store of cached answers, bound to one collection.
///
/// Only provisioning reports errors. Reads and writes fail soft: a broken
/// store must look like an empty cache, never like a failed request.
#[async_trait]
pub trait VectorStore: Send + Sync + Debug {
    /// Collection schema this store manages
    fn spec(&self) -> &CollectionSpec;

    /// Create the collection and its `usecase` index if absent.
    ///
    /// Fails when the collection cannot be created or exists with another
    /// dimension.
    async fn ensure_collection(&self) -> Result<(), DomainError>;

    /// Insert or overwrite a point; `false` on any backend error
    async fn upsert(&self, point: CachedAnswer) -> bool;

    /// Points in `usecase` with similarity at or above `score_threshold`,
    /// most similar first; empty on any backend error
    async fn search(
        &self,
        vector: &[f32],
        usecase: &str,
        limit: usize,
        score_threshold: f32,
    ) -> Vec<SearchResult>;

    /// Collection statistics; zeroed on any backend error
    async fn stats(&self) -> CollectionStats;

    /// Delete the collection and provision it again, empty
    async fn clear_collection(&self) -> Result<(), DomainError>;
}
