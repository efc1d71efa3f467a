//! In-memory vector store implementation

use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;
use tracing::{debug, warn};

use crate::domain::answer_cache::{
    CachedAnswer, CollectionSpec, CollectionStats, DistanceMetric, SearchResult, VectorStore,
};
use crate::domain::embedding::cosine_similarity;
use crate::domain::DomainError;

/// In-memory vector store using linear search
///
/// Suitable for development, tests and single-process deployments. The
/// collection starts absent, exactly like a fresh Qdrant instance.
#[derive(Debug)]
pub struct InMemoryVectorStore {
    spec: CollectionSpec,
    points: RwLock<Option<HashMap<String, CachedAnswer>>>,
}

impl InMemoryVectorStore {
    pub fn new(spec: CollectionSpec) -> Self {
        Self {
            spec,
            points: RwLock::new(None),
        }
    }

    fn score(&self, query: &[f32], point: &[f32]) -> f32 {
        match self.spec.distance {
            DistanceMetric::Cosine => cosine_similarity(query, point),
            DistanceMetric::Dot => query.iter().zip(point).map(|(a, b)| a * b).sum(),
        }
    }
}

#[async_trait]
impl VectorStore for InMemoryVectorStore {
    fn spec(&self) -> &CollectionSpec {
        &self.spec
    }

    async fn ensure_collection(&self) -> Result<(), DomainError> {
        let mut points = self.points.write().map_err(|e| {
            DomainError::storage(format!("Failed to acquire write lock: {}", e))
        })?;

        if points.is_none() {
            debug!(collection = %self.spec.name, "Creating in-memory collection");
            *points = Some(HashMap::new());
        }

        Ok(())
    }

    async fn upsert(&self, point: CachedAnswer) -> bool {
        if point.vector().len() != self.spec.dimension {
            warn!(
                collection = %self.spec.name,
                expected = self.spec.dimension,
                actual = point.vector().len(),
                "Rejecting point with wrong vector dimension"
            );
            return false;
        }

        let Ok(mut guard) = self.points.write() else {
            warn!(collection = %self.spec.name, "Store lock poisoned, dropping upsert");
            return false;
        };

        match guard.as_mut() {
            Some(points) => {
                points.insert(point.id().to_string(), point);
                true
            }
            None => {
                warn!(collection = %self.spec.name, "Collection does not exist, dropping upsert");
                false
            }
        }
    }

    async fn search(
        &self,
        vector: &[f32],
        usecase: &str,
        limit: usize,
        score_threshold: f32,
    ) -> Vec<SearchResult> {
        let Ok(guard) = self.points.read() else {
            warn!(collection = %self.spec.name, "Store lock poisoned, returning no results");
            return Vec::new();
        };

        let Some(points) = guard.as_ref() else {
            warn!(collection = %self.spec.name, "Collection does not exist, returning no results");
            return Vec::new();
        };

        let mut scored: Vec<(&str, f32, &CachedAnswer)> = points
            .values()
            .filter(|point| point.usecase() == usecase)
            .map(|point| (point.id(), self.score(vector, point.vector()), point))
            .filter(|(_, score, _)| *score >= score_threshold)
            .collect();

        // Ties are broken by id so identical inputs give identical order
        scored.sort_by(|a, b| {
            b.1.partial_cmp(&a.1)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| a.0.cmp(b.0))
        });
        scored.truncate(limit);

        scored
            .into_iter()
            .filter_map(|(_, score, point)| SearchResult::from_payload(point.payload(), score))
            .collect()
    }

    async fn stats(&self) -> CollectionStats {
        let points_count = self
            .points
            .read()
            .ok()
            .and_then(|guard| guard.as_ref().map(|points| points.len() as u64));

        match points_count {
            Some(points_count) => CollectionStats {
                points_count,
                vector_size: self.spec.dimension,
                distance: self.spec.distance.to_string(),
            },
            None => CollectionStats::default(),
        }
    }

    async fn clear_collection(&self) -> Result<(), DomainError> {
        {
            let mut points = self.points.write().map_err(|e| {
                DomainError::storage(format!("Failed to acquire write lock: {}", e))
            })?;
            *points = None;
        }

        self.ensure_collection().await
    }
}
