//! Qdrant vector store over the REST API

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Map, Value};
use tracing::{debug, info, warn};

use crate::domain::answer_cache::{
    CachedAnswer, CollectionSpec, CollectionStats, SearchResult, VectorStore, TIMESTAMP_KEY,
    USECASE_KEY,
};
use crate::domain::DomainError;
use crate::infrastructure::http_client::HttpClientTrait;

pub const DEFAULT_QDRANT_URL: &str = "http://localhost:6333";

/// Vector store backed by a Qdrant collection
#[derive(Debug)]
pub struct QdrantVectorStore<C: HttpClientTrait> {
    client: C,
    base_url: String,
    api_key: Option<String>,
    spec: CollectionSpec,
}

impl<C: HttpClientTrait> QdrantVectorStore<C> {
    pub fn new(client: C, base_url: impl Into<String>, spec: CollectionSpec) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: None,
            spec,
        }
    }

    /// Authenticate every request with an `api-key` header
    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        let api_key = api_key.into();
        self.api_key = (!api_key.trim().is_empty()).then_some(api_key);
        self
    }

    fn collection_url(&self) -> String {
        format!("{}/collections/{}", self.base_url, self.spec.name)
    }

    fn index_url(&self) -> String {
        format!("{}/index?wait=true", self.collection_url())
    }

    fn points_url(&self) -> String {
        format!("{}/points?wait=true", self.collection_url())
    }

    fn search_url(&self) -> String {
        format!("{}/points/search", self.collection_url())
    }

    fn headers(&self) -> Vec<(&str, &str)> {
        let mut headers = vec![("Content-Type", "application/json")];

        if let Some(ref api_key) = self.api_key {
            headers.push(("api-key", api_key.as_str()));
        }

        headers
    }

    async fn fetch_collection(&self) -> Result<Option<QdrantCollectionInfo>, DomainError> {
        match self.client.get_json(&self.collection_url(), self.headers()).await {
            Ok(json) => {
                let response: QdrantResponse<QdrantCollectionInfo> = serde_json::from_value(json)
                    .map_err(|e| {
                        DomainError::storage(format!("Failed to parse collection info: {}", e))
                    })?;
                Ok(Some(response.result))
            }
            Err(DomainError::NotFound { .. }) => Ok(None),
            Err(e) => Err(e),
        }
    }

    async fn create_collection(&self) -> Result<(), DomainError> {
        let body = json!({
            "vectors": {
                "size": self.spec.dimension,
                "distance": self.spec.distance.as_str(),
            }
        });

        match self
            .client
            .put_json(&self.collection_url(), self.headers(), &body)
            .await
        {
            Ok(_) => {
                info!(
                    collection = %self.spec.name,
                    dimension = self.spec.dimension,
                    distance = %self.spec.distance,
                    "Created collection"
                );
                Ok(())
            }
            Err(DomainError::Conflict { .. }) => {
                debug!(collection = %self.spec.name, "Collection created concurrently");
                Ok(())
            }
            Err(e) => Err(DomainError::storage(format!(
                "Failed to create collection '{}': {}",
                self.spec.name, e
            ))),
        }
    }

    async fn create_index(&self, field: &str, schema: &str) -> Result<(), DomainError> {
        let body = json!({
            "field_name": field,
            "field_schema": schema,
        });

        self.client
            .put_json(&self.index_url(), self.headers(), &body)
            .await
            .map(|_| ())
    }

    /// Indexes on a collection that already existed; failures are expected
    async fn ensure_indexes(&self) {
        if let Err(e) = self.create_index(USECASE_KEY, "keyword").await {
            debug!(
                collection = %self.spec.name,
                error = %e,
                "Usecase index already exists or could not be recreated"
            );
        }

        self.ensure_timestamp_index().await;
    }

    async fn ensure_timestamp_index(&self) {
        if let Err(e) = self.create_index(TIMESTAMP_KEY, "datetime").await {
            warn!(
                collection = %self.spec.name,
                error = %e,
                "Could not create timestamp index"
            );
        }
    }

    fn check_dimension(&self, info: &QdrantCollectionInfo) -> Result<(), DomainError> {
        match info.vector_params() {
            Some(params) if params.size != self.spec.dimension => {
                Err(DomainError::configuration(format!(
                    "Collection '{}' has dimension {} but the embedding model produces {}",
                    self.spec.name, params.size, self.spec.dimension
                )))
            }
            _ => Ok(()),
        }
    }
}

#[async_trait]
impl<C: HttpClientTrait> VectorStore for QdrantVectorStore<C> {
    fn spec(&self) -> &CollectionSpec {
        &self.spec
    }

    async fn ensure_collection(&self) -> Result<(), DomainError> {
        let existing = self.fetch_collection().await.map_err(|e| match e {
            DomainError::Storage { .. } => e,
            other => DomainError::storage(format!(
                "Failed to inspect collection '{}': {}",
                self.spec.name, other
            )),
        })?;

        match existing {
            Some(info) => {
                self.check_dimension(&info)?;
                debug!(collection = %self.spec.name, "Collection already exists");
                self.ensure_indexes().await;
            }
            None => {
                self.create_collection().await?;

                self.create_index(USECASE_KEY, "keyword").await.map_err(|e| {
                    DomainError::storage(format!(
                        "Failed to create usecase index on '{}': {}",
                        self.spec.name, e
                    ))
                })?;

                self.ensure_timestamp_index().await;
            }
        }

        Ok(())
    }

    async fn upsert(&self, point: CachedAnswer) -> bool {
        let body = json!({
            "points": [{
                "id": point.id(),
                "vector": point.vector(),
                "payload": point.payload(),
            }]
        });

        match self
            .client
            .put_json(&self.points_url(), self.headers(), &body)
            .await
        {
            Ok(_) => {
                debug!(collection = %self.spec.name, id = point.id(), "Stored point");
                true
            }
            Err(e) => {
                warn!(
                    collection = %self.spec.name,
                    id = point.id(),
                    error = %e,
                    "Failed to store point"
                );
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
        let body = json!({
            "vector": vector,
            "filter": {
                "must": [{"key": USECASE_KEY, "match": {"value": usecase}}]
            },
            "limit": limit,
            "score_threshold": score_threshold,
            "with_payload": true,
        });

        let response = match self
            .client
            .post_json(&self.search_url(), self.headers(), &body)
            .await
        {
            Ok(json) => json,
            Err(e) => {
                warn!(collection = %self.spec.name, error = %e, "Search failed");
                return Vec::new();
            }
        };

        let response: QdrantResponse<Vec<QdrantScoredPoint>> =
            match serde_json::from_value(response) {
                Ok(response) => response,
                Err(e) => {
                    warn!(collection = %self.spec.name, error = %e, "Unreadable search response");
                    return Vec::new();
                }
            };

        response
            .result
            .into_iter()
            .filter_map(|point| {
                let result = SearchResult::from_payload(point.payload.unwrap_or_default(), point.score);
                if result.is_none() {
                    debug!(id = %point.id, "Skipping point without question or answer");
                }
                result
            })
            .collect()
    }

    async fn stats(&self) -> CollectionStats {
        match self.fetch_collection().await {
            Ok(Some(info)) => {
                let params = info.vector_params();

                CollectionStats {
                    points_count: info.points_count.unwrap_or(0),
                    vector_size: params.map(|p| p.size).unwrap_or(0),
                    distance: params.map(|p| p.distance.clone()).unwrap_or_default(),
                }
            }
            Ok(None) => {
                warn!(collection = %self.spec.name, "Collection does not exist");
                CollectionStats::default()
            }
            Err(e) => {
                warn!(collection = %self.spec.name, error = %e, "Failed to read collection stats");
                CollectionStats::default()
            }
        }
    }

    async fn clear_collection(&self) -> Result<(), DomainError> {
        match self.client.delete(&self.collection_url(), self.headers()).await {
            Ok(_) | Err(DomainError::NotFound { .. }) => {
                info!(collection = %self.spec.name, "Deleted collection");
            }
            Err(e) => {
                return Err(DomainError::storage(format!(
                    "Failed to delete collection '{}': {}",
                    self.spec.name, e
                )));
            }
        }

        self.ensure_collection().await
    }
}

// Qdrant REST API types

#[derive(Debug, Deserialize)]
struct QdrantResponse<T> {
    result: T,
}

#[derive(Debug, Deserialize)]
struct QdrantCollectionInfo {
    #[serde(default)]
    points_count: Option<u64>,
    config: QdrantCollectionConfig,
}

impl QdrantCollectionInfo {
    fn vector_params(&self) -> Option<&QdrantVectorParams> {
        match &self.config.params.vectors {
            QdrantVectors::Single(params) => Some(params),
            QdrantVectors::Named(_) => None,
        }
    }
}

#[derive(Debug, Deserialize)]
struct QdrantCollectionConfig {
    params: QdrantCollectionParams,
}

#[derive(Debug, Deserialize)]
struct QdrantCollectionParams {
    vectors: QdrantVectors,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum QdrantVectors {
    Single(QdrantVectorParams),
    Named(Map<String, Value>),
}

#[derive(Debug, Deserialize)]
struct QdrantVectorParams {
    size: usize,
    distance: String,
}

#[derive(Debug, Deserialize)]
struct QdrantScoredPoint {
    id: Value,
    score: f32,
    #[serde(default)]
    payload: Option<Map<String, Value>>,
}
