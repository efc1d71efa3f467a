//! Cache inspection request and response bodies

use serde::{Deserialize, Serialize};

use crate::domain::answer_cache::{CollectionStats, SearchResult};

/// Largest `limit` a search request may ask for
pub const MAX_SEARCH_LIMIT: usize = 50;

/// POST /api/cache/search
#[derive(Debug, Clone, Deserialize)]
pub struct CacheSearchRequest {
    pub query: String,
    #[serde(default)]
    pub usecase: Option<String>,
    #[serde(default)]
    pub limit: Option<usize>,
}

#[derive(Debug, Clone, Serialize)]
pub struct CacheSearchResponse {
    pub results: Vec<SearchResult>,
    pub keywords: Vec<String>,
}

/// GET /api/cache/stats
#[derive(Debug, Clone, Serialize)]
pub struct CacheStatsResponse {
    pub collection: String,
    #[serde(flatten)]
    pub stats: CollectionStats,
}

/// DELETE /api/cache
#[derive(Debug, Clone, Serialize)]
pub struct CacheClearedResponse {
    pub collection: String,
    pub cleared: bool,
}
