//! Answer cache inspection endpoints

use axum::extract::State;
use tracing::{debug, info};

use crate::api::state::AppState;
use crate::api::types::cache::MAX_SEARCH_LIMIT;
use crate::api::types::{
    ApiError, CacheClearedResponse, CacheSearchRequest, CacheSearchResponse, CacheStatsResponse,
    Json,
};
use crate::domain::answer_cache::{extract_keywords, Usecase, DEFAULT_MAX_KEYWORDS};
use crate::infrastructure::services::CacheDecisionEngine;

fn engine(state: &AppState) -> Result<&CacheDecisionEngine, ApiError> {
    state.cache.as_deref().ok_or_else(ApiError::cache_disabled)
}

/// POST /api/cache/search
pub async fn search(
    State(state): State<AppState>,
    Json(request): Json<CacheSearchRequest>,
) -> Result<Json<CacheSearchResponse>, ApiError> {
    let engine = engine(&state)?;
    let usecase = Usecase::from(request.usecase.clone());
    let limit = request
        .limit
        .unwrap_or(engine.config().search_limit)
        .clamp(1, MAX_SEARCH_LIMIT);

    debug!(usecase = %usecase, limit, "Searching answer cache");

    let results = engine.search(&usecase, &request.query, limit).await;

    Ok(Json(CacheSearchResponse {
        results,
        keywords: extract_keywords(&request.query, DEFAULT_MAX_KEYWORDS),
    }))
}

/// GET /api/cache/stats
pub async fn stats(State(state): State<AppState>) -> Result<Json<CacheStatsResponse>, ApiError> {
    let engine = engine(&state)?;

    Ok(Json(CacheStatsResponse {
        collection: engine.store().spec().name.clone(),
        stats: engine.stats().await,
    }))
}

/// DELETE /api/cache
pub async fn clear(State(state): State<AppState>) -> Result<Json<CacheClearedResponse>, ApiError> {
    let engine = engine(&state)?;
    let collection = engine.store().spec().name.clone();

    engine.clear().await?;
    info!(collection = %collection, "Answer cache cleared via API");

    Ok(Json(CacheClearedResponse {
        collection,
        cleared: true,
    }))
}
