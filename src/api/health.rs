//! Health check endpoints for Kubernetes probes

use std::time::Instant;

use axum::{extract::State, http::StatusCode, response::IntoResponse};
use serde::Serialize;

use super::state::AppState;
use crate::api::types::Json;

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: HealthStatus,
    pub version: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub checks: Option<Vec<HealthCheck>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub latency_ms: Option<u64>,
}

#[derive(Debug, Serialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    Healthy,
    Degraded,
    Unhealthy,
}

#[derive(Debug, Serialize)]
pub struct HealthCheck {
    pub name: String,
    pub status: HealthStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub latency_ms: Option<u64>,
}

/// GET /health
pub async fn health_check() -> impl IntoResponse {
    let response = HealthResponse {
        status: HealthStatus::Healthy,
        version: env!("CARGO_PKG_VERSION").to_string(),
        checks: None,
        latency_ms: None,
    };

    (StatusCode::OK, Json(response))
}

/// GET /ready
///
/// An unreachable vector store degrades the service rather than failing
/// it: answers are still generated, just never cached.
pub async fn ready_check(State(state): State<AppState>) -> impl IntoResponse {
    let start = Instant::now();
    let check = check_vector_store(&state).await;

    let status = match check.status {
        HealthStatus::Healthy => HealthStatus::Healthy,
        _ => HealthStatus::Degraded,
    };

    let response = HealthResponse {
        status,
        version: env!("CARGO_PKG_VERSION").to_string(),
        checks: Some(vec![check]),
        latency_ms: Some(start.elapsed().as_millis() as u64),
    };

    (StatusCode::OK, Json(response))
}

/// GET /live
pub async fn live_check() -> impl IntoResponse {
    StatusCode::OK
}

async fn check_vector_store(state: &AppState) -> HealthCheck {
    let start = Instant::now();

    let Some(cache) = state.cache.as_ref() else {
        return HealthCheck {
            name: "vector_store".to_string(),
            status: HealthStatus::Healthy,
            message: Some("answer cache disabled".to_string()),
            latency_ms: None,
        };
    };

    // Stats fail soft to zeroes, and a provisioned collection never has size 0
    let stats = cache.stats().await;
    let latency_ms = Some(start.elapsed().as_millis() as u64);

    if stats.vector_size > 0 {
        HealthCheck {
            name: "vector_store".to_string(),
            status: HealthStatus::Healthy,
            message: None,
            latency_ms,
        }
    } else {
        HealthCheck {
            name: "vector_store".to_string(),
            status: HealthStatus::Unhealthy,
            message: Some(format!(
                "collection '{}' is unreachable",
                cache.store().spec().name
            )),
            latency_ms,
        }
    }
}
