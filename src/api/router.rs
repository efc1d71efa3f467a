use axum::{routing::get, Router};
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use super::handlers;
use super::health;
use super::state::AppState;

/// Create the full router with application state
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_check))
        .route("/ready", get(health::ready_check))
        .route("/live", get(health::live_check))
        .nest("/api", handlers::create_api_router())
        .with_state(state)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CorsLayer::permissive()),
        )
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::body::{to_bytes, Body};
    use axum::http::{Method, Request, StatusCode};
    use serde_json::{json, Value};
    use tower::ServiceExt;

    use super::*;
    use crate::domain::answer_cache::{CacheConfig, CollectionSpec, VectorStore};
    use crate::domain::embedding::MockEmbeddingProvider;
    use crate::domain::generation::{Generation, MockGenerationBackend};
    use crate::infrastructure::services::{CacheDecisionEngine, Responder};
    use crate::infrastructure::vector_store::InMemoryVectorStore;

    fn generator() -> MockGenerationBackend {
        let mut mock = MockGenerationBackend::new();
        mock.expect_generate()
            .returning(|_| Ok(Generation::text_only("Artificial Intelligence is...")));
        mock.expect_model().return_const("llama3".to_string());
        mock
    }

    async fn cached_app() -> Router {
        let store = Arc::new(InMemoryVectorStore::new(CollectionSpec::new("qa_collection", 3)));
        store.ensure_collection().await.unwrap();
        let provider = MockEmbeddingProvider::new("mock", 3)
            .with_vector("What is AI?", vec![1.0, 0.0, 0.0])
            .with_vector("what is ai", vec![0.99, 0.1, 0.0]);
        let engine = Arc::new(CacheDecisionEngine::with_config(
            store,
            Arc::new(provider),
            CacheConfig::default(),
        ));
        let responder = Responder::new(Arc::new(generator())).with_cache(engine);

        create_router(AppState::new(responder))
    }

    fn uncached_app() -> Router {
        create_router(AppState::new(Responder::new(Arc::new(generator()))))
    }

    async fn send(app: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        let body = match body {
            Some(json) => {
                builder = builder.header("content-type", "application/json");
                Body::from(json.to_string())
            }
            None => Body::empty(),
        };

        let response = app
            .clone()
            .oneshot(builder.body(body).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let json = serde_json::from_slice(&bytes).unwrap_or(Value::Null);

        (status, json)
    }

    #[tokio::test]
    async fn test_chat_miss_then_hit() {
        let app = cached_app().await;

        let (status, first) = send(
            &app,
            Method::POST,
            "/api/chat",
            Some(json!({"usecase": "Basic Chatbot", "message": "What is AI?"})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(first["from_cache"], json!(false));
        assert_eq!(first["content"], json!("Artificial Intelligence is..."));
        assert!(first.get("score").is_none());

        let (_, second) = send(
            &app,
            Method::POST,
            "/api/chat",
            Some(json!({"usecase": "Basic Chatbot", "message": "what is ai"})),
        )
        .await;
        assert_eq!(second["from_cache"], json!(true));
        assert!(second["content"]
            .as_str()
            .unwrap()
            .starts_with("Artificial Intelligence is..."));

        let (_, other) = send(
            &app,
            Method::POST,
            "/api/chat",
            Some(json!({"usecase": "AI News", "message": "what is ai"})),
        )
        .await;
        assert_eq!(other["from_cache"], json!(false));
    }

    #[tokio::test]
    async fn test_chat_rejects_blank_message() {
        let app = cached_app().await;

        let (status, body) =
            send(&app, Method::POST, "/api/chat", Some(json!({"message": "  "}))).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["type"], json!("invalid_request_error"));
    }

    #[tokio::test]
    async fn test_cache_search_stats_and_clear() {
        let app = cached_app().await;
        send(
            &app,
            Method::POST,
            "/api/chat",
            Some(json!({"usecase": "Basic Chatbot", "message": "What is AI?"})),
        )
        .await;

        let (status, search) = send(
            &app,
            Method::POST,
            "/api/cache/search",
            Some(json!({"query": "what is ai", "usecase": "Basic Chatbot"})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(search["results"].as_array().unwrap().len(), 1);
        assert_eq!(search["results"][0]["question"], json!("What is AI?"));
        assert!(search["results"][0]["combined_score"].is_number());

        let (_, stats) = send(&app, Method::GET, "/api/cache/stats", None).await;
        assert_eq!(stats["collection"], json!("qa_collection"));
        assert_eq!(stats["points_count"], json!(1));
        assert_eq!(stats["vector_size"], json!(3));

        let (status, cleared) = send(&app, Method::DELETE, "/api/cache", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(cleared["cleared"], json!(true));

        let (_, stats) = send(&app, Method::GET, "/api/cache/stats", None).await;
        assert_eq!(stats["points_count"], json!(0));
    }

    #[tokio::test]
    async fn test_cache_endpoints_without_cache() {
        let app = uncached_app();

        let (status, body) = send(&app, Method::GET, "/api/cache/stats", None).await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(body["error"]["code"], json!("cache_disabled"));

        let (status, reply) =
            send(&app, Method::POST, "/api/chat", Some(json!({"message": "What is AI?"}))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(reply["from_cache"], json!(false));
    }

    #[tokio::test]
    async fn test_health_endpoints() {
        let app = cached_app().await;

        let (status, health) = send(&app, Method::GET, "/health", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(health["status"], json!("healthy"));

        let (status, ready) = send(&app, Method::GET, "/ready", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(ready["status"], json!("healthy"));
        assert_eq!(ready["checks"][0]["name"], json!("vector_store"));

        let (status, _) = send(&app, Method::GET, "/live", None).await;
        assert_eq!(status, StatusCode::OK);
    }

    #[tokio::test]
    async fn test_ready_degrades_when_store_unreachable() {
        // Never provisioned, so stats come back zeroed
        let store = Arc::new(InMemoryVectorStore::new(CollectionSpec::new("qa_collection", 3)));
        let engine = Arc::new(CacheDecisionEngine::new(
            store,
            Arc::new(MockEmbeddingProvider::new("mock", 3)),
        ));
        let app = create_router(AppState::new(
            Responder::new(Arc::new(generator())).with_cache(engine),
        ));

        let (status, ready) = send(&app, Method::GET, "/ready", None).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(ready["status"], json!("degraded"));
        assert_eq!(ready["checks"][0]["status"], json!("unhealthy"));
    }
}
