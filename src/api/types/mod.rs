//! Request and response types

pub mod cache;
pub mod chat;
pub mod error;
pub mod json;

pub use cache::{CacheClearedResponse, CacheSearchRequest, CacheSearchResponse, CacheStatsResponse};
pub use chat::{ChatRequest, ChatResponse};
pub use error::{ApiError, ApiErrorResponse};
pub use json::Json;
