//! Infrastructure layer - External service implementations

pub mod embedding;
pub mod generation;
pub mod http_client;
pub mod logging;
pub mod services;
pub mod vector_store;

pub use http_client::{HttpClient, HttpClientTrait};
