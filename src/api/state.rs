//! Application state shared by handlers

use std::sync::Arc;

use crate::infrastructure::services::{CacheDecisionEngine, Responder};

/// Application state; cheap to clone
#[derive(Debug, Clone)]
pub struct AppState {
    pub responder: Arc<Responder>,
    /// Same engine the responder consults, if caching is configured
    pub cache: Option<Arc<CacheDecisionEngine>>,
}

impl AppState {
    pub fn new(responder: Responder) -> Self {
        let cache = responder.cache().cloned();

        Self {
            responder: Arc::new(responder),
            cache,
        }
    }
}
