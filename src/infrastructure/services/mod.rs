//! Application services

mod cache_decision_engine;
mod responder;

pub use cache_decision_engine::{CacheDecisionEngine, CacheHit};
pub use responder::{Reply, Responder};
