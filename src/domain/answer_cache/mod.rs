//! Semantic answer cache domain models and traits
//!
//! Answers are stored per usecase and matched by embedding similarity
//! rather than by exact question text.

mod config;
mod context;
mod entry;
mod identity;
mod normalizer;
mod ranking;
mod recency;
mod store;

pub use config::{CacheConfig, MAX_AGE_HOURS_LIMIT};
pub use context::{RequestContext, Usecase, DEFAULT_USECASE};
pub use entry::{
    current_timestamp, sanitize_metadata, CachedAnswer, CollectionStats, Metadata, SearchResult,
    ANSWER_KEY, QUESTION_KEY, RESERVED_KEYS, TIMESTAMP_KEY, USECASE_KEY,
};
pub use identity::IdentityHasher;
pub use normalizer::{extract_keywords, normalize_query, DEFAULT_MAX_KEYWORDS};
pub use ranking::{combined_score, jaccard_similarity, rank_by_relevance, TEXT_WEIGHT, VECTOR_WEIGHT};
pub use recency::{filter_by_recency, filter_by_recency_at, parse_timestamp};
pub use store::{CollectionSpec, DistanceMetric, VectorStore};
