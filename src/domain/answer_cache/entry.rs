//! Cached answer and search result types

use std::collections::BTreeMap;

use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::warn;

use super::identity::IdentityHasher;

pub const QUESTION_KEY: &str = "question";
pub const ANSWER_KEY: &str = "answer";
pub const USECASE_KEY: &str = "usecase";
pub const TIMESTAMP_KEY: &str = "timestamp";

/// Payload keys owned by the cache itself
pub const RESERVED_KEYS: &[&str] = &[QUESTION_KEY, ANSWER_KEY, USECASE_KEY, TIMESTAMP_KEY];

/// Open string to scalar mapping stored alongside an answer
pub type Metadata = BTreeMap<String, Value>;

/// Current time as an ISO-8601 timestamp with second precision
pub fn current_timestamp() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true)
}

/// Drop reserved and non-scalar metadata entries
pub fn sanitize_metadata(metadata: Metadata) -> Metadata {
    metadata
        .into_iter()
        .filter(|(key, value)| {
            if RESERVED_KEYS.contains(&key.as_str()) {
                warn!(key = %key, "Ignoring metadata key that shadows a reserved payload field");
                return false;
            }

            if value.is_array() || value.is_object() {
                warn!(key = %key, "Ignoring non-scalar metadata value");
                return false;
            }

            true
        })
        .collect()
}

/// A question/answer pair stored as one point in the vector store
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CachedAnswer {
    id: String,
    vector: Vec<f32>,
    question: String,
    answer: String,
    usecase: String,
    timestamp: String,
    metadata: Metadata,
}

impl CachedAnswer {
    /// Create a new cached answer stamped with the current time
    pub fn new(
        question: impl Into<String>,
        answer: impl Into<String>,
        usecase: impl Into<String>,
        vector: Vec<f32>,
    ) -> Self {
        let question = question.into();
        let usecase = usecase.into();

        Self {
            id: IdentityHasher::id(&question, &usecase),
            vector,
            question,
            answer: answer.into(),
            usecase,
            timestamp: current_timestamp(),
            metadata: Metadata::new(),
        }
    }

    /// Attach metadata; reserved keys and non-scalar values are dropped
    pub fn with_metadata(mut self, metadata: Metadata) -> Self {
        self.metadata = sanitize_metadata(metadata);
        self
    }

    /// Override the write timestamp
    pub fn with_timestamp(mut self, timestamp: impl Into<String>) -> Self {
        self.timestamp = timestamp.into();
        self
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn vector(&self) -> &[f32] {
        &self.vector
    }

    pub fn question(&self) -> &str {
        &self.question
    }

    pub fn answer(&self) -> &str {
        &self.answer
    }

    pub fn usecase(&self) -> &str {
        &self.usecase
    }

    pub fn timestamp(&self) -> &str {
        &self.timestamp
    }

    pub fn metadata(&self) -> &Metadata {
        &self.metadata
    }

    /// Build the stored payload: metadata first, reserved fields on top
    pub fn payload(&self) -> Map<String, Value> {
        let mut payload: Map<String, Value> = self
            .metadata
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect();

        payload.insert(QUESTION_KEY.to_string(), Value::String(self.question.clone()));
        payload.insert(ANSWER_KEY.to_string(), Value::String(self.answer.clone()));
        payload.insert(USECASE_KEY.to_string(), Value::String(self.usecase.clone()));
        payload.insert(TIMESTAMP_KEY.to_string(), Value::String(self.timestamp.clone()));

        payload
    }
}

/// A cached answer returned by a similarity search
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchResult {
    pub question: String,
    pub answer: String,
    /// Similarity reported by the vector store
    pub vector_score: f32,
    /// Every payload field except question and answer
    pub metadata: Metadata,
    /// Blend of vector and lexical similarity, set by re-ranking
    #[serde(skip_serializing_if = "Option::is_none")]
    pub combined_score: Option<f32>,
}

impl SearchResult {
    pub fn new(
        question: impl Into<String>,
        answer: impl Into<String>,
        vector_score: f32,
        metadata: Metadata,
    ) -> Self {
        Self {
            question: question.into(),
            answer: answer.into(),
            vector_score,
            metadata,
            combined_score: None,
        }
    }

    /// Build a result from a stored payload; `None` when question or answer is missing
    pub fn from_payload(mut payload: Map<String, Value>, score: f32) -> Option<Self> {
        let question = match payload.remove(QUESTION_KEY)? {
            Value::String(s) => s,
            _ => return None,
        };
        let answer = match payload.remove(ANSWER_KEY)? {
            Value::String(s) => s,
            _ => return None,
        };

        Some(Self::new(question, answer, score, payload.into_iter().collect()))
    }

    pub fn usecase(&self) -> Option<&str> {
        self.metadata.get(USECASE_KEY).and_then(Value::as_str)
    }

    pub fn timestamp(&self) -> Option<&str> {
        self.metadata.get(TIMESTAMP_KEY).and_then(Value::as_str)
    }
}

/// Read-only collection statistics
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CollectionStats {
    pub points_count: u64,
    pub vector_size: usize,
    pub distance: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_cached_answer_creation() {
        let answer = CachedAnswer::new("What is AI?", "Artificial Intelligence is...", "Basic Chatbot", vec![0.1, 0.2]);

        assert_eq!(answer.id(), IdentityHasher::id("What is AI?", "Basic Chatbot"));
        assert_eq!(answer.question(), "What is AI?");
        assert_eq!(answer.usecase(), "Basic Chatbot");
        assert_eq!(answer.vector(), &[0.1, 0.2]);
        assert!(answer.timestamp().ends_with('Z'));
        assert!(answer.metadata().is_empty());
    }

    #[test]
    fn test_reserved_metadata_is_dropped() {
        let mut metadata = Metadata::new();
        metadata.insert("usecase".into(), json!("AI News"));
        metadata.insert("answer".into(), json!("hijacked"));
        metadata.insert("model".into(), json!("llama3"));

        let answer = CachedAnswer::new("q", "a", "Basic Chatbot", vec![]).with_metadata(metadata);
        let payload = answer.payload();

        assert_eq!(payload["usecase"], json!("Basic Chatbot"));
        assert_eq!(payload["answer"], json!("a"));
        assert_eq!(payload["model"], json!("llama3"));
        assert!(!answer.metadata().contains_key("usecase"));
    }

    #[test]
    fn test_non_scalar_metadata_is_dropped() {
        let mut metadata = Metadata::new();
        metadata.insert("tags".into(), json!(["a", "b"]));
        metadata.insert("nested".into(), json!({"k": 1}));
        metadata.insert("from_cache".into(), json!(false));
        metadata.insert("tokens".into(), json!(42));

        let sanitized = sanitize_metadata(metadata);

        assert_eq!(sanitized.len(), 2);
        assert!(sanitized.contains_key("from_cache"));
        assert!(sanitized.contains_key("tokens"));
    }

    #[test]
    fn test_payload_contains_all_fields() {
        let answer = CachedAnswer::new("q", "a", "u", vec![1.0]).with_timestamp("2024-01-01T00:00:00Z");
        let payload = answer.payload();

        assert_eq!(payload.len(), 4);
        assert_eq!(payload["timestamp"], json!("2024-01-01T00:00:00Z"));
    }

    #[test]
    fn test_search_result_from_payload() {
        let payload = json!({
            "question": "What is AI?",
            "answer": "Artificial Intelligence is...",
            "usecase": "Basic Chatbot",
            "timestamp": "2024-01-01T00:00:00Z",
            "method": "llm_generated"
        });
        let Value::Object(map) = payload else { unreachable!() };

        let result = SearchResult::from_payload(map, 0.93).unwrap();

        assert_eq!(result.question, "What is AI?");
        assert_eq!(result.vector_score, 0.93);
        assert_eq!(result.usecase(), Some("Basic Chatbot"));
        assert_eq!(result.timestamp(), Some("2024-01-01T00:00:00Z"));
        assert_eq!(result.metadata.len(), 3);
        assert!(result.combined_score.is_none());
    }

    #[test]
    fn test_search_result_from_incomplete_payload() {
        let Value::Object(map) = json!({"question": "only a question"}) else { unreachable!() };

        assert!(SearchResult::from_payload(map, 0.9).is_none());
    }
}
