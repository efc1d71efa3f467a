//! Per-request cache context

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::entry::Metadata;

/// Partition used when a caller does not name one
pub const DEFAULT_USECASE: &str = "default";

/// Logical cache partition; blank names map to `default`
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub struct Usecase(String);

impl Usecase {
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        let trimmed = name.trim();

        if trimmed.is_empty() {
            Self(DEFAULT_USECASE.to_string())
        } else {
            Self(trimmed.to_string())
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for Usecase {
    fn default() -> Self {
        Self(DEFAULT_USECASE.to_string())
    }
}

impl From<String> for Usecase {
    fn from(name: String) -> Self {
        Self::new(name)
    }
}

impl From<&str> for Usecase {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

impl From<Option<String>> for Usecase {
    fn from(name: Option<String>) -> Self {
        name.map(Self::new).unwrap_or_default()
    }
}

impl From<Usecase> for String {
    fn from(usecase: Usecase) -> Self {
        usecase.0
    }
}

impl std::fmt::Display for Usecase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// State threaded through one lookup/record cycle
#[derive(Debug, Clone, Default)]
pub struct RequestContext {
    usecase: Usecase,
    metadata: Metadata,
}

impl RequestContext {
    pub fn new(usecase: impl Into<Usecase>) -> Self {
        Self {
            usecase: usecase.into(),
            metadata: Metadata::new(),
        }
    }

    /// Add a metadata entry stored with any answer recorded for this request
    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }

    pub fn usecase(&self) -> &Usecase {
        &self.usecase
    }

    pub fn metadata(&self) -> &Metadata {
        &self.metadata
    }
}
