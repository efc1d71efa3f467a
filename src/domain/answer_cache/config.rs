//! Answer cache configuration

use serde::{Deserialize, Serialize};

use crate::domain::DomainError;

/// Largest accepted `max_age_hours`, one hundred years
pub const MAX_AGE_HOURS_LIMIT: u32 = 24 * 365 * 100;

/// Configuration for the cache decision policy
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    /// Whether lookups and records are performed at all
    #[serde(default = "default_enabled")]
    pub enabled: bool,

    /// Minimum vector similarity for a point to be retrieved (0.0 to 1.0)
    #[serde(default = "default_retrieval_threshold")]
    pub retrieval_threshold: f32,

    /// Minimum vector similarity for the top candidate to be served (0.0 to 1.0)
    #[serde(default = "default_acceptance_threshold")]
    pub acceptance_threshold: f32,

    /// Maximum number of candidates retrieved per lookup
    #[serde(default = "default_search_limit")]
    pub search_limit: usize,

    /// Drop candidates older than this many hours; no filtering when unset
    #[serde(default)]
    pub max_age_hours: Option<u32>,

    /// Text appended to answers served from the cache
    #[serde(default = "default_provenance_marker")]
    pub provenance_marker: String,
}

fn default_enabled() -> bool {
    true
}

fn default_retrieval_threshold() -> f32 {
    0.7
}

fn default_acceptance_threshold() -> f32 {
    0.8
}

fn default_search_limit() -> usize {
    3
}

fn default_provenance_marker() -> String {
    "\n\n*[This response was retrieved from previous similar questions]*".to_string()
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            enabled: default_enabled(),
            retrieval_threshold: default_retrieval_threshold(),
            acceptance_threshold: default_acceptance_threshold(),
            search_limit: default_search_limit(),
            max_age_hours: None,
            provenance_marker: default_provenance_marker(),
        }
    }
}

impl CacheConfig {
    /// Create a new config with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Set whether caching is enabled
    pub fn with_enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    /// Set the retrieval threshold
    pub fn with_retrieval_threshold(mut self, threshold: f32) -> Self {
        self.retrieval_threshold = threshold.clamp(0.0, 1.0);
        self
    }

    /// Set the acceptance threshold
    pub fn with_acceptance_threshold(mut self, threshold: f32) -> Self {
        self.acceptance_threshold = threshold.clamp(0.0, 1.0);
        self
    }

    /// Set the candidate limit
    pub fn with_search_limit(mut self, limit: usize) -> Self {
        self.search_limit = limit.max(1);
        self
    }

    /// Set the maximum candidate age
    pub fn with_max_age_hours(mut self, hours: u32) -> Self {
        self.max_age_hours = Some(hours);
        self
    }

    /// Set the provenance marker
    pub fn with_provenance_marker(mut self, marker: impl Into<String>) -> Self {
        self.provenance_marker = marker.into();
        self
    }

    /// Check values that bypassed the builders, e.g. loaded from files or env
    pub fn validate(&self) -> Result<(), DomainError> {
        check_threshold("retrieval_threshold", self.retrieval_threshold)?;
        check_threshold("acceptance_threshold", self.acceptance_threshold)?;

        if self.search_limit == 0 {
            return Err(DomainError::configuration(
                "cache.search_limit must be at least 1",
            ));
        }

        if let Some(hours) = self.max_age_hours {
            if hours == 0 || hours > MAX_AGE_HOURS_LIMIT {
                return Err(DomainError::configuration(format!(
                    "cache.max_age_hours must be between 1 and {}, got {}",
                    MAX_AGE_HOURS_LIMIT, hours
                )));
            }
        }

        Ok(())
    }
}

fn check_threshold(name: &str, value: f32) -> Result<(), DomainError> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(DomainError::configuration(format!(
            "cache.{} must be between 0.0 and 1.0, got {}",
            name, value
        )))
    }
}
