//! Timestamp-based post-filtering of search results

use chrono::{DateTime, Duration, NaiveDateTime, Utc};
use tracing::warn;

use super::entry::SearchResult;

/// Parse a stored timestamp: RFC 3339, or a naive ISO-8601 value read as UTC
pub fn parse_timestamp(value: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Some(dt.with_timezone(&Utc));
    }

    NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S%.f")
        .ok()
        .map(|naive| naive.and_utc())
}

/// Drop results written `max_age_hours` ago or earlier
pub fn filter_by_recency(results: Vec<SearchResult>, max_age_hours: u32) -> Vec<SearchResult> {
    filter_by_recency_at(results, max_age_hours, Utc::now())
}

/// Same as `filter_by_recency` with an explicit clock.
///
/// Results without a timestamp, or with one that does not parse, are kept.
/// A cutoff earlier than the representable range keeps everything.
pub fn filter_by_recency_at(
    results: Vec<SearchResult>,
    max_age_hours: u32,
    now: DateTime<Utc>,
) -> Vec<SearchResult> {
    let Some(cutoff) = Duration::try_hours(i64::from(max_age_hours))
        .and_then(|age| now.checked_sub_signed(age))
    else {
        return results;
    };

    results
        .into_iter()
        .filter(|result| {
            let Some(raw) = result.timestamp().filter(|s| !s.is_empty()) else {
                return true;
            };

            match parse_timestamp(raw) {
                Some(timestamp) => timestamp > cutoff,
                None => {
                    warn!(timestamp = %raw, "Error parsing timestamp, keeping result");
                    true
                }
            }
        })
        .collect()
}
