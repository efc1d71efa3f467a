//! Query canonicalization and keyword extraction

use once_cell::sync::Lazy;
use regex::Regex;

/// Anything that is neither a word character nor whitespace
static NON_WORD_PATTERN: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^\w\s]").unwrap());

static WORD_PATTERN: Lazy<Regex> = Lazy::new(|| Regex::new(r"\b\w+\b").unwrap());

/// Default number of keywords returned by `extract_keywords`
pub const DEFAULT_MAX_KEYWORDS: usize = 5;

const STOP_WORDS: &[&str] = &[
    "the", "a", "an", "and", "or", "but", "in", "on", "at", "to", "for", "of", "with", "by", "is",
    "are", "was", "were", "be", "been", "have", "has", "had", "do", "does", "did", "will",
    "would", "could", "should", "may", "might", "must", "shall", "can", "this", "that", "these",
    "those",
];

/// Strip punctuation, lowercase and collapse whitespace
pub fn normalize_query(query: &str) -> String {
    NON_WORD_PATTERN
        .replace_all(query, "")
        .to_lowercase()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// Unique non-stop-word tokens longer than two characters, in first-seen order
pub fn extract_keywords(text: &str, max_keywords: usize) -> Vec<String> {
    let lowered = text.to_lowercase();
    let mut keywords: Vec<String> = Vec::new();

    for word in WORD_PATTERN.find_iter(&lowered).map(|m| m.as_str()) {
        if keywords.len() >= max_keywords {
            break;
        }

        if word.chars().count() <= 2 || STOP_WORDS.contains(&word) {
            continue;
        }

        if !keywords.iter().any(|k| k == word) {
            keywords.push(word.to_string());
        }
    }

    keywords
}
