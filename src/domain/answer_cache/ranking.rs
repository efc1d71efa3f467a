//! Hybrid re-ranking of search results

use std::cmp::Ordering;
use std::collections::HashSet;

use super::entry::SearchResult;
use super::normalizer::normalize_query;

/// Weight of the vector similarity in the combined score
pub const VECTOR_WEIGHT: f32 = 0.7;

/// Weight of the lexical similarity in the combined score
pub const TEXT_WEIGHT: f32 = 0.3;

/// Jaccard similarity of the whitespace-separated word sets; 0 for an empty union
pub fn jaccard_similarity(a: &str, b: &str) -> f32 {
    let a_lower = a.to_lowercase();
    let b_lower = b.to_lowercase();
    let words_a: HashSet<&str> = a_lower.split_whitespace().collect();
    let words_b: HashSet<&str> = b_lower.split_whitespace().collect();

    let union = words_a.union(&words_b).count();

    if union == 0 {
        return 0.0;
    }

    words_a.intersection(&words_b).count() as f32 / union as f32
}

/// Weighted blend of a vector score and a text score
pub fn combined_score(vector_score: f32, text_score: f32) -> f32 {
    VECTOR_WEIGHT * vector_score + TEXT_WEIGHT * text_score
}

/// Attach combined scores and sort by them, highest first.
///
/// `normalized_query` must already be normalized; candidate questions are
/// normalized here. Equal scores keep their incoming order.
pub fn rank_by_relevance(mut results: Vec<SearchResult>, normalized_query: &str) -> Vec<SearchResult> {
    for result in results.iter_mut() {
        let text_score = jaccard_similarity(normalized_query, &normalize_query(&result.question));
        result.combined_score = Some(combined_score(result.vector_score, text_score));
    }

    results.sort_by(|a, b| {
        b.combined_score
            .partial_cmp(&a.combined_score)
            .unwrap_or(Ordering::Equal)
    });

    results
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::answer_cache::Metadata;

    fn result(question: &str, score: f32) -> SearchResult {
        SearchResult::new(question, format!("answer to {}", question), score, Metadata::new())
    }

    #[test]
    fn test_jaccard_identical() {
        assert_eq!(jaccard_similarity("what is ai", "what is ai"), 1.0);
    }

    #[test]
    fn test_jaccard_partial_overlap() {
        // {what, is, ai} vs {what, is, ml}: 2 shared of 4
        assert!((jaccard_similarity("what is ai", "what is ml") - 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_jaccard_empty() {
        assert_eq!(jaccard_similarity("", ""), 0.0);
        assert_eq!(jaccard_similarity("", "what is ai"), 0.0);
    }

    #[test]
    fn test_jaccard_is_case_insensitive() {
        assert_eq!(jaccard_similarity("What IS ai", "what is AI"), 1.0);
    }

    #[test]
    fn test_text_similarity_reorders_candidates() {
        let query = "a b c d e f g h i";
        let candidates = vec![
            // jaccard 0.0 with the query
            result("unrelated wording entirely", 0.80),
            // 9 shared words of 10: jaccard 0.9
            result("a b c d e f g h i j", 0.75),
        ];

        let ranked = rank_by_relevance(candidates, query);

        assert_eq!(ranked[0].question, "a b c d e f g h i j");
        assert!((ranked[0].combined_score.unwrap() - 0.795).abs() < 1e-5);
        assert!((ranked[1].combined_score.unwrap() - 0.56).abs() < 1e-5);
        // raw vector scores are untouched
        assert_eq!(ranked[0].vector_score, 0.75);
        assert_eq!(ranked[1].vector_score, 0.80);
    }

    #[test]
    fn test_candidate_question_is_normalized() {
        let ranked = rank_by_relevance(vec![result("What is AI?", 0.9)], "what is ai");

        assert!((ranked[0].combined_score.unwrap() - (0.7 * 0.9 + 0.3)).abs() < 1e-5);
    }

    #[test]
    fn test_empty_query_uses_vector_score_only() {
        let ranked = rank_by_relevance(vec![result("anything", 0.9)], "");

        assert!((ranked[0].combined_score.unwrap() - 0.63).abs() < 1e-5);
    }

    #[test]
    fn test_rank_empty_results() {
        assert!(rank_by_relevance(Vec::new(), "query").is_empty());
    }
}
