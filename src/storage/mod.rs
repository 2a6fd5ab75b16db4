//! Storage Layer - SQLite-backed persistence
//!
//! One database file backs both lookup tiers:
//! - faqs(id, question, answer, category, normalized) for exact matches
//! - faq_vectors(id, question, answer, vector) for nearest-neighbour search
//! - meta(key, value) for the index dimensionality

pub mod schema;
pub mod sqlite;

pub use sqlite::{FaqRow, SqliteStore, StoreStats, VectorRow};

use crate::Result;
use serde::Serialize;

/// Structured store keyed by normalized question text
pub trait FaqStore: Send + Sync {
    /// Return the answer of the first row whose normalized question matches.
    fn lookup(&self, normalized_question: &str) -> Result<Option<String>>;
}

/// Nearest-neighbour index over stored question embeddings
pub trait SimilarityIndex: Send + Sync {
    /// Return the single closest stored entry, or `None` if the index is empty.
    fn nearest(&self, vector: &[f32]) -> Result<Option<Candidate>>;
}

/// Best match returned by a [`SimilarityIndex`]
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Candidate {
    /// Cosine similarity in [-1, 1]
    pub score: f32,
    pub question: String,
    pub answer: String,
}

/// Exact-match key: trimmed and lowercased
pub fn normalize_question(question: &str) -> String {
    question.trim().to_lowercase()
}

/// Cosine similarity clamped to [-1, 1]. Mismatched or zero vectors score 0.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }
    let dot_product: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();

    if norm_a == 0.0 || norm_b == 0.0 {
        0.0
    } else {
        (dot_product / (norm_a * norm_b)).clamp(-1.0, 1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_question() {
        assert_eq!(
            normalize_question("  What is the Currency in DUBAI?  "),
            "what is the currency in dubai?"
        );
    }

    #[test]
    fn test_cosine_similarity() {
        let a = [1.0, 0.0, 0.0];
        let b = [1.0, 0.0, 0.0];
        let c = [0.0, 1.0, 0.0];
        let d = [-1.0, 0.0, 0.0];

        assert!((cosine_similarity(&a, &b) - 1.0).abs() < 1e-6);
        assert!(cosine_similarity(&a, &c).abs() < 1e-6);
        assert!((cosine_similarity(&a, &d) + 1.0).abs() < 1e-6);
        assert_eq!(cosine_similarity(&a, &[1.0, 0.0]), 0.0);
        assert_eq!(cosine_similarity(&a, &[0.0, 0.0, 0.0]), 0.0);
    }
}
