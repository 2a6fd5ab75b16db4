use std::sync::Arc;

use super::Resolver;
use crate::Result;
use crate::embedding::Embedder;
use crate::record::{AnswerRecord, Method};
use crate::storage::{Candidate, SimilarityIndex};

/// Minimum cosine similarity for a semantic match to be accepted
pub const DEFAULT_THRESHOLD: f32 = 0.75;

/// Tier 2: embed the question and accept the nearest stored question if it
/// is similar enough.
pub struct SemanticResolver {
    embedder: Arc<dyn Embedder>,
    index: Arc<dyn SimilarityIndex>,
    threshold: f32,
}

impl SemanticResolver {
    pub fn new(embedder: Arc<dyn Embedder>, index: Arc<dyn SimilarityIndex>) -> Self {
        Self {
            embedder,
            index,
            threshold: DEFAULT_THRESHOLD,
        }
    }

    pub fn with_threshold(mut self, threshold: f32) -> Self {
        self.threshold = threshold;
        self
    }

    pub fn threshold(&self) -> f32 {
        self.threshold
    }

    fn search(&self, question: &str) -> Result<Option<Candidate>> {
        let vector = self.embedder.embed(question)?;
        self.index.nearest(&vector)
    }
}

impl Resolver for SemanticResolver {
    fn name(&self) -> &'static str {
        "semantic"
    }

    fn resolve(&self, record: &mut AnswerRecord) -> Result<()> {
        if record.is_answered() {
            return Ok(());
        }

        let candidate = match self.search(&record.question) {
            Ok(Some(candidate)) => candidate,
            Ok(None) => {
                tracing::debug!("No candidates in similarity index");
                return Ok(());
            }
            Err(e) => {
                tracing::warn!("Vector search failed: {}", e);
                record.note_error(format!("Vector search failed: {}", e.detail()));
                return Ok(());
            }
        };

        tracing::debug!(
            "Best match similarity {:.3} for '{}'",
            candidate.score,
            candidate.question
        );
        // Kept on rejection too, for threshold tuning.
        record.similarity_score = Some(candidate.score);

        if candidate.score >= self.threshold {
            tracing::info!("Using vector match (score: {:.3})", candidate.score);
            if record.set_answer(candidate.answer, Method::VectorMatch) {
                record.matched_question = Some(candidate.question);
            }
        } else {
            tracing::debug!(
                "Similarity too low: {:.3} < {:.3}",
                candidate.score,
                self.threshold
            );
        }
        Ok(())
    }
}
