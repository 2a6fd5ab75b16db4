use std::sync::Arc;

use super::Resolver;
use crate::Result;
use crate::record::{AnswerRecord, Method};
use crate::storage::{FaqStore, normalize_question};

/// Tier 1: verbatim (case-insensitive) lookup in the structured store
pub struct ExactMatchResolver {
    store: Arc<dyn FaqStore>,
}

impl ExactMatchResolver {
    pub fn new(store: Arc<dyn FaqStore>) -> Self {
        Self { store }
    }
}

impl Resolver for ExactMatchResolver {
    fn name(&self) -> &'static str {
        "exact_match"
    }

    fn resolve(&self, record: &mut AnswerRecord) -> Result<()> {
        if record.is_answered() {
            return Ok(());
        }

        let key = normalize_question(&record.question);
        match self.store.lookup(&key) {
            Ok(Some(answer)) => {
                tracing::info!("Exact match found for '{}'", key);
                record.set_answer(answer, Method::SqlMatch);
            }
            Ok(None) => {
                tracing::debug!("No exact match for '{}'", key);
            }
            Err(e) => {
                tracing::warn!("SQL lookup failed: {}", e);
                record.note_error(format!("SQL lookup failed: {}", e.detail()));
            }
        }
        Ok(())
    }
}
