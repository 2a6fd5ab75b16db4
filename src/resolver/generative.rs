use std::sync::Arc;

use super::Resolver;
use crate::Result;
use crate::llm::{APOLOGY_ANSWER, GenerativeModel, city_prompt};
use crate::record::{AnswerRecord, Method};

/// Tier 3: ask a generative model. Always leaves the record answered.
pub struct GenerativeResolver {
    model: Arc<dyn GenerativeModel>,
    city: String,
}

impl GenerativeResolver {
    pub fn new(model: Arc<dyn GenerativeModel>, city: impl Into<String>) -> Self {
        Self {
            model,
            city: city.into(),
        }
    }
}

impl Resolver for GenerativeResolver {
    fn name(&self) -> &'static str {
        "generative"
    }

    fn resolve(&self, record: &mut AnswerRecord) -> Result<()> {
        if record.is_answered() {
            return Ok(());
        }

        tracing::debug!("Generating response with {}", self.model.name());
        let prompt = city_prompt(&self.city, &record.question);

        match self.model.complete(&prompt) {
            Ok(text) => {
                tracing::info!("Generated answer using {}", self.model.name());
                record.set_answer(text, Method::LlmGenerated);
            }
            Err(e) => {
                tracing::warn!("LLM generation failed: {}", e);
                record.set_answer(APOLOGY_ANSWER, Method::Error);
                record.note_error(format!("LLM generation failed: {}", e.detail()));
            }
        }
        Ok(())
    }
}
