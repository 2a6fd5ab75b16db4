//! Resolution pipeline
//!
//! A strict linear chain: exact match, then semantic, then generative, then
//! finalization. After each step the shared predicate
//! [`AnswerRecord::is_answered`] decides whether to jump straight to
//! finalization. There are no cycles and no revisits.

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

use crate::Result;
use crate::embedding::Embedder;
use crate::llm::GenerativeModel;
use crate::record::AnswerRecord;
use crate::resolver::{ExactMatchResolver, GenerativeResolver, Resolver, SemanticResolver};
use crate::storage::{FaqStore, SimilarityIndex};

/// Ordered resolver chain shared by all requests
pub struct Pipeline {
    steps: Vec<Box<dyn Resolver>>,
}

impl Pipeline {
    /// Build a pipeline from an explicit list of steps, run in order
    pub fn new(steps: Vec<Box<dyn Resolver>>) -> Self {
        Self { steps }
    }

    /// The standard three-tier chain
    pub fn standard(
        store: Arc<dyn FaqStore>,
        embedder: Arc<dyn Embedder>,
        index: Arc<dyn SimilarityIndex>,
        model: Arc<dyn GenerativeModel>,
        options: PipelineOptions,
    ) -> Self {
        Self::new(vec![
            Box::new(ExactMatchResolver::new(store)),
            Box::new(SemanticResolver::new(embedder, index).with_threshold(options.threshold)),
            Box::new(GenerativeResolver::new(model, options.city)),
        ])
    }

    /// Names of the steps in execution order
    pub fn step_names(&self) -> Vec<&'static str> {
        self.steps.iter().map(|s| s.name()).collect()
    }

    /// Answer one question.
    ///
    /// Never panics and never fails: anything escaping a resolver is turned
    /// into a record with `method = error`. The caller must pass trimmed,
    /// non-empty text.
    pub fn process(&self, question: &str) -> AnswerRecord {
        let span = tracing::info_span!("process", question = %question);
        let _guard = span.enter();

        match panic::catch_unwind(AssertUnwindSafe(|| self.run(question))) {
            Ok(Ok(record)) => {
                tracing::debug!(
                    "Response finalized using method: {}",
                    record.method.map(|m| m.as_str()).unwrap_or("unknown")
                );
                record
            }
            Ok(Err(e)) => {
                tracing::error!("Workflow execution failed: {}", e);
                AnswerRecord::failed(question, e.to_string())
            }
            Err(payload) => {
                let detail = panic_detail(payload.as_ref());
                tracing::error!("Workflow execution panicked: {}", detail);
                AnswerRecord::failed(question, detail)
            }
        }
    }

    fn run(&self, question: &str) -> Result<AnswerRecord> {
        let mut record = AnswerRecord::new(question);

        for step in &self.steps {
            if record.is_answered() {
                tracing::debug!("Skipping {} (already answered)", step.name());
                break;
            }
            tracing::debug!("Running {}", step.name());
            step.resolve(&mut record)?;
        }

        record.finalize();
        Ok(record)
    }
}

/// Knobs for [`Pipeline::standard`]
#[derive(Debug, Clone)]
pub struct PipelineOptions {
    pub threshold: f32,
    /// City named in the generative prompt
    pub city: String,
}

impl Default for PipelineOptions {
    fn default() -> Self {
        Self {
            threshold: crate::resolver::DEFAULT_THRESHOLD,
            city: "Dubai".to_string(),
        }
    }
}

fn panic_detail(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "resolver panicked".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Error;
    use crate::llm::APOLOGY_ANSWER;
    use crate::record::{FALLBACK_ANSWER, Method};
    use crate::testing::{MockEmbedder, MockIndex, MockModel, MockStore};

    struct Doubles {
        store: Arc<MockStore>,
        embedder: Arc<MockEmbedder>,
        index: Arc<MockIndex>,
        model: Arc<MockModel>,
    }

    impl Doubles {
        fn new(store: MockStore, index: MockIndex, model: MockModel) -> Self {
            Self {
                store: Arc::new(store),
                embedder: Arc::new(MockEmbedder::new()),
                index: Arc::new(index),
                model: Arc::new(model),
            }
        }

        fn pipeline(&self) -> Pipeline {
            Pipeline::standard(
                self.store.clone(),
                self.embedder.clone(),
                self.index.clone(),
                self.model.clone(),
                PipelineOptions::default(),
            )
        }
    }

    struct ErrResolver;

    impl Resolver for ErrResolver {
        fn name(&self) -> &'static str {
            "err"
        }

        fn resolve(&self, _record: &mut AnswerRecord) -> Result<()> {
            Err(Error::Pipeline("state corrupted".to_string()))
        }
    }

    struct PanicResolver;

    impl Resolver for PanicResolver {
        fn name(&self) -> &'static str {
            "panic"
        }

        fn resolve(&self, _record: &mut AnswerRecord) -> Result<()> {
            panic!("resolver blew up");
        }
    }

    struct NoopResolver;

    impl Resolver for NoopResolver {
        fn name(&self) -> &'static str {
            "noop"
        }

        fn resolve(&self, _record: &mut AnswerRecord) -> Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_exact_match_short_circuits() {
        let d = Doubles::new(
            MockStore::with_answer("The UAE Dirham (AED)."),
            MockIndex::with_match(0.99, "q", "a"),
            MockModel::replying("unused"),
        );

        let record = d.pipeline().process("What is the currency in Dubai?");

        assert_eq!(record.method, Some(Method::SqlMatch));
        assert_eq!(record.answer.as_deref(), Some("The UAE Dirham (AED)."));
        assert!(record.similarity_score.is_none());
        assert_eq!(d.embedder.calls(), 0);
        assert_eq!(d.index.calls(), 0);
        assert_eq!(d.model.calls(), 0);
    }

    #[test]
    fn test_paraphrase_uses_vector_match() {
        let d = Doubles::new(
            MockStore::empty(),
            MockIndex::with_match(0.81, "What is the currency in Dubai?", "The UAE Dirham (AED)."),
            MockModel::replying("unused"),
        );

        let record = d.pipeline().process("currency used in Dubai");

        assert_eq!(record.method, Some(Method::VectorMatch));
        assert_eq!(record.matched_question.as_deref(), Some("What is the currency in Dubai?"));
        assert_eq!(record.similarity_score, Some(0.81));
        assert_eq!(d.store.calls(), 1);
        assert_eq!(d.model.calls(), 0);
    }

    #[test]
    fn test_below_threshold_falls_through_to_generative() {
        let d = Doubles::new(
            MockStore::empty(),
            MockIndex::with_match(0.749, "What is the Dubai Frame?", "A landmark."),
            MockModel::replying("Generated."),
        );

        let record = d.pipeline().process("Tell me a joke about camels");

        assert_eq!(record.method, Some(Method::LlmGenerated));
        assert_eq!(record.answer.as_deref(), Some("Generated."));
        assert_eq!(record.similarity_score, Some(0.749));
        assert!(record.matched_question.is_none());
        assert_eq!(d.model.calls(), 1);
    }

    #[test]
    fn test_outages_before_successful_generation() {
        let d = Doubles::new(
            MockStore::failing("disk I/O error"),
            MockIndex::failing("index unreachable"),
            MockModel::replying("Generated."),
        );

        let record = d.pipeline().process("Is Dubai expensive?");

        assert_eq!(record.method, Some(Method::LlmGenerated));
        assert_eq!(record.answer.as_deref(), Some("Generated."));
        let error = record.error.unwrap();
        assert!(error.contains("SQL lookup failed"));
        assert!(error.contains("Vector search failed"));
        assert!(!error.contains("LLM generation failed"));
    }

    #[test]
    fn test_generative_failure_yields_apology() {
        let d = Doubles::new(
            MockStore::empty(),
            MockIndex::empty(),
            MockModel::failing("503 Service Unavailable"),
        );

        let record = d.pipeline().process("Tell me a joke about camels");

        assert_eq!(record.method, Some(Method::Error));
        assert_eq!(record.answer.as_deref(), Some(APOLOGY_ANSWER));
        assert!(record.error.unwrap().contains("503 Service Unavailable"));
    }

    #[test]
    fn test_finalize_fallback_when_no_step_answers() {
        let pipeline = Pipeline::new(vec![Box::new(NoopResolver), Box::new(NoopResolver)]);

        let record = pipeline.process("q");

        assert_eq!(record.method, Some(Method::Fallback));
        assert_eq!(record.answer.as_deref(), Some(FALLBACK_ANSWER));
    }

    #[test]
    fn test_step_error_becomes_failed_record() {
        let pipeline = Pipeline::new(vec![Box::new(ErrResolver)]);

        let record = pipeline.process("q");

        assert_eq!(record.method, Some(Method::Error));
        assert!(record.answer.as_deref().unwrap().starts_with("Workflow execution failed:"));
        assert!(record.error.unwrap().contains("state corrupted"));
    }

    #[test]
    fn test_panic_is_contained() {
        let pipeline = Pipeline::new(vec![Box::new(NoopResolver), Box::new(PanicResolver)]);

        let record = pipeline.process("q");

        assert_eq!(record.method, Some(Method::Error));
        assert_eq!(record.error.as_deref(), Some("resolver blew up"));
        assert!(record.answer.is_some());
    }

    #[test]
    fn test_always_answered() {
        let d = Doubles::new(
            MockStore::failing("x"),
            MockIndex::failing("y"),
            MockModel::failing("z"),
        );
        let pipeline = d.pipeline();

        for question in ["a", "What is the weekend in Dubai?", "¿Dónde está el metro?"] {
            let record = pipeline.process(question);
            assert!(record.answer.is_some());
            assert!(record.method.is_some());
            assert_eq!(record.question, question);
        }
    }

    #[test]
    fn test_shared_across_threads() {
        let d = Doubles::new(
            MockStore::empty(),
            MockIndex::with_match(0.9, "What is the Dubai Metro?", "A driverless metro."),
            MockModel::replying("unused"),
        );
        let pipeline = Arc::new(d.pipeline());

        let handles: Vec<_> = (0..4)
            .map(|_| {
                let pipeline = Arc::clone(&pipeline);
                std::thread::spawn(move || pipeline.process("tell me about the metro"))
            })
            .collect();

        for handle in handles {
            assert_eq!(handle.join().unwrap().method, Some(Method::VectorMatch));
        }
        assert_eq!(d.index.calls(), 4);
    }

    #[test]
    fn test_step_order() {
        let d = Doubles::new(MockStore::empty(), MockIndex::empty(), MockModel::replying("x"));
        assert_eq!(d.pipeline().step_names(), vec!["exact_match", "semantic", "generative"]);
    }
}
