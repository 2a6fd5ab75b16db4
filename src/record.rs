//! Request and answer record types
//!
//! An [`AnswerRecord`] is created fresh for every question, threaded through
//! the resolver chain as `&mut`, and handed back to the caller once the
//! pipeline has finalized it.

use serde::{Deserialize, Serialize};

/// Answer used by finalization when no tier produced anything.
pub const FALLBACK_ANSWER: &str =
    "I apologize, but I'm unable to provide an answer at the moment. Please try again later.";

/// A validated question coming from a front-end
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AnswerRequest {
    question: String,
}

impl AnswerRequest {
    /// Trim raw user input. Returns `None` for empty or whitespace-only text.
    pub fn parse(raw: &str) -> Option<Self> {
        let question = raw.trim();
        if question.is_empty() {
            return None;
        }
        Some(Self {
            question: question.to_string(),
        })
    }

    pub fn question(&self) -> &str {
        &self.question
    }
}

/// Which tier (or terminal step) produced the answer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Method {
    SqlMatch,
    VectorMatch,
    LlmGenerated,
    Error,
    Fallback,
}

impl Method {
    pub fn as_str(&self) -> &'static str {
        match self {
            Method::SqlMatch => "sql_match",
            Method::VectorMatch => "vector_match",
            Method::LlmGenerated => "llm_generated",
            Method::Error => "error",
            Method::Fallback => "fallback",
        }
    }
}

impl std::fmt::Display for Method {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Method {
    type Err = crate::Error;

    fn from_str(s: &str) -> crate::Result<Self> {
        match s {
            "sql_match" => Ok(Method::SqlMatch),
            "vector_match" => Ok(Method::VectorMatch),
            "llm_generated" => Ok(Method::LlmGenerated),
            "error" => Ok(Method::Error),
            "fallback" => Ok(Method::Fallback),
            _ => Err(crate::Error::Config(format!("unknown method: {}", s))),
        }
    }
}

/// Accumulated result of one pass through the pipeline
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnswerRecord {
    pub question: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub answer: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub method: Option<Method>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub similarity_score: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub matched_question: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl AnswerRecord {
    /// Create an empty record for a question
    pub fn new(question: impl Into<String>) -> Self {
        Self {
            question: question.into(),
            answer: None,
            method: None,
            similarity_score: None,
            matched_question: None,
            error: None,
        }
    }

    /// Record produced when the pipeline itself fails
    pub fn failed(question: impl Into<String>, detail: impl Into<String>) -> Self {
        let detail = detail.into();
        Self {
            question: question.into(),
            answer: Some(format!("Workflow execution failed: {}", detail)),
            method: Some(Method::Error),
            similarity_score: None,
            matched_question: None,
            error: Some(detail),
        }
    }

    /// Short-circuit predicate shared by every tier
    pub fn is_answered(&self) -> bool {
        self.answer.is_some()
    }

    /// Set the answer unless an earlier tier already did.
    ///
    /// Returns `false` when the record was already answered and nothing changed.
    pub fn set_answer(&mut self, answer: impl Into<String>, method: Method) -> bool {
        if self.is_answered() {
            return false;
        }
        self.answer = Some(answer.into());
        self.method = Some(method);
        true
    }

    /// Append diagnostic detail. Earlier failures are kept.
    pub fn note_error(&mut self, detail: impl Into<String>) {
        let detail = detail.into();
        self.error = Some(match self.error.take() {
            Some(existing) => format!("{}; {}", existing, detail),
            None => detail,
        });
    }

    /// Terminal step: guarantee a non-null answer and method
    pub fn finalize(&mut self) {
        if !self.is_answered() {
            self.answer = Some(FALLBACK_ANSWER.to_string());
            self.method = Some(Method::Fallback);
        }
    }

    /// True when a semantic match stood in for the user's wording
    pub fn is_paraphrase(&self) -> bool {
        match &self.matched_question {
            Some(matched) => matched.to_lowercase() != self.question.to_lowercase(),
            None => false,
        }
    }
}
