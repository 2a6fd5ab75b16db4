//! Generative model clients

pub mod gemini;
pub mod openai;
pub mod prompt;

pub use gemini::GeminiClient;
pub use openai::OpenAiClient;
pub use prompt::{APOLOGY_ANSWER, city_prompt};

use crate::Result;

/// Single-shot text completion. No streaming, no conversation state.
pub trait GenerativeModel: Send + Sync {
    fn complete(&self, prompt: &str) -> Result<String>;

    /// Provider/model label used in logs
    fn name(&self) -> &str;
}
