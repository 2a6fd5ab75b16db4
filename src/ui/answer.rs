//! Rendering of answer records for terminal front-ends

use crate::record::{AnswerRecord, Method};
use crate::ui::{Icons, theme};
use owo_colors::OwoColorize;

/// Shown when the user submits an empty message
pub const EMPTY_INPUT_REPLY: &str = "Please ask a question, and I'll be happy to help!";

pub fn welcome_message(city: &str) -> String {
    format!(
        "{city_icon} Welcome to the {city} FAQ Assistant!\n\n\
I can help with questions about {city}, including:\n\
  - Tourism & attractions: places to visit, weather, landmarks\n\
  - Practical info: visas, transportation, money, customs\n\
  - Culture & lifestyle: etiquette, food, shopping, nightlife\n\n\
{bulb} Ask specific questions for the best answers, e.g. \"What's the best time to visit {city}?\"\n\
Type 'exit' to quit.",
        city_icon = Icons::CITY,
        bulb = Icons::BULB,
    )
}

/// Format a finished record for display
pub fn format_answer(record: &AnswerRecord) -> String {
    let answer = record.answer.as_deref().unwrap_or("No answer available");
    let t = theme();

    match record.method {
        Some(Method::SqlMatch) => format!(
            "{} {}\n\n{}",
            Icons::CHECK,
            "Found in Database".style(t.stored.clone()),
            answer
        ),
        Some(Method::VectorMatch) => {
            let score = record.similarity_score.unwrap_or(0.0);
            let mut out = format!(
                "{} {} (Match: {:.1}%)\n\n{}",
                Icons::STATS,
                "Found in FAQ Database".style(t.stored.clone()),
                score * 100.0,
                answer
            );
            if record.is_paraphrase() {
                if let Some(matched) = &record.matched_question {
                    out.push_str(&format!(
                        "\n\n{} {}",
                        Icons::BULB,
                        format!("This answer is for: \"{}\"", matched).style(t.dim.clone())
                    ));
                }
            }
            out
        }
        Some(Method::LlmGenerated) => format!(
            "{} {}\n\n{}",
            Icons::ROBOT,
            "AI Generated Response".style(t.generated.clone()),
            answer
        ),
        Some(Method::Error) => format!(
            "{} {}\n\n{}\n\n{} Troubleshooting:\n\
- Check your internet connection\n\
- Try rephrasing your question\n\
- Wait a moment and try again",
            Icons::CROSS,
            "Service Issue".style(t.error.clone()),
            answer,
            Icons::WRENCH
        ),
        Some(Method::Fallback) => format!(
            "{} {}\n\n{}",
            Icons::WARN,
            "Fallback Response".style(t.warn.clone()),
            answer
        ),
        None => format!("{} Response\n\n{}", Icons::SEARCH, answer),
    }
}
