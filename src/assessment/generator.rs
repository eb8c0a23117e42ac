//! AI-generated question banks

use super::parser::{parse_questions, MAX_QUESTIONS};
use super::Question;
use crate::completion::CompletionService;
use crate::error::GenerationError;

/// Fewest valid questions a generated bank may contain
pub const MIN_VALID_QUESTIONS: usize = 3;

pub const GENERATION_PROMPT: &str = "Create exactly 5 multiple-choice questions that help a student \
reflect on their habits when using AI tools for learning (frequency of use, types of tasks, \
verification of AI output, feelings and ethical concerns, impact on learning).

Use exactly this format for every question, with no extra commentary:

Q1: <question text>
A. <option>
B. <option>
C. <option>
D. <option>

Number the questions Q1 to Q5 and leave a blank line between questions.";

/// Asks the completion service for a fresh bank and parses it.
///
/// The caller's existing bank is not touched; on
/// [`GenerationError::InsufficientValidQuestions`] the raw response is
/// returned for diagnostics.
pub async fn generate_questions(
    service: &dyn CompletionService,
) -> Result<Vec<Question>, GenerationError> {
    let raw = service.complete(GENERATION_PROMPT).await?;
    let parsed = parse_questions(&raw);

    if parsed.discarded > 0 {
        tracing::warn!(discarded = parsed.discarded, "Discarded malformed generated questions");
    }

    if parsed.questions.len() < MIN_VALID_QUESTIONS {
        tracing::warn!(
            found = parsed.questions.len(),
            "Generated response did not contain enough valid questions"
        );
        return Err(GenerationError::InsufficientValidQuestions {
            found: parsed.questions.len(),
            required: MIN_VALID_QUESTIONS,
            raw,
        });
    }

    debug_assert!(parsed.questions.len() <= MAX_QUESTIONS);
    tracing::info!(count = parsed.questions.len(), "Generated assessment questions");
    Ok(parsed.questions)
}
