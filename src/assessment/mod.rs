//! Usage habit assessment
//!
//! Holds the session's question bank together with the selected answers.
//! Questions come either from the built-in bank or from the completion
//! service via [`generator::generate_questions`].

pub mod bank;
pub mod generator;
pub mod parser;

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::AssessmentError;

/// Option letters in display order
pub const OPTION_LETTERS: [char; 4] = ['A', 'B', 'C', 'D'];

/// A multiple-choice question with exactly four lettered options
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Question {
    pub text: String,
    pub options: [String; 4],
}

impl Question {
    /// Builds a question, prefixing any option that lacks its `X. ` letter.
    pub fn new(text: impl Into<String>, options: [&str; 4]) -> Self {
        let mut lettered: [String; 4] = Default::default();
        for (i, option) in options.iter().enumerate() {
            lettered[i] = ensure_letter(OPTION_LETTERS[i], option);
        }
        Self {
            text: text.into(),
            options: lettered,
        }
    }

    pub fn has_option(&self, option: &str) -> bool {
        self.options.iter().any(|o| o == option)
    }
}

fn ensure_letter(letter: char, option: &str) -> String {
    let option = option.trim();
    if option.contains(". ") {
        option.to_string()
    } else {
        format!("{letter}. {option}")
    }
}

/// Outcome of a successful submission
#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct Submission {
    pub responses: Vec<Response>,
}

/// One question paired with the recorded answer
#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct Response {
    pub index: usize,
    pub question: String,
    pub answer: String,
}

/// Question bank plus the answers recorded against it
#[derive(Serialize, Deserialize, Debug, Clone, Default)]
pub struct Assessment {
    questions: Vec<Question>,
    answers: BTreeMap<usize, String>,
}

impl Assessment {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the bank with the built-in five questions.
    pub fn load_fixed_question_bank(&mut self) {
        self.replace_questions(bank::fixed_question_bank());
    }

    /// Installs a new bank; answers recorded against the old one are dropped.
    pub fn replace_questions(&mut self, questions: Vec<Question>) {
        tracing::info!(count = questions.len(), "Loaded assessment questions");
        *self = Self {
            questions,
            answers: BTreeMap::new(),
        };
    }

    /// Records (or overwrites) the selected option for a question.
    ///
    /// The option must be one of the question's own four options.
    pub fn record_answer(&mut self, index: usize, option: &str) -> Result<(), AssessmentError> {
        let question = self
            .questions
            .get(index)
            .ok_or(AssessmentError::QuestionOutOfRange {
                index,
                len: self.questions.len(),
            })?;

        if !question.has_option(option) {
            tracing::warn!(index, option, "Rejected answer outside the option set");
            return Err(AssessmentError::UnknownOption {
                index,
                option: option.to_string(),
            });
        }

        self.answers.insert(index, option.to_string());
        Ok(())
    }

    /// Succeeds only once every loaded question has an answer.
    pub fn submit(&self) -> Result<Submission, AssessmentError> {
        if self.questions.is_empty() {
            return Err(AssessmentError::NoQuestions);
        }

        let unanswered = self.unanswered_count();
        if unanswered > 0 {
            tracing::warn!(unanswered, "Assessment submitted with unanswered questions");
            return Err(AssessmentError::Incomplete { unanswered });
        }

        tracing::info!(questions = self.questions.len(), "Assessment submitted");
        Ok(Submission {
            responses: self.responses().collect(),
        })
    }

    /// Clears the bank and every answer in one step.
    pub fn reset(&mut self) {
        *self = Self::default();
        tracing::info!("Assessment reset");
    }

    /// Answered questions in bank order
    pub fn responses(&self) -> impl Iterator<Item = Response> + '_ {
        self.answers.iter().filter_map(|(&index, answer)| {
            self.questions.get(index).map(|q| Response {
                index,
                question: q.text.clone(),
                answer: answer.clone(),
            })
        })
    }

    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    pub fn answers(&self) -> &BTreeMap<usize, String> {
        &self.answers
    }

    pub fn answer(&self, index: usize) -> Option<&str> {
        self.answers.get(&index).map(String::as_str)
    }

    pub fn has_answers(&self) -> bool {
        !self.answers.is_empty()
    }

    pub fn unanswered_count(&self) -> usize {
        (0..self.questions.len())
            .filter(|i| !self.answers.contains_key(i))
            .count()
    }
}
