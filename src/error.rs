//! Error types for the study buddy core
//!
//! Every failure a user can trigger is recoverable: the session stays usable
//! after any of these errors is returned.

use thiserror::Error;

/// Failures of the external completion service.
///
/// The kinds are distinguished structurally so callers never have to match
/// on error messages.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ServiceError {
    /// Network failure or a 5xx from the provider
    #[error("completion service unavailable: {0}")]
    Unavailable(String),

    /// Missing, invalid, or rejected credential
    #[error("completion service rejected the credential: {0}")]
    Auth(String),

    /// The configured model identifier is unknown to the provider
    #[error("model '{model}' is not available: {message}")]
    ModelUnavailable { model: String, message: String },

    /// Provider quota or rate limit exhausted
    #[error("completion service quota exceeded: {0}")]
    Quota(String),

    /// Request deadline expired before the provider answered
    #[error("completion service timed out after {0}s")]
    Timeout(u64),

    /// Successful call that carried no text
    #[error("completion service returned an empty response")]
    EmptyResponse,

    /// Body could not be decoded
    #[error("completion service returned an invalid response: {0}")]
    InvalidResponse(String),
}

/// Journal validation failures
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum JournalError {
    #[error("please complete all fields before saving (missing: {})", .missing.join(", "))]
    MissingFields { missing: Vec<&'static str> },
}

/// Assessment failures
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AssessmentError {
    #[error("no assessment questions are loaded")]
    NoQuestions,

    #[error("a question bank is already loaded; reset the assessment first")]
    BankAlreadyLoaded,

    #[error("question index {index} is out of range (bank has {len} questions)")]
    QuestionOutOfRange { index: usize, len: usize },

    #[error("'{option}' is not one of the options of question {index}")]
    UnknownOption { index: usize, option: String },

    #[error("please answer {unanswered} remaining question(s)")]
    Incomplete { unanswered: usize },
}

/// Question generation failures
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GenerationError {
    #[error(transparent)]
    Service(#[from] ServiceError),

    #[error("only {found} valid question(s) could be parsed, at least {required} are needed")]
    InsufficientValidQuestions {
        found: usize,
        required: usize,
        raw: String,
    },
}

/// Feedback generation failures
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FeedbackError {
    #[error("complete at least one module (journal or assessment) before generating feedback")]
    InsufficientData,

    #[error(transparent)]
    Service(#[from] ServiceError),

    #[error("no feedback report has been generated in this session")]
    NoReport,
}

/// Literacy module progress failures
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LiteracyError {
    #[error("unknown literacy module '{0}'")]
    UnknownModule(String),

    #[error("task index {index} is out of range (module has {len} tasks)")]
    TaskOutOfRange { index: usize, len: usize },
}

/// Challenge submission failures
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ChallengeError {
    #[error("unknown challenge '{0}'")]
    UnknownChallenge(String),

    #[error("please complete all sections (missing: {})", .missing.join(", "))]
    MissingFields { missing: Vec<&'static str> },

    #[error("'{0}' is not one of the debate topics")]
    UnknownTopic(String),
}

/// Configuration failures
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Read(#[from] std::io::Error),

    #[error("failed to parse config: {0}")]
    Parse(#[from] serde_yaml::Error),

    #[error("invalid configuration: {0}")]
    Invalid(String),
}

/// Top-level error type for study buddy operations
#[derive(Error, Debug)]
pub enum StudyError {
    #[error(transparent)]
    Journal(#[from] JournalError),

    #[error(transparent)]
    Assessment(#[from] AssessmentError),

    #[error(transparent)]
    Generation(#[from] GenerationError),

    #[error(transparent)]
    Feedback(#[from] FeedbackError),

    #[error(transparent)]
    Literacy(#[from] LiteracyError),

    #[error(transparent)]
    Challenge(#[from] ChallengeError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Service(#[from] ServiceError),
}

/// Result type alias for study buddy operations
pub type Result<T> = std::result::Result<T, StudyError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_fields_display_lists_names() {
        let error = JournalError::MissingFields {
            missing: vec!["task", "usage"],
        };
        assert_eq!(
            error.to_string(),
            "please complete all fields before saving (missing: task, usage)"
        );
    }

    #[test]
    fn test_incomplete_display_counts_questions() {
        let error = AssessmentError::Incomplete { unanswered: 2 };
        assert_eq!(error.to_string(), "please answer 2 remaining question(s)");
    }

    #[test]
    fn test_model_unavailable_is_distinct_from_auth() {
        let model = ServiceError::ModelUnavailable {
            model: "gemini-pro".to_string(),
            message: "not found".to_string(),
        };
        let auth = ServiceError::Auth("bad key".to_string());
        assert_ne!(model, auth);
        assert!(model.to_string().contains("gemini-pro"));
    }

    #[test]
    fn test_service_error_is_transparent_through_feedback() {
        let error: StudyError = FeedbackError::from(ServiceError::Timeout(30)).into();
        assert_eq!(error.to_string(), "completion service timed out after 30s");
    }
}
