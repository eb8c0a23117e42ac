use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::{json, Value};

use crate::error::{
    AssessmentError, ChallengeError, FeedbackError, GenerationError, JournalError, LiteracyError,
    ServiceError, StudyError,
};

/// Error returned by handlers; rendered as a JSON body
#[derive(Debug)]
pub struct AppError(pub StudyError);

impl<E> From<E> for AppError
where
    E: Into<StudyError>,
{
    fn from(err: E) -> Self {
        Self(err.into())
    }
}

fn service_parts(err: &ServiceError) -> (StatusCode, &'static str) {
    let kind = match err {
        ServiceError::Unavailable(_) => "service_unavailable",
        ServiceError::Auth(_) => "auth_failure",
        ServiceError::ModelUnavailable { .. } => "model_unavailable",
        ServiceError::Quota(_) => "quota_exceeded",
        ServiceError::Timeout(_) => "timeout",
        ServiceError::EmptyResponse => "empty_response",
        ServiceError::InvalidResponse(_) => "invalid_response",
    };
    let status = match err {
        ServiceError::Timeout(_) => StatusCode::GATEWAY_TIMEOUT,
        _ => StatusCode::BAD_GATEWAY,
    };
    (status, kind)
}

impl AppError {
    fn parts(&self) -> (StatusCode, &'static str, Value) {
        let mut extra = json!({});
        let (status, kind) = match &self.0 {
            StudyError::Journal(JournalError::MissingFields { missing }) => {
                extra = json!({ "missing": missing });
                (StatusCode::UNPROCESSABLE_ENTITY, "missing_fields")
            }
            StudyError::Assessment(err) => match err {
                AssessmentError::NoQuestions => (StatusCode::CONFLICT, "no_questions"),
                AssessmentError::BankAlreadyLoaded => (StatusCode::CONFLICT, "bank_already_loaded"),
                AssessmentError::QuestionOutOfRange { .. } => {
                    (StatusCode::NOT_FOUND, "question_not_found")
                }
                AssessmentError::UnknownOption { .. } => {
                    (StatusCode::UNPROCESSABLE_ENTITY, "unknown_option")
                }
                AssessmentError::Incomplete { unanswered } => {
                    extra = json!({ "unanswered": unanswered });
                    (StatusCode::CONFLICT, "incomplete_assessment")
                }
            },
            StudyError::Generation(GenerationError::InsufficientValidQuestions {
                found, raw, ..
            }) => {
                extra = json!({ "found": found, "raw": raw, "fallback_available": true });
                (StatusCode::BAD_GATEWAY, "insufficient_valid_questions")
            }
            StudyError::Generation(GenerationError::Service(err))
            | StudyError::Feedback(FeedbackError::Service(err))
            | StudyError::Service(err) => {
                extra = json!({ "fallback_available": true });
                service_parts(err)
            }
            StudyError::Feedback(FeedbackError::InsufficientData) => {
                (StatusCode::UNPROCESSABLE_ENTITY, "insufficient_data")
            }
            StudyError::Feedback(FeedbackError::NoReport) => (StatusCode::NOT_FOUND, "no_report"),
            StudyError::Literacy(LiteracyError::UnknownModule(_)) => {
                (StatusCode::NOT_FOUND, "unknown_module")
            }
            StudyError::Literacy(LiteracyError::TaskOutOfRange { .. }) => {
                (StatusCode::NOT_FOUND, "task_not_found")
            }
            StudyError::Challenge(ChallengeError::UnknownChallenge(_)) => {
                (StatusCode::NOT_FOUND, "unknown_challenge")
            }
            StudyError::Challenge(ChallengeError::MissingFields { missing }) => {
                extra = json!({ "missing": missing });
                (StatusCode::UNPROCESSABLE_ENTITY, "missing_fields")
            }
            StudyError::Challenge(ChallengeError::UnknownTopic(_)) => {
                (StatusCode::UNPROCESSABLE_ENTITY, "unknown_topic")
            }
            StudyError::Config(_) => (StatusCode::INTERNAL_SERVER_ERROR, "config"),
        };
        (status, kind, extra)
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, kind, extra) = self.parts();
        if status.is_server_error() {
            tracing::error!("{kind}: {}", self.0);
        } else {
            tracing::debug!("{kind}: {}", self.0);
        }

        let mut body = json!({ "error": kind, "message": self.0.to_string() });
        if let (Some(body), Value::Object(extra)) = (body.as_object_mut(), extra) {
            body.extend(extra);
        }
        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_incomplete_maps_to_conflict() {
        let err = AppError::from(AssessmentError::Incomplete { unanswered: 2 });
        let (status, kind, extra) = err.parts();
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(kind, "incomplete_assessment");
        assert_eq!(extra["unanswered"], 2);
    }

    #[test]
    fn test_timeout_maps_to_gateway_timeout() {
        let err = AppError::from(FeedbackError::Service(ServiceError::Timeout(30)));
        let (status, kind, extra) = err.parts();
        assert_eq!(status, StatusCode::GATEWAY_TIMEOUT);
        assert_eq!(kind, "timeout");
        assert_eq!(extra["fallback_available"], true);
    }

    #[test]
    fn test_model_unavailable_kind() {
        let err = AppError::from(GenerationError::Service(ServiceError::ModelUnavailable {
            model: "gemini-pro".to_string(),
            message: "404".to_string(),
        }));
        assert_eq!(err.parts().1, "model_unavailable");
    }
}
