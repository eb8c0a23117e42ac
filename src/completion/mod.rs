//! Completion service boundary
//!
//! The feedback and question generators only ever see [`CompletionService`]:
//! one prompt in, one block of text out. Providers translate transport and
//! HTTP failures into [`ServiceError`] kinds.

pub mod gemini;
pub mod openai;

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};

use crate::config::{CompletionConfig, ProviderKind};
use crate::error::ServiceError;

pub use gemini::GeminiClient;
pub use openai::OpenAiClient;

#[async_trait]
pub trait CompletionService: Send + Sync {
    /// Sends one prompt and returns the generated text.
    ///
    /// Single attempt, no retries.
    async fn complete(&self, prompt: &str) -> Result<String, ServiceError>;

    /// Model identifier this service was configured with
    fn model(&self) -> &str;
}

/// Builds the configured provider.
pub fn from_config(config: &CompletionConfig) -> Result<Arc<dyn CompletionService>, ServiceError> {
    let client = http_client(config.timeout_seconds)?;
    let api_key = config.api_key();
    if api_key.is_none() {
        tracing::warn!(
            "{} is not set; feedback and question generation will fail until it is",
            config.api_key_env()
        );
    }

    tracing::info!(
        provider = ?config.provider,
        model = %config.model(),
        "Configured completion service"
    );

    Ok(match config.provider {
        ProviderKind::OpenAi => Arc::new(OpenAiClient::new(client, config, api_key)),
        ProviderKind::Gemini => Arc::new(GeminiClient::new(client, config, api_key)),
    })
}

pub(crate) fn http_client(timeout_seconds: u64) -> Result<Client, ServiceError> {
    Client::builder()
        .timeout(Duration::from_secs(timeout_seconds))
        .build()
        .map_err(|e| ServiceError::Unavailable(format!("failed to build HTTP client: {}", e)))
}

/// Maps a transport-level failure.
pub(crate) fn transport_error(err: reqwest::Error, timeout_seconds: u64) -> ServiceError {
    if err.is_timeout() {
        tracing::error!("Completion request timed out after {}s", timeout_seconds);
        ServiceError::Timeout(timeout_seconds)
    } else {
        tracing::error!("Completion request failed: {}", err);
        ServiceError::Unavailable(err.to_string())
    }
}

/// Maps a non-success HTTP status to a failure kind.
///
/// Some providers report an unknown model or a bad key as a plain 400, so
/// the body is consulted for those two cases.
pub(crate) fn status_error(status: StatusCode, body: &str, model: &str) -> ServiceError {
    tracing::error!("Completion service returned error {}: {}", status, body);
    let lowered = body.to_ascii_lowercase();
    let message = format!("{}: {}", status, body);

    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => ServiceError::Auth(message),
        StatusCode::NOT_FOUND => ServiceError::ModelUnavailable {
            model: model.to_string(),
            message,
        },
        StatusCode::TOO_MANY_REQUESTS => ServiceError::Quota(message),
        StatusCode::BAD_REQUEST if lowered.contains("api key") => ServiceError::Auth(message),
        StatusCode::BAD_REQUEST if names_unknown_model(body) => ServiceError::ModelUnavailable {
            model: model.to_string(),
            message,
        },
        _ => ServiceError::Unavailable(message),
    }
}

/// True when a 400 body says the requested model does not exist.
///
/// Looks at the structured `error.code` first, then at phrases providers use
/// for an unknown model. Other 400s that merely mention the model (context
/// length, bad parameters) do not count.
fn names_unknown_model(body: &str) -> bool {
    let code = serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|v| v.pointer("/error/code").and_then(|c| c.as_str()).map(str::to_string));
    if let Some(code) = code {
        if code == "model_not_found" {
            return true;
        }
    }

    let lowered = body.to_ascii_lowercase();
    lowered.contains("model")
        && ["does not exist", "not found", "is not supported", "unknown model"]
            .iter()
            .any(|phrase| lowered.contains(phrase))
}

pub(crate) fn missing_credential(config_env: &str) -> ServiceError {
    ServiceError::Auth(format!("no API key configured; set {}", config_env))
}

#[cfg(test)]
pub(crate) mod testing {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    use super::*;

    /// Scripted completion service that counts calls
    pub struct StubCompletion {
        calls: AtomicUsize,
        response: Result<String, ServiceError>,
        prompts: Mutex<Vec<String>>,
    }

    impl StubCompletion {
        pub fn replying(text: &str) -> Self {
            Self::with(Ok(text.to_string()))
        }

        pub fn failing(err: ServiceError) -> Self {
            Self::with(Err(err))
        }

        fn with(response: Result<String, ServiceError>) -> Self {
            Self {
                calls: AtomicUsize::new(0),
                response,
                prompts: Mutex::new(Vec::new()),
            }
        }

        pub fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }

        pub fn last_prompt(&self) -> Option<String> {
            self.prompts.lock().unwrap().last().cloned()
        }
    }

    #[async_trait]
    impl CompletionService for StubCompletion {
        async fn complete(&self, prompt: &str) -> Result<String, ServiceError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.prompts.lock().unwrap().push(prompt.to_string());
            self.response.clone()
        }

        fn model(&self) -> &str {
            "stub"
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_error_auth() {
        assert!(matches!(
            status_error(StatusCode::UNAUTHORIZED, "bad key", "gpt-4"),
            ServiceError::Auth(_)
        ));
        assert!(matches!(
            status_error(StatusCode::BAD_REQUEST, "API key not valid", "gemini-pro"),
            ServiceError::Auth(_)
        ));
    }

    #[test]
    fn test_status_error_model_unavailable() {
        let err = status_error(StatusCode::NOT_FOUND, "models/gemini-pro is not found", "gemini-pro");
        assert_eq!(
            err,
            ServiceError::ModelUnavailable {
                model: "gemini-pro".to_string(),
                message: "404 Not Found: models/gemini-pro is not found".to_string(),
            }
        );
    }

    #[test]
    fn test_bad_request_mentioning_model_is_not_model_unavailable() {
        let body = r#"{"error":{"message":"This model's maximum context length is 8192 tokens.","type":"invalid_request_error","code":"context_length_exceeded"}}"#;
        assert!(matches!(
            status_error(StatusCode::BAD_REQUEST, body, "gpt-4"),
            ServiceError::Unavailable(_)
        ));
    }

    #[test]
    fn test_bad_request_unknown_model() {
        let coded = r#"{"error":{"message":"nope","code":"model_not_found"}}"#;
        assert!(matches!(
            status_error(StatusCode::BAD_REQUEST, coded, "gpt-9"),
            ServiceError::ModelUnavailable { .. }
        ));
        assert!(matches!(
            status_error(StatusCode::BAD_REQUEST, "The model `gpt-9` does not exist", "gpt-9"),
            ServiceError::ModelUnavailable { .. }
        ));
    }

    #[test]
    fn test_status_error_quota_and_unavailable() {
        assert!(matches!(
            status_error(StatusCode::TOO_MANY_REQUESTS, "slow down", "m"),
            ServiceError::Quota(_)
        ));
        assert!(matches!(
            status_error(StatusCode::BAD_GATEWAY, "", "m"),
            ServiceError::Unavailable(_)
        ));
    }

    #[test]
    fn test_from_config_builds_each_provider() {
        let mut config = CompletionConfig::default();
        assert_eq!(from_config(&config).unwrap().model(), "gpt-4o-mini");

        config.provider = ProviderKind::Gemini;
        assert_eq!(from_config(&config).unwrap().model(), "gemini-1.5-flash");
    }
}
