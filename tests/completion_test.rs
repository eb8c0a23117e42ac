use std::time::Duration;

use serde_json::json;
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use study_buddy::completion::{CompletionService, GeminiClient, OpenAiClient};
use study_buddy::config::{CompletionConfig, ProviderKind};
use study_buddy::error::ServiceError;

fn config(provider: ProviderKind, server: &MockServer, model: &str) -> CompletionConfig {
    CompletionConfig {
        provider,
        model: Some(model.to_string()),
        api_base: Some(server.uri()),
        timeout_seconds: 1,
        ..CompletionConfig::default()
    }
}

fn openai(server: &MockServer) -> OpenAiClient {
    OpenAiClient::new(
        reqwest::Client::new(),
        &config(ProviderKind::OpenAi, server, "gpt-4o-mini"),
        Some("test-key".to_string()),
    )
}

fn gemini(server: &MockServer) -> GeminiClient {
    GeminiClient::new(
        reqwest::Client::new(),
        &config(ProviderKind::Gemini, server, "gemini-1.5-flash"),
        Some("test-key".to_string()),
    )
}

fn chat_body(content: &str) -> serde_json::Value {
    json!({
        "choices": [{
            "message": { "role": "assistant", "content": content },
            "finish_reason": "stop"
        }],
        "usage": { "prompt_tokens": 10, "completion_tokens": 5, "total_tokens": 15 }
    })
}

async fn openai_error(status: u16, body: &str) -> ServiceError {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(status).set_body_string(body))
        .mount(&server)
        .await;

    openai(&server)
        .complete("hello")
        .await
        .expect_err("non-success status should fail")
}

#[tokio::test]
async fn test_openai_returns_trimmed_text() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .and(header("authorization", "Bearer test-key"))
        .and(body_partial_json(json!({ "model": "gpt-4o-mini", "n": 1 })))
        .respond_with(ResponseTemplate::new(200).set_body_json(chat_body("  Keep a journal.\n")))
        .expect(1)
        .mount(&server)
        .await;

    let text = openai(&server).complete("Give me a tip").await.unwrap();
    assert_eq!(text, "Keep a journal.");
}

#[tokio::test]
async fn test_openai_status_mapping() {
    assert!(matches!(
        openai_error(401, "invalid api key").await,
        ServiceError::Auth(_)
    ));
    assert!(matches!(
        openai_error(404, "model not found").await,
        ServiceError::ModelUnavailable { model, .. } if model == "gpt-4o-mini"
    ));
    assert!(matches!(
        openai_error(429, "rate limited").await,
        ServiceError::Quota(_)
    ));
    assert!(matches!(
        openai_error(500, "boom").await,
        ServiceError::Unavailable(_)
    ));
    assert!(matches!(
        openai_error(400, "The model `gpt-9` does not exist").await,
        ServiceError::ModelUnavailable { .. }
    ));
}

#[tokio::test]
async fn test_openai_empty_content() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(chat_body("   ")))
        .mount(&server)
        .await;

    let err = openai(&server).complete("hello").await.unwrap_err();
    assert_eq!(err, ServiceError::EmptyResponse);
}

#[tokio::test]
async fn test_openai_invalid_body() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
        .mount(&server)
        .await;

    let err = openai(&server).complete("hello").await.unwrap_err();
    assert!(matches!(err, ServiceError::InvalidResponse(_)));
}

#[tokio::test]
async fn test_missing_key_fails_without_request() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(chat_body("unused")))
        .expect(0)
        .mount(&server)
        .await;

    let client = OpenAiClient::new(
        reqwest::Client::new(),
        &config(ProviderKind::OpenAi, &server, "gpt-4o-mini"),
        None,
    );
    let err = client.complete("hello").await.unwrap_err();
    assert!(matches!(err, ServiceError::Auth(msg) if msg.contains("OPENAI_API_KEY")));
}

#[tokio::test]
async fn test_slow_provider_times_out() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(chat_body("late"))
                .set_delay(Duration::from_secs(3)),
        )
        .mount(&server)
        .await;

    let http = reqwest::Client::builder()
        .timeout(Duration::from_millis(200))
        .build()
        .unwrap();
    let client = OpenAiClient::new(
        http,
        &config(ProviderKind::OpenAi, &server, "gpt-4o-mini"),
        Some("test-key".to_string()),
    );

    let err = client.complete("hello").await.unwrap_err();
    assert_eq!(err, ServiceError::Timeout(1));
}

#[tokio::test]
async fn test_gemini_joins_candidate_parts() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/models/gemini-1.5-flash:generateContent"))
        .and(header("x-goog-api-key", "test-key"))
        .and(body_partial_json(json!({
            "contents": [{ "parts": [{ "text": "Give me a tip" }] }]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "candidates": [{
                "content": { "parts": [{ "text": "Verify " }, { "text": "sources." }] }
            }]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let text = gemini(&server).complete("Give me a tip").await.unwrap();
    assert_eq!(text, "Verify sources.");
}

#[tokio::test]
async fn test_gemini_unknown_model() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(
            ResponseTemplate::new(404)
                .set_body_string("models/gemini-1.5-flash is not found for API version v1beta"),
        )
        .mount(&server)
        .await;

    let err = gemini(&server).complete("hello").await.unwrap_err();
    assert!(matches!(err, ServiceError::ModelUnavailable { .. }));
}

#[tokio::test]
async fn test_gemini_no_candidates_is_empty() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "candidates": [] })))
        .mount(&server)
        .await;

    let err = gemini(&server).complete("hello").await.unwrap_err();
    assert_eq!(err, ServiceError::EmptyResponse);
}
