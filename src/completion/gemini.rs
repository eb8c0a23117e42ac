//! Google Gemini `generateContent` client

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use super::{missing_credential, status_error, transport_error, CompletionService};
use crate::config::CompletionConfig;
use crate::error::ServiceError;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiRequest {
    contents: Vec<Content>,
    generation_config: GenerationConfig,
}

#[derive(Serialize)]
struct Content {
    parts: Vec<Part>,
}

#[derive(Serialize)]
struct Part {
    text: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    temperature: f32,
    max_output_tokens: u32,
}

#[derive(Deserialize)]
struct GeminiResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
struct Candidate {
    content: Option<ContentResponse>,
}

#[derive(Deserialize)]
struct ContentResponse {
    #[serde(default)]
    parts: Vec<PartResponse>,
}

#[derive(Deserialize)]
struct PartResponse {
    #[serde(default)]
    text: String,
}

pub struct GeminiClient {
    client: Client,
    api_base: String,
    api_key: Option<String>,
    api_key_env: String,
    model: String,
    temperature: f32,
    max_tokens: u32,
    timeout_seconds: u64,
}

impl GeminiClient {
    pub fn new(client: Client, config: &CompletionConfig, api_key: Option<String>) -> Self {
        Self {
            client,
            api_base: config.api_base(),
            api_key,
            api_key_env: config.api_key_env(),
            model: config.model(),
            temperature: config.temperature,
            max_tokens: config.max_tokens,
            timeout_seconds: config.timeout_seconds,
        }
    }

    fn endpoint(&self) -> String {
        let model = self.model.trim_start_matches("models/");
        format!("{}/models/{}:generateContent", self.api_base, model)
    }
}

#[async_trait]
impl CompletionService for GeminiClient {
    async fn complete(&self, prompt: &str) -> Result<String, ServiceError> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or_else(|| missing_credential(&self.api_key_env))?;

        let request = GeminiRequest {
            contents: vec![Content {
                parts: vec![Part {
                    text: prompt.to_string(),
                }],
            }],
            generation_config: GenerationConfig {
                temperature: self.temperature,
                max_output_tokens: self.max_tokens,
            },
        };

        tracing::debug!(model = %self.model, prompt_chars = prompt.len(), "Sending Gemini request");

        let response = self
            .client
            .post(self.endpoint())
            .header("x-goog-api-key", api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| transport_error(e, self.timeout_seconds))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(status_error(status, &error_text, &self.model));
        }

        let body: GeminiResponse = response.json().await.map_err(|e| {
            tracing::error!("Failed to parse Gemini response: {}", e);
            ServiceError::InvalidResponse(e.to_string())
        })?;

        let text: String = body
            .candidates
            .into_iter()
            .next()
            .and_then(|c| c.content)
            .map(|content| {
                content
                    .parts
                    .into_iter()
                    .map(|p| p.text)
                    .collect::<Vec<_>>()
                    .join("")
            })
            .unwrap_or_default();

        let text = text.trim();
        if text.is_empty() {
            return Err(ServiceError::EmptyResponse);
        }
        Ok(text.to_string())
    }

    fn model(&self) -> &str {
        &self.model
    }
}
