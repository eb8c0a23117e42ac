//! OpenAI-compatible chat completions client

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use super::{missing_credential, status_error, transport_error, CompletionService};
use crate::config::CompletionConfig;
use crate::error::ServiceError;

const SYSTEM_PROMPT: &str =
    "You are a supportive learning coach helping students use AI tools responsibly and effectively.";

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: "system".to_string(),
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: content.into(),
        }
    }
}

#[derive(Serialize, Debug)]
pub struct ChatCompletionRequest {
    pub model: String,
    pub messages: Vec<ChatMessage>,
    pub temperature: Option<f32>,
    pub max_tokens: Option<u32>,
    pub n: Option<u32>,
}

#[derive(Deserialize, Debug)]
pub struct ChatCompletionResponse {
    pub choices: Vec<ChatChoice>,
    pub usage: Option<ChatUsage>,
}

#[derive(Deserialize, Debug)]
pub struct ChatChoice {
    pub message: ChatMessage,
    pub finish_reason: Option<String>,
}

#[derive(Deserialize, Debug)]
pub struct ChatUsage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
    pub total_tokens: u32,
}

pub struct OpenAiClient {
    client: Client,
    api_base: String,
    api_key: Option<String>,
    api_key_env: String,
    model: String,
    temperature: f32,
    max_tokens: u32,
    timeout_seconds: u64,
}

impl OpenAiClient {
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

    async fn generate_chat_completion(
        &self,
        messages: Vec<ChatMessage>,
    ) -> Result<ChatCompletionResponse, ServiceError> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or_else(|| missing_credential(&self.api_key_env))?;

        let request = ChatCompletionRequest {
            model: self.model.clone(),
            messages,
            temperature: Some(self.temperature),
            max_tokens: Some(self.max_tokens),
            n: Some(1),
        };

        let response = self
            .client
            .post(format!("{}/chat/completions", self.api_base))
            .bearer_auth(api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| transport_error(e, self.timeout_seconds))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(status_error(status, &error_text, &self.model));
        }

        response.json().await.map_err(|e| {
            tracing::error!("Failed to parse chat completion response: {}", e);
            ServiceError::InvalidResponse(e.to_string())
        })
    }
}

#[async_trait]
impl CompletionService for OpenAiClient {
    async fn complete(&self, prompt: &str) -> Result<String, ServiceError> {
        tracing::debug!(model = %self.model, prompt_chars = prompt.len(), "Sending chat completion");

        let response = self
            .generate_chat_completion(vec![
                ChatMessage::system(SYSTEM_PROMPT),
                ChatMessage::user(prompt),
            ])
            .await?;

        if let Some(usage) = &response.usage {
            tracing::debug!(
                "Chat completion usage: prompt_tokens={}, completion_tokens={}, total={}",
                usage.prompt_tokens,
                usage.completion_tokens,
                usage.total_tokens
            );
        }

        let choice = response
            .choices
            .into_iter()
            .next()
            .ok_or(ServiceError::EmptyResponse)?;
        if let Some(reason) = &choice.finish_reason {
            tracing::debug!(finish_reason = %reason, "Chat completion finished");
        }

        let text = choice.message.content.trim().to_string();
        if text.is_empty() {
            return Err(ServiceError::EmptyResponse);
        }
        Ok(text)
    }

    fn model(&self) -> &str {
        &self.model
    }
}
