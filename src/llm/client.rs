use std::time::Duration;

use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::config::LlmConfig;
use crate::error::{AppError, Result};

/// Client for an OpenAI-compatible `/chat/completions` endpoint.
pub struct ChatClient {
    client: Client,
    api_url: String,
    api_key: String,
    model: String,
    temperature: f32,
}

impl ChatClient {
    pub fn new(config: &LlmConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            client,
            api_url: config.api_url.clone(),
            api_key: config.api_key.clone(),
            model: config.model.clone(),
            temperature: config.temperature,
        })
    }

    /// Send the conversation and return the first choice's message content.
    pub async fn complete(&self, messages: &[Message]) -> Result<String> {
        let request = ChatRequest {
            model: &self.model,
            messages,
            temperature: self.temperature,
        };

        let response = self
            .client
            .post(&self.api_url)
            .bearer_auth(&self.api_key)
            .header("content-type", "application/json")
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        let parsed = serde_json::from_str::<ChatResponse>(&body).ok();

        if let Some(error) = parsed.as_ref().and_then(|p| p.error.as_ref()) {
            return Err(error.to_app_error(status));
        }
        if !status.is_success() {
            return Err(AppError::LlmApi(format!("API returned {status}: {body}")));
        }

        parsed
            .and_then(|p| p.choices.into_iter().next())
            .and_then(|c| c.message)
            .and_then(|m| m.content)
            .filter(|content| !content.trim().is_empty())
            .ok_or_else(|| AppError::LlmApi(format!("No message content in response: {body}")))
    }
}

// --- Request types ---

#[derive(Debug, Serialize)]
pub struct ChatRequest<'a> {
    pub model: &'a str,
    pub messages: &'a [Message],
    pub temperature: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub role: String,
    pub content: String,
}

impl Message {
    pub fn system(content: impl Into<String>) -> Self {
        Self::new("system", content)
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::new("user", content)
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new("assistant", content)
    }

    fn new(role: &str, content: impl Into<String>) -> Self {
        Self {
            role: role.to_string(),
            content: content.into(),
        }
    }
}

// --- Response types ---

#[derive(Debug, Deserialize)]
pub struct ChatResponse {
    #[serde(default)]
    pub choices: Vec<Choice>,
    pub error: Option<ApiError>,
}

#[derive(Debug, Deserialize)]
pub struct Choice {
    pub message: Option<ResponseMessage>,
}

#[derive(Debug, Deserialize)]
pub struct ResponseMessage {
    pub content: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ApiError {
    #[serde(default)]
    pub message: String,
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub code: Option<serde_json::Value>,
}

impl ApiError {
    /// Whether the request was rejected for exceeding the model's input limit.
    pub fn is_context_length(&self) -> bool {
        let code = self.code.as_ref().and_then(|c| c.as_str()).unwrap_or("");
        let message = self.message.to_lowercase();
        code == "context_length_exceeded"
            || message.contains("token limit")
            || message.contains("context length")
            || message.contains("maximum context")
    }

    fn to_app_error(&self, status: reqwest::StatusCode) -> AppError {
        if self.is_context_length() {
            AppError::LlmContextLength(self.message.clone())
        } else {
            AppError::LlmApi(format!(
                "API returned {status} ({}): {}",
                self.kind.as_deref().unwrap_or("error"),
                self.message
            ))
        }
    }
}
