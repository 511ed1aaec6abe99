//! Chat-completion client for any OpenAI-compatible API (OpenAI, Ollama, OpenRouter, ...)

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use std::time::Duration;

use misrecall_domain::EndpointConfig;

use crate::infrastructure::ports::{GenerationError, LlmPort, LlmRequest};

/// Default transport timeout; completions can be slow.
pub const DEFAULT_TIMEOUT_SECS: u64 = 120;

/// Client for the `/chat/completions` endpoint.
///
/// Endpoint, key and model come with each request so a settings change
/// applies to the next generation without rebuilding the client.
#[derive(Clone)]
pub struct OpenAiClient {
    client: Client,
}

impl OpenAiClient {
    pub fn new() -> Self {
        Self::with_timeout(DEFAULT_TIMEOUT_SECS)
    }

    /// Create client with custom timeout (for testing).
    pub fn with_timeout(timeout_secs: u64) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .unwrap_or_else(|_| Client::new());

        Self { client }
    }
}

impl Default for OpenAiClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl LlmPort for OpenAiClient {
    async fn complete(
        &self,
        config: &EndpointConfig,
        request: LlmRequest,
    ) -> Result<String, GenerationError> {
        let endpoint = config.endpoint.trim().trim_end_matches('/');
        if endpoint.is_empty() {
            return Err(GenerationError::NotConfigured);
        }

        let api_request = OpenAIChatRequest {
            model: config.model.clone(),
            messages: build_messages(&request),
            temperature: request.temperature,
            max_tokens: request.max_tokens,
        };

        let mut builder = self
            .client
            .post(format!("{}/chat/completions", endpoint))
            .json(&api_request);
        if let Some(key) = &config.api_key {
            builder = builder.bearer_auth(key);
        }

        let response = builder.send().await.map_err(GenerationError::network)?;

        let status = response.status();
        if !status.is_success() {
            // An unreadable body still yields an upstream error, just without detail.
            let body = response.text().await.unwrap_or_default();
            let message = upstream_message(status, &body);
            tracing::warn!(status = status.as_u16(), message = %message, "Completion request rejected");
            return Err(GenerationError::upstream(status.as_u16(), message));
        }

        let api_response: OpenAIChatResponse = response
            .json()
            .await
            .map_err(GenerationError::malformed)?;

        extract_content(api_response)
    }
}

fn build_messages(request: &LlmRequest) -> Vec<OpenAIMessage> {
    let mut messages = Vec::with_capacity(request.messages.len() + 1);

    if let Some(system) = &request.system_prompt {
        messages.push(OpenAIMessage {
            role: "system".to_string(),
            content: Some(system.clone()),
        });
    }

    for msg in &request.messages {
        messages.push(OpenAIMessage {
            role: msg.role.as_str().to_string(),
            content: Some(msg.content.clone()),
        });
    }

    messages
}

/// `error.message` from the body when present and non-empty, else the status text.
fn upstream_message(status: StatusCode, body: &str) -> String {
    serde_json::from_str::<OpenAIErrorBody>(body)
        .ok()
        .and_then(|b| b.error)
        .and_then(|e| e.message)
        .filter(|m| !m.trim().is_empty())
        .unwrap_or_else(|| {
            status
                .canonical_reason()
                .map(str::to_string)
                .unwrap_or_else(|| status.as_str().to_string())
        })
}

fn extract_content(response: OpenAIChatResponse) -> Result<String, GenerationError> {
    let message = response
        .choices
        .into_iter()
        .next()
        .and_then(|choice| choice.message)
        .ok_or_else(|| GenerationError::malformed("No message in completion response"))?;

    message
        .content
        .ok_or_else(|| GenerationError::malformed("Completion message has no content"))
}

// =============================================================================
// OpenAI API types
// =============================================================================

#[derive(Debug, Serialize)]
struct OpenAIChatRequest {
    model: String,
    messages: Vec<OpenAIMessage>,
    temperature: f32,
    max_tokens: u32,
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct OpenAIMessage {
    #[serde(default)]
    role: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct OpenAIChatResponse {
    #[serde(default)]
    choices: Vec<OpenAIChoice>,
}

#[derive(Debug, Deserialize, Default)]
struct OpenAIChoice {
    #[serde(default)]
    message: Option<OpenAIMessage>,
}

#[derive(Debug, Deserialize)]
struct OpenAIErrorBody {
    #[serde(default)]
    error: Option<OpenAIErrorDetail>,
}

#[derive(Debug, Deserialize)]
struct OpenAIErrorDetail {
    #[serde(default)]
    message: Option<String>,
}
