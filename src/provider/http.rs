// fitagent — HTTP completion client (OpenAI-compatible)

use super::*;
use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;

pub const DEFAULT_API_BASE: &str = "https://api.groq.com/openai/v1";

/// HttpCompletionClient speaks the OpenAI-compatible chat completions API.
/// Works with Groq, OpenAI, OpenRouter, vLLM and friends.
pub struct HttpCompletionClient {
    api_key: String,
    api_base: String,
    client: Client,
    model: String,
}

impl HttpCompletionClient {
    pub fn new(
        api_key: String,
        api_base: String,
        model: String,
        timeout: Duration,
    ) -> Result<Self, CompletionError> {
        let client = Client::builder()
            .timeout(timeout)
            .connect_timeout(Duration::from_secs(30))
            .build()?;

        let base = if api_base.is_empty() {
            DEFAULT_API_BASE.to_string()
        } else {
            api_base
        };

        Ok(Self {
            api_key,
            api_base: base,
            client,
            model,
        })
    }

    fn endpoint(&self) -> String {
        format!("{}/chat/completions", self.api_base.trim_end_matches('/'))
    }
}

#[async_trait]
impl CompletionClient for HttpCompletionClient {
    async fn complete_with(
        &self,
        prompt: &str,
        temperature: Option<f64>,
    ) -> Result<String, CompletionError> {
        let url = self.endpoint();
        let body = ChatRequest {
            model: &self.model,
            messages: vec![Message::user(prompt)],
            temperature,
        };

        tracing::debug!(
            url = %url,
            model = %self.model,
            prompt_len = prompt.len(),
            "Sending completion request"
        );

        let response = self
            .client
            .post(&url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/json")
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "could not read body".to_string());
            tracing::warn!(status = %status, "Completion API error: {}", body);
            return Err(CompletionError::RemoteFailure {
                status: status.as_u16(),
                body,
            });
        }

        let response_body = response.text().await?;
        tracing::debug!(status = %status, body_len = response_body.len(), "Completion received");
        parse_completion(&response_body)
    }

    fn model(&self) -> &str {
        &self.model
    }
}

/// Pull `choices[0].message.content` out of a chat completion body.
fn parse_completion(body: &str) -> Result<String, CompletionError> {
    let v: serde_json::Value = serde_json::from_str(body)
        .map_err(|e| CompletionError::MalformedResponse(format!("invalid JSON: {}", e)))?;

    let choice = v
        .get("choices")
        .and_then(|c| c.as_array())
        .and_then(|c| c.first())
        .ok_or_else(|| CompletionError::MalformedResponse("no choices in response".into()))?;

    choice
        .get("message")
        .and_then(|m| m.get("content"))
        .and_then(|c| c.as_str())
        .map(str::to_string)
        .ok_or_else(|| CompletionError::MalformedResponse("no message content in choice".into()))
}
