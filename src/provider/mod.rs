// fitagent — Completion provider abstraction

pub mod factory;
pub mod http;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

// ---------------------------------------------------------------------------
// Core types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub role: String,
    pub content: String,
}

impl Message {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".into(),
            content: content.into(),
        }
    }
}

/// Request body for an OpenAI-compatible `/chat/completions` call.
#[derive(Debug, Clone, Serialize)]
pub struct ChatRequest<'a> {
    pub model: &'a str,
    pub messages: Vec<Message>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f64>,
}

#[derive(Error, Debug)]
pub enum CompletionError {
    #[error("completion API error ({status}): {body}")]
    RemoteFailure { status: u16, body: String },
    #[error("malformed completion response: {0}")]
    MalformedResponse(String),
    #[error("completion request failed: {0}")]
    Transport(#[from] reqwest::Error),
}

// ---------------------------------------------------------------------------
// Client trait
// ---------------------------------------------------------------------------

/// A single-turn text completion service. One call, one attempt.
#[async_trait]
pub trait CompletionClient: Send + Sync {
    async fn complete_with(
        &self,
        prompt: &str,
        temperature: Option<f64>,
    ) -> Result<String, CompletionError>;

    async fn complete(&self, prompt: &str) -> Result<String, CompletionError> {
        self.complete_with(prompt, None).await
    }

    fn model(&self) -> &str;
}
