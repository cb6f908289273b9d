// src/llm/mod.rs

//! Hosted model access.

pub mod gemini;

use async_trait::async_trait;
use serde_json::Value;

pub use gemini::GeminiClient;

#[derive(Debug, thiserror::Error)]
pub enum LlmError {
    #[error("HTTP error: {0}")]
    Http(String),
    #[error("Request timed out")]
    Timeout,
    #[error("Network error: {0}")]
    Network(String),
    #[error("Rate limit exceeded")]
    RateLimit,
    #[error("Authentication failed")]
    Authentication,
    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },
    #[error("Malformed response: {0}")]
    MalformedResponse(String),
}

/// One structured-output request: instruction, schema and an inline document.
#[derive(Debug, Clone, Copy)]
pub struct StructuredRequest<'a> {
    pub instruction: &'a str,
    pub schema: &'a Value,
    pub document: &'a [u8],
    pub document_mime_type: &'a str,
}

/// A model that answers a structured-output request with text.
#[async_trait]
pub trait QuestionModel: Send + Sync {
    /// `Ok(None)` means the model answered but produced no text.
    async fn generate(&self, request: StructuredRequest<'_>) -> Result<Option<String>, LlmError>;
}
