// src/llm/gemini.rs

//! Minimal client for the Gemini `generateContent` endpoint.
//!
//! Calls log model name, latency and response size. The API key and the
//! document are never logged.

use std::time::Instant;

use async_trait::async_trait;
use base64::{Engine, engine::general_purpose::STANDARD};
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{error, info, instrument, warn};

use crate::config::LlmConfig;
use crate::llm::{LlmError, QuestionModel, StructuredRequest};

#[derive(Clone, Debug)]
pub struct GeminiClient {
    client: Client,
    api_key: String,
    endpoint: String,
    model: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest<'a> {
    contents: Vec<Content<'a>>,
    generation_config: GenerationConfig<'a>,
}

#[derive(Serialize)]
struct Content<'a> {
    role: &'a str,
    parts: Vec<Part<'a>>,
}

#[derive(Serialize)]
#[serde(untagged)]
enum Part<'a> {
    Text {
        text: &'a str,
    },
    #[serde(rename_all = "camelCase")]
    Inline {
        inline_data: InlineData<'a>,
    },
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct InlineData<'a> {
    mime_type: &'a str,
    data: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig<'a> {
    response_mime_type: &'a str,
    response_schema: &'a Value,
}

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
struct ResponsePart {
    text: Option<String>,
}

impl GenerateContentResponse {
    /// Concatenated text of the first candidate; `None` when it is empty.
    fn text(self) -> Option<String> {
        let text: String = self
            .candidates
            .into_iter()
            .next()?
            .content?
            .parts
            .into_iter()
            .filter_map(|p| p.text)
            .collect();

        if text.trim().is_empty() { None } else { Some(text) }
    }
}

impl GeminiClient {
    /// Returns `None` when no API key is configured.
    pub fn from_config(config: &LlmConfig) -> Result<Option<Self>, LlmError> {
        let Some(api_key) = config.api_key.clone() else {
            return Ok(None);
        };

        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| LlmError::Http(e.to_string()))?;

        let endpoint = format!(
            "{}/models/{}:generateContent",
            config.base_url.as_str().trim_end_matches('/'),
            config.model
        );

        Ok(Some(Self {
            client,
            api_key,
            endpoint,
            model: config.model.clone(),
        }))
    }

    fn build_body<'a>(request: &StructuredRequest<'a>) -> GenerateContentRequest<'a> {
        GenerateContentRequest {
            contents: vec![Content {
                role: "user",
                parts: vec![
                    Part::Text {
                        text: request.instruction,
                    },
                    Part::Inline {
                        inline_data: InlineData {
                            mime_type: request.document_mime_type,
                            data: STANDARD.encode(request.document),
                        },
                    },
                ],
            }],
            generation_config: GenerationConfig {
                response_mime_type: "application/json",
                response_schema: request.schema,
            },
        }
    }
}

#[async_trait]
impl QuestionModel for GeminiClient {
    #[instrument(skip(self, request), fields(model = %self.model, document_bytes = request.document.len()))]
    async fn generate(&self, request: StructuredRequest<'_>) -> Result<Option<String>, LlmError> {
        let started = Instant::now();

        let response = self
            .client
            .post(&self.endpoint)
            .header("x-goog-api-key", &self.api_key)
            .json(&Self::build_body(&request))
            .send()
            .await
            .map_err(|e| {
                error!(error = %e, "Gemini request failed");
                if e.is_timeout() {
                    LlmError::Timeout
                } else if e.is_connect() {
                    LlmError::Network(e.to_string())
                } else {
                    LlmError::Http(e.to_string())
                }
            })?;

        let status = response.status();
        match status {
            StatusCode::TOO_MANY_REQUESTS => {
                warn!("Gemini rate limit exceeded");
                return Err(LlmError::RateLimit);
            }
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                error!(status = %status, "Gemini authentication failed");
                return Err(LlmError::Authentication);
            }
            s if !s.is_success() => {
                let message = response
                    .text()
                    .await
                    .unwrap_or_else(|_| "Unknown error".to_string());
                error!(status = %s, "Gemini API error");
                return Err(LlmError::Api {
                    status: s.as_u16(),
                    message,
                });
            }
            _ => {}
        }

        let body: GenerateContentResponse = response.json().await.map_err(|e| {
            if e.is_timeout() {
                LlmError::Timeout
            } else {
                LlmError::MalformedResponse(e.to_string())
            }
        })?;

        let text = body.text();
        info!(
            latency_ms = started.elapsed().as_millis() as u64,
            response_chars = text.as_ref().map_or(0, String::len),
            "Gemini response received"
        );

        Ok(text)
    }
}
