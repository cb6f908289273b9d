// src/generation/error.rs

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;

use crate::{generation::GenerationFailure, llm::LlmError, store::StoreError};

/// Failures of the question-generation pipeline.
///
/// `Display` is the internal description that gets logged; callers only
/// ever see [`GenerationError::user_message`].
#[derive(Debug, thiserror::Error)]
pub enum GenerationError {
    #[error("caller is not signed in")]
    Unauthorized,

    #[error("invalid input: {0}")]
    InvalidInput(&'static str),

    #[error("model client is not configured")]
    Misconfigured,

    #[error("model request failed: {0}")]
    Upstream(#[from] LlmError),

    #[error("model returned no text")]
    UpstreamEmpty,

    #[error("model output rejected: {0}")]
    GenerationFailed(#[from] GenerationFailure),

    #[error("model output contained no questions")]
    InsufficientContent,

    #[error("store rejected the owner of the new exam")]
    PersistenceAuthFailed,

    #[error("saving the exam failed: {0}")]
    PersistenceFailed(StoreError),
}

impl From<StoreError> for GenerationError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Unauthenticated => GenerationError::PersistenceAuthFailed,
            other => GenerationError::PersistenceFailed(other),
        }
    }
}

impl GenerationError {
    pub fn status(&self) -> StatusCode {
        match self {
            GenerationError::Unauthorized | GenerationError::PersistenceAuthFailed => StatusCode::UNAUTHORIZED,
            GenerationError::InvalidInput(_) => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn user_message(&self) -> &'static str {
        match self {
            GenerationError::Unauthorized => "You must be signed in to generate questions.",
            GenerationError::InvalidInput(msg) => *msg,
            GenerationError::Misconfigured | GenerationError::Upstream(LlmError::Authentication) => {
                "There's a configuration issue with our AI service. Please contact support."
            }
            GenerationError::Upstream(LlmError::RateLimit) => {
                "Our AI service is currently experiencing high demand. Please try again in a few minutes."
            }
            GenerationError::Upstream(LlmError::Timeout) => {
                "The request took too long to process. Please try with a smaller PDF or try again later."
            }
            GenerationError::Upstream(LlmError::Network(_)) => {
                "Network connection issue. Please check your internet connection and try again."
            }
            GenerationError::Upstream(_) => "An unexpected error occurred while processing your document.",
            GenerationError::UpstreamEmpty => "No response received from the AI model. Please try again.",
            GenerationError::GenerationFailed(_) => {
                "The AI had trouble processing your document. This might be due to poor document quality, unclear text, or unsupported PDF format. Please try again with a clearer PDF document."
            }
            GenerationError::InsufficientContent => {
                "Your document doesn't contain enough readable content to generate questions. Please try a more detailed PDF with clear text."
            }
            GenerationError::PersistenceAuthFailed => "You must be signed in to save exams.",
            GenerationError::PersistenceFailed(_) => "Failed to save the generated exam. Please try again.",
        }
    }
}

impl IntoResponse for GenerationError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!("Question generation failed: {}", self);
        } else {
            tracing::info!("Question generation refused: {}", self);
        }

        (status, Json(json!({ "error": self.user_message() }))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn store_auth_failure_is_distinct_from_save_failure() {
        let auth: GenerationError = StoreError::Unauthenticated.into();
        assert!(matches!(auth, GenerationError::PersistenceAuthFailed));
        assert_eq!(auth.status(), StatusCode::UNAUTHORIZED);

        let other: GenerationError = StoreError::Conflict("x".to_string()).into();
        assert_eq!(other.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert!(other.user_message().starts_with("Failed to save"));
    }

    #[test]
    fn upstream_messages_follow_failure_kind() {
        assert!(
            GenerationError::Upstream(LlmError::RateLimit)
                .user_message()
                .contains("high demand")
        );
        assert!(
            GenerationError::Upstream(LlmError::Timeout)
                .user_message()
                .contains("too long")
        );
        assert_eq!(
            GenerationError::Upstream(LlmError::Authentication).user_message(),
            GenerationError::Misconfigured.user_message()
        );
    }

    #[test]
    fn invalid_input_is_bad_request_with_its_own_message() {
        let err = GenerationError::InvalidInput("File must be a PDF");
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
        assert_eq!(err.user_message(), "File must be a PDF");
    }
}
