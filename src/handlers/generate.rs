// src/handlers/generate.rs

use axum::{
    Json,
    extract::{
        Multipart, State,
        multipart::{MultipartError, MultipartRejection},
    },
    http::StatusCode,
    response::IntoResponse,
};

use crate::{
    generation::{
        GenerationError, GenerationPipeline, PdfUpload,
        pipeline::GenerationRequest,
    },
    utils::jwt::AuthUser,
};

/// Generates an exam from an uploaded PDF.
///
/// Multipart fields: `file` (required, `application/pdf`) and `settings`
/// (optional JSON). The session is checked before the body is read.
pub async fn generate_questions(
    State(pipeline): State<GenerationPipeline>,
    user: Option<AuthUser>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<impl IntoResponse, GenerationError> {
    let user_id = GenerationPipeline::require_caller(user.map(|u| u.id))?;

    let multipart = multipart.map_err(|e| {
        tracing::debug!("Rejected generation form: {}", e);
        GenerationError::InvalidInput("No file provided")
    })?;

    let request = read_form(multipart).await?;
    let summary = pipeline.run(Some(user_id), request).await?;

    Ok(Json(summary))
}

async fn read_form(mut multipart: Multipart) -> Result<GenerationRequest, GenerationError> {
    let mut request = GenerationRequest::default();

    while let Some(field) = multipart.next_field().await.map_err(form_error)? {
        match field.name() {
            Some("file") => {
                let file_name = field.file_name().unwrap_or("document.pdf").to_string();
                let content_type = field.content_type().map(str::to_string);
                let bytes = field.bytes().await.map_err(form_error)?;
                request.file = Some(PdfUpload {
                    file_name,
                    content_type,
                    bytes,
                });
            }
            Some("settings") => {
                request.settings = Some(field.text().await.map_err(form_error)?);
            }
            _ => {}
        }
    }

    Ok(request)
}

fn form_error(e: MultipartError) -> GenerationError {
    tracing::debug!("Multipart read failed: {}", e);
    if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
        GenerationError::InvalidInput("File size must be less than 10MB")
    } else {
        GenerationError::InvalidInput("Invalid form data")
    }
}
