// src/generation/pipeline.rs

use std::sync::{Arc, LazyLock};

use axum::body::Bytes;
use regex::Regex;
use tracing::instrument;

use crate::{
    config::MAX_PDF_BYTES,
    generation::{GenerationError, decode_questions, parser::ResponseFormat, prompt::build_prompt},
    llm::{QuestionModel, StructuredRequest},
    models::{
        exam::{GenerationSummary, NewExam},
        question::StoredQuestion,
        settings::GenerationSettings,
    },
    store::ExamStore,
};

pub const PDF_MIME_TYPE: &str = "application/pdf";

static PDF_EXTENSION: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)\.pdf$").expect("static regex"));

/// An uploaded file as received from the client.
#[derive(Debug, Clone)]
pub struct PdfUpload {
    pub file_name: String,
    /// Declared MIME type of the multipart field.
    pub content_type: Option<String>,
    pub bytes: Bytes,
}

impl PdfUpload {
    pub fn size(&self) -> usize {
        self.bytes.len()
    }
}

/// Inputs of one generation request, after authentication.
#[derive(Debug, Default)]
pub struct GenerationRequest {
    pub file: Option<PdfUpload>,
    /// Raw JSON of the `settings` form field.
    pub settings: Option<String>,
}

/// Upload → prompt → model → parse/validate → persist.
///
/// Holds no per-request state; cheap to clone.
#[derive(Clone)]
pub struct GenerationPipeline {
    model: Option<Arc<dyn QuestionModel>>,
    store: Arc<dyn ExamStore>,
}

impl GenerationPipeline {
    pub fn new(model: Option<Arc<dyn QuestionModel>>, store: Arc<dyn ExamStore>) -> Self {
        Self { model, store }
    }

    /// First step of every request: there must be a signed-in caller.
    pub fn require_caller(caller: Option<i64>) -> Result<i64, GenerationError> {
        caller.ok_or(GenerationError::Unauthorized)
    }

    /// Presence, MIME type and size checks, in that order.
    pub fn check_file(file: Option<PdfUpload>) -> Result<PdfUpload, GenerationError> {
        let file = file.ok_or(GenerationError::InvalidInput("No file provided"))?;

        if file.content_type.as_deref() != Some(PDF_MIME_TYPE) {
            return Err(GenerationError::InvalidInput("File must be a PDF"));
        }

        if file.size() > MAX_PDF_BYTES {
            return Err(GenerationError::InvalidInput("File size must be less than 10MB"));
        }

        Ok(file)
    }

    #[instrument(skip_all, fields(user_id = ?caller))]
    pub async fn run(&self, caller: Option<i64>, request: GenerationRequest) -> Result<GenerationSummary, GenerationError> {
        let user_id = Self::require_caller(caller)?;
        let file = Self::check_file(request.file)?;
        let settings = GenerationSettings::from_form_field(request.settings.as_deref());
        let prompt = build_prompt(&settings);

        tracing::info!(
            file_name = %file.file_name,
            file_size = file.size(),
            number_of_questions = settings.number_of_questions,
            difficulty = settings.difficulty.as_str(),
            explanation = settings.explanation.as_str(),
            "Generating questions"
        );

        let model = self.model.as_ref().ok_or(GenerationError::Misconfigured)?;
        let text = model
            .generate(StructuredRequest {
                instruction: &prompt.instruction,
                schema: &prompt.schema,
                document: &file.bytes,
                document_mime_type: PDF_MIME_TYPE,
            })
            .await?
            .ok_or(GenerationError::UpstreamEmpty)?;

        let questions = decode_questions(&text, ResponseFormat::Json).map_err(|e| {
            tracing::error!(error = %e, response_chars = text.len(), "Failed to parse model response");
            tracing::debug!(response = %text, "Rejected model response");
            GenerationError::GenerationFailed(e)
        })?;

        if questions.is_empty() {
            return Err(GenerationError::InsufficientContent);
        }

        let question_count = questions.len();
        let exam = NewExam {
            user_id,
            exam_name: exam_name_from_file(&file.file_name),
            exam_description: Some(exam_description(&file.file_name, question_count)),
            questions: questions.into_iter().map(StoredQuestion::from).collect(),
        };

        let exam = self.store.insert_exam(exam).await.map_err(|e| {
            tracing::error!("Error saving generated exam: {}", e);
            GenerationError::from(e)
        })?;

        tracing::info!(exam_id = %exam.id, question_count, "Exam generated");

        Ok(GenerationSummary {
            success: true,
            exam_id: exam.id,
            file_name: file.file_name,
            file_size: file.bytes.len(),
            question_count,
        })
    }
}

/// File name without a trailing `.pdf` (any case).
pub fn exam_name_from_file(file_name: &str) -> String {
    PDF_EXTENSION.replace(file_name, "").into_owned()
}

pub fn exam_description(file_name: &str, question_count: usize) -> String {
    format!("Generated from {file_name} containing {question_count} questions")
}
