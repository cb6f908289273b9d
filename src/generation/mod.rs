// src/generation/mod.rs

pub mod error;
pub mod parser;
pub mod pipeline;
pub mod prompt;
pub mod validator;
pub mod yaml;

use crate::models::question::Question;
use parser::{ParseError, ResponseFormat, parse_response};
use validator::{ValidationError, validate_questions};

pub use error::GenerationError;
pub use pipeline::{GenerationPipeline, PdfUpload};

/// Why model output could not be turned into questions.
#[derive(Debug, thiserror::Error)]
pub enum GenerationFailure {
    #[error(transparent)]
    Parse(#[from] ParseError),
    #[error(transparent)]
    Validation(#[from] ValidationError),
}

/// Parse then validate in one step.
pub fn decode_questions(raw: &str, format: ResponseFormat) -> Result<Vec<Question>, GenerationFailure> {
    let untrusted = parse_response(raw, format)?;
    Ok(validate_questions(untrusted)?)
}
