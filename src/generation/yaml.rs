// src/generation/yaml.rs

//! YAML export/import of question lists.

use crate::{
    generation::{
        GenerationFailure,
        parser::{ResponseFormat, parse_response},
        validator::validate_questions,
    },
    models::question::Question,
};

/// Block-style YAML for `questions`.
pub fn questions_to_yaml(questions: &[Question]) -> Result<String, serde_yml::Error> {
    serde_yml::to_string(questions)
}

/// Reads a YAML (or JSON) question list, tolerating code fences, and
/// validates it the same way model output is validated.
pub fn questions_from_yaml(text: &str) -> Result<Vec<Question>, GenerationFailure> {
    let raw = parse_response(text, ResponseFormat::Yaml)?;
    Ok(validate_questions(raw)?)
}
