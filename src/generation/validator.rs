// src/generation/validator.rs

use std::fmt;

use serde_json::{Map, Value};

use crate::{
    generation::parser::UntrustedQuestion,
    models::question::{AnswerKey, AnswerOptions, Question},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationReason {
    NotAnObject,
    EmptyQuestionText,
    InvalidCorrectAnswer,
}

impl fmt::Display for ValidationReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ValidationReason::NotAnObject => "not an object",
            ValidationReason::EmptyQuestionText => "empty question text",
            ValidationReason::InvalidCorrectAnswer => "invalid correctAnswer",
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("question at index {index}: {reason}")]
pub struct ValidationError {
    pub reason: ValidationReason,
    pub index: usize,
}

/// Turns decoded model output into questions, filling defaults.
///
/// Stops at the first bad element; no partial result is returned.
pub fn validate_questions<I>(items: I) -> Result<Vec<Question>, ValidationError>
where
    I: IntoIterator<Item = UntrustedQuestion>,
{
    items
        .into_iter()
        .enumerate()
        .map(|(index, item)| validate_question(index, item))
        .collect()
}

fn validate_question(index: usize, UntrustedQuestion(raw): UntrustedQuestion) -> Result<Question, ValidationError> {
    let fail = |reason| ValidationError { reason, index };

    let Value::Object(fields) = raw else {
        return Err(fail(ValidationReason::NotAnObject));
    };

    let id = fields
        .get("id")
        .and_then(integer_id)
        .unwrap_or(index as i64 + 1);

    let question = text(fields.get("question"));
    if question.trim().is_empty() {
        return Err(fail(ValidationReason::EmptyQuestionText));
    }

    let options = match fields.get("options") {
        Some(Value::Object(opts)) => AnswerOptions {
            a: option_text(opts, "A"),
            b: option_text(opts, "B"),
            c: option_text(opts, "C"),
            d: option_text(opts, "D"),
        },
        _ => AnswerOptions::default(),
    };

    let letter = match fields.get("correctAnswer") {
        Some(value) if !is_blank(value) => text(Some(value)),
        _ => "A".to_string(),
    };
    let correct_answer = letter
        .parse::<AnswerKey>()
        .map_err(|_| fail(ValidationReason::InvalidCorrectAnswer))?;

    Ok(Question {
        id,
        question,
        options,
        correct_answer,
        explanation: text(fields.get("explanation")),
    })
}

/// Non-zero integer ids are kept; anything else gets back-filled.
fn integer_id(value: &Value) -> Option<i64> {
    value.as_i64().filter(|id| *id != 0)
}

/// Null, `false`, zero and the empty string all count as "not given".
fn is_blank(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Bool(b) => !b,
        Value::Number(n) => n.as_f64() == Some(0.0),
        Value::String(s) => s.is_empty(),
        Value::Array(_) | Value::Object(_) => false,
    }
}

/// Strings as-is, numbers and booleans rendered, everything else empty.
fn text(value: Option<&Value>) -> String {
    match value {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Number(n)) => n.to_string(),
        Some(Value::Bool(b)) => b.to_string(),
        _ => String::new(),
    }
}

fn option_text(options: &Map<String, Value>, letter: &str) -> String {
    text(options.get(letter))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn untrusted(values: Vec<Value>) -> Vec<UntrustedQuestion> {
        values.into_iter().map(UntrustedQuestion).collect()
    }

    #[test]
    fn missing_ids_follow_position() {
        let questions = validate_questions(untrusted(vec![
            json!({ "question": "first", "correctAnswer": "B" }),
            json!({ "id": 42, "question": "second", "correctAnswer": "C" }),
            json!({ "id": 0, "question": "third" }),
        ]))
        .unwrap();

        let ids: Vec<i64> = questions.iter().map(|q| q.id).collect();
        assert_eq!(ids, [1, 42, 3]);
        assert_eq!(questions[0].question, "first");
        assert_eq!(questions[2].correct_answer, AnswerKey::A);
    }

    #[test]
    fn missing_fields_get_defaults() {
        let questions = validate_questions(untrusted(vec![json!({
            "question": "Only text",
            "options": { "B": "two" }
        })]))
        .unwrap();

        let q = &questions[0];
        assert_eq!(q.options.a, "");
        assert_eq!(q.options.b, "two");
        assert_eq!(q.options.d, "");
        assert_eq!(q.correct_answer, AnswerKey::A);
        assert_eq!(q.explanation, "");
    }

    #[test]
    fn unset_looking_answers_fall_back_to_a() {
        let questions = validate_questions(untrusted(vec![
            json!({ "question": "a", "correctAnswer": false }),
            json!({ "question": "b", "correctAnswer": 0 }),
            json!({ "question": "c", "correctAnswer": null }),
            json!({ "question": "d", "correctAnswer": "" }),
        ]))
        .unwrap();

        assert!(questions.iter().all(|q| q.correct_answer == AnswerKey::A));

        let err = validate_questions(untrusted(vec![json!({ "question": "e", "correctAnswer": true })])).unwrap_err();
        assert_eq!(err.reason, ValidationReason::InvalidCorrectAnswer);
    }

    #[test]
    fn blank_question_reports_its_index() {
        let err = validate_questions(untrusted(vec![
            json!({ "question": "ok" }),
            json!({ "question": "   " }),
        ]))
        .unwrap_err();

        assert_eq!(err.index, 1);
        assert_eq!(err.reason, ValidationReason::EmptyQuestionText);
        assert_eq!(err.to_string(), "question at index 1: empty question text");
    }

    #[test]
    fn unknown_letter_reports_its_index() {
        let err = validate_questions(untrusted(vec![
            json!({ "question": "a", "correctAnswer": "A" }),
            json!({ "question": "b", "correctAnswer": "D" }),
            json!({ "question": "c", "correctAnswer": "E" }),
        ]))
        .unwrap_err();

        assert_eq!(err.index, 2);
        assert_eq!(err.reason, ValidationReason::InvalidCorrectAnswer);
    }

    #[test]
    fn non_object_is_rejected() {
        let err = validate_questions(untrusted(vec![json!({ "question": "a" }), json!("text")])).unwrap_err();
        assert_eq!(err.reason, ValidationReason::NotAnObject);
        assert_eq!(err.index, 1);
    }

    #[test]
    fn empty_input_is_a_valid_empty_list() {
        assert!(validate_questions(Vec::new()).unwrap().is_empty());
    }
}
