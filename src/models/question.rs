// src/models/question.rs

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use validator::Validate;

/// One of the four option letters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AnswerKey {
    A,
    B,
    C,
    D,
}

impl AnswerKey {
    pub fn as_str(self) -> &'static str {
        match self {
            AnswerKey::A => "A",
            AnswerKey::B => "B",
            AnswerKey::C => "C",
            AnswerKey::D => "D",
        }
    }
}

impl fmt::Display for AnswerKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AnswerKey {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "A" => Ok(AnswerKey::A),
            "B" => Ok(AnswerKey::B),
            "C" => Ok(AnswerKey::C),
            "D" => Ok(AnswerKey::D),
            _ => Err(()),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnswerOptions {
    #[serde(rename = "A", default)]
    pub a: String,
    #[serde(rename = "B", default)]
    pub b: String,
    #[serde(rename = "C", default)]
    pub c: String,
    #[serde(rename = "D", default)]
    pub d: String,
}

impl AnswerOptions {
    pub fn into_vec(self) -> Vec<String> {
        vec![self.a, self.b, self.c, self.d]
    }
}

/// A validated multiple-choice question as produced by the model.
///
/// Text fields may carry LaTeX (`$...$` / `$$...$$`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Question {
    pub id: i64,
    pub question: String,
    #[serde(default)]
    pub options: AnswerOptions,
    #[serde(rename = "correctAnswer")]
    pub correct_answer: AnswerKey,
    #[serde(default)]
    pub explanation: String,
}

/// Shape of a question inside a persisted exam.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct StoredQuestion {
    #[validate(length(min = 1, max = 5000))]
    pub question: String,

    /// Option texts in A, B, C, D order.
    #[validate(length(equal = 4, message = "Exactly four answers are required."))]
    pub answers: Vec<String>,

    #[validate(custom(function = validate_answer_letter))]
    pub correct_answer: String,

    #[validate(length(max = 10000))]
    pub explanation: String,
}

impl From<Question> for StoredQuestion {
    fn from(q: Question) -> Self {
        Self {
            question: q.question,
            answers: q.options.into_vec(),
            correct_answer: q.correct_answer.to_string(),
            explanation: q.explanation,
        }
    }
}

impl StoredQuestion {
    /// `true` when `answer` names this question's correct option.
    pub fn is_correct(&self, answer: &str) -> bool {
        !answer.is_empty() && answer == self.correct_answer
    }
}

fn validate_answer_letter(letter: &str) -> Result<(), validator::ValidationError> {
    letter
        .parse::<AnswerKey>()
        .map(|_| ())
        .map_err(|_| validator::ValidationError::new("invalid_correct_answer"))
}
