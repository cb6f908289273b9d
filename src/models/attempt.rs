// src/models/attempt.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, types::Json};
use uuid::Uuid;
use validator::Validate;

use crate::models::question::StoredQuestion;

/// One graded answer, aligned by position with the exam's questions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttemptAnswer {
    pub is_correct: bool,
    /// Selected letter, or empty when the question was skipped.
    pub answer: String,
}

/// Represents the 'attempts' table in the database.
/// Immutable once written.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Attempt {
    pub id: Uuid,
    pub exam_id: Uuid,
    pub score: i32,
    /// Seconds.
    pub time_taken: i32,
    pub attempt_date: DateTime<Utc>,
    pub answers: Json<Vec<AttemptAnswer>>,
}

#[derive(Debug, Clone)]
pub struct NewAttempt {
    pub exam_id: Uuid,
    pub score: i32,
    pub time_taken: i32,
    pub answers: Vec<AttemptAnswer>,
}

impl NewAttempt {
    /// Grades `selected` against `questions`. Lengths must already match.
    pub fn grade(exam_id: Uuid, questions: &[StoredQuestion], selected: Vec<String>, time_taken: i32) -> Self {
        let answers: Vec<AttemptAnswer> = questions
            .iter()
            .zip(selected)
            .map(|(question, answer)| AttemptAnswer {
                is_correct: question.is_correct(&answer),
                answer,
            })
            .collect();

        let score = answers.iter().filter(|a| a.is_correct).count() as i32;

        Self {
            exam_id,
            score,
            time_taken,
            answers,
        }
    }
}

/// DTO for submitting a finished exam run.
#[derive(Debug, Deserialize, Validate)]
pub struct SubmitAttemptRequest {
    /// One entry per question: "A".."D", or "" when skipped.
    #[validate(custom(function = validate_selected_answers))]
    pub answers: Vec<String>,

    #[validate(range(min = 0, max = 604800))]
    pub time_taken: i32,
}

fn validate_selected_answers(answers: &[String]) -> Result<(), validator::ValidationError> {
    let ok = answers
        .iter()
        .all(|a| a.is_empty() || matches!(a.as_str(), "A" | "B" | "C" | "D"));
    if !ok {
        return Err(validator::ValidationError::new("invalid_answer_letter"));
    }
    Ok(())
}

/// Attempts of one exam plus the dashboard statistics.
#[derive(Debug, Serialize)]
pub struct AttemptHistory {
    pub attempts: Vec<Attempt>,
    pub best_score: Option<i32>,
    pub average_score: Option<i32>,
}

impl AttemptHistory {
    pub fn new(attempts: Vec<Attempt>) -> Self {
        let best_score = attempts.iter().map(|a| a.score).max();
        let average_score = if attempts.is_empty() {
            None
        } else {
            let total: i64 = attempts.iter().map(|a| a.score as i64).sum();
            Some((total as f64 / attempts.len() as f64).round() as i32)
        };

        Self {
            attempts,
            best_score,
            average_score,
        }
    }
}
