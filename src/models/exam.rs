// src/models/exam.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, types::Json};
use uuid::Uuid;
use validator::Validate;

use crate::models::question::StoredQuestion;

/// Represents the 'exams' table in the database.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Exam {
    pub id: Uuid,

    /// Owner. Only this user may read, rename or attempt the exam.
    pub user_id: i64,

    pub creation_date: DateTime<Utc>,
    pub exam_name: String,
    pub exam_description: Option<String>,

    /// Stored as a JSONB array.
    pub question_data: Json<Vec<StoredQuestion>>,
}

impl Exam {
    pub fn is_owned_by(&self, user_id: i64) -> bool {
        self.user_id == user_id
    }

    pub fn question_count(&self) -> usize {
        self.question_data.0.len()
    }
}

/// Everything needed to insert an exam; id and timestamp are assigned by the store.
#[derive(Debug, Clone)]
pub struct NewExam {
    pub user_id: i64,
    pub exam_name: String,
    pub exam_description: Option<String>,
    pub questions: Vec<StoredQuestion>,
}

/// List item for the dashboard.
#[derive(Debug, Serialize)]
pub struct ExamSummary {
    pub id: Uuid,
    pub exam_name: String,
    pub exam_description: Option<String>,
    pub creation_date: DateTime<Utc>,
    pub question_count: usize,
}

impl From<&Exam> for ExamSummary {
    fn from(exam: &Exam) -> Self {
        Self {
            id: exam.id,
            exam_name: exam.exam_name.clone(),
            exam_description: exam.exam_description.clone(),
            creation_date: exam.creation_date,
            question_count: exam.question_count(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct ExamListParams {
    pub limit: Option<i64>,
}

/// DTO for creating an exam by hand.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateExamRequest {
    #[validate(length(min = 1, max = 200))]
    pub exam_name: String,
    #[validate(length(max = 1000))]
    pub exam_description: Option<String>,
    #[validate(length(min = 1, max = 100))]
    #[validate(nested)]
    pub questions: Vec<StoredQuestion>,
}

/// DTO for renaming an exam. Absent fields are left untouched.
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateExamRequest {
    #[validate(length(min = 1, max = 200))]
    pub exam_name: Option<String>,
    #[validate(length(max = 1000))]
    pub exam_description: Option<String>,
}

/// Response of a successful generation request.
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct GenerationSummary {
    pub success: bool,
    pub exam_id: Uuid,
    pub file_name: String,
    pub file_size: usize,
    pub question_count: usize,
}
