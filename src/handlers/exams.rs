// src/handlers/exams.rs

use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use uuid::Uuid;
use validator::Validate;

use crate::{
    error::AppError,
    models::exam::{CreateExamRequest, Exam, ExamListParams, ExamSummary, NewExam, UpdateExamRequest},
    store::ExamStore,
    utils::jwt::AuthUser,
};

/// Loads an exam the caller owns. Someone else's exam looks exactly like a missing one.
pub(crate) async fn owned_exam(store: &dyn ExamStore, user: &AuthUser, exam_id: Uuid) -> Result<Exam, AppError> {
    store
        .get_exam(exam_id)
        .await?
        .filter(|exam| exam.is_owned_by(user.id))
        .ok_or(AppError::NotFound("Exam not found".to_string()))
}

/// Lists the caller's exams, newest first.
pub async fn list_exams(
    State(store): State<Arc<dyn ExamStore>>,
    user: AuthUser,
    Query(params): Query<ExamListParams>,
) -> Result<impl IntoResponse, AppError> {
    if let Some(limit) = params.limit {
        if !(1..=100).contains(&limit) {
            return Err(AppError::BadRequest("limit must be between 1 and 100".to_string()));
        }
    }

    let exams = store.list_exams(user.id, params.limit).await?;
    let summaries: Vec<ExamSummary> = exams.iter().map(ExamSummary::from).collect();

    Ok(Json(summaries))
}

/// Creates an exam from questions supplied by the client.
pub async fn create_exam(
    State(store): State<Arc<dyn ExamStore>>,
    user: AuthUser,
    Json(payload): Json<CreateExamRequest>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let exam_name = payload.exam_name.trim().to_string();
    if exam_name.is_empty() {
        return Err(AppError::BadRequest("Exam name cannot be empty".to_string()));
    }

    let exam = store
        .insert_exam(NewExam {
            user_id: user.id,
            exam_name,
            exam_description: payload.exam_description,
            questions: payload.questions,
        })
        .await?;

    tracing::info!(exam_id = %exam.id, user_id = user.id, "Exam created");
    Ok((StatusCode::CREATED, Json(serde_json::json!({ "id": exam.id }))))
}

/// Returns one exam with its questions.
pub async fn get_exam(
    State(store): State<Arc<dyn ExamStore>>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let exam = owned_exam(store.as_ref(), &user, id).await?;
    Ok(Json(exam))
}

/// Renames an exam or changes its description.
pub async fn update_exam(
    State(store): State<Arc<dyn ExamStore>>,
    user: AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateExamRequest>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let exam_name = match payload.exam_name {
        Some(name) if name.trim().is_empty() => {
            return Err(AppError::BadRequest("Exam name cannot be empty".to_string()));
        }
        Some(name) => Some(name.trim().to_string()),
        None => None,
    };

    owned_exam(store.as_ref(), &user, id).await?;

    let exam = store
        .update_exam(id, exam_name, payload.exam_description)
        .await?
        .ok_or(AppError::NotFound("Exam not found".to_string()))?;

    Ok(Json(exam))
}
