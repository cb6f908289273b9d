// src/handlers/attempts.rs

use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use uuid::Uuid;
use validator::Validate;

use crate::{
    error::AppError,
    handlers::exams::owned_exam,
    models::attempt::{AttemptHistory, NewAttempt, SubmitAttemptRequest},
    store::ExamStore,
    utils::jwt::AuthUser,
};

/// Records a finished run of an exam.
///
/// * One answer per question, in question order ("" for skipped).
/// * Grading happens here; the client only sends its selections.
pub async fn submit_attempt(
    State(store): State<Arc<dyn ExamStore>>,
    user: AuthUser,
    Path(exam_id): Path<Uuid>,
    Json(req): Json<SubmitAttemptRequest>,
) -> Result<impl IntoResponse, AppError> {
    req.validate()?;

    let exam = owned_exam(store.as_ref(), &user, exam_id).await?;
    let questions = &exam.question_data.0;

    if req.answers.len() != questions.len() {
        return Err(AppError::BadRequest(format!(
            "Expected {} answers, got {}",
            questions.len(),
            req.answers.len()
        )));
    }

    let attempt = store
        .insert_attempt(NewAttempt::grade(exam.id, questions, req.answers, req.time_taken))
        .await?;

    tracing::info!(attempt_id = %attempt.id, exam_id = %exam.id, score = attempt.score, "Attempt recorded");

    Ok((StatusCode::CREATED, Json(attempt)))
}

/// Lists attempts of an exam, newest first, with best and average score.
pub async fn list_attempts(
    State(store): State<Arc<dyn ExamStore>>,
    user: AuthUser,
    Path(exam_id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let exam = owned_exam(store.as_ref(), &user, exam_id).await?;
    let attempts = store.list_attempts(exam.id).await?;

    Ok(Json(AttemptHistory::new(attempts)))
}

/// Returns one attempt; only the owner of its exam may read it.
pub async fn get_attempt(
    State(store): State<Arc<dyn ExamStore>>,
    user: AuthUser,
    Path(attempt_id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let not_found = || AppError::NotFound("Attempt not found".to_string());

    let attempt = store.get_attempt(attempt_id).await?.ok_or_else(not_found)?;

    let owns_exam = store
        .get_exam(attempt.exam_id)
        .await?
        .is_some_and(|exam| exam.is_owned_by(user.id));
    if !owns_exam {
        return Err(not_found());
    }

    Ok(Json(attempt))
}
