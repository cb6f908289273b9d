// src/store/postgres.rs

use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use sqlx::{PgPool, postgres::PgPoolOptions, types::Json};
use uuid::Uuid;

use crate::{
    models::{
        attempt::{Attempt, NewAttempt},
        exam::{Exam, NewExam},
        user::User,
    },
    store::{ExamStore, StoreError},
};

const EXAM_COLUMNS: &str = "id, user_id, creation_date, exam_name, exam_description, question_data";
const ATTEMPT_COLUMNS: &str = "id, exam_id, score, time_taken, attempt_date, answers";

#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Connects with retry (the database container may still be starting).
    pub async fn connect(database_url: &str) -> Result<Self, StoreError> {
        let mut retry_count = 0;
        let pool = loop {
            match PgPoolOptions::new()
                .max_connections(5)
                .acquire_timeout(Duration::from_secs(3))
                .connect(database_url)
                .await
            {
                Ok(pool) => break pool,
                Err(e) => {
                    retry_count += 1;
                    if retry_count > 5 {
                        return Err(e.into());
                    }
                    tracing::warn!("Database not ready, retrying in 2s... (Attempt {})", retry_count);
                    tokio::time::sleep(Duration::from_secs(2)).await;
                }
            }
        };

        tracing::info!("Database connected...");
        Ok(Self::new(pool))
    }

    pub async fn migrate(&self) -> Result<(), StoreError> {
        tracing::info!("Running migrations...");
        sqlx::migrate!("./migrations").run(&self.pool).await?;
        tracing::info!("Migrations applied successfully.");
        Ok(())
    }
}

fn is_foreign_key_violation(e: &sqlx::Error) -> bool {
    e.as_database_error()
        .is_some_and(|db| db.is_foreign_key_violation())
}

fn is_unique_violation(e: &sqlx::Error) -> bool {
    e.as_database_error().is_some_and(|db| db.is_unique_violation())
}

#[async_trait]
impl ExamStore for PgStore {
    async fn create_user(&self, username: &str, password_hash: &str) -> Result<User, StoreError> {
        sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (username, password)
            VALUES ($1, $2)
            RETURNING id, username, password, created_at
            "#,
        )
        .bind(username)
        .bind(password_hash)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                StoreError::Conflict(format!("Username '{}' already exists", username))
            } else {
                tracing::error!("Failed to register user: {:?}", e);
                StoreError::from(e)
            }
        })
    }

    async fn find_user_by_username(&self, username: &str) -> Result<Option<User>, StoreError> {
        let user = sqlx::query_as::<_, User>(
            "SELECT id, username, password, created_at FROM users WHERE username = $1",
        )
        .bind(username)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    async fn insert_exam(&self, exam: NewExam) -> Result<Exam, StoreError> {
        let sql = format!(
            r#"
            INSERT INTO exams (id, user_id, creation_date, exam_name, exam_description, question_data)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING {EXAM_COLUMNS}
            "#
        );

        sqlx::query_as::<_, Exam>(&sql)
            .bind(Uuid::new_v4())
            .bind(exam.user_id)
            .bind(Utc::now())
            .bind(&exam.exam_name)
            .bind(&exam.exam_description)
            .bind(Json(&exam.questions))
            .fetch_one(&self.pool)
            .await
            .map_err(|e| {
                if is_foreign_key_violation(&e) {
                    StoreError::Unauthenticated
                } else {
                    tracing::error!("Failed to insert exam: {:?}", e);
                    StoreError::from(e)
                }
            })
    }

    async fn list_exams(&self, user_id: i64, limit: Option<i64>) -> Result<Vec<Exam>, StoreError> {
        let sql = format!(
            "SELECT {EXAM_COLUMNS} FROM exams WHERE user_id = $1 ORDER BY creation_date DESC LIMIT $2"
        );

        let exams = sqlx::query_as::<_, Exam>(&sql)
            .bind(user_id)
            .bind(limit)
            .fetch_all(&self.pool)
            .await?;

        Ok(exams)
    }

    async fn get_exam(&self, exam_id: Uuid) -> Result<Option<Exam>, StoreError> {
        let sql = format!("SELECT {EXAM_COLUMNS} FROM exams WHERE id = $1");

        let exam = sqlx::query_as::<_, Exam>(&sql)
            .bind(exam_id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(exam)
    }

    async fn update_exam(
        &self,
        exam_id: Uuid,
        exam_name: Option<String>,
        exam_description: Option<String>,
    ) -> Result<Option<Exam>, StoreError> {
        let sql = format!(
            r#"
            UPDATE exams SET
                exam_name = COALESCE($2, exam_name),
                exam_description = COALESCE($3, exam_description)
            WHERE id = $1
            RETURNING {EXAM_COLUMNS}
            "#
        );

        let exam = sqlx::query_as::<_, Exam>(&sql)
            .bind(exam_id)
            .bind(exam_name)
            .bind(exam_description)
            .fetch_optional(&self.pool)
            .await?;

        Ok(exam)
    }

    async fn insert_attempt(&self, attempt: NewAttempt) -> Result<Attempt, StoreError> {
        let sql = format!(
            r#"
            INSERT INTO attempts (id, exam_id, score, time_taken, attempt_date, answers)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING {ATTEMPT_COLUMNS}
            "#
        );

        let attempt = sqlx::query_as::<_, Attempt>(&sql)
            .bind(Uuid::new_v4())
            .bind(attempt.exam_id)
            .bind(attempt.score)
            .bind(attempt.time_taken)
            .bind(Utc::now())
            .bind(Json(&attempt.answers))
            .fetch_one(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to insert attempt: {:?}", e);
                StoreError::from(e)
            })?;

        Ok(attempt)
    }

    async fn list_attempts(&self, exam_id: Uuid) -> Result<Vec<Attempt>, StoreError> {
        let sql = format!(
            "SELECT {ATTEMPT_COLUMNS} FROM attempts WHERE exam_id = $1 ORDER BY attempt_date DESC"
        );

        let attempts = sqlx::query_as::<_, Attempt>(&sql)
            .bind(exam_id)
            .fetch_all(&self.pool)
            .await?;

        Ok(attempts)
    }

    async fn get_attempt(&self, attempt_id: Uuid) -> Result<Option<Attempt>, StoreError> {
        let sql = format!("SELECT {ATTEMPT_COLUMNS} FROM attempts WHERE id = $1");

        let attempt = sqlx::query_as::<_, Attempt>(&sql)
            .bind(attempt_id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(attempt)
    }
}
