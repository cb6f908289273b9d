// src/store/mod.rs

//! Persistence of users, exams and attempts.
//!
//! Ownership checks live in the handlers; the store only records `user_id`.

pub mod memory;
pub mod postgres;

use async_trait::async_trait;
use uuid::Uuid;

use crate::models::{
    attempt::{Attempt, NewAttempt},
    exam::{Exam, NewExam},
    user::User,
};

pub use memory::MemoryStore;
pub use postgres::PgStore;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The owning user does not exist (deleted account, stale token).
    #[error("Not authenticated")]
    Unauthenticated,
    #[error("{0}")]
    Conflict(String),
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),
}

#[async_trait]
pub trait ExamStore: Send + Sync {
    /// Fails with [`StoreError::Conflict`] when the username is taken.
    async fn create_user(&self, username: &str, password_hash: &str) -> Result<User, StoreError>;

    async fn find_user_by_username(&self, username: &str) -> Result<Option<User>, StoreError>;

    /// Fails with [`StoreError::Unauthenticated`] when `user_id` is unknown.
    async fn insert_exam(&self, exam: NewExam) -> Result<Exam, StoreError>;

    /// Newest first.
    async fn list_exams(&self, user_id: i64, limit: Option<i64>) -> Result<Vec<Exam>, StoreError>;

    async fn get_exam(&self, exam_id: Uuid) -> Result<Option<Exam>, StoreError>;

    /// `None` leaves a field unchanged. Returns the updated exam, or `None` if it does not exist.
    async fn update_exam(
        &self,
        exam_id: Uuid,
        exam_name: Option<String>,
        exam_description: Option<String>,
    ) -> Result<Option<Exam>, StoreError>;

    async fn insert_attempt(&self, attempt: NewAttempt) -> Result<Attempt, StoreError>;

    /// Newest first.
    async fn list_attempts(&self, exam_id: Uuid) -> Result<Vec<Attempt>, StoreError>;

    async fn get_attempt(&self, attempt_id: Uuid) -> Result<Option<Attempt>, StoreError>;
}
