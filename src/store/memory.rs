// src/store/memory.rs

//! Process-local store for development without a database and for tests.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use sqlx::types::Json;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::{
    models::{
        attempt::{Attempt, NewAttempt},
        exam::{Exam, NewExam},
        user::User,
    },
    store::{ExamStore, StoreError},
};

#[derive(Default)]
struct Tables {
    users: Vec<User>,
    exams: HashMap<Uuid, Exam>,
    attempts: HashMap<Uuid, Attempt>,
}

#[derive(Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn exam_count(&self) -> usize {
        self.tables.read().await.exams.len()
    }
}

#[async_trait]
impl ExamStore for MemoryStore {
    async fn create_user(&self, username: &str, password_hash: &str) -> Result<User, StoreError> {
        let mut tables = self.tables.write().await;
        if tables.users.iter().any(|u| u.username == username) {
            return Err(StoreError::Conflict(format!("Username '{}' already exists", username)));
        }

        let user = User {
            id: tables.users.len() as i64 + 1,
            username: username.to_string(),
            password: password_hash.to_string(),
            created_at: Some(Utc::now()),
        };
        tables.users.push(user.clone());
        Ok(user)
    }

    async fn find_user_by_username(&self, username: &str) -> Result<Option<User>, StoreError> {
        let tables = self.tables.read().await;
        Ok(tables.users.iter().find(|u| u.username == username).cloned())
    }

    async fn insert_exam(&self, exam: NewExam) -> Result<Exam, StoreError> {
        let mut tables = self.tables.write().await;
        if !tables.users.iter().any(|u| u.id == exam.user_id) {
            return Err(StoreError::Unauthenticated);
        }

        let exam = Exam {
            id: Uuid::new_v4(),
            user_id: exam.user_id,
            creation_date: Utc::now(),
            exam_name: exam.exam_name,
            exam_description: exam.exam_description,
            question_data: Json(exam.questions),
        };
        tables.exams.insert(exam.id, exam.clone());
        Ok(exam)
    }

    async fn list_exams(&self, user_id: i64, limit: Option<i64>) -> Result<Vec<Exam>, StoreError> {
        let tables = self.tables.read().await;
        let mut exams: Vec<Exam> = tables
            .exams
            .values()
            .filter(|e| e.user_id == user_id)
            .cloned()
            .collect();
        exams.sort_by(|a, b| b.creation_date.cmp(&a.creation_date));

        if let Some(limit) = limit {
            exams.truncate(limit.max(0) as usize);
        }
        Ok(exams)
    }

    async fn get_exam(&self, exam_id: Uuid) -> Result<Option<Exam>, StoreError> {
        Ok(self.tables.read().await.exams.get(&exam_id).cloned())
    }

    async fn update_exam(
        &self,
        exam_id: Uuid,
        exam_name: Option<String>,
        exam_description: Option<String>,
    ) -> Result<Option<Exam>, StoreError> {
        let mut tables = self.tables.write().await;
        let Some(exam) = tables.exams.get_mut(&exam_id) else {
            return Ok(None);
        };

        if let Some(name) = exam_name {
            exam.exam_name = name;
        }
        if let Some(description) = exam_description {
            exam.exam_description = Some(description);
        }
        Ok(Some(exam.clone()))
    }

    async fn insert_attempt(&self, attempt: NewAttempt) -> Result<Attempt, StoreError> {
        let mut tables = self.tables.write().await;
        let attempt = Attempt {
            id: Uuid::new_v4(),
            exam_id: attempt.exam_id,
            score: attempt.score,
            time_taken: attempt.time_taken,
            attempt_date: Utc::now(),
            answers: Json(attempt.answers),
        };
        tables.attempts.insert(attempt.id, attempt.clone());
        Ok(attempt)
    }

    async fn list_attempts(&self, exam_id: Uuid) -> Result<Vec<Attempt>, StoreError> {
        let tables = self.tables.read().await;
        let mut attempts: Vec<Attempt> = tables
            .attempts
            .values()
            .filter(|a| a.exam_id == exam_id)
            .cloned()
            .collect();
        attempts.sort_by(|a, b| b.attempt_date.cmp(&a.attempt_date));
        Ok(attempts)
    }

    async fn get_attempt(&self, attempt_id: Uuid) -> Result<Option<Attempt>, StoreError> {
        Ok(self.tables.read().await.attempts.get(&attempt_id).cloned())
    }
}
