// src/state.rs

use std::sync::Arc;

use axum::extract::FromRef;

use crate::{config::Config, generation::GenerationPipeline, llm::QuestionModel, store::ExamStore};

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn ExamStore>,
    /// `None` when no model API key is configured.
    pub model: Option<Arc<dyn QuestionModel>>,
    pub config: Config,
}

impl FromRef<AppState> for Arc<dyn ExamStore> {
    fn from_ref(state: &AppState) -> Self {
        state.store.clone()
    }
}

impl FromRef<AppState> for Config {
    fn from_ref(state: &AppState) -> Self {
        state.config.clone()
    }
}

impl FromRef<AppState> for GenerationPipeline {
    fn from_ref(state: &AppState) -> Self {
        GenerationPipeline::new(state.model.clone(), state.store.clone())
    }
}
