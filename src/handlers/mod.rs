// src/handlers/mod.rs

pub mod attempts;
pub mod auth;
pub mod exams;
pub mod generate;
