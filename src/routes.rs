// src/routes.rs

use axum::{
    Router,
    extract::DefaultBodyLimit,
    http::{HeaderValue, Method, header},
    routing::{get, post},
};
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::{
    config::MAX_PDF_BYTES,
    handlers::{attempts, auth, exams, generate},
    state::AppState,
};

/// Multipart framing and the settings field on top of the PDF itself.
const FORM_OVERHEAD_BYTES: usize = 1024 * 1024;

/// Assembles the main application router.
///
/// * Merges all sub-routers (auth, exams, attempts).
/// * Applies global middleware (Trace, CORS).
/// * Injects global state (store, model client, config).
pub fn create_router(state: AppState) -> Router {
    let origins: Vec<HeaderValue> = state
        .config
        .cors_origins
        .iter()
        .filter_map(|origin| match origin.parse() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!("Ignoring invalid CORS origin: {}", origin);
                None
            }
        })
        .collect();

    let cors = CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([Method::GET, Method::POST, Method::PATCH])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE]);

    let auth_routes = Router::new()
        .route("/register", post(auth::register))
        .route("/login", post(auth::login));

    let exam_routes = Router::new()
        .route(
            "/api/exams/generate",
            post(generate::generate_questions).layer(DefaultBodyLimit::max(MAX_PDF_BYTES + FORM_OVERHEAD_BYTES)),
        )
        .route("/api/exams", get(exams::list_exams).post(exams::create_exam))
        .route("/api/exams/{id}", get(exams::get_exam).patch(exams::update_exam))
        .route(
            "/api/exams/{id}/attempts",
            get(attempts::list_attempts).post(attempts::submit_attempt),
        )
        .route("/api/attempts/{id}", get(attempts::get_attempt));

    Router::new()
        .nest("/api/auth", auth_routes)
        .merge(exam_routes)
        // Global Middleware (applied from outside in)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors),
        )
        .with_state(state)
}
