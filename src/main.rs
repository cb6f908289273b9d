// src/main.rs

use std::sync::Arc;

use anyhow::Context;
use examgen::config::Config;
use examgen::llm::{GeminiClient, QuestionModel};
use examgen::routes;
use examgen::state::AppState;
use examgen::store::{ExamStore, MemoryStore, PgStore};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load configuration from environment (.env included)
    let config = Config::from_env().context("invalid configuration")?;

    let file_appender = tracing_appender::rolling::daily("logs", "app.log");
    let (non_blocking, _guard) = tracing_appender::non_blocking(file_appender);
    let env_filter = EnvFilter::new(&config.rust_log);
    let stdout_layer = fmt::layer().with_writer(std::io::stdout).with_target(false);
    let file_layer = fmt::layer().with_writer(non_blocking).with_ansi(false);

    // Initialize Tracing (Logging)
    tracing_subscriber::registry()
        .with(env_filter)
        .with(stdout_layer)
        .with(file_layer)
        .init();

    let store: Arc<dyn ExamStore> = match &config.database_url {
        Some(url) => {
            let store = PgStore::connect(url).await.context("failed to connect to database")?;
            store.migrate().await.context("failed to run database migrations")?;
            Arc::new(store)
        }
        None => {
            tracing::warn!("DATABASE_URL not set, using in-memory store; data is lost on restart");
            Arc::new(MemoryStore::new())
        }
    };

    let model: Option<Arc<dyn QuestionModel>> = match GeminiClient::from_config(&config.llm)? {
        Some(client) => {
            tracing::info!(model = %config.llm.model, "Question model configured");
            Some(Arc::new(client))
        }
        None => {
            tracing::warn!("GOOGLE_AI_API_KEY not set, question generation is disabled");
            None
        }
    };

    let addr = config.bind_addr;
    let state = AppState { store, model, config };

    // Create the Axum application router
    let app = routes::create_router(state);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    tracing::info!("Listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutting down");
}
