// src/config.rs

use std::env;
use std::net::SocketAddr;
use std::time::Duration;

use dotenvy::dotenv;
use url::Url;

pub const DEFAULT_GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
pub const DEFAULT_GEMINI_MODEL: &str = "gemini-2.5-flash";

/// Maximum accepted size of an uploaded PDF (10 MB).
pub const MAX_PDF_BYTES: usize = 10 * 1024 * 1024;

/// Startup configuration problems.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),
    #[error("{name} has an invalid value: {reason}")]
    Invalid { name: &'static str, reason: String },
}

/// Settings for the hosted model.
#[derive(Debug, Clone)]
pub struct LlmConfig {
    /// `None` leaves generation disabled; requests then fail as misconfigured.
    pub api_key: Option<String>,
    pub model: String,
    pub base_url: Url,
    pub timeout: Duration,
}

#[derive(Debug, Clone)]
pub struct Config {
    /// `None` selects the in-memory store.
    pub database_url: Option<String>,
    pub jwt_secret: String,
    pub jwt_expiration: u64,
    pub rust_log: String,
    pub bind_addr: SocketAddr,
    pub cors_origins: Vec<String>,
    pub llm: LlmConfig,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenv().ok();

        let database_url = optional("DATABASE_URL");

        let jwt_secret = optional("JWT_SECRET").ok_or(ConfigError::Missing("JWT_SECRET"))?;

        let jwt_expiration = parse_or("JWT_EXPIRATION", 86_400u64)?;

        let rust_log = env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string());

        let bind_addr = parse_or("BIND_ADDR", SocketAddr::from(([0, 0, 0, 0], 3000)))?;

        let cors_origins = optional("CORS_ORIGINS")
            .map(|raw| {
                raw.split(',')
                    .map(str::trim)
                    .filter(|origin| !origin.is_empty())
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_else(|| vec!["http://localhost:3000".to_string()]);

        let base_url = optional("GEMINI_BASE_URL").unwrap_or_else(|| DEFAULT_GEMINI_BASE_URL.to_string());
        let base_url = Url::parse(&base_url).map_err(|e| ConfigError::Invalid {
            name: "GEMINI_BASE_URL",
            reason: e.to_string(),
        })?;

        let llm = LlmConfig {
            api_key: optional("GOOGLE_AI_API_KEY"),
            model: optional("GEMINI_MODEL").unwrap_or_else(|| DEFAULT_GEMINI_MODEL.to_string()),
            base_url,
            timeout: Duration::from_secs(parse_or("LLM_TIMEOUT_SECS", 120u64)?),
        };

        Ok(Self {
            database_url,
            jwt_secret,
            jwt_expiration,
            rust_log,
            bind_addr,
            cors_origins,
            llm,
        })
    }
}

fn optional(name: &str) -> Option<String> {
    env::var(name).ok().filter(|value| !value.trim().is_empty())
}

fn parse_or<T>(name: &'static str, default: T) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match optional(name) {
        Some(raw) => raw.trim().parse().map_err(|e: T::Err| ConfigError::Invalid {
            name,
            reason: e.to_string(),
        }),
        None => Ok(default),
    }
}
