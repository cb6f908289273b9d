// tests/common/mod.rs

#![allow(dead_code)]

use std::net::SocketAddr;
use std::sync::{
    Arc, Mutex,
    atomic::{AtomicUsize, Ordering},
};
use std::time::Duration;

use async_trait::async_trait;
use examgen::{
    config::{Config, LlmConfig},
    llm::{LlmError, QuestionModel, StructuredRequest},
    routes,
    state::AppState,
    store::{ExamStore, MemoryStore},
};

/// What the fake model answers.
#[derive(Debug, Clone)]
pub enum Reply {
    Text(String),
    Empty,
    RateLimited,
}

/// Model double that returns a fixed reply and records what it was asked.
pub struct ScriptedModel {
    reply: Reply,
    calls: AtomicUsize,
    last_instruction: Mutex<Option<String>>,
}

impl ScriptedModel {
    pub fn new(reply: Reply) -> Arc<Self> {
        Arc::new(Self {
            reply,
            calls: AtomicUsize::new(0),
            last_instruction: Mutex::new(None),
        })
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn last_instruction(&self) -> Option<String> {
        self.last_instruction.lock().unwrap().clone()
    }
}

#[async_trait]
impl QuestionModel for ScriptedModel {
    async fn generate(&self, request: StructuredRequest<'_>) -> Result<Option<String>, LlmError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self.last_instruction.lock().unwrap() = Some(request.instruction.to_string());

        match &self.reply {
            Reply::Text(text) => Ok(Some(text.clone())),
            Reply::Empty => Ok(None),
            Reply::RateLimited => Err(LlmError::RateLimit),
        }
    }
}

/// A JSON array of `n` well-formed questions, as the model would return it.
pub fn questions_json(n: usize) -> String {
    let items: Vec<serde_json::Value> = (1..=n)
        .map(|i| {
            serde_json::json!({
                "id": i,
                "question": format!("What is {i} + {i}?"),
                "options": {
                    "A": format!("{}", i * 2),
                    "B": format!("{}", i * 2 + 1),
                    "C": format!("{}", i),
                    "D": "$\\infty$"
                },
                "correctAnswer": "A",
                "explanation": format!("{i} + {i} = {}", i * 2)
            })
        })
        .collect();
    serde_json::Value::Array(items).to_string()
}

pub fn test_config() -> Config {
    Config {
        database_url: None,
        jwt_secret: "test_secret_for_integration_tests".to_string(),
        jwt_expiration: 600, // 10 minutes for tests
        rust_log: "error".to_string(),
        bind_addr: SocketAddr::from(([127, 0, 0, 1], 0)),
        cors_origins: vec!["http://localhost:3000".to_string()],
        llm: LlmConfig {
            api_key: None,
            model: "scripted".to_string(),
            base_url: url::Url::parse("http://localhost/unused").unwrap(),
            timeout: Duration::from_secs(5),
        },
    }
}

pub struct TestApp {
    pub address: String,
    pub store: Arc<MemoryStore>,
    pub client: reqwest::Client,
}

/// Spawns the app on a random port with an in-memory store.
pub async fn spawn_app(model: Option<Arc<ScriptedModel>>) -> TestApp {
    let store = Arc::new(MemoryStore::new());
    let state = AppState {
        store: store.clone() as Arc<dyn ExamStore>,
        model: model.map(|m| m as Arc<dyn QuestionModel>),
        config: test_config(),
    };

    let app = routes::create_router(state);

    // Bind to port 0 to get a random available port
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind random port");
    let port = listener.local_addr().unwrap().port();

    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    TestApp {
        address: format!("http://127.0.0.1:{}", port),
        store,
        client: reqwest::Client::new(),
    }
}

impl TestApp {
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.address, path)
    }

    /// Registers `username` and returns a bearer token.
    pub async fn signed_in(&self, username: &str) -> String {
        let password = "password123";

        let register = self
            .client
            .post(self.url("/api/auth/register"))
            .json(&serde_json::json!({ "username": username, "password": password }))
            .send()
            .await
            .expect("Register failed");
        assert_eq!(register.status().as_u16(), 201);

        let login = self
            .client
            .post(self.url("/api/auth/login"))
            .json(&serde_json::json!({ "username": username, "password": password }))
            .send()
            .await
            .expect("Login failed")
            .json::<serde_json::Value>()
            .await
            .expect("Failed to parse login json");

        login["token"].as_str().expect("Token not found").to_string()
    }

    pub async fn upload(
        &self,
        token: Option<&str>,
        file_name: &str,
        mime: &str,
        bytes: Vec<u8>,
        settings: Option<&str>,
    ) -> reqwest::Response {
        let part = reqwest::multipart::Part::bytes(bytes)
            .file_name(file_name.to_string())
            .mime_str(mime)
            .unwrap();
        let mut form = reqwest::multipart::Form::new().part("file", part);
        if let Some(settings) = settings {
            form = form.text("settings", settings.to_string());
        }

        let mut request = self.client.post(self.url("/api/exams/generate")).multipart(form);
        if let Some(token) = token {
            request = request.header("Authorization", format!("Bearer {}", token));
        }
        request.send().await.expect("Failed to execute request")
    }
}
