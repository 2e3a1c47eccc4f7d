use std::net::SocketAddr;
use std::sync::{Arc, Mutex};

use accountd::config::{Config, HashingConfig};
use accountd::db::MemoryAccountStore;
use accountd::email::{Mailer, OutgoingEmail};
use accountd::state::AppState;
use async_trait::async_trait;
use chrono::Duration;
use reqwest::{Client, StatusCode};
use serde_json::{json, Value};

/// Captures outgoing mail instead of sending it.
#[derive(Default)]
pub struct RecordingMailer {
    sent: Mutex<Vec<OutgoingEmail>>,
}

impl RecordingMailer {
    pub fn sent(&self) -> Vec<OutgoingEmail> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl Mailer for RecordingMailer {
    async fn send(&self, email: OutgoingEmail) -> Result<(), String> {
        self.sent.lock().unwrap().push(email);
        Ok(())
    }
}

/// A running test server backed by an in-memory store.
pub struct TestApp {
    pub addr: SocketAddr,
    pub client: Client,
    pub store: Arc<MemoryAccountStore>,
    pub mailer: Arc<RecordingMailer>,
}

impl TestApp {
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }

    pub async fn post(&self, path: &str, body: &Value) -> (Value, StatusCode) {
        let resp = self
            .client
            .post(self.url(path))
            .json(body)
            .send()
            .await
            .expect("post request failed");
        let status = resp.status();
        let body: Value = resp.json().await.unwrap_or(json!(null));
        (body, status)
    }

    pub async fn signup(&self, name: &str, email: &str, password: &str) -> (Value, StatusCode) {
        self.post(
            "/api/signup",
            &json!({ "name": name, "email": email, "password": password }),
        )
        .await
    }

    pub async fn login(&self, email: &str, password: &str) -> (Value, StatusCode) {
        self.post("/api/login", &json!({ "email": email, "password": password }))
            .await
    }

    pub async fn forgot_password(&self, email: &str) -> (Value, StatusCode) {
        self.post("/api/forgot-password", &json!({ "email": email }))
            .await
    }

    pub async fn reset_password(&self, token: &str, password: &str) -> (Value, StatusCode) {
        self.post(
            "/api/reset-password",
            &json!({ "token": token, "password": password }),
        )
        .await
    }

    /// The token from the most recent reset link emailed out.
    pub fn last_reset_token(&self) -> String {
        let sent = self.mailer.sent();
        let email = sent.last().expect("no email was sent");
        let (_, token) = email
            .text
            .split_once("?token=")
            .expect("reset link missing from email");
        token
            .split_whitespace()
            .next()
            .expect("empty token")
            .to_string()
    }
}

pub fn test_config() -> Config {
    Config {
        database_url: "postgres://unused".to_string(),
        jwt_secret: "test-jwt-secret-that-is-long-enough".to_string(),
        host: "127.0.0.1".parse().unwrap(),
        port: 0,
        frontend_url: "http://localhost:5500".to_string(),
        cors_origin: "http://localhost:5500".to_string(),
        site_name: "Accountd".to_string(),
        max_body_size: 65536,
        log_level: "warn".to_string(),
        reset_token_ttl: Duration::minutes(15),
        session_ttl: Duration::hours(1),
        min_password_length: 8,
        hashing: HashingConfig {
            memory_kib: 1024,
            iterations: 1,
            parallelism: 1,
        },
        smtp: None,
        contact_to: Some("inbox@example.com".to_string()),
    }
}

pub async fn spawn_app() -> TestApp {
    spawn_app_with(test_config()).await
}

pub async fn spawn_app_with(config: Config) -> TestApp {
    let store = Arc::new(MemoryAccountStore::new());
    let mailer = Arc::new(RecordingMailer::default());
    let state = AppState::new(config, store.clone(), mailer.clone()).expect("invalid test state");
    let app = accountd::build_app(state);

    // Bind to random port
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind to random port");
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("Server failed");
    });

    TestApp {
        addr,
        client: Client::new(),
        store,
        mailer,
    }
}
