//! Shared harness for HTTP tests

#![allow(dead_code)]

use axum::{
    Router,
    body::{Body, to_bytes},
    http::{Method, Request, StatusCode, header},
};
use chrono::Duration;
use rolegate_api::{AppState, create_router};
use rolegate_auth::JwtManager;
use rolegate_core::{BootstrapConfig, seed};
use rolegate_db::Database;
use serde_json::{Value, json};
use std::sync::Arc;
use tower::ServiceExt;

pub const SECRET: &str = "integration-test-secret";
pub const ADMIN_EMAIL: &str = "root@example.com";
pub const ADMIN_USERNAME: &str = "root";
pub const ADMIN_PASSWORD: &str = "root-password";

pub struct TestApp {
    pub router: Router,
    pub db: Arc<Database>,
    pub jwt: Arc<JwtManager>,
}

/// Seeded app backed by an in-memory store
pub async fn spawn_app() -> TestApp {
    let db = Arc::new(Database::in_memory().await.unwrap());
    let bootstrap = BootstrapConfig {
        admin_email: Some(ADMIN_EMAIL.to_string()),
        admin_username: Some(ADMIN_USERNAME.to_string()),
        admin_password: Some(ADMIN_PASSWORD.to_string()),
        ..Default::default()
    };
    seed(db.as_ref(), &bootstrap).await.unwrap();

    let jwt = Arc::new(JwtManager::new(SECRET, Duration::seconds(60)));
    let state = AppState::new(db.clone(), jwt.clone());

    TestApp {
        router: create_router(state, None),
        db,
        jwt,
    }
}

impl TestApp {
    /// Send a request and return the status plus the decoded JSON body
    pub async fn send(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }
        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or(Value::Null)
        };
        (status, value)
    }

    pub async fn register(&self, email: &str, username: &str, password: &str) -> StatusCode {
        let body = json!({ "email": email, "username": username, "password": password });
        self.send(Method::POST, "/register", None, Some(body)).await.0
    }

    /// Log in and return the issued token
    pub async fn login(&self, email: &str, username: &str, password: &str) -> String {
        let body = json!({ "email": email, "username": username, "password": password });
        let (status, value) = self.send(Method::POST, "/login", None, Some(body)).await;
        assert_eq!(status, StatusCode::OK, "login failed: {}", value);
        value["token"].as_str().unwrap().to_string()
    }

    pub async fn admin_token(&self) -> String {
        self.login(ADMIN_EMAIL, ADMIN_USERNAME, ADMIN_PASSWORD).await
    }
}
