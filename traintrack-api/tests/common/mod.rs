//! Common test utilities for integration tests
//!
//! Builds the real router over an in-memory store and drives it with
//! `tower::ServiceExt::oneshot`; no database or network is needed.

#![allow(dead_code)]

use axum::{
    body::Body,
    http::{header, HeaderMap, Method, Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt;
use traintrack_api::{
    app::{build_router, AppState},
    config::Config,
};
use traintrack_shared::store::memory::MemoryStore;

pub const PASSWORD: &str = "s3cret-pass";

/// Test context: router plus direct access to the backing store
pub struct TestContext {
    pub store: Arc<MemoryStore>,
    pub app: Router,
}

/// Decoded response
pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    /// JSON body; `Value::Null` when empty
    pub body: Value,
}

impl TestResponse {
    pub fn set_cookie(&self) -> Option<&str> {
        self.headers
            .get(header::SET_COOKIE)
            .and_then(|v| v.to_str().ok())
    }
}

impl TestContext {
    pub fn new() -> Self {
        Self::with_config(Config::for_tests())
    }

    pub fn with_config(config: Config) -> Self {
        let store = Arc::new(MemoryStore::new());
        let app = build_router(AppState::new(store.clone(), config));
        Self { store, app }
    }

    /// Sends a request; `token` travels as the session cookie
    pub async fn send(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> TestResponse {
        let mut builder = Request::builder().method(method).uri(uri);

        if let Some(token) = token {
            builder = builder.header(header::COOKIE, format!("traintrack_session={}", token));
        }

        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        self.send_request(request).await
    }

    pub async fn send_request(&self, request: Request<Body>) -> TestResponse {
        let response = self.app.clone().oneshot(request).await.unwrap();

        let status = response.status();
        let headers = response.headers().clone();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or_else(|_| {
                Value::String(String::from_utf8_lossy(&bytes).into_owned())
            })
        };

        TestResponse {
            status,
            headers,
            body,
        }
    }

    pub async fn register(&self, username: &str, role: &str) -> TestResponse {
        self.send(
            Method::POST,
            "/v1/auth/register",
            None,
            Some(json!({
                "username": username,
                "email": format!("{}@example.com", username),
                "password": PASSWORD,
                "confirm_password": PASSWORD,
                "role": role,
            })),
        )
        .await
    }

    pub async fn login(&self, username: &str, password: &str) -> TestResponse {
        self.send(
            Method::POST,
            "/v1/auth/login",
            None,
            Some(json!({ "username": username, "password": password })),
        )
        .await
    }

    /// Registers a user with the given role and returns a session token
    pub async fn user_token(&self, username: &str, role: &str) -> String {
        let registered = self.register(username, role).await;
        assert_eq!(registered.status, StatusCode::CREATED, "{}", registered.body);

        let login = self.login(username, PASSWORD).await;
        assert_eq!(login.status, StatusCode::OK, "{}", login.body);

        login.body["token"].as_str().unwrap().to_string()
    }

    pub async fn manager_token(&self) -> String {
        self.user_token("maria", "manager").await
    }

    pub async fn technician_token(&self) -> String {
        self.user_token("joao", "technician").await
    }
}

/// The body every authorization failure returns
pub fn access_denied_body() -> Value {
    json!({ "error": "forbidden", "message": "Access denied" })
}

pub fn training_body(title: &str, date: &str) -> Value {
    json!({
        "title": title,
        "description": "Annual refresher",
        "training_date": date,
        "status": "scheduled",
        "participants": "Operations",
        "responsible": "Maria",
        "location": "Room 2",
    })
}
