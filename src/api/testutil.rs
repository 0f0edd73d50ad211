//! Shared helpers for API route tests.

use std::sync::Arc;

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use serde_json::Value;
use tower::util::ServiceExt;

use crate::api::state::AppState;
use crate::auth::SessionStore;
use crate::config::AppConfig;
use crate::covers::{CoverError, CoverProvider};
use crate::store::GameStore;

/// Provider that knows one hardcoded title.
pub struct StubProvider;

#[async_trait]
impl CoverProvider for StubProvider {
    async fn search_cover(&self, title: &str) -> Result<Option<String>, CoverError> {
        if title == "Okami" {
            Ok(Some("https://img.example/okami.jpg".to_string()))
        } else {
            Ok(None)
        }
    }
}

/// State over an in-memory store, a default config and the stub provider.
pub async fn test_state() -> AppState {
    AppState {
        store: GameStore::in_memory().await.unwrap(),
        config: Arc::new(AppConfig::default()),
        sessions: Arc::new(SessionStore::new()),
        covers: Arc::new(StubProvider),
    }
}

/// Log in with the default admin password and return a bearer token.
pub async fn admin_token(state: &AppState) -> String {
    state
        .sessions
        .login("admin", &state.config.admin.password_sha256)
        .await
        .expect("default password should log in")
}

pub async fn get_json(app: axum::Router, uri: &str) -> (StatusCode, Value) {
    let resp = app
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = resp.status();
    let body = axum::body::to_bytes(resp.into_body(), usize::MAX)
        .await
        .unwrap();
    let json: Value = serde_json::from_slice(&body).unwrap_or(Value::Null);
    (status, json)
}

pub async fn request_json(
    app: axum::Router,
    method: &str,
    uri: &str,
    token: Option<&str>,
    body: &str,
) -> (StatusCode, Value) {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json");
    if let Some(token) = token {
        builder = builder.header("authorization", format!("Bearer {}", token));
    }

    let resp = app
        .oneshot(builder.body(Body::from(body.to_string())).unwrap())
        .await
        .unwrap();
    let status = resp.status();
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX)
        .await
        .unwrap();
    let json: Value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, json)
}
