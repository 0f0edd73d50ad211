//! REST API endpoints.
//!
//! Axum-based HTTP API for browsing the collection, admin-gated mutation,
//! TSV import, statistics and cover lookup.

use axum::routing::{get, post};
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json, Router,
};
use serde::Serialize;
use thiserror::Error;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::store::StoreError;

pub mod routes;
pub mod state;

#[cfg(test)]
pub mod testutil;

use state::AppState;

/// API error types.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Access denied: admin login required")]
    Unauthorized,

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Error response body.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: ErrorDetail,
}

#[derive(Debug, Serialize)]
pub struct ErrorDetail {
    pub code: String,
    pub message: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code) = match &self {
            ApiError::Unauthorized => (StatusCode::FORBIDDEN, "UNAUTHORIZED"),
            ApiError::NotFound(_) => (StatusCode::NOT_FOUND, "NOT_FOUND"),
            ApiError::BadRequest(_) => (StatusCode::BAD_REQUEST, "BAD_REQUEST"),
            ApiError::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR"),
        };

        let body = ErrorResponse {
            error: ErrorDetail {
                code: code.to_string(),
                message: self.to_string(),
            },
        };

        (status, Json(body)).into_response()
    }
}

impl From<StoreError> for ApiError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::Unauthorized => ApiError::Unauthorized,
            StoreError::Validation(message) => ApiError::BadRequest(message),
            StoreError::NotFound(id) => ApiError::NotFound(format!("game {}", id)),
            StoreError::Database(e) => {
                // Underlying cause goes to the log, not to the client.
                tracing::error!("Database error: {}", e);
                ApiError::Internal("database error".to_string())
            }
        }
    }
}

/// Build the application router.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/api/health", get(health))
        .route("/api/auth/login", post(routes::auth::login))
        .route("/api/auth/logout", post(routes::auth::logout))
        .route("/api/auth/session", get(routes::auth::session))
        .route(
            "/api/games",
            get(routes::games::list).post(routes::games::create),
        )
        .route(
            "/api/games/:id",
            get(routes::games::get_one)
                .patch(routes::games::update)
                .delete(routes::games::remove),
        )
        .route("/api/statuses", get(routes::games::statuses))
        .route("/api/games/:id/move", post(routes::games::move_section))
        .route(
            "/api/games/:id/priority",
            post(routes::games::update_priority),
        )
        .route("/api/import", post(routes::import::import_tsv))
        .route("/api/statistics", get(routes::statistics::statistics))
        .route("/api/covers/search", get(routes::covers::search))
        .route("/api/covers/scan", post(routes::covers::scan))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "ok" }))
}
