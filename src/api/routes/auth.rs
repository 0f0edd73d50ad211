//! Admin login and session endpoints.

use axum::extract::State;
use axum::http::{header, HeaderMap};
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::api::state::AppState;
use crate::api::ApiError;
use crate::auth::AuthContext;

/// Pull the token out of an `Authorization: Bearer …` header.
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(header::AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
}

/// Build the caller's authorization context from the request headers.
pub async fn auth_context(state: &AppState, headers: &HeaderMap) -> AuthContext {
    state.sessions.context_for(bearer_token(headers)).await
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub token: String,
}

pub async fn login(
    State(state): State<AppState>,
    Json(request): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, ApiError> {
    match state
        .sessions
        .login(&request.password, &state.config.admin.password_sha256)
        .await
    {
        Some(token) => Ok(Json(LoginResponse { token })),
        None => Err(ApiError::Unauthorized),
    }
}

#[derive(Debug, Serialize)]
pub struct LogoutResponse {
    pub message: String,
}

pub async fn logout(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Json<LogoutResponse> {
    if let Some(token) = bearer_token(&headers) {
        state.sessions.logout(token).await;
    }
    Json(LogoutResponse {
        message: "Logged out".to_string(),
    })
}

#[derive(Debug, Serialize)]
pub struct SessionResponse {
    pub is_admin: bool,
}

pub async fn session(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Json<SessionResponse> {
    let auth = auth_context(&state, &headers).await;
    Json(SessionResponse {
        is_admin: auth.is_admin(),
    })
}

#[cfg(test)]
mod tests {
    use crate::api::build_router;
    use crate::api::testutil::{get_json, request_json, test_state};
    use axum::http::StatusCode;

    #[tokio::test]
    async fn test_login_logout_session_flow() {
        let state = test_state().await;
        let app = build_router(state.clone());

        let (status, json) = request_json(
            app.clone(),
            "POST",
            "/api/auth/login",
            None,
            r#"{"password": "admin"}"#,
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        let token = json["token"].as_str().unwrap().to_string();

        let ctx = state.sessions.context_for(Some(&token)).await;
        assert!(ctx.is_admin());

        let (status, _) = request_json(
            app.clone(),
            "POST",
            "/api/auth/logout",
            Some(&token),
            "",
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert!(!state.sessions.context_for(Some(&token)).await.is_admin());
    }

    #[tokio::test]
    async fn test_wrong_password_is_forbidden() {
        let state = test_state().await;
        let app = build_router(state);

        let (status, json) = request_json(
            app,
            "POST",
            "/api/auth/login",
            None,
            r#"{"password": "sbagliata"}"#,
        )
        .await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        assert_eq!(json["error"]["code"], "UNAUTHORIZED");
    }

    #[tokio::test]
    async fn test_session_without_token_is_anonymous() {
        let state = test_state().await;
        let app = build_router(state);

        let (status, json) = get_json(app, "/api/auth/session").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["is_admin"], false);
    }
}
