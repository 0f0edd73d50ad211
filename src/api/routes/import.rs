//! TSV import endpoint.

use axum::body::Bytes;
use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::Json;
use serde::Serialize;

use crate::api::state::AppState;
use crate::api::ApiError;
use crate::import::Importer;

use super::auth::auth_context;

#[derive(Debug, Serialize)]
pub struct ImportResponse {
    pub success: bool,
    pub message: String,
    pub imported_count: usize,
    pub errors: Vec<String>,
}

/// Accept a raw TSV upload and run the importer. The response carries the
/// per-row errors either way; the status code reflects whether anything was
/// imported at all.
pub async fn import_tsv(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<(StatusCode, Json<ImportResponse>), ApiError> {
    let auth = auth_context(&state, &headers).await;
    let outcome = Importer::new(&state.store).import(&auth, &body).await?;

    let success = outcome.is_success();
    let response = ImportResponse {
        success,
        message: if success {
            format!("Importati {} giochi con successo", outcome.imported)
        } else {
            "Nessun gioco importato".to_string()
        },
        imported_count: outcome.imported,
        errors: outcome.errors,
    };

    let status = if success {
        StatusCode::OK
    } else {
        StatusCode::BAD_REQUEST
    };
    Ok((status, Json(response)))
}

#[cfg(test)]
mod tests {
    use crate::api::build_router;
    use crate::api::testutil::{admin_token, get_json, test_state};
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use serde_json::Value;
    use tower::util::ServiceExt;

    async fn post_tsv(
        app: axum::Router,
        token: Option<&str>,
        body: &str,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder()
            .method("POST")
            .uri("/api/import")
            .header("content-type", "text/tab-separated-values");
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
        (status, serde_json::from_slice(&bytes).unwrap_or(Value::Null))
    }

    #[tokio::test]
    async fn test_import_requires_admin() {
        let state = test_state().await;
        let app = build_router(state);

        let (status, _) = post_tsv(app, None, "Titolo\tStato\nOkami\tFinito").await;
        assert_eq!(status, StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn test_import_mixed_rows() {
        let state = test_state().await;
        let token = admin_token(&state).await;
        let app = build_router(state);

        let tsv = "Titolo\tPiattaforma\nOkami\tPS2\n\tPS3\nIco\tPS2";
        let (status, json) = post_tsv(app.clone(), Some(&token), tsv).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["success"], true);
        assert_eq!(json["imported_count"], 2);
        assert_eq!(json["errors"][0], "Riga 3: Titolo mancante");

        let (_, json) = get_json(app, "/api/games?section=played").await;
        assert_eq!(json["count"], 2);
    }

    #[tokio::test]
    async fn test_import_with_only_bad_rows_is_rejected() {
        let state = test_state().await;
        let token = admin_token(&state).await;
        let app = build_router(state);

        let tsv = "Titolo\tPiattaforma\n\tPS3";
        let (status, json) = post_tsv(app, Some(&token), tsv).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["success"], false);
        assert_eq!(json["message"], "Nessun gioco importato");
        assert_eq!(json["errors"].as_array().unwrap().len(), 1);
    }
}
