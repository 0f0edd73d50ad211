//! Cover lookup endpoints.

use std::time::Duration;

use axum::extract::{Query, State};
use axum::http::HeaderMap;
use axum::Json;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::api::state::AppState;
use crate::api::ApiError;
use crate::covers::{scan_missing_covers, ScanOutcome};

use super::auth::auth_context;

#[derive(Debug, Deserialize)]
pub struct SearchParams {
    pub title: String,
}

#[derive(Debug, Serialize)]
pub struct SearchResponse {
    pub cover_url: String,
    pub game_title: String,
}

pub async fn search(
    State(state): State<AppState>,
    Query(params): Query<SearchParams>,
) -> Result<Json<SearchResponse>, ApiError> {
    let title = params.title.trim();
    if title.is_empty() {
        return Err(ApiError::BadRequest(
            "Il titolo è obbligatorio per la ricerca della cover".to_string(),
        ));
    }

    match state.covers.search_cover(title).await {
        Ok(Some(cover_url)) => Ok(Json(SearchResponse {
            cover_url,
            game_title: title.to_string(),
        })),
        Ok(None) => Err(ApiError::NotFound(format!(
            "Nessun risultato trovato per: {}",
            title
        ))),
        Err(e) => {
            warn!("Cover search failed for \"{}\": {}", title, e);
            Err(ApiError::Internal("cover lookup failed".to_string()))
        }
    }
}

/// Look up covers for every game that has none. Admin-gated; the scan runs
/// serially with the configured inter-call delay.
pub async fn scan(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<ScanOutcome>, ApiError> {
    let auth = auth_context(&state, &headers).await;
    let delay = Duration::from_millis(state.config.covers.rate_limit_ms);

    let outcome = scan_missing_covers(&state.store, &auth, state.covers.clone(), delay).await?;
    Ok(Json(outcome))
}
