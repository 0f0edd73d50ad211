//! Game CRUD endpoints.

use axum::extract::{Path, Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::api::state::AppState;
use crate::api::ApiError;
use crate::models::{Game, GameDraft, GamePatch, Section, KNOWN_STATUSES};

use super::auth::auth_context;

#[derive(Debug, Deserialize)]
pub struct ListParams {
    pub section: Option<String>,
    pub sort: Option<String>,
    pub order: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ListResponse {
    pub count: usize,
    pub games: Vec<Game>,
}

pub async fn list(
    State(state): State<AppState>,
    Query(params): Query<ListParams>,
) -> Result<Json<ListResponse>, ApiError> {
    let section = Section::parse_or_default(params.section.as_deref().unwrap_or("played"));
    let games: Vec<Game> = state
        .store
        .list(
            section,
            params.sort.as_deref().unwrap_or("title"),
            params.order.as_deref().unwrap_or("ASC"),
        )
        .await?
        .into_iter()
        .map(Game::into_display_order)
        .collect();

    Ok(Json(ListResponse {
        count: games.len(),
        games,
    }))
}

pub async fn get_one(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<Game>, ApiError> {
    Ok(Json(state.store.get(id).await?.into_display_order()))
}

/// The known status vocabulary, for UI dropdowns. The field itself stays
/// free text.
pub async fn statuses() -> Json<Vec<&'static str>> {
    Json(KNOWN_STATUSES.to_vec())
}

#[derive(Debug, Serialize)]
pub struct CreatedResponse {
    pub id: i64,
    pub message: String,
}

pub async fn create(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(draft): Json<GameDraft>,
) -> Result<(StatusCode, Json<CreatedResponse>), ApiError> {
    let auth = auth_context(&state, &headers).await;
    let id = state.store.add(&auth, &draft).await?;

    Ok((
        StatusCode::CREATED,
        Json(CreatedResponse {
            id,
            message: "Game added successfully".to_string(),
        }),
    ))
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    headers: HeaderMap,
    Json(patch): Json<GamePatch>,
) -> Result<Json<MessageResponse>, ApiError> {
    let auth = auth_context(&state, &headers).await;
    state.store.update(&auth, id, &patch).await?;

    Ok(Json(MessageResponse {
        message: "Game updated successfully".to_string(),
    }))
}

pub async fn remove(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    headers: HeaderMap,
) -> Result<Json<MessageResponse>, ApiError> {
    let auth = auth_context(&state, &headers).await;
    state.store.delete(&auth, id).await?;

    Ok(Json(MessageResponse {
        message: "Game deleted successfully".to_string(),
    }))
}

#[derive(Debug, Deserialize)]
pub struct MoveRequest {
    pub section: Section,
}

pub async fn move_section(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    headers: HeaderMap,
    Json(request): Json<MoveRequest>,
) -> Result<Json<MessageResponse>, ApiError> {
    let auth = auth_context(&state, &headers).await;
    state.store.move_section(&auth, id, request.section).await?;

    Ok(Json(MessageResponse {
        message: "Game moved successfully".to_string(),
    }))
}

#[derive(Debug, Deserialize)]
pub struct PriorityRequest {
    pub priority: i64,
}

pub async fn update_priority(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    headers: HeaderMap,
    Json(request): Json<PriorityRequest>,
) -> Result<Json<MessageResponse>, ApiError> {
    let auth = auth_context(&state, &headers).await;
    state
        .store
        .update_priority(&auth, id, request.priority)
        .await?;

    Ok(Json(MessageResponse {
        message: "Priorità aggiornata con successo".to_string(),
    }))
}
