//! Statistics endpoint.

use axum::extract::{Query, State};
use axum::Json;
use chrono::{Datelike, Utc};
use serde::Deserialize;

use crate::api::state::AppState;
use crate::api::ApiError;
use crate::stats::Statistics;

#[derive(Debug, Deserialize)]
pub struct StatsParams {
    /// Restrict to one section; absent or "all" means the whole collection.
    pub section: Option<String>,
}

pub async fn statistics(
    State(state): State<AppState>,
    Query(params): Query<StatsParams>,
) -> Result<Json<Statistics>, ApiError> {
    let section = params
        .section
        .as_deref()
        .and_then(|s| s.parse().ok());

    let games = state.store.all(section).await?;
    let stats = Statistics::compute(&games, Utc::now().year());
    Ok(Json(stats))
}

#[cfg(test)]
mod tests {
    use crate::api::build_router;
    use crate::api::testutil::{admin_token, get_json, request_json, test_state};
    use axum::http::StatusCode;

    #[tokio::test]
    async fn test_statistics_over_seeded_collection() {
        let state = test_state().await;
        let token = admin_token(&state).await;
        let app = build_router(state);

        for body in [
            r#"{"title": "Okami", "section": "played", "platform": "PS2, Fisico", "total_score": 93, "status": "Finito", "playtime": "40 PS2"}"#,
            r#"{"title": "Bloodborne", "section": "played", "platform": "PS4, Digitale", "total_score": 95, "status": "Masterato/Platinato", "platinum_date": "163 GIORNI", "difficulty": 8}"#,
            r#"{"title": "Hollow Knight", "section": "backlog", "platform": "Switch"}"#,
        ] {
            let (status, _) =
                request_json(app.clone(), "POST", "/api/games", Some(&token), body).await;
            assert_eq!(status, StatusCode::CREATED);
        }

        let (status, json) = get_json(app.clone(), "/api/statistics").await;
        assert_eq!(status, StatusCode::OK);

        // Fixed platform vocabulary with zero-count entries included.
        assert_eq!(json["platform"].as_array().unwrap().len(), 12);
        let ps4 = json["platform"]
            .as_array()
            .unwrap()
            .iter()
            .find(|p| p["platform"] == "PS4")
            .unwrap();
        assert_eq!(ps4["count"], 1);

        assert_eq!(json["fastest_completions"][0]["title"], "Bloodborne");
        assert_eq!(json["top_difficult_games"][0]["difficulty"], 8);

        // Section filter narrows the set.
        let (_, json) = get_json(app, "/api/statistics?section=backlog").await;
        assert_eq!(json["status"].as_array().unwrap().len(), 0);
        let switch = json["platform"]
            .as_array()
            .unwrap()
            .iter()
            .find(|p| p["platform"] == "SWITCH")
            .unwrap();
        assert_eq!(switch["count"], 1);
    }
}
