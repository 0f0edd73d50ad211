//! Cover-art lookup.
//!
//! Covers come from the RAWG games database: given a title, it returns at
//! most one image URL, best-effort. The provider sits behind a trait so the
//! bulk scan can be tested without the network.

use std::sync::{Arc, OnceLock};
use std::time::Duration;

use async_trait::async_trait;
use regex::Regex;
use reqwest::Client;
use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::auth::AuthContext;
use crate::config::CoversConfig;
use crate::store::{GameStore, Result as StoreResult, StoreError};

/// Errors from a cover lookup.
#[derive(Debug, Error)]
pub enum CoverError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("HTTP {status} from cover service")]
    Status { status: u16 },
}

/// Something that can find a cover image for a title.
#[async_trait]
pub trait CoverProvider: Send + Sync {
    /// Find a cover URL for the given title, or `None` when the service
    /// has nothing.
    async fn search_cover(&self, title: &str) -> Result<Option<String>, CoverError>;
}

/// Response subset of RAWG's `/games` search.
#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    results: Vec<SearchResult>,
}

#[derive(Debug, Deserialize)]
struct SearchResult {
    background_image: Option<String>,
}

/// RAWG API client.
pub struct RawgClient {
    client: Client,
    api_base: String,
    api_key: String,
}

impl RawgClient {
    pub fn new(config: &CoversConfig) -> Result<Self, CoverError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .user_agent("ludoteca/0.1.0")
            .build()?;

        Ok(Self {
            client,
            api_base: config.api_base.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
        })
    }

    /// One search call; `None` when the first result has no image.
    async fn search_once(&self, term: &str) -> Result<Option<String>, CoverError> {
        let url = format!("{}/games", self.api_base);
        let response = self
            .client
            .get(&url)
            .query(&[
                ("key", self.api_key.as_str()),
                ("search", term),
                ("page_size", "1"),
            ])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(CoverError::Status {
                status: status.as_u16(),
            });
        }

        let body: SearchResponse = response.json().await?;
        Ok(body
            .results
            .into_iter()
            .next()
            .and_then(|r| r.background_image)
            .map(|image| normalize_cover_url(&image)))
    }
}

#[async_trait]
impl CoverProvider for RawgClient {
    async fn search_cover(&self, title: &str) -> Result<Option<String>, CoverError> {
        match self.search_once(title).await {
            Ok(Some(url)) => return Ok(Some(url)),
            Ok(None) => debug!("No cover for \"{}\", trying fallbacks", title),
            Err(e) => warn!("Cover search failed for \"{}\": {}", title, e),
        }

        // Retry with progressively simpler titles: subtitles and edition
        // tags often confuse the search.
        for term in fallback_terms(title) {
            match self.search_once(&term).await {
                Ok(Some(url)) => {
                    debug!("Found cover for \"{}\" via \"{}\"", title, term);
                    return Ok(Some(url));
                }
                Ok(None) => {}
                Err(e) => warn!("Cover search failed for \"{}\": {}", term, e),
            }
        }

        Ok(None)
    }
}

/// Strip the query string and route through RAWG's crop endpoint so every
/// cover comes back at a consistent size.
pub fn normalize_cover_url(url: &str) -> String {
    let url = url.split('?').next().unwrap_or(url);
    if url.contains("media.rawg.io") {
        url.replace("media.rawg.io/media/", "media.rawg.io/media/crop/600/400/")
    } else {
        url.to_string()
    }
}

fn fallback_patterns() -> &'static [Regex; 3] {
    static PATTERNS: OnceLock<[Regex; 3]> = OnceLock::new();
    PATTERNS.get_or_init(|| {
        [
            Regex::new(r"\s*\([^)]*\)\s*$").unwrap(),
            Regex::new(r"\s*-.*$").unwrap(),
            Regex::new(r"\s*:.*$").unwrap(),
        ]
    })
}

/// Alternate search terms for a title: without the trailing parenthetical,
/// without everything after a dash, without everything after a colon.
/// Deduplicated; terms equal to the original are skipped.
pub fn fallback_terms(title: &str) -> Vec<String> {
    let mut terms: Vec<String> = Vec::new();

    for pattern in fallback_patterns() {
        let candidate = pattern.replace(title, "").trim().to_string();
        if candidate.is_empty() || candidate == title || terms.contains(&candidate) {
            continue;
        }
        terms.push(candidate);
    }

    terms
}

/// One game updated by a scan.
#[derive(Debug, Clone, serde::Serialize)]
pub struct CoverUpdate {
    pub id: i64,
    pub title: String,
    pub cover_url: String,
}

/// One game the scan could not resolve.
#[derive(Debug, Clone, serde::Serialize)]
pub struct CoverFailure {
    pub id: i64,
    pub title: String,
    pub error: String,
}

/// Result of a bulk cover scan.
#[derive(Debug, Default, serde::Serialize)]
pub struct ScanOutcome {
    pub updated: Vec<CoverUpdate>,
    pub failed: Vec<CoverFailure>,
}

/// Find covers for every game that has none, serially, sleeping between
/// calls to respect the service's implicit rate limit. One failed lookup
/// records the game and moves on.
pub async fn scan_missing_covers(
    store: &GameStore,
    auth: &AuthContext,
    provider: Arc<dyn CoverProvider>,
    delay: Duration,
) -> StoreResult<ScanOutcome> {
    if !auth.is_admin() {
        return Err(StoreError::Unauthorized);
    }

    let missing = store.games_missing_cover().await?;
    info!("Cover scan: {} games without cover", missing.len());

    let mut outcome = ScanOutcome::default();

    for (id, title) in missing {
        match provider.search_cover(&title).await {
            Ok(Some(cover_url)) => match store.set_cover_url(auth, id, &cover_url).await {
                Ok(()) => outcome.updated.push(CoverUpdate {
                    id,
                    title,
                    cover_url,
                }),
                Err(e) => outcome.failed.push(CoverFailure {
                    id,
                    title,
                    error: e.to_string(),
                }),
            },
            Ok(None) => outcome.failed.push(CoverFailure {
                id,
                title,
                error: "No cover found".to_string(),
            }),
            Err(e) => outcome.failed.push(CoverFailure {
                id,
                title,
                error: e.to_string(),
            }),
        }

        tokio::time::sleep(delay).await;
    }

    info!(
        "Cover scan finished: {} updated, {} failed",
        outcome.updated.len(),
        outcome.failed.len()
    );
    Ok(outcome)
}
