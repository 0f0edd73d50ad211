//! The game record and its ingestion types.

use chrono::{DateTime, Utc};
use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize};

use super::platform::{display_order, join_platforms, split_platforms};

/// Which top-level list a game belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Section {
    /// Already experienced.
    Played,
    /// Planned for later, ranked by priority.
    Backlog,
}

impl Section {
    pub fn as_str(&self) -> &'static str {
        match self {
            Section::Played => "played",
            Section::Backlog => "backlog",
        }
    }

    /// Parse a section name; anything unrecognized falls back to `played`.
    pub fn parse_or_default(s: &str) -> Self {
        match s {
            "backlog" => Section::Backlog,
            _ => Section::Played,
        }
    }
}

impl std::fmt::Display for Section {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Section {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "played" => Ok(Section::Played),
            "backlog" => Ok(Section::Backlog),
            other => Err(format!("unknown section: {}", other)),
        }
    }
}

/// A game in the collection.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Game {
    /// Unique identifier, assigned on creation
    pub id: i64,

    /// Game title
    pub title: String,

    /// Platform tags in entry order (joined into one column at rest)
    pub platforms: Vec<String>,

    /// Which list the game lives in
    pub section: Section,

    /// Free-text hours played, e.g. "412 PS + 7,9 PC"
    pub playtime: Option<String>,

    /// Overall score (0-100 by convention)
    pub total_score: Option<i64>,

    /// Aesthetic score (0-100 by convention)
    pub aesthetic_score: Option<i64>,

    /// Soundtrack score (0-100 by convention)
    pub ost_score: Option<i64>,

    /// Difficulty rating (0-10 by convention)
    pub difficulty: Option<i64>,

    /// Completion status label, e.g. "Masterato/Platinato"
    pub status: Option<String>,

    /// Trophy completion percentage (0-100)
    pub trophy_percentage: Option<i64>,

    /// Free-text time-to-platinum, parsed for the fastest-completion ranking
    pub platinum_date: Option<String>,

    /// Completed replay count
    pub replays: i64,

    /// Free-text date of first play (may be a bare year)
    pub first_played: Option<String>,

    /// Free-text date of last finish
    pub last_finished: Option<String>,

    /// Personal review
    pub review: Option<String>,

    /// Cover art URL
    pub cover_url: Option<String>,

    /// Backlog pickup priority; NULL outside the backlog
    pub priority: Option<i64>,

    /// When this record was created
    pub created_at: DateTime<Utc>,
}

impl Game {
    /// The platform list as stored: one comma-joined string.
    pub fn platform_column(&self) -> String {
        join_platforms(&self.platforms)
    }

    /// Reorder the platform tags for display: FISICO, then DIGITALE, then
    /// the rest in entry order. Applied when a game leaves the API.
    pub fn into_display_order(mut self) -> Self {
        self.platforms = display_order(&self.platforms);
        self
    }
}

/// Platform field as it arrives from clients: a single string or a list.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum PlatformInput {
    One(String),
    Many(Vec<String>),
}

impl PlatformInput {
    /// Normalize to the ordered tag list used everywhere internally.
    pub fn into_tags(self) -> Vec<String> {
        match self {
            PlatformInput::One(s) => split_platforms(&s),
            PlatformInput::Many(items) => items
                .into_iter()
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect(),
        }
    }
}

/// Data for a new game. Scores arrive as numbers or stringified numbers and
/// are normalized here, before anything reaches the store.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct GameDraft {
    pub title: String,

    #[serde(default, alias = "platforms")]
    pub platform: Option<PlatformInput>,

    #[serde(default = "GameDraft::default_section")]
    pub section: Section,

    #[serde(default)]
    pub playtime: Option<String>,

    #[serde(default, deserialize_with = "de_flexible_int")]
    pub total_score: Option<i64>,

    #[serde(default, deserialize_with = "de_flexible_int")]
    pub aesthetic_score: Option<i64>,

    #[serde(default, deserialize_with = "de_flexible_int")]
    pub ost_score: Option<i64>,

    #[serde(default, deserialize_with = "de_flexible_int")]
    pub difficulty: Option<i64>,

    #[serde(default)]
    pub status: Option<String>,

    #[serde(default, deserialize_with = "de_flexible_int")]
    pub trophy_percentage: Option<i64>,

    #[serde(default)]
    pub platinum_date: Option<String>,

    #[serde(default, deserialize_with = "de_flexible_int")]
    pub replays: Option<i64>,

    #[serde(default)]
    pub first_played: Option<String>,

    #[serde(default)]
    pub last_finished: Option<String>,

    #[serde(default)]
    pub review: Option<String>,

    #[serde(default)]
    pub cover_url: Option<String>,

    #[serde(default, deserialize_with = "de_flexible_int")]
    pub priority: Option<i64>,
}

impl GameDraft {
    fn default_section() -> Section {
        Section::Played
    }

    /// Create a draft with the two required fields; everything else absent.
    pub fn new(title: impl Into<String>, section: Section) -> Self {
        Self {
            title: title.into(),
            section,
            ..Default::default()
        }
    }

    /// Normalized platform tag list (empty when the field was absent).
    pub fn platform_tags(&self) -> Vec<String> {
        self.platform.clone().map(PlatformInput::into_tags).unwrap_or_default()
    }
}

impl Default for Section {
    fn default() -> Self {
        Section::Played
    }
}

/// A partial update. `None` means "leave unchanged"; `Some(None)` means
/// "clear the field". Field presence is what drives the update, so every
/// member is double-wrapped except `title` and `platform`, which are written
/// verbatim whenever present (clearing them stores an empty string, not
/// NULL).
#[derive(Debug, Clone, Default, Deserialize)]
pub struct GamePatch {
    #[serde(default)]
    pub title: Option<String>,

    #[serde(default, alias = "platforms")]
    pub platform: Option<PlatformInput>,

    #[serde(default)]
    pub section: Option<Section>,

    #[serde(default, deserialize_with = "de_patch_string")]
    pub playtime: Option<Option<String>>,

    #[serde(default, deserialize_with = "de_patch_int")]
    pub total_score: Option<Option<i64>>,

    #[serde(default, deserialize_with = "de_patch_int")]
    pub aesthetic_score: Option<Option<i64>>,

    #[serde(default, deserialize_with = "de_patch_int")]
    pub ost_score: Option<Option<i64>>,

    #[serde(default, deserialize_with = "de_patch_int")]
    pub difficulty: Option<Option<i64>>,

    #[serde(default, deserialize_with = "de_patch_string")]
    pub status: Option<Option<String>>,

    #[serde(default, deserialize_with = "de_patch_int")]
    pub trophy_percentage: Option<Option<i64>>,

    #[serde(default, deserialize_with = "de_patch_string")]
    pub platinum_date: Option<Option<String>>,

    #[serde(default, deserialize_with = "de_patch_int")]
    pub replays: Option<Option<i64>>,

    #[serde(default, deserialize_with = "de_patch_string")]
    pub first_played: Option<Option<String>>,

    #[serde(default, deserialize_with = "de_patch_string")]
    pub last_finished: Option<Option<String>>,

    #[serde(default, deserialize_with = "de_patch_string")]
    pub review: Option<Option<String>>,

    #[serde(default, deserialize_with = "de_patch_string")]
    pub cover_url: Option<Option<String>>,

    #[serde(default, deserialize_with = "de_patch_int")]
    pub priority: Option<Option<i64>>,
}

impl GamePatch {
    /// True when no field was supplied at all.
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.platform.is_none()
            && self.section.is_none()
            && self.playtime.is_none()
            && self.total_score.is_none()
            && self.aesthetic_score.is_none()
            && self.ost_score.is_none()
            && self.difficulty.is_none()
            && self.status.is_none()
            && self.trophy_percentage.is_none()
            && self.platinum_date.is_none()
            && self.replays.is_none()
            && self.first_played.is_none()
            && self.last_finished.is_none()
            && self.review.is_none()
            && self.cover_url.is_none()
            && self.priority.is_none()
    }
}

/// Accept a number, a stringified number, `""`, or null for an optional
/// integer field. Empty strings and null mean "absent".
fn de_flexible_int<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value: Option<serde_json::Value> = Option::deserialize(deserializer)?;
    flexible_int(value.as_ref()).map_err(D::Error::custom)
}

/// Same as [`de_flexible_int`] but distinguishing "field absent" (outer
/// `None`, via serde default) from "clear this field" (`Some(None)`).
fn de_patch_int<'de, D>(deserializer: D) -> Result<Option<Option<i64>>, D::Error>
where
    D: Deserializer<'de>,
{
    let value: Option<serde_json::Value> = Option::deserialize(deserializer)?;
    flexible_int(value.as_ref()).map(Some).map_err(D::Error::custom)
}

/// Present string field in a patch: null clears, a value is kept as-is.
fn de_patch_string<'de, D>(deserializer: D) -> Result<Option<Option<String>>, D::Error>
where
    D: Deserializer<'de>,
{
    let value: Option<String> = Option::deserialize(deserializer)?;
    Ok(Some(value))
}

fn flexible_int(value: Option<&serde_json::Value>) -> Result<Option<i64>, String> {
    match value {
        None | Some(serde_json::Value::Null) => Ok(None),
        Some(serde_json::Value::Number(n)) => n
            .as_i64()
            .or_else(|| n.as_f64().map(|f| f as i64))
            .ok_or_else(|| format!("number out of range: {}", n))
            .map(Some),
        Some(serde_json::Value::String(s)) => {
            let s = s.trim();
            if s.is_empty() {
                return Ok(None);
            }
            s.parse::<i64>()
                .map(Some)
                .or_else(|_| s.parse::<f64>().map(|f| Some(f as i64)))
                .map_err(|_| format!("not a number: {}", s))
        }
        Some(other) => Err(format!("expected a number, got {}", other)),
    }
}
