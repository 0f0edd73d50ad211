//! SQLite persistence for the game collection.
//!
//! Every mutating operation takes an [`AuthContext`] and checks it before
//! doing anything else, and runs inside its own transaction: a failure
//! mid-operation rolls back completely, so partial writes are never
//! observable.

use std::path::Path;

use chrono::Utc;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions, SqliteRow};
use sqlx::{Pool, Row, Sqlite};
use thiserror::Error;
use tracing::debug;

use crate::auth::AuthContext;
use crate::models::{join_platforms, split_platforms, Game, GameDraft, GamePatch, Section};

/// Errors that can occur during store operations.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Admin authorization required")]
    Unauthorized,

    #[error("{0}")]
    Validation(String),

    #[error("Game not found: {0}")]
    NotFound(i64),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

pub type Result<T> = std::result::Result<T, StoreError>;

/// Columns a list request may sort by. Anything else falls back to `title`.
const SORT_COLUMNS: [&str; 13] = [
    "title",
    "platform",
    "playtime",
    "total_score",
    "aesthetic_score",
    "ost_score",
    "difficulty",
    "status",
    "trophy_percentage",
    "first_played",
    "last_finished",
    "created_at",
    "priority",
];

const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS games (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    title TEXT NOT NULL,
    platform TEXT,
    section TEXT NOT NULL DEFAULT 'played' CHECK (section IN ('played', 'backlog')),
    playtime TEXT,
    total_score INTEGER,
    aesthetic_score INTEGER,
    ost_score INTEGER,
    difficulty INTEGER,
    status TEXT,
    trophy_percentage INTEGER,
    platinum_date TEXT,
    replays INTEGER NOT NULL DEFAULT 0,
    first_played TEXT,
    last_finished TEXT,
    review TEXT,
    cover_url TEXT,
    priority INTEGER,
    created_at TEXT NOT NULL
)
"#;

/// The game record store.
#[derive(Debug, Clone)]
pub struct GameStore {
    pool: Pool<Sqlite>,
}

impl GameStore {
    /// Open (creating if missing) the database at `path` and ensure the
    /// schema exists.
    pub async fn connect(path: &Path) -> Result<Self> {
        let options = SqliteConnectOptions::new()
            .filename(path)
            .create_if_missing(true);
        let pool = SqlitePoolOptions::new().connect_with(options).await?;

        let store = Self { pool };
        store.init_schema().await?;
        Ok(store)
    }

    /// An in-memory store, used by tests. Limited to a single connection so
    /// every handle sees the same database.
    pub async fn in_memory() -> Result<Self> {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await?;

        let store = Self { pool };
        store.init_schema().await?;
        Ok(store)
    }

    /// Create the `games` table if it does not exist.
    pub async fn init_schema(&self) -> Result<()> {
        sqlx::query(SCHEMA).execute(&self.pool).await?;
        Ok(())
    }

    /// List one section. The sort column is checked against an allow-list
    /// (unknown values fall back to `title`) and the order normalizes to
    /// ASC/DESC. Backlog ordering is priority-driven by design, so the
    /// requested sort is ignored there.
    pub async fn list(&self, section: Section, sort: &str, order: &str) -> Result<Vec<Game>> {
        let sort = if SORT_COLUMNS.contains(&sort) {
            sort
        } else {
            "title"
        };
        let order = if order.eq_ignore_ascii_case("desc") {
            "DESC"
        } else {
            "ASC"
        };

        let order_by = if section == Section::Backlog {
            "COALESCE(priority, 0) DESC, title ASC".to_string()
        } else {
            format!("{} {}", sort, order)
        };

        let sql = format!("SELECT * FROM games WHERE section = ? ORDER BY {}", order_by);
        let rows = sqlx::query(&sql)
            .bind(section.as_str())
            .fetch_all(&self.pool)
            .await?;

        Ok(rows.iter().map(game_from_row).collect())
    }

    /// All games, optionally filtered by section, ordered by title. Used by
    /// the statistics aggregator and the cover scan.
    pub async fn all(&self, section: Option<Section>) -> Result<Vec<Game>> {
        let rows = match section {
            Some(section) => {
                sqlx::query("SELECT * FROM games WHERE section = ? ORDER BY title")
                    .bind(section.as_str())
                    .fetch_all(&self.pool)
                    .await?
            }
            None => {
                sqlx::query("SELECT * FROM games ORDER BY title")
                    .fetch_all(&self.pool)
                    .await?
            }
        };

        Ok(rows.iter().map(game_from_row).collect())
    }

    /// Fetch a single game by id.
    pub async fn get(&self, id: i64) -> Result<Game> {
        let row = sqlx::query("SELECT * FROM games WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or(StoreError::NotFound(id))?;

        Ok(game_from_row(&row))
    }

    /// Insert a new game and return its id.
    pub async fn add(&self, auth: &AuthContext, draft: &GameDraft) -> Result<i64> {
        require_admin(auth)?;

        let title = draft.title.trim();
        if title.is_empty() {
            return Err(StoreError::Validation(
                "Missing required field: title".to_string(),
            ));
        }

        let platform = join_platforms(&draft.platform_tags());
        // Priority only means something in the backlog.
        let priority = match draft.section {
            Section::Backlog => Some(draft.priority.unwrap_or(0)),
            Section::Played => None,
        };

        let mut tx = self.pool.begin().await?;
        let result = sqlx::query(
            r#"
            INSERT INTO games (
                title, platform, section, playtime, total_score, aesthetic_score,
                ost_score, difficulty, status, trophy_percentage, platinum_date,
                replays, first_played, last_finished, review, cover_url,
                priority, created_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(title)
        .bind(non_empty(&platform))
        .bind(draft.section.as_str())
        .bind(opt_non_empty(&draft.playtime))
        .bind(draft.total_score)
        .bind(draft.aesthetic_score)
        .bind(draft.ost_score)
        .bind(draft.difficulty)
        .bind(opt_non_empty(&draft.status))
        .bind(draft.trophy_percentage)
        .bind(opt_non_empty(&draft.platinum_date))
        .bind(draft.replays.unwrap_or(0))
        .bind(opt_non_empty(&draft.first_played))
        .bind(opt_non_empty(&draft.last_finished))
        .bind(opt_non_empty(&draft.review))
        .bind(opt_non_empty(&draft.cover_url))
        .bind(priority)
        .bind(Utc::now())
        .execute(&mut *tx)
        .await?;
        tx.commit().await?;

        let id = result.last_insert_rowid();
        debug!("Added game {} ({})", id, title);
        Ok(id)
    }

    /// Partial update: only supplied fields change. Empty strings clear a
    /// field to NULL, except `title` and `platform` which are written
    /// verbatim (clearing them stores an empty string).
    pub async fn update(&self, auth: &AuthContext, id: i64, patch: &GamePatch) -> Result<()> {
        require_admin(auth)?;

        if patch.is_empty() {
            return Err(StoreError::Validation("No fields to update".to_string()));
        }

        enum Bind {
            Text(Option<String>),
            Int(Option<i64>),
        }

        let mut sets: Vec<&str> = Vec::new();
        let mut binds: Vec<Bind> = Vec::new();

        if let Some(title) = &patch.title {
            sets.push("title = ?");
            binds.push(Bind::Text(Some(title.clone())));
        }
        if let Some(platform) = &patch.platform {
            sets.push("platform = ?");
            binds.push(Bind::Text(Some(join_platforms(&platform.clone().into_tags()))));
        }
        if let Some(section) = &patch.section {
            sets.push("section = ?");
            binds.push(Bind::Text(Some(section.as_str().to_string())));
        }

        let text_fields: [(&str, &Option<Option<String>>); 7] = [
            ("playtime = ?", &patch.playtime),
            ("status = ?", &patch.status),
            ("platinum_date = ?", &patch.platinum_date),
            ("first_played = ?", &patch.first_played),
            ("last_finished = ?", &patch.last_finished),
            ("review = ?", &patch.review),
            ("cover_url = ?", &patch.cover_url),
        ];
        for (set, value) in text_fields {
            if let Some(value) = value {
                sets.push(set);
                binds.push(Bind::Text(value.clone().filter(|s| !s.is_empty())));
            }
        }

        let int_fields: [(&str, &Option<Option<i64>>); 6] = [
            ("total_score = ?", &patch.total_score),
            ("aesthetic_score = ?", &patch.aesthetic_score),
            ("ost_score = ?", &patch.ost_score),
            ("difficulty = ?", &patch.difficulty),
            ("trophy_percentage = ?", &patch.trophy_percentage),
            ("priority = ?", &patch.priority),
        ];
        for (set, value) in int_fields {
            if let Some(value) = value {
                sets.push(set);
                binds.push(Bind::Int(*value));
            }
        }
        if let Some(replays) = &patch.replays {
            sets.push("replays = ?");
            // replays is NOT NULL; clearing it resets to 0
            binds.push(Bind::Int(replays.or(Some(0))));
        }

        let sql = format!("UPDATE games SET {} WHERE id = ?", sets.join(", "));
        let mut tx = self.pool.begin().await?;

        let mut query = sqlx::query(&sql);
        for bind in binds {
            query = match bind {
                Bind::Text(v) => query.bind(v),
                Bind::Int(v) => query.bind(v),
            };
        }
        let result = query.bind(id).execute(&mut *tx).await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound(id));
        }
        tx.commit().await?;

        debug!("Updated game {}", id);
        Ok(())
    }

    /// Hard delete.
    pub async fn delete(&self, auth: &AuthContext, id: i64) -> Result<()> {
        require_admin(auth)?;

        let mut tx = self.pool.begin().await?;
        let result = sqlx::query("DELETE FROM games WHERE id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound(id));
        }
        tx.commit().await?;

        debug!("Deleted game {}", id);
        Ok(())
    }

    /// Move a game between sections. Entering the backlog keeps the stored
    /// priority (default 0); leaving it clears the priority. Moving to the
    /// section the game is already in is rejected as a no-op.
    pub async fn move_section(
        &self,
        auth: &AuthContext,
        id: i64,
        section: Section,
    ) -> Result<()> {
        require_admin(auth)?;

        let mut tx = self.pool.begin().await?;

        let current: Option<String> = sqlx::query_scalar("SELECT section FROM games WHERE id = ?")
            .bind(id)
            .fetch_optional(&mut *tx)
            .await?;
        let Some(current) = current else {
            return Err(StoreError::NotFound(id));
        };
        if current == section.as_str() {
            return Err(StoreError::Validation("Section unchanged".to_string()));
        }

        let sql = match section {
            Section::Backlog => {
                "UPDATE games SET section = ?, priority = COALESCE(priority, 0) WHERE id = ?"
            }
            Section::Played => "UPDATE games SET section = ?, priority = NULL WHERE id = ?",
        };
        sqlx::query(sql)
            .bind(section.as_str())
            .bind(id)
            .execute(&mut *tx)
            .await?;
        tx.commit().await?;
        Ok(())
    }

    /// Set a backlog game's pickup priority. The API accepts 0–1000; the UI
    /// constrains itself to 0–10.
    pub async fn update_priority(
        &self,
        auth: &AuthContext,
        id: i64,
        priority: i64,
    ) -> Result<()> {
        require_admin(auth)?;

        if !(0..=1000).contains(&priority) {
            return Err(StoreError::Validation(
                "Priority must be between 0 and 1000".to_string(),
            ));
        }

        let mut tx = self.pool.begin().await?;
        let result = sqlx::query("UPDATE games SET priority = ? WHERE id = ?")
            .bind(priority)
            .bind(id)
            .execute(&mut *tx)
            .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound(id));
        }
        tx.commit().await?;
        Ok(())
    }

    /// Games with no cover art, for the bulk cover scan.
    pub async fn games_missing_cover(&self) -> Result<Vec<(i64, String)>> {
        let rows =
            sqlx::query("SELECT id, title FROM games WHERE cover_url IS NULL OR cover_url = ''")
                .fetch_all(&self.pool)
                .await?;

        Ok(rows
            .iter()
            .map(|row| (row.get("id"), row.get("title")))
            .collect())
    }

    /// Record a found cover URL.
    pub async fn set_cover_url(&self, auth: &AuthContext, id: i64, url: &str) -> Result<()> {
        require_admin(auth)?;

        let mut tx = self.pool.begin().await?;
        let result = sqlx::query("UPDATE games SET cover_url = ? WHERE id = ?")
            .bind(url)
            .bind(id)
            .execute(&mut *tx)
            .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound(id));
        }
        tx.commit().await?;
        Ok(())
    }
}

fn require_admin(auth: &AuthContext) -> Result<()> {
    if auth.is_admin() {
        Ok(())
    } else {
        Err(StoreError::Unauthorized)
    }
}

fn non_empty(s: &str) -> Option<&str> {
    if s.is_empty() {
        None
    } else {
        Some(s)
    }
}

fn opt_non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|s| !s.is_empty())
}

fn game_from_row(row: &SqliteRow) -> Game {
    let platform: Option<String> = row.get("platform");
    let section: String = row.get("section");

    Game {
        id: row.get("id"),
        title: row.get("title"),
        platforms: platform.as_deref().map(split_platforms).unwrap_or_default(),
        section: Section::parse_or_default(&section),
        playtime: row.get("playtime"),
        total_score: row.get("total_score"),
        aesthetic_score: row.get("aesthetic_score"),
        ost_score: row.get("ost_score"),
        difficulty: row.get("difficulty"),
        status: row.get("status"),
        trophy_percentage: row.get("trophy_percentage"),
        platinum_date: row.get("platinum_date"),
        replays: row.get("replays"),
        first_played: row.get("first_played"),
        last_finished: row.get("last_finished"),
        review: row.get("review"),
        cover_url: row.get("cover_url"),
        priority: row.get("priority"),
        created_at: row.get("created_at"),
    }
}
