//! # Ludoteca
//!
//! A personal video-game collection tracker.
//!
//! ## Architecture
//!
//! - **models**: Core data structures (games, sections, platform tags)
//! - **store**: SQLite persistence with authorization-checked mutations
//! - **parse**: Free-text parsers (Italian completion times, playtime sums)
//! - **import**: Bulk TSV import with per-row error accumulation
//! - **stats**: Distributions and rankings derived from the collection
//! - **covers**: RAWG cover-art lookup and bulk scan
//! - **api**: REST API endpoints
//! - **auth**: Admin sessions and the authorization context
//! - **config**: Configuration loading and validation

pub mod api;
pub mod auth;
pub mod config;
pub mod covers;
pub mod import;
pub mod models;
pub mod parse;
pub mod stats;
pub mod store;

pub use models::*;
