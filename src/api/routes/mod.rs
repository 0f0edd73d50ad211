//! Route handlers, grouped by resource.

pub mod auth;
pub mod covers;
pub mod games;
pub mod import;
pub mod statistics;
