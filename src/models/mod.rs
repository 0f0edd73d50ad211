//! Core data models.

mod game;
mod platform;
mod status;

pub use game::*;
pub use platform::*;
pub use status::*;
