//! Free-text parsers.
//!
//! The collection stores playtimes and completion times exactly as typed,
//! in Italian, with decades of accumulated formatting quirks. These parsers
//! turn that text into numbers for the statistics rankings; anything they
//! cannot read is treated as "not recorded", never as an error.

pub mod completion;
pub mod playtime;

pub use completion::{parse_completion, ParsedCompletion};
pub use playtime::parse_playtime;
