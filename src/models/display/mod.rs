//! Display model implementations for table and JSON output
//!
//! Display models turn domain types into CLI-friendly rows with column names.

mod common;
mod team;

pub use common::format_average;
pub use team::{StandingDisplay, SuggestionDisplay, TeamDisplay};
