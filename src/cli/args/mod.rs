//! Shared CLI argument types

mod common;
mod global;

pub use common::{OutputFormat, parse_status};
pub use global::GlobalOptions;
