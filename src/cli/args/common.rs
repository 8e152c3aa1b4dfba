//! Common CLI types shared across commands

use crate::team::TeamStatus;

/// Output format options
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// Pretty format - human-optimized rich formatting
    #[default]
    Pretty,
    /// Table format - one row per entry
    Table,
    /// JSON format - structured for scripts
    Json,
}

/// Parse a `--status` value, ignoring case
pub fn parse_status(value: &str) -> Result<TeamStatus, String> {
    value.parse().map_err(|e: crate::error::TeamError| e.to_string())
}
