//! Global CLI options shared across all commands
//!
//! Collects the global flags once so handlers take a single parameter.

use crate::cli::{Cli, OutputFormat};

/// Global CLI options passed to all command handlers.
///
/// # Precedence
///
/// CLI flag > environment variable > config file > default. This struct
/// captures the CLI/env layer; config file defaults are resolved later in
/// `CommandContext`.
#[derive(Debug, Clone, Default)]
pub struct GlobalOptions {
    /// Output format, if given on the command line or in the environment
    pub format: Option<OutputFormat>,

    /// Custom config file path (defaults to ~/.teamrate/config.yaml)
    pub config: Option<String>,

    /// Identity override (bypasses user_id in config)
    pub user: Option<String>,

    /// Debug logging requested
    pub debug: bool,
}

impl GlobalOptions {
    /// Create GlobalOptions from a parsed CLI struct.
    pub fn from_cli(cli: &Cli) -> Self {
        Self {
            format: cli.format,
            config: cli.config.clone(),
            user: cli.user.clone(),
            debug: cli.debug,
        }
    }

    /// Get config path as `Option<&str>`.
    pub fn config_ref(&self) -> Option<&str> {
        self.config.as_deref()
    }

    /// Get identity override as `Option<&str>`.
    pub fn user_ref(&self) -> Option<&str> {
        self.user.as_deref()
    }
}
