//! Command execution context
//!
//! Loads the config once, opens the configured store and wires up the team
//! repository so each command starts from a ready-to-use context.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use clap::ValueEnum;
use log::debug;

use crate::cli::{GlobalOptions, OutputFormat};
use crate::config::{Backend, Config};
use crate::error::{ConfigError, Result};
use crate::store::{DocumentStore, FirestoreStore, SqliteStore};
use crate::team::{ReviewerList, TeamRepository};

/// Context for command execution containing config, repository, and runtime options.
pub struct CommandContext {
    /// Loaded and validated configuration
    pub config: Config,
    /// Repository over the configured store
    pub repo: TeamRepository,
    /// Output format preference
    pub format: OutputFormat,
    user_override: Option<String>,
}

impl CommandContext {
    /// Create a new command context.
    ///
    /// # Errors
    /// Returns error if the config cannot be loaded or the store cannot be opened.
    pub fn new(opts: &GlobalOptions) -> Result<Self> {
        let config_path = resolve_config_path(opts.config_ref())?;
        let config = Config::load_from(&config_path)?;

        debug!("Loaded config from {}", config_path.display());
        let store = open_store(&config, &config_path)?;
        let reviewers = Arc::new(ReviewerList::new(&config.reviewers));
        let repo = TeamRepository::new(store, reviewers).with_retry(config.retry.policy());

        let format = resolve_format(opts.format, &config);

        Ok(Self {
            config,
            repo,
            format,
            user_override: opts.user.clone(),
        })
    }

    /// Identity acting in this command.
    pub fn identity(&self) -> Result<String> {
        self.config.identity(self.user_override.as_deref())
    }
}

/// Config file to use: the override, else the default location
pub fn resolve_config_path(path: Option<&str>) -> Result<PathBuf> {
    match path {
        Some(path) => Ok(PathBuf::from(path)),
        None => Config::default_path(),
    }
}

/// Output format: flag or env first, then the config preference, then pretty.
pub fn resolve_format(flag: Option<OutputFormat>, config: &Config) -> OutputFormat {
    flag.or_else(|| {
        config
            .preferences
            .format
            .as_deref()
            .and_then(|f| OutputFormat::from_str(f, true).ok())
    })
    .unwrap_or_default()
}

/// Open the store the config points at.
pub fn open_store(config: &Config, config_path: &Path) -> Result<Arc<dyn DocumentStore>> {
    match &config.backend {
        Backend::Local { .. } => {
            let path = config.local_store_path(config_path).ok_or_else(|| {
                ConfigError::Invalid("Local backend has no store path".to_string())
            })?;
            debug!("Opening local store at {}", path.display());
            Ok(Arc::new(SqliteStore::open(&path)?))
        }
        Backend::Firestore {
            project_id,
            api_key,
            id_token,
            base_url,
        } => {
            if project_id.trim().is_empty() {
                return Err(ConfigError::MissingProjectId.into());
            }
            debug!("Using Firestore project {}", project_id);
            Ok(Arc::new(FirestoreStore::new(
                project_id,
                api_key.clone(),
                id_token.clone(),
                base_url.as_deref(),
            )?))
        }
    }
}
