//! Configuration management for teamrate

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::{ConfigError, Result};
use crate::team::RetryPolicy;
use crate::team::retry::{DEFAULT_BASE_DELAY, DEFAULT_MAX_ATTEMPTS};

/// Directory under the home directory holding config and local data
const CONFIG_DIR: &str = ".teamrate";

/// File name of the local store, next to the config file
pub const LOCAL_STORE_FILE: &str = "teams.db";

/// Application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Identity used as owner, rater and reviewer
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,

    /// Name recorded as a team's creator
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,

    /// Identities allowed to approve and reject teams
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub reviewers: Vec<String>,

    /// Where teams are stored
    #[serde(default)]
    pub backend: Backend,

    #[serde(default)]
    pub retry: RetrySettings,

    /// User preferences
    #[serde(default)]
    pub preferences: Preferences,
}

/// Document store backend
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Backend {
    /// SQLite file on this machine
    Local {
        /// Defaults to `teams.db` beside the config file
        #[serde(default, skip_serializing_if = "Option::is_none")]
        path: Option<PathBuf>,
    },
    /// Hosted Firestore database over REST
    Firestore {
        project_id: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        api_key: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        id_token: Option<String>,
        /// Emulator or proxy endpoint
        #[serde(default, skip_serializing_if = "Option::is_none")]
        base_url: Option<String>,
    },
}

impl Default for Backend {
    fn default() -> Self {
        Backend::Local { path: None }
    }
}

impl Backend {
    pub fn name(&self) -> &'static str {
        match self {
            Backend::Local { .. } => "local",
            Backend::Firestore { .. } => "firestore",
        }
    }
}

/// Retry settings for store operations
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetrySettings {
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,

    #[serde(default = "default_base_delay_ms")]
    pub base_delay_ms: u64,
}

fn default_max_attempts() -> u32 {
    DEFAULT_MAX_ATTEMPTS
}

fn default_base_delay_ms() -> u64 {
    DEFAULT_BASE_DELAY.as_millis() as u64
}

impl Default for RetrySettings {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            base_delay_ms: default_base_delay_ms(),
        }
    }
}

impl RetrySettings {
    pub fn policy(&self) -> RetryPolicy {
        RetryPolicy::new(self.max_attempts, Duration::from_millis(self.base_delay_ms))
    }
}

/// User preferences
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Preferences {
    /// Default output format
    #[serde(skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
}

impl Config {
    /// Get the default config file path
    pub fn default_path() -> Result<PathBuf> {
        let home = dirs::home_dir().ok_or(ConfigError::Invalid(
            "Could not determine home directory".to_string(),
        ))?;

        Ok(home.join(CONFIG_DIR).join("config.yaml"))
    }

    /// Load configuration from a specific path
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(ConfigError::NotFound.into());
        }

        let contents = std::fs::read_to_string(path)?;
        let config: Config = serde_yaml::from_str(&contents).map_err(ConfigError::from)?;
        config.validate()?;

        Ok(config)
    }

    /// Save configuration to a specific path
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let contents =
            serde_yaml::to_string(self).map_err(|e| ConfigError::SaveError(e.to_string()))?;
        std::fs::write(path, contents)?;

        // API keys may live in here
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let mut perms = std::fs::metadata(path)?.permissions();
            perms.set_mode(0o600);
            std::fs::set_permissions(path, perms)?;
        }

        Ok(())
    }

    /// Check settings that serde cannot
    pub fn validate(&self) -> Result<()> {
        if let Backend::Firestore { project_id, .. } = &self.backend
            && project_id.trim().is_empty()
        {
            return Err(ConfigError::MissingProjectId.into());
        }
        Ok(())
    }

    /// Acting identity: the override if given, else the configured user.
    pub fn identity(&self, override_id: Option<&str>) -> Result<String> {
        override_id
            .or(self.user_id.as_deref())
            .map(str::trim)
            .filter(|id| !id.is_empty())
            .map(str::to_string)
            .ok_or_else(|| ConfigError::MissingIdentity.into())
    }

    /// Path of the local SQLite store for a config loaded from `config_path`
    pub fn local_store_path(&self, config_path: &Path) -> Option<PathBuf> {
        match &self.backend {
            Backend::Local { path: Some(path) } => Some(path.clone()),
            Backend::Local { path: None } => Some(
                config_path
                    .parent()
                    .unwrap_or_else(|| Path::new("."))
                    .join(LOCAL_STORE_FILE),
            ),
            Backend::Firestore { .. } => None,
        }
    }
}
