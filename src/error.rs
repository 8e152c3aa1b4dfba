//! Error types for teamrate

use std::time::Duration;
use thiserror::Error;

/// Result type alias for teamrate operations
pub type Result<T> = std::result::Result<T, Error>;

/// Top-level error type for the application
#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Team(#[from] TeamError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("Interactive prompt error: {0}")]
    Dialoguer(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Operation failed: {0}")]
    Other(String),
}

impl From<dialoguer::Error> for Error {
    fn from(err: dialoguer::Error) -> Self {
        Error::Dialoguer(err.to_string())
    }
}

impl Error {
    /// Whether another attempt at the same operation could succeed.
    ///
    /// Only store failures are worth retrying. Validation, configuration and
    /// local I/O errors fail the same way every time.
    pub fn is_transient(&self) -> bool {
        matches!(self, Error::Store(_))
    }
}

/// Repository operations, used to phrase the message shown once retries run out
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    FetchTeams,
    FetchApprovedTeams,
    FetchTeam,
    CreateTeam,
    UpdateTeam,
    RateTeam,
    UpdateStatus,
}

impl Operation {
    /// User-facing failure text for this operation
    pub fn failure_message(&self) -> &'static str {
        match self {
            Operation::FetchTeams => "Failed to fetch teams. Please check your internet connection.",
            Operation::FetchApprovedTeams => {
                "Failed to fetch approved teams. Please check your internet connection."
            }
            Operation::FetchTeam => "Failed to fetch team. Please check your internet connection.",
            Operation::CreateTeam => {
                "Failed to add team. Please check your internet connection and try again."
            }
            Operation::UpdateTeam => {
                "Failed to update team. Please check your internet connection and try again."
            }
            Operation::RateTeam => {
                "Failed to submit rating. Please check your internet connection and try again."
            }
            Operation::UpdateStatus => {
                "Failed to update team status. Please check your internet connection."
            }
        }
    }
}

/// Team validation and operation errors
#[derive(Debug, Error)]
pub enum TeamError {
    #[error("Rating must be between 1 and 10 (got {0})")]
    InvalidRating(i64),

    #[error("Team not found: {0}")]
    TeamNotFound(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Not authorized: {0}")]
    NotAuthorized(String),

    #[error("{}", .0.failure_message())]
    Unavailable(Operation),
}

/// Document store errors
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Authentication with the document store failed. Check the configured API key.")]
    Unauthorized,

    #[error("Access denied by the document store.")]
    Forbidden,

    #[error("Document not found: {0}")]
    NotFound(String),

    /// Carries the server's Retry-After hint for display only. Repository
    /// retries keep their own linear backoff.
    #[error("Rate limit exceeded. Retry after {0:?}")]
    RateLimit(Duration),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Server error: {0}")]
    ServerError(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Invalid store response: {0}")]
    InvalidResponse(String),

    #[error("Database error: {0}")]
    Database(String),
}

impl From<reqwest::Error> for StoreError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            StoreError::Network("Request timed out".to_string())
        } else if err.is_connect() {
            StoreError::Network("Failed to connect to document store".to_string())
        } else {
            StoreError::Network(err.to_string())
        }
    }
}

impl From<rusqlite::Error> for StoreError {
    fn from(err: rusqlite::Error) -> Self {
        StoreError::Database(err.to_string())
    }
}

/// Configuration-related errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Configuration file not found. Run `teamrate init` to set up.")]
    NotFound,

    #[error("Failed to parse configuration: {0}")]
    ParseError(String),

    #[error("Invalid configuration: {0}")]
    Invalid(String),

    #[error("Failed to save configuration: {0}")]
    SaveError(String),

    #[error("No user identity configured. Run `teamrate init` or pass --user <ID>.")]
    MissingIdentity,

    #[error("Firestore backend requires a project_id. Run `teamrate init` to set it.")]
    MissingProjectId,
}

impl From<serde_yaml::Error> for ConfigError {
    fn from(err: serde_yaml::Error) -> Self {
        ConfigError::ParseError(err.to_string())
    }
}
