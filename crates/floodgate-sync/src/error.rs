//! Error types for floodgate-sync

use floodgate_core::ResourceKind;
use thiserror::Error;

/// Result type for floodgate-sync operations
pub type Result<T> = std::result::Result<T, SyncError>;

/// Errors that can occur while loading, comparing or syncing resources
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum SyncError {
    /// A required identity field is missing or has the wrong type
    #[error("invalid {kind} definition: '{field}' {reason}")]
    Validation {
        kind: ResourceKind,
        field: String,
        reason: String,
    },

    /// State could not be encoded or decoded
    #[error("serialization error: {0}")]
    Serialization(String),

    /// Reading the remote state failed
    #[error("failed to fetch {kind} '{resource}' from Gate: {message}")]
    RemoteFetch {
        kind: ResourceKind,
        resource: String,
        status: Option<u16>,
        message: String,
    },

    /// Writing the local state to Gate failed
    #[error("failed to save {kind} '{resource}' to Gate: {message}")]
    RemoteSave {
        kind: ResourceKind,
        resource: String,
        status: Option<u16>,
        message: String,
    },

    /// Change detection was requested before the remote state was fetched
    #[error("remote state of {kind} '{resource}' has not been loaded")]
    StateMissing { kind: ResourceKind, resource: String },

    /// HTTP transport failure
    #[error("Gate request failed: {0}")]
    Transport(String),

    /// Configuration or definition loading failed
    #[error(transparent)]
    Config(#[from] floodgate_core::CoreError),

    /// One or more resources failed to sync
    #[error("{failed} of {total} resource(s) failed to sync:\n{details}")]
    SyncIncomplete {
        failed: usize,
        total: usize,
        details: String,
    },
}

impl From<serde_json::Error> for SyncError {
    fn from(e: serde_json::Error) -> Self {
        SyncError::Serialization(e.to_string())
    }
}

impl From<reqwest::Error> for SyncError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            SyncError::Transport(format!("request timed out: {}", e))
        } else if e.is_connect() {
            SyncError::Transport(format!("connection failed: {}", e))
        } else {
            SyncError::Transport(e.to_string())
        }
    }
}

impl From<url::ParseError> for SyncError {
    fn from(e: url::ParseError) -> Self {
        SyncError::Transport(format!("invalid Gate URL: {}", e))
    }
}

impl SyncError {
    /// HTTP status attached to a remote error, if any
    pub fn status(&self) -> Option<u16> {
        match self {
            SyncError::RemoteFetch { status, .. } | SyncError::RemoteSave { status, .. } => *status,
            _ => None,
        }
    }

    /// Whether the error was raised by definition validation
    pub fn is_validation(&self) -> bool {
        matches!(self, SyncError::Validation { .. })
    }
}
