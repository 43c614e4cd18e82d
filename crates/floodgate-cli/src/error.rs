//! CLI error types with exit code handling
//!
//! Library errors are folded into a single `CliError` whose variant decides
//! the process exit code.

use miette::Diagnostic;
use thiserror::Error;

use floodgate_core::CoreError;
use floodgate_sync::SyncError;

use crate::exit_codes;

/// CLI-specific error type that includes exit code information
#[derive(Error, Debug, Diagnostic, Clone)]
pub enum CliError {
    /// Config file missing or invalid
    #[error("Configuration error: {message}")]
    #[diagnostic(code(floodgate::cli::config))]
    Config {
        message: String,
        #[help]
        help: Option<String>,
    },

    /// A resource definition could not be read or is malformed
    #[error("Definition error: {message}")]
    #[diagnostic(code(floodgate::cli::definition))]
    Definition {
        message: String,
        #[help]
        help: Option<String>,
    },

    /// Talking to Gate failed
    #[error("Gate error: {message}")]
    #[diagnostic(code(floodgate::cli::gate))]
    Gate {
        message: String,
        #[help]
        help: Option<String>,
    },

    /// Local definitions differ from Gate
    #[error("{count} resource(s) out of sync with Gate")]
    #[diagnostic(code(floodgate::cli::out_of_sync), help("Run `floodgate sync` to push local definitions"))]
    OutOfSync { count: usize },

    /// Some resources failed to sync
    #[error("{failed} of {total} resource(s) failed to sync")]
    #[diagnostic(code(floodgate::cli::sync))]
    SyncFailed {
        failed: usize,
        total: usize,
        #[help]
        details: Option<String>,
    },

    /// IO error (file not found, permissions, etc.)
    #[error("IO error: {message}")]
    #[diagnostic(code(floodgate::cli::io))]
    Io { message: String },

    /// Internal error (runtime, unexpected failure)
    #[error("Internal error: {message}")]
    #[diagnostic(code(floodgate::cli::internal))]
    Internal { message: String },
}

impl CliError {
    /// Get the exit code for this error
    pub fn exit_code(&self) -> i32 {
        match self {
            CliError::Config { .. } => exit_codes::CONFIG_ERROR,
            CliError::Definition { .. } => exit_codes::DEFINITION_ERROR,
            CliError::Gate { .. } => exit_codes::GATE_ERROR,
            CliError::OutOfSync { .. } => exit_codes::OUT_OF_SYNC,
            CliError::SyncFailed { .. } => exit_codes::SYNC_FAILED,
            CliError::Io { .. } => exit_codes::IO_ERROR,
            CliError::Internal { .. } => exit_codes::ERROR,
        }
    }

    /// Whether the error needs a report on stderr
    ///
    /// Drift is already shown on stdout; the exit code is enough.
    pub fn is_reported(&self) -> bool {
        !matches!(self, CliError::OutOfSync { .. })
    }

    /// Create an internal error
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    fn definition(message: impl Into<String>) -> Self {
        Self::Definition {
            message: message.into(),
            help: None,
        }
    }

    fn gate(message: impl Into<String>, help: Option<&str>) -> Self {
        Self::Gate {
            message: message.into(),
            help: help.map(str::to_string),
        }
    }
}

impl From<CoreError> for CliError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::ConfigNotFound { .. } => CliError::Config {
                message: err.to_string(),
                help: Some(
                    "Create the file or point --config / FLOODGATE_CONFIG at an existing one"
                        .to_string(),
                ),
            },
            CoreError::InvalidConfig { .. } => CliError::Config {
                message: err.to_string(),
                help: None,
            },
            CoreError::ResourcePathNotFound { .. } => CliError::Definition {
                message: err.to_string(),
                help: Some("Resource paths are resolved relative to the config file".to_string()),
            },
            CoreError::YamlParse { .. }
            | CoreError::JsonParse { .. }
            | CoreError::InvalidDefinition { .. } => CliError::definition(err.to_string()),
            CoreError::Io(e) => CliError::from(e),
        }
    }
}

impl From<SyncError> for CliError {
    fn from(err: SyncError) -> Self {
        match err {
            SyncError::Config(e) => CliError::from(e),
            SyncError::Validation { .. } => CliError::definition(err.to_string()),
            SyncError::RemoteFetch { status: Some(401 | 403), .. }
            | SyncError::RemoteSave { status: Some(401 | 403), .. } => {
                CliError::gate(err.to_string(), Some("Check the credentials under `auth`"))
            }
            SyncError::Transport(_) => CliError::gate(
                err.to_string(),
                Some("Check that `endpoint` points at a reachable Gate"),
            ),
            SyncError::RemoteFetch { .. } | SyncError::RemoteSave { .. } => {
                CliError::gate(err.to_string(), None)
            }
            SyncError::SyncIncomplete {
                failed,
                total,
                details,
            } => CliError::SyncFailed {
                failed,
                total,
                details: Some(details),
            },
            other => CliError::internal(other.to_string()),
        }
    }
}

impl From<std::io::Error> for CliError {
    fn from(err: std::io::Error) -> Self {
        CliError::Io {
            message: err.to_string(),
        }
    }
}

impl From<serde_json::Error> for CliError {
    fn from(err: serde_json::Error) -> Self {
        CliError::internal(err.to_string())
    }
}

/// Result type for CLI operations
pub type Result<T> = std::result::Result<T, CliError>;
