use std::io;
use thiserror::Error;

use crate::config::settings::ConfigError;

/// Errors that can occur while driving git
#[derive(Debug, Error)]
pub enum GitError {
    #[error("Failed to start '{command}': {source}")]
    Spawn {
        command: String,
        #[source]
        source: io::Error,
    },

    #[error("Command '{command}' failed: {status}")]
    CommandFailed { command: String, status: String },

    #[error("Failed to parse git output: {0}")]
    ParseError(String),

    #[error("Not found: {0}")]
    NotFound(String),
}

impl GitError {
    /// True when the child process could not be started or exited unsuccessfully
    pub fn is_process_failure(&self) -> bool {
        matches!(self, GitError::Spawn { .. } | GitError::CommandFailed { .. })
    }

    /// The rendered command line, for process failures
    pub fn command(&self) -> Option<&str> {
        match self {
            GitError::Spawn { command, .. } | GitError::CommandFailed { command, .. } => {
                Some(command)
            }
            _ => None,
        }
    }
}

/// Top-level error for host tooling built on this crate
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Git error: {0}")]
    Git(#[from] GitError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

/// Result type for git operations
pub type GitResult<T> = std::result::Result<T, GitError>;

/// Result type for application-level operations
pub type AppResult<T> = std::result::Result<T, AppError>;
