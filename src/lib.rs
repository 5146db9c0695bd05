pub mod config;
pub mod error;
pub mod git;

// Re-export commonly used types for convenience
pub use config::Config;
pub use error::{AppError, AppResult, GitError, GitResult};
pub use git::{
    Commit, CommandExecutor, DiagnosticSink, ProcessExecutor, RemoteConfig, RepositoryClient,
};
