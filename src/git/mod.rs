pub mod branch;
pub mod executor;
pub mod parser;
pub mod repository;

// Re-export commonly used types
pub use branch::{BranchNaming, ParsedBranch};
pub use executor::{
    CommandExecutor, DiagnosticSink, ExecutionMode, ProcessExecutor, TracingSink, render_command,
};
pub use parser::{
    Commit, FIELD_DELIMITER, RECORD_DELIMITER, RemoteConfig, parse_branch_list,
    parse_commit_log, parse_remote_url,
};
pub use repository::RepositoryClient;
