use crate::error::{GitError, GitResult};
use std::fmt;
use std::path::{Path, PathBuf};
use std::process::{Command, ExitStatus, Stdio};
use std::sync::Arc;
use tracing::{debug, warn};

/// How a child process is wired to the caller's terminal
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExecutionMode {
    /// stdout and stderr are inherited; failures propagate
    Interactive,
    /// stdout is buffered and returned, stderr is inherited; failures propagate
    Captured,
    /// Like `Interactive`, but failures go to the diagnostic sink only
    BestEffort,
}

impl fmt::Display for ExecutionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ExecutionMode::Interactive => "interactive",
            ExecutionMode::Captured => "captured",
            ExecutionMode::BestEffort => "best-effort",
        };
        f.write_str(name)
    }
}

/// Runs `<program> <subcommand> <args...>` under one of three contracts.
///
/// Every call blocks until the child exits. Nothing is retried and calls
/// are not serialized against each other.
pub trait CommandExecutor {
    /// Run with the caller's stdout/stderr inherited
    fn run_interactive(&self, subcommand: &str, args: &[&str]) -> GitResult<()>;

    /// Run with stdout captured in full and returned after exit
    fn run_captured(&self, subcommand: &str, args: &[&str]) -> GitResult<String>;

    /// Run like `run_interactive`, reporting any failure to a diagnostic sink
    /// instead of returning it
    fn run_best_effort(&self, subcommand: &str, args: &[&str]);
}

/// Receives failures swallowed by best-effort execution
pub trait DiagnosticSink: Send + Sync {
    fn report(&self, error: &GitError);
}

/// Default sink: emits a `warn` event through `tracing`
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink;

impl DiagnosticSink for TracingSink {
    fn report(&self, error: &GitError) {
        warn!(error = %error, "ignoring failure from best-effort command");
    }
}

/// Render an invocation for logs and error messages.
///
/// Arguments that are empty or contain whitespace are shown quoted so
/// argument boundaries stay visible.
pub fn render_command(program: &str, subcommand: &str, args: &[&str]) -> String {
    let mut rendered = format!("{} {}", program, subcommand);
    for arg in args {
        rendered.push(' ');
        if arg.is_empty() || arg.chars().any(char::is_whitespace) {
            rendered.push_str(&format!("{:?}", arg));
        } else {
            rendered.push_str(arg);
        }
    }
    rendered
}

fn describe_status(status: ExitStatus) -> String {
    match status.code() {
        Some(code) => format!("exit code {}", code),
        None => "terminated by signal".to_string(),
    }
}

/// Executes commands by spawning a real child process
pub struct ProcessExecutor {
    program: String,
    working_dir: Option<PathBuf>,
    sink: Arc<dyn DiagnosticSink>,
}

impl ProcessExecutor {
    /// Bind an executor to a program resolved on `PATH`
    pub fn new<S: Into<String>>(program: S) -> Self {
        Self {
            program: program.into(),
            working_dir: None,
            sink: Arc::new(TracingSink),
        }
    }

    /// Bind an executor to `git`
    pub fn git() -> Self {
        Self::new("git")
    }

    /// Run every command from `dir` instead of the current directory
    pub fn with_working_dir<P: AsRef<Path>>(mut self, dir: P) -> Self {
        self.working_dir = Some(dir.as_ref().to_path_buf());
        self
    }

    /// Replace the sink receiving best-effort failures
    pub fn with_sink(mut self, sink: Arc<dyn DiagnosticSink>) -> Self {
        self.sink = sink;
        self
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    pub fn working_dir(&self) -> Option<&Path> {
        self.working_dir.as_deref()
    }

    /// Spawn one child in `mode`. Returns the captured stdout for
    /// `ExecutionMode::Captured`, `None` otherwise.
    fn spawn(
        &self,
        mode: ExecutionMode,
        subcommand: &str,
        args: &[&str],
    ) -> GitResult<Option<String>> {
        let rendered = render_command(&self.program, subcommand, args);
        debug!(%mode, command = %rendered, "running command");

        let mut command = Command::new(&self.program);
        command.arg(subcommand).args(args).stderr(Stdio::inherit());
        if let Some(dir) = &self.working_dir {
            command.current_dir(dir);
        }

        let spawn_error = |source| GitError::Spawn {
            command: rendered.clone(),
            source,
        };

        let (status, stdout) = match mode {
            ExecutionMode::Captured => {
                let output = command
                    .stdin(Stdio::null())
                    .stdout(Stdio::piped())
                    .output()
                    .map_err(spawn_error)?;
                let stdout = String::from_utf8_lossy(&output.stdout).into_owned();
                (output.status, Some(stdout))
            }
            ExecutionMode::Interactive | ExecutionMode::BestEffort => {
                let status = command
                    .stdin(Stdio::inherit())
                    .stdout(Stdio::inherit())
                    .status()
                    .map_err(spawn_error)?;
                (status, None)
            }
        };

        if !status.success() {
            return Err(GitError::CommandFailed {
                command: rendered,
                status: describe_status(status),
            });
        }

        debug!(%mode, command = %rendered, "command succeeded");
        Ok(stdout)
    }
}

impl CommandExecutor for ProcessExecutor {
    fn run_interactive(&self, subcommand: &str, args: &[&str]) -> GitResult<()> {
        self.spawn(ExecutionMode::Interactive, subcommand, args)
            .map(|_| ())
    }

    fn run_captured(&self, subcommand: &str, args: &[&str]) -> GitResult<String> {
        self.spawn(ExecutionMode::Captured, subcommand, args)
            .map(Option::unwrap_or_default)
    }

    fn run_best_effort(&self, subcommand: &str, args: &[&str]) {
        if let Err(e) = self.spawn(ExecutionMode::BestEffort, subcommand, args) {
            self.sink.report(&e);
        }
    }
}

impl fmt::Debug for ProcessExecutor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProcessExecutor")
            .field("program", &self.program)
            .field("working_dir", &self.working_dir)
            .finish_non_exhaustive()
    }
}
