use crate::config::settings::GitConfig;
use crate::error::{GitError, GitResult};
use crate::git::branch::{BranchNaming, ParsedBranch};
use crate::git::executor::{CommandExecutor, ProcessExecutor};
use crate::git::parser::{self, Commit, RemoteConfig};
use std::path::Path;

const DEFAULT_REMOTE: &str = "origin";
const DEFAULT_MAIN_BRANCH: &str = "master";
const FIX_COMMIT_TIME_EXEC: &str = "git commit --amend --reset-author --no-edit";

/// Typed git operations on top of a [`CommandExecutor`].
///
/// Nothing is cached: each call issues exactly one command against the
/// working checkout, so sequential calls observe all prior effects.
#[derive(Debug)]
pub struct RepositoryClient<E = ProcessExecutor> {
    executor: E,
    remote: String,
    main_branch: String,
    naming: BranchNaming,
}

impl RepositoryClient<ProcessExecutor> {
    /// Drive `git` from the current directory
    pub fn git() -> Self {
        Self::new(ProcessExecutor::git())
    }

    /// Drive `git` inside `path`
    pub fn open<P: AsRef<Path>>(path: P) -> Self {
        Self::new(ProcessExecutor::git().with_working_dir(path))
    }

    /// Build a client from loaded configuration
    pub fn from_config(config: &GitConfig) -> Self {
        Self::with_remote(
            ProcessExecutor::new(config.program.as_str()),
            &config.remote,
            &config.main_branch,
        )
        .with_naming(BranchNaming::new(&config.branch_prefix, &config.branch_split))
    }
}

impl<E: CommandExecutor> RepositoryClient<E> {
    pub fn new(executor: E) -> Self {
        Self::with_remote(executor, DEFAULT_REMOTE, DEFAULT_MAIN_BRANCH)
    }

    pub fn with_remote(executor: E, remote: &str, main_branch: &str) -> Self {
        Self {
            executor,
            remote: remote.to_string(),
            main_branch: main_branch.to_string(),
            naming: BranchNaming::default(),
        }
    }

    /// Use `naming` to recognise and build stacked branch names
    pub fn with_naming(mut self, naming: BranchNaming) -> Self {
        self.naming = naming;
        self
    }

    pub fn naming(&self) -> &BranchNaming {
        &self.naming
    }

    pub fn executor(&self) -> &E {
        &self.executor
    }

    pub fn remote(&self) -> &str {
        &self.remote
    }

    pub fn main_branch(&self) -> &str {
        &self.main_branch
    }

    /// Fetch the main branch from the remote, pruning stale refs
    pub fn fetch_default(&self) -> GitResult<()> {
        self.fetch_branch(&self.main_branch)
    }

    pub fn fetch_branch(&self, branch: &str) -> GitResult<()> {
        self.executor
            .run_interactive("fetch", &["-p", self.remote.as_str(), branch])
    }

    pub fn push(&self, revisions: &[&str]) -> GitResult<()> {
        self.push_revisions(revisions, false)
    }

    pub fn force_push(&self, revisions: &[&str]) -> GitResult<()> {
        self.push_revisions(revisions, true)
    }

    fn push_revisions(&self, revisions: &[&str], force: bool) -> GitResult<()> {
        let mut args = Vec::with_capacity(revisions.len() + 2);
        if force {
            args.push("-f");
        }
        args.push(self.remote.as_str());
        args.extend_from_slice(revisions);
        self.executor.run_interactive("push", &args)
    }

    pub fn checkout(&self, revision: &str) -> GitResult<()> {
        self.executor.run_interactive("checkout", &[revision])
    }

    pub fn checkout_new_branch(&self, branch: &str) -> GitResult<()> {
        self.executor.run_interactive("checkout", &["-b", branch])
    }

    /// Delete a local branch; failures are only diagnosed
    pub fn delete_branch(&self, branch: &str) {
        self.executor.run_best_effort("branch", &["-D", branch]);
    }

    /// Delete a branch on the remote; failures are only diagnosed
    pub fn delete_remote_branch(&self, branch: &str) {
        self.executor
            .run_best_effort("push", &[self.remote.as_str(), "--delete", branch]);
    }

    /// Delete the remote-tracking ref `<remote>/<branch>`; failures are only diagnosed
    pub fn delete_remote_tracking_branch(&self, branch: &str) {
        let tracking = format!("{}/{}", self.remote, branch);
        self.executor
            .run_best_effort("branch", &["-D", "-r", tracking.as_str()]);
    }

    /// Delete `branch` on the remote, locally and as a remote-tracking ref
    pub fn delete_branch_everywhere(&self, branch: &str) {
        self.delete_remote_branch(branch);
        self.delete_branch(branch);
        self.delete_remote_tracking_branch(branch);
    }

    /// Point `branch` at `start_point`, creating it if needed
    pub fn force_branch(&self, branch: &str, start_point: &str) -> GitResult<()> {
        self.executor
            .run_interactive("branch", &["-f", branch, start_point])
    }

    pub fn current_branch(&self) -> GitResult<String> {
        self.single_line("rev-parse", &["--abbrev-ref", "HEAD"])
    }

    /// All local branches, without the detached-HEAD pseudo-branch
    pub fn all_branches(&self) -> GitResult<Vec<String>> {
        let output = self
            .executor
            .run_captured("branch", &["--format", "'%(refname:short)'"])?;
        Ok(parser::parse_branch_list(&output))
    }

    /// Local branches carrying the configured prefix
    pub fn managed_branches(&self) -> GitResult<Vec<String>> {
        let branches = self.all_branches()?;
        Ok(self
            .naming
            .managed(&branches)
            .into_iter()
            .map(str::to_string)
            .collect())
    }

    /// The parts of stack `base`, ordered by part number
    pub fn stack_branches(&self, base: &str) -> GitResult<Vec<ParsedBranch>> {
        let branches = self.all_branches()?;
        Ok(self.naming.stack(&branches, base))
    }

    pub fn current_parsed_branch(&self) -> GitResult<ParsedBranch> {
        let branch = self.current_branch()?;
        Ok(self.naming.parse(&branch))
    }

    pub fn branch_exists(&self, branch: &str) -> bool {
        let full_ref = format!("refs/heads/{}", branch);
        self.executor
            .run_captured("rev-parse", &["--verify", "--quiet", full_ref.as_str()])
            .is_ok()
    }

    /// Resolve a ref to its full hash
    pub fn resolve_ref(&self, reference: &str) -> GitResult<String> {
        self.single_line("rev-parse", &[reference])
    }

    /// Committer timestamp of `reference`, in seconds since the epoch
    pub fn commit_timestamp(&self, reference: &str) -> GitResult<i64> {
        let output = self.single_line(
            "show",
            &["--no-patch", "--no-notes", "--pretty=format:%ct", reference],
        )?;
        output.parse::<i64>().map_err(|_| {
            GitError::ParseError(format!("invalid commit timestamp: {:?}", output))
        })
    }

    pub fn reset(&self, reference: &str) -> GitResult<()> {
        self.executor.run_interactive("reset", &[reference])
    }

    pub fn reset_hard(&self, reference: &str) -> GitResult<()> {
        self.executor.run_interactive("reset", &["--hard", reference])
    }

    pub fn diff(&self, start_ref: &str, end_ref: &str) -> GitResult<()> {
        let range = format!("{}..{}", start_ref, end_ref);
        self.executor.run_interactive("diff", &[range.as_str()])
    }

    /// Diff from `reference` to HEAD
    pub fn diff_current(&self, reference: &str) -> GitResult<()> {
        self.diff(reference, "HEAD")
    }

    pub fn rebase_interactive(&self, reference: &str) -> GitResult<()> {
        self.executor.run_interactive("rebase", &["-i", reference])
    }

    pub fn rebase_abort(&self) -> GitResult<()> {
        self.executor.run_interactive("rebase", &["--abort"])
    }

    pub fn rebase_continue(&self) -> GitResult<()> {
        self.executor.run_interactive("rebase", &["--continue"])
    }

    /// Rebase onto `reference`, re-committing each commit with a fresh
    /// author date so hosts display them in order
    pub fn rebase_fix_commit_times(&self, reference: &str) -> GitResult<()> {
        self.executor
            .run_interactive("rebase", &[reference, "--exec", FIX_COMMIT_TIME_EXEC])
    }

    /// Cherry-pick `(start_ref, end_ref]`, optionally with a merge strategy option
    pub fn cherry_pick(
        &self,
        start_ref: &str,
        end_ref: &str,
        strategy: Option<&str>,
    ) -> GitResult<()> {
        let range = format!("{}..{}", start_ref, end_ref);
        match strategy {
            Some(strategy) => self.executor.run_interactive(
                "cherry-pick",
                &[range.as_str(), "--strategy-option", strategy],
            ),
            None => self.executor.run_interactive("cherry-pick", &[range.as_str()]),
        }
    }

    pub fn cherry_pick_continue(&self) -> GitResult<()> {
        self.executor.run_interactive("cherry-pick", &["--continue"])
    }

    pub fn cherry_pick_abort(&self) -> GitResult<()> {
        self.executor.run_interactive("cherry-pick", &["--abort"])
    }

    /// Commits in `(start_ref, end_ref]`, most recent first
    pub fn commits(&self, start_ref: &str, end_ref: &str) -> GitResult<Vec<Commit>> {
        let range = format!("{}..{}", start_ref, end_ref);
        let format = parser::log_format();
        let output = self
            .executor
            .run_captured("log", &[format.as_str(), range.as_str()])?;
        parser::parse_commit_log(&output)
    }

    /// The commit at `reference`.
    ///
    /// Queries `reference^..reference`, so a root commit fails with a
    /// process failure from git.
    pub fn commit(&self, reference: &str) -> GitResult<Commit> {
        let parent = format!("{}^", reference);
        self.commits(&parent, reference)?
            .into_iter()
            .next()
            .ok_or_else(|| GitError::NotFound(format!("no commit at ref {}", reference)))
    }

    pub fn current_commit(&self) -> GitResult<Commit> {
        self.commit("HEAD")
    }

    /// Parse the remote's URL into owner and repository name
    pub fn remote_config(&self) -> GitResult<RemoteConfig> {
        let key = format!("remote.{}.url", self.remote);
        let url = self.single_line("config", &[key.as_str()])?;
        parser::parse_remote_url(&url)
    }

    fn single_line(&self, subcommand: &str, args: &[&str]) -> GitResult<String> {
        let output = self.executor.run_captured(subcommand, args)?;
        Ok(output.trim().to_string())
    }
}
