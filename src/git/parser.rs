use crate::error::{GitError, GitResult};

/// Separates the fields of one commit record in log output
pub const FIELD_DELIMITER: &str = "~<gg:field>~";

/// Terminates each commit record in log output
pub const RECORD_DELIMITER: &str = "~<gg:record>~";

/// Prefix git gives the pseudo-branch listed while HEAD is detached
pub const DETACHED_HEAD_PREFIX: &str = "(HEAD detached at";

const SHORT_HASH_LEN: usize = 7;
const FIELDS_PER_COMMIT: usize = 4;

/// The `--pretty` argument whose output `parse_commit_log` decodes
pub fn log_format() -> String {
    format!(
        "--pretty=format:%H{f}%s{f}%an{f}%b{r}",
        f = FIELD_DELIMITER,
        r = RECORD_DELIMITER
    )
}

/// A single commit decoded from log output
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Commit {
    hash: String,
    title: String,
    author: String,
    body: String,
}

impl Commit {
    /// Build a commit, rejecting hashes shorter than a short hash
    pub fn new(
        hash: impl Into<String>,
        title: impl Into<String>,
        author: impl Into<String>,
        body: impl Into<String>,
    ) -> GitResult<Self> {
        let hash = hash.into();
        if hash.chars().count() < SHORT_HASH_LEN {
            return Err(GitError::ParseError(format!(
                "commit hash must be at least {} characters: {:?}",
                SHORT_HASH_LEN, hash
            )));
        }

        Ok(Self {
            hash,
            title: title.into(),
            author: author.into(),
            body: body.into(),
        })
    }

    pub fn hash(&self) -> &str {
        &self.hash
    }

    /// First seven characters of the hash
    pub fn short_hash(&self) -> &str {
        match self.hash.char_indices().nth(SHORT_HASH_LEN) {
            Some((end, _)) => &self.hash[..end],
            None => &self.hash,
        }
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn author(&self) -> &str {
        &self.author
    }

    /// Message text after the title; may be empty or span several lines
    pub fn body(&self) -> &str {
        &self.body
    }
}

/// Structured identity of the origin remote
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteConfig {
    pub is_github: bool,
    /// The URL exactly as git reported it, trimmed
    pub origin_url: String,
    pub repo_owner: String,
    pub repo_name: String,
}

/// Decode the output of a log query run with [`log_format`].
///
/// Records come back in the order git emitted them (most recent first).
pub fn parse_commit_log(output: &str) -> GitResult<Vec<Commit>> {
    let mut commits = Vec::new();

    for chunk in output.split(RECORD_DELIMITER) {
        // git separates records with a newline after the terminator
        let chunk = chunk.strip_prefix('\n').unwrap_or(chunk);
        if chunk.is_empty() {
            continue;
        }

        let fields: Vec<&str> = chunk.split(FIELD_DELIMITER).collect();
        if fields.len() != FIELDS_PER_COMMIT {
            return Err(GitError::ParseError(format!(
                "expected {} fields in commit record, found {}: {:?}",
                FIELDS_PER_COMMIT,
                fields.len(),
                chunk
            )));
        }

        commits.push(Commit::new(fields[0], fields[1], fields[2], fields[3])?);
    }

    Ok(commits)
}

/// Parse `git branch --format '%(refname:short)'` output.
///
/// The single pair of quotes the format adds around each name is removed
/// and a leading detached-HEAD entry is dropped. Apostrophes that are part
/// of the name are kept.
pub fn parse_branch_list(output: &str) -> Vec<String> {
    let mut branches: Vec<String> = output
        .lines()
        .map(str::trim)
        .map(|line| {
            line.strip_prefix('\'')
                .and_then(|inner| inner.strip_suffix('\''))
                .unwrap_or(line)
        })
        .filter(|name| !name.is_empty())
        .map(str::to_string)
        .collect();

    if branches
        .first()
        .is_some_and(|first| first.starts_with(DETACHED_HEAD_PREFIX))
    {
        branches.remove(0);
    }

    branches
}

/// Parse a remote URL of the form `[ssh://]host:owner/name[.git]`.
///
/// Only the `ssh://` scheme is stripped. Other schemes such as `https://`
/// are passed through and will usually fail to parse or parse wrongly.
pub fn parse_remote_url(url: &str) -> GitResult<RemoteConfig> {
    let origin_url = url.trim();
    let location = origin_url.strip_prefix("ssh://").unwrap_or(origin_url);

    let mut segments = location.split(':');
    let host = segments.next().unwrap_or_default();
    let path = segments.next().ok_or_else(|| {
        GitError::ParseError(format!(
            "remote URL has no host:path separator: {:?}",
            origin_url
        ))
    })?;

    let mut path_segments = path.split('/');
    let owner = path_segments.next().unwrap_or_default();
    let name = path_segments.next().ok_or_else(|| {
        GitError::ParseError(format!(
            "remote URL path has no owner/name separator: {:?}",
            origin_url
        ))
    })?;
    let name = name.strip_suffix(".git").unwrap_or(name);

    if owner.is_empty() || name.is_empty() {
        return Err(GitError::ParseError(format!(
            "remote URL is missing an owner or repository name: {:?}",
            origin_url
        )));
    }

    Ok(RemoteConfig {
        is_github: host.contains("github.com"),
        origin_url: origin_url.to_string(),
        repo_owner: owner.to_string(),
        repo_name: name.to_string(),
    })
}
