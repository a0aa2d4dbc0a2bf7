//! Core session types and the naming convention
//!
//! A session is never stored. It is derived from a worktree whose directory
//! sits under the base directory and is named `<repo>-<session>`; its branch
//! is `wt-<session>`.

use std::fmt;
use std::path::{Path, PathBuf};

use chrono::Local;

use crate::error::SessionError;

/// Directory under the home directory that holds every session worktree
pub const WORKTREE_BASE_DIR: &str = ".wt";

/// Prefix of every session branch
pub const BRANCH_PREFIX: &str = "wt-";

/// Timestamp layout of generated session names (`20240131-142502`)
const GENERATED_NAME_FORMAT: &str = "%Y%m%d-%H%M%S";

/// An isolated working environment: one worktree plus its dedicated branch
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    /// Session name, recovered from the worktree directory name
    pub name: String,
    /// Branch checked out in the worktree (empty when detached)
    pub branch: String,
    /// Absolute path to the worktree
    pub path: PathBuf,
}

impl fmt::Display for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}

/// Branch name for a session
pub fn branch_for(session_name: &str) -> String {
    format!("{BRANCH_PREFIX}{session_name}")
}

/// Session name for a branch; strings without the prefix come back unchanged
pub fn session_from_branch(branch: &str) -> &str {
    branch.strip_prefix(BRANCH_PREFIX).unwrap_or(branch)
}

/// Directory-name prefix shared by every session of `repo_name`
pub fn dir_prefix(repo_name: &str) -> String {
    format!("{repo_name}-")
}

/// Worktree path for a session of `repo_name` under `base_dir`
pub fn worktree_path(base_dir: &Path, repo_name: &str, session_name: &str) -> PathBuf {
    base_dir.join(format!("{}{}", dir_prefix(repo_name), session_name))
}

/// Default base directory, `~/.wt`
pub fn default_base_dir() -> Result<PathBuf, SessionError> {
    directories::BaseDirs::new()
        .map(|dirs| dirs.home_dir().join(WORKTREE_BASE_DIR))
        .ok_or(SessionError::HomeDirUnavailable)
}

/// Timestamp-based session name
///
/// Second resolution: two names generated within the same second are equal.
pub fn generate_session_name() -> String {
    Local::now().format(GENERATED_NAME_FORMAT).to_string()
}

/// Check that `name` can be used as both a directory name suffix and a branch suffix
pub fn validate_session_name(name: &str) -> Result<(), SessionError> {
    let invalid = |reason: &str| SessionError::InvalidName {
        name: name.to_string(),
        reason: reason.to_string(),
    };

    if name.is_empty() {
        return Err(invalid("name is empty"));
    }
    if name == "." || name == ".." {
        return Err(invalid("name is a relative path component"));
    }
    if name.starts_with('-') {
        return Err(invalid("name starts with '-'"));
    }
    if name.contains(['/', '\\']) {
        return Err(invalid("name contains a path separator"));
    }
    if name.chars().any(|c| c.is_whitespace() || c.is_control()) {
        return Err(invalid("name contains whitespace or control characters"));
    }

    Ok(())
}
