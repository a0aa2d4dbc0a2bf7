//! Error types for wt
//!
//! Uses `thiserror` for ergonomic error definitions with automatic `Display` and `Error` impls.
//! Everything here is fatal to the command that hit it; advisory failures never
//! leave the session manager as errors, they go through the reporter instead.

use std::path::PathBuf;

use thiserror::Error;

/// Top-level error type for wt
#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Session(#[from] SessionError),

    #[error(transparent)]
    Git(#[from] GitError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Launch(#[from] LaunchError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Session management errors
#[derive(Error, Debug)]
pub enum SessionError {
    #[error("session '{0}' not found")]
    NotFound(String),

    #[error("'{query}' matches multiple sessions: {}", .matches.join(", "))]
    AmbiguousMatch { query: String, matches: Vec<String> },

    #[error("session '{name}' already exists at {}", .path.display())]
    AlreadyExists { name: String, path: PathBuf },

    #[error("source branch '{0}' has no commits")]
    EmptySourceBranch(String),

    #[error("invalid session name '{name}': {reason}")]
    InvalidName { name: String, reason: String },

    #[error("could not determine home directory")]
    HomeDirUnavailable,

    #[error("cannot use worktrees directory {}: {source}", .path.display())]
    BaseDirUnavailable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Git operations errors
#[derive(Error, Debug)]
pub enum GitError {
    #[error("not in a git repository: {}", .0.display())]
    NotARepository(PathBuf),

    #[error("{command} failed: {stderr}")]
    CommandFailed { command: String, stderr: String },

    #[error("HEAD is detached, no current branch")]
    DetachedHead,

    #[error("failed to fetch from origin: {0}")]
    FetchFailed(String),

    #[error("failed to fast-forward {branch}: {output}")]
    FastForwardFailed { branch: String, output: String },

    #[error("failed to create branch {branch}: {output}")]
    BranchCreateFailed { branch: String, output: String },

    #[error("failed to delete branch {branch}: {output}")]
    BranchDeleteFailed { branch: String, output: String },

    #[error("failed to create worktree at {}: {output}", .path.display())]
    WorktreeAddFailed { path: PathBuf, output: String },

    #[error("failed to remove worktree {}: {output}", .path.display())]
    WorktreeRemoveFailed { path: PathBuf, output: String },

    #[error("failed to list worktrees: {0}")]
    WorktreeListFailed(String),
}

/// Configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to load configuration: {0}")]
    LoadFailed(String),

    #[error("Failed to save configuration: {0}")]
    SaveFailed(String),

    #[error("Failed to create directory: {}", .0.display())]
    DirectoryCreationFailed(PathBuf),
}

/// Interactive process launch errors
#[derive(Error, Debug)]
pub enum LaunchError {
    #[error("failed to start {program}: {reason}")]
    Spawn { program: String, reason: String },

    #[error("{program} exited with status {}", .code.map_or_else(|| "signal".to_string(), |c| c.to_string()))]
    Exited { program: String, code: Option<i32> },
}

/// Result type alias using our error type
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = SessionError::NotFound("xyz".to_string());
        assert_eq!(err.to_string(), "session 'xyz' not found");

        let err = SessionError::AmbiguousMatch {
            query: "auth".to_string(),
            matches: vec!["auth-feature".to_string(), "auth-login".to_string()],
        };
        assert_eq!(
            err.to_string(),
            "'auth' matches multiple sessions: auth-feature, auth-login"
        );

        let err = GitError::NotARepository(PathBuf::from("/tmp/foo"));
        assert!(err.to_string().contains("/tmp/foo"));

        let err = GitError::BranchDeleteFailed {
            branch: "wt-x".to_string(),
            output: "error: branch 'wt-x' not found.".to_string(),
        };
        assert!(err.to_string().contains("branch 'wt-x' not found"));

        let err = LaunchError::Exited {
            program: "/bin/zsh".to_string(),
            code: None,
        };
        assert_eq!(err.to_string(), "/bin/zsh exited with status signal");
    }

    #[test]
    fn test_error_conversion() {
        let session_err = SessionError::EmptySourceBranch("main".to_string());
        let top_err: Error = session_err.into();
        assert_eq!(top_err.to_string(), "source branch 'main' has no commits");

        let git_err = GitError::DetachedHead;
        let _top_err: Error = git_err.into();
    }

    #[test]
    fn test_base_dir_error_keeps_io_cause() {
        use std::error::Error as _;

        let err = SessionError::BaseDirUnavailable {
            path: PathBuf::from("/ro/.wt"),
            source: std::io::Error::from(std::io::ErrorKind::PermissionDenied),
        };
        let message = err.to_string();
        assert!(message.starts_with("cannot use worktrees directory /ro/.wt: "));
        assert!(!message.contains("Configuration"));
        assert!(err.source().is_some());
    }
}
