//! Session manager - sequences the session lifecycle
//!
//! Sessions are reconstructed from git's worktree listing on every call; the
//! manager itself keeps no state besides its collaborators and the base
//! directory. Create and remove are multi-step workflows that tolerate
//! advisory failures and roll back only one thing: a freshly created branch
//! whose worktree could not be added.

use std::path::{Path, PathBuf};

use tracing::{debug, info, instrument};

use super::{
    ConsoleReporter, Reporter, Session, branch_for, dir_prefix, validate_session_name,
    worktree_path,
};
use crate::error::{Result, SessionError};
use crate::git::{GitRepository, WorkingCopy};

/// Outcome of removing every session of a repository
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RemovalSummary {
    /// Sessions that were removed
    pub removed: Vec<String>,
    /// Sessions whose removal failed (already reported as warnings)
    pub failed: Vec<String>,
}

impl RemovalSummary {
    pub fn is_empty(&self) -> bool {
        self.removed.is_empty() && self.failed.is_empty()
    }
}

/// Session manager coordinates all session operations
pub struct SessionManager<G, R = ConsoleReporter> {
    /// Repository adapter
    git: G,
    /// Where progress and advisory warnings go
    reporter: R,
    /// Directory holding every session worktree
    base_dir: PathBuf,
}

impl<G: GitRepository, R: Reporter> SessionManager<G, R> {
    /// Create a new session manager
    pub fn new(git: G, reporter: R, base_dir: impl Into<PathBuf>) -> Self {
        Self {
            git,
            reporter,
            base_dir: base_dir.into(),
        }
    }

    /// Repository adapter
    pub fn git(&self) -> &G {
        &self.git
    }

    /// Directory holding every session worktree
    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    /// All sessions of the current repository, in git's listing order
    #[instrument(skip(self))]
    pub async fn list(&self) -> Result<Vec<Session>> {
        let repo_name = self.git.repo_name().await?;
        let worktrees = self.git.list_worktrees().await?;
        let base_dir = self.resolved_base_dir().await;

        Ok(sessions_from_worktrees(worktrees, &base_dir, &repo_name))
    }

    /// Find a session by exact name, or by a prefix matching exactly one session
    #[instrument(skip(self))]
    pub async fn find(&self, query: &str) -> Result<Session> {
        let sessions = self.list().await?;
        Ok(find_session(sessions, query)?)
    }

    /// Create a session named `name` branching off `source_branch`
    ///
    /// Re-running after a partial failure reuses an existing `wt-<name>` branch.
    #[instrument(skip(self))]
    pub async fn create(&self, name: &str, source_branch: &str) -> Result<Session> {
        validate_session_name(name)?;

        let repo_name = self.git.repo_name().await?;
        let base_dir = self.prepare_base_dir().await?;

        let branch_name = branch_for(name);
        let path = worktree_path(&base_dir, &repo_name, name);

        if tokio::fs::symlink_metadata(&path).await.is_ok() {
            return Err(SessionError::AlreadyExists {
                name: name.to_string(),
                path,
            }
            .into());
        }

        self.reporter.progress("Fetching from origin...");
        if let Err(e) = self.git.fetch_origin().await {
            self.reporter.warn(&e.to_string());
        }

        self.reporter.progress(&format!("Updating {}...", source_branch));
        if let Err(e) = self.git.fast_forward(source_branch).await {
            self.reporter.warn(&e.to_string());
        }

        if !self.git.has_commits(source_branch).await {
            return Err(SessionError::EmptySourceBranch(source_branch.to_string()).into());
        }

        let created_branch = if self.git.branch_exists(&branch_name).await {
            self.reporter.progress(&format!(
                "Branch {} already exists, using existing branch",
                branch_name
            ));
            false
        } else {
            self.reporter.progress(&format!(
                "Creating branch {} from {}...",
                branch_name, source_branch
            ));
            self.git.create_branch(&branch_name, source_branch).await?;
            true
        };

        self.reporter
            .progress(&format!("Creating worktree at {}...", path.display()));
        if let Err(e) = self.git.add_worktree(&path, &branch_name).await {
            if created_branch {
                debug!("Rolling back branch {}", branch_name);
                if let Err(rollback) = self.git.delete_branch(&branch_name).await {
                    self.reporter.warn(&rollback.to_string());
                }
            }
            return Err(e);
        }

        info!("Created session '{}' at {:?}", name, path);

        Ok(Session {
            name: name.to_string(),
            branch: branch_name,
            path,
        })
    }

    /// Base directory as git records it, with symlinks resolved
    ///
    /// Falls back to the configured path while it does not exist yet.
    async fn resolved_base_dir(&self) -> PathBuf {
        match tokio::fs::canonicalize(&self.base_dir).await {
            Ok(resolved) => resolved,
            Err(e) => {
                debug!("Using {:?} unresolved: {}", self.base_dir, e);
                self.base_dir.clone()
            }
        }
    }

    /// Create the base directory if needed and return its resolved path
    async fn prepare_base_dir(&self) -> Result<PathBuf> {
        let unavailable = |source: std::io::Error| SessionError::BaseDirUnavailable {
            path: self.base_dir.clone(),
            source,
        };
        tokio::fs::create_dir_all(&self.base_dir)
            .await
            .map_err(unavailable)?;
        Ok(tokio::fs::canonicalize(&self.base_dir)
            .await
            .map_err(unavailable)?)
    }

    /// Remove a session's worktree, then its branch
    ///
    /// The worktree must go; the branch is deleted best-effort.
    #[instrument(skip(self))]
    pub async fn remove(&self, name: &str) -> Result<Session> {
        let session = self.find(name).await?;

        self.reporter
            .progress(&format!("Removing worktree {}...", session.path.display()));
        self.git.remove_worktree(&session.path).await?;

        self.reporter
            .progress(&format!("Deleting branch {}...", session.branch));
        if let Err(e) = self.git.delete_branch(&session.branch).await {
            self.reporter.warn(&e.to_string());
        }

        info!("Removed session '{}'", session.name);
        Ok(session)
    }

    /// Remove every session of the current repository
    ///
    /// Each session is removed independently; failures are reported and the
    /// batch continues.
    #[instrument(skip(self))]
    pub async fn remove_all(&self) -> Result<RemovalSummary> {
        let sessions = self.list().await?;
        let mut summary = RemovalSummary::default();

        if sessions.is_empty() {
            self.reporter.progress("No sessions to remove");
            return Ok(summary);
        }

        for session in sessions {
            match self.remove(&session.name).await {
                Ok(_) => summary.removed.push(session.name),
                Err(e) => {
                    self.reporter.warn(&format!(
                        "failed to remove session '{}': {}",
                        session.name, e
                    ));
                    summary.failed.push(session.name);
                }
            }
        }

        Ok(summary)
    }
}

/// Keep the worktrees that belong to `repo_name` under `base_dir` and turn them into sessions
///
/// The session name comes from the directory name, not the branch, so a
/// renamed or deleted branch does not orphan the session.
pub fn sessions_from_worktrees(
    worktrees: Vec<WorkingCopy>,
    base_dir: &Path,
    repo_name: &str,
) -> Vec<Session> {
    let prefix = dir_prefix(repo_name);

    worktrees
        .into_iter()
        .filter(|wt| wt.path.starts_with(base_dir))
        .filter_map(|wt| {
            let dir_name = wt.path.file_name()?.to_str()?;
            let name = dir_name.strip_prefix(&prefix)?.to_string();
            Some(Session {
                name,
                branch: wt.branch,
                path: wt.path,
            })
        })
        .collect()
}

/// Resolve `query` against `sessions`: exact match first, then a unique prefix
pub fn find_session(
    sessions: Vec<Session>,
    query: &str,
) -> std::result::Result<Session, SessionError> {
    if let Some(exact) = sessions.iter().find(|s| s.name == query) {
        return Ok(exact.clone());
    }

    let mut matches: Vec<Session> = sessions
        .into_iter()
        .filter(|s| s.name.starts_with(query))
        .collect();

    match matches.len() {
        0 => Err(SessionError::NotFound(query.to_string())),
        1 => Ok(matches.remove(0)),
        _ => Err(SessionError::AmbiguousMatch {
            query: query.to_string(),
            matches: matches.into_iter().map(|s| s.name).collect(),
        }),
    }
}
