//! Git backend driven through the git CLI
//!
//! Every operation maps onto a single `git` invocation whose exit status and
//! output are translated into a typed result. `GitRepository` is the seam the
//! session manager depends on; `GitCli` is the production implementation.

use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use std::process::Stdio;

use async_trait::async_trait;
use tokio::process::Command;
use tracing::{debug, instrument};

use super::WorkingCopy;
use crate::error::{GitError, Result};

/// Remote that sessions are fetched from and fast-forwarded against
const REMOTE: &str = "origin";

/// Operations the session manager needs from the version-control tool
#[async_trait]
pub trait GitRepository: Send + Sync {
    /// Absolute path of the repository's top-level directory
    async fn repo_root(&self) -> Result<PathBuf>;

    /// Base name of the repository root
    async fn repo_name(&self) -> Result<String> {
        let root = self.repo_root().await?;
        Ok(repo_name_of(&root))
    }

    /// Abbreviated name of the checked-out branch
    async fn current_branch(&self) -> Result<String>;

    /// Fetch from `origin`
    async fn fetch_origin(&self) -> Result<()>;

    /// Bring `branch` up to date with `origin/<branch>` where that is a fast-forward
    async fn fast_forward(&self, branch: &str) -> Result<()>;

    /// Whether `name` resolves as a revision. Errors count as "no".
    async fn branch_exists(&self, name: &str) -> bool;

    /// Create `name` pointing at the tip of `source`
    async fn create_branch(&self, name: &str, source: &str) -> Result<()>;

    /// Force-delete `name`
    async fn delete_branch(&self, name: &str) -> Result<()>;

    /// Whether `branch` resolves to a commit
    async fn has_commits(&self, branch: &str) -> bool;

    /// Create a worktree at `path` checked out to `branch`
    async fn add_worktree(&self, path: &Path, branch: &str) -> Result<()>;

    /// Force-remove the worktree at `path`
    async fn remove_worktree(&self, path: &Path) -> Result<()>;

    /// All worktrees of the repository, in git's order
    async fn list_worktrees(&self) -> Result<Vec<WorkingCopy>>;
}

/// Base name of a repository root, falling back to the whole path for `/`
pub fn repo_name_of(root: &Path) -> String {
    root.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| root.to_string_lossy().into_owned())
}

/// Captured result of one git invocation
#[derive(Debug)]
pub(crate) struct GitOutput {
    pub success: bool,
    pub stdout: String,
    pub stderr: String,
}

impl GitOutput {
    /// Diagnostic text for error messages: stderr, or stdout when git wrote nothing there
    pub fn diagnostic(&self) -> String {
        let stderr = self.stderr.trim();
        if stderr.is_empty() {
            self.stdout.trim().to_string()
        } else {
            stderr.to_string()
        }
    }
}

/// Git backend that shells out to the `git` binary
///
/// Holds no state besides the directory git runs in; nothing is cached
/// between calls.
#[derive(Debug, Clone, Default)]
pub struct GitCli {
    /// Directory to run git in (the process cwd when unset)
    workdir: Option<PathBuf>,
}

impl GitCli {
    /// Backend operating on the repository containing the current directory
    pub fn new() -> Self {
        Self { workdir: None }
    }

    /// Backend operating on the repository containing `path`
    pub fn in_dir(path: impl Into<PathBuf>) -> Self {
        Self {
            workdir: Some(path.into()),
        }
    }

    /// Directory git is run from
    pub fn workdir(&self) -> PathBuf {
        self.workdir
            .clone()
            .or_else(|| std::env::current_dir().ok())
            .unwrap_or_default()
    }

    /// Run git with `args`, capturing both output streams
    ///
    /// A non-zero exit is not an error at this level; only a failure to spawn is.
    pub(crate) async fn run<I, S>(&self, args: I) -> Result<GitOutput>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<OsStr>,
    {
        let args: Vec<_> = args.into_iter().map(|a| a.as_ref().to_os_string()).collect();
        let command = format!(
            "git {}",
            args.iter()
                .map(|a| a.to_string_lossy())
                .collect::<Vec<_>>()
                .join(" ")
        );

        let mut cmd = Command::new("git");
        if let Some(dir) = &self.workdir {
            cmd.current_dir(dir);
        }
        cmd.args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());

        let output = cmd.output().await.map_err(|e| GitError::CommandFailed {
            command: command.clone(),
            stderr: e.to_string(),
        })?;

        debug!(command = %command, status = %output.status, "git finished");

        Ok(GitOutput {
            success: output.status.success(),
            stdout: String::from_utf8_lossy(&output.stdout).to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).to_string(),
        })
    }

    /// Run git and fail with `CommandFailed` on a non-zero exit
    async fn run_checked(&self, args: &[&str]) -> Result<String> {
        let output = self.run(args).await?;
        if !output.success {
            return Err(GitError::CommandFailed {
                command: format!("git {}", args.join(" ")),
                stderr: output.diagnostic(),
            }
            .into());
        }
        Ok(output.stdout.trim().to_string())
    }

    /// Run git and report only whether it exited cleanly
    async fn succeeds(&self, args: &[&str]) -> bool {
        matches!(self.run(args).await, Ok(output) if output.success)
    }
}

#[async_trait]
impl GitRepository for GitCli {
    #[instrument(skip(self))]
    async fn repo_root(&self) -> Result<PathBuf> {
        match self.run(["rev-parse", "--show-toplevel"]).await {
            Ok(output) if output.success => Ok(PathBuf::from(output.stdout.trim())),
            _ => Err(GitError::NotARepository(self.workdir()).into()),
        }
    }

    #[instrument(skip(self))]
    async fn current_branch(&self) -> Result<String> {
        let branch = self.run_checked(&["rev-parse", "--abbrev-ref", "HEAD"]).await?;
        if branch == "HEAD" {
            return Err(GitError::DetachedHead.into());
        }
        Ok(branch)
    }

    #[instrument(skip(self))]
    async fn fetch_origin(&self) -> Result<()> {
        let output = self.run(["fetch", REMOTE]).await?;
        if !output.success {
            return Err(GitError::FetchFailed(output.diagnostic()).into());
        }
        Ok(())
    }

    #[instrument(skip(self))]
    async fn fast_forward(&self, branch: &str) -> Result<()> {
        let remote_ref = format!("{REMOTE}/{branch}");
        if !self.succeeds(&["rev-parse", "--verify", remote_ref.as_str()]).await {
            debug!("No remote-tracking branch {}, skipping fast-forward", remote_ref);
            return Ok(());
        }

        if self.current_branch().await? == branch {
            let output = self.run(["pull", "--ff-only"]).await?;
            if !output.success {
                return Err(GitError::FastForwardFailed {
                    branch: branch.to_string(),
                    output: output.diagnostic(),
                }
                .into());
            }
            return Ok(());
        }

        // Updates the local ref without touching any working tree
        let refspec = format!("{branch}:{branch}");
        let output = self.run(["fetch", REMOTE, refspec.as_str()]).await?;
        if !output.success {
            debug!(
                "{} not fast-forwardable, leaving it as is: {}",
                branch,
                output.diagnostic()
            );
        }
        Ok(())
    }

    async fn branch_exists(&self, name: &str) -> bool {
        self.succeeds(&["rev-parse", "--verify", name]).await
    }

    #[instrument(skip(self))]
    async fn create_branch(&self, name: &str, source: &str) -> Result<()> {
        let output = self.run(["branch", name, source]).await?;
        if !output.success {
            return Err(GitError::BranchCreateFailed {
                branch: name.to_string(),
                output: output.diagnostic(),
            }
            .into());
        }
        Ok(())
    }

    #[instrument(skip(self))]
    async fn delete_branch(&self, name: &str) -> Result<()> {
        let output = self.run(["branch", "-D", name]).await?;
        if !output.success {
            return Err(GitError::BranchDeleteFailed {
                branch: name.to_string(),
                output: output.diagnostic(),
            }
            .into());
        }
        Ok(())
    }

    async fn has_commits(&self, branch: &str) -> bool {
        self.succeeds(&["rev-parse", branch]).await
    }

    async fn add_worktree(&self, path: &Path, branch: &str) -> Result<()> {
        self.worktree_add(path, branch).await
    }

    async fn remove_worktree(&self, path: &Path) -> Result<()> {
        self.worktree_remove(path).await
    }

    async fn list_worktrees(&self) -> Result<Vec<WorkingCopy>> {
        self.worktree_list().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_repo_name_of() {
        assert_eq!(repo_name_of(Path::new("/home/dev/projects/api")), "api");
        assert_eq!(repo_name_of(Path::new("/home/dev/my.repo")), "my.repo");
        assert_eq!(repo_name_of(Path::new("/")), "/");
    }

    #[test]
    fn test_diagnostic_prefers_stderr() {
        let output = GitOutput {
            success: false,
            stdout: "some stdout\n".to_string(),
            stderr: "fatal: bad revision\n".to_string(),
        };
        assert_eq!(output.diagnostic(), "fatal: bad revision");

        let output = GitOutput {
            success: false,
            stdout: "only stdout\n".to_string(),
            stderr: "  \n".to_string(),
        };
        assert_eq!(output.diagnostic(), "only stdout");
    }

    #[tokio::test]
    async fn test_repo_root_outside_repository() {
        let temp_dir = tempfile::TempDir::new().unwrap();
        let git = GitCli::in_dir(temp_dir.path());
        match git.repo_root().await {
            Err(crate::Error::Git(GitError::NotARepository(path))) => {
                assert_eq!(path, temp_dir.path());
            }
            Ok(root) => eprintln!("Skipping: temp dir is inside repository {:?}", root),
            Err(e) => panic!("unexpected error: {e}"),
        }
    }
}
