//! Git worktree operations
//!
//! Provides worktree lifecycle operations on top of the CLI backend:
//! - Add a worktree for an existing branch
//! - Force-remove a worktree
//! - List worktrees via `git worktree list --porcelain`

use std::ffi::OsStr;
use std::path::{Path, PathBuf};

use tracing::{info, instrument};

use super::GitCli;
use crate::error::{GitError, Result};

/// Namespace stripped from `branch` lines of the porcelain listing
const HEADS_PREFIX: &str = "refs/heads/";

/// One entry of `git worktree list --porcelain`
///
/// Built fresh on every listing; never persisted.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WorkingCopy {
    /// Absolute path to the worktree
    pub path: PathBuf,
    /// HEAD commit ID
    pub head: String,
    /// Branch name without `refs/heads/`, empty when detached
    pub branch: String,
}

impl GitCli {
    #[instrument(skip(self))]
    pub(super) async fn worktree_add(&self, path: &Path, branch: &str) -> Result<()> {
        let output = self
            .run([
                OsStr::new("worktree"),
                OsStr::new("add"),
                path.as_os_str(),
                OsStr::new(branch),
            ])
            .await?;

        if !output.success {
            return Err(GitError::WorktreeAddFailed {
                path: path.to_path_buf(),
                output: output.diagnostic(),
            }
            .into());
        }

        info!("Created worktree at {:?} with branch {}", path, branch);
        Ok(())
    }

    #[instrument(skip(self))]
    pub(super) async fn worktree_remove(&self, path: &Path) -> Result<()> {
        let output = self
            .run([
                OsStr::new("worktree"),
                OsStr::new("remove"),
                OsStr::new("--force"),
                path.as_os_str(),
            ])
            .await?;

        if !output.success {
            return Err(GitError::WorktreeRemoveFailed {
                path: path.to_path_buf(),
                output: output.diagnostic(),
            }
            .into());
        }

        info!("Removed worktree at {:?}", path);
        Ok(())
    }

    #[instrument(skip(self))]
    pub(super) async fn worktree_list(&self) -> Result<Vec<WorkingCopy>> {
        let output = self.run(["worktree", "list", "--porcelain"]).await?;

        if !output.success {
            return Err(GitError::WorktreeListFailed(output.diagnostic()).into());
        }

        Ok(parse_worktree_list(&output.stdout))
    }
}

/// Parse `git worktree list --porcelain` output
///
/// Records are separated by blank lines. Only the `worktree`, `HEAD` and
/// `branch` attributes are read; anything else (`bare`, `detached`, `locked`,
/// `prunable`) is skipped. A record without a `worktree` line is dropped.
pub fn parse_worktree_list(output: &str) -> Vec<WorkingCopy> {
    let mut worktrees = Vec::new();
    let mut current = WorkingCopy::default();

    for line in output.lines() {
        if line.is_empty() {
            push_record(&mut worktrees, std::mem::take(&mut current));
            continue;
        }

        if let Some(path) = line.strip_prefix("worktree ") {
            current.path = PathBuf::from(path);
        } else if let Some(head) = line.strip_prefix("HEAD ") {
            current.head = head.to_string();
        } else if let Some(branch) = line.strip_prefix("branch ") {
            current.branch = branch.strip_prefix(HEADS_PREFIX).unwrap_or(branch).to_string();
        }
    }

    // Last record when the output has no trailing blank line
    push_record(&mut worktrees, current);

    worktrees
}

fn push_record(worktrees: &mut Vec<WorkingCopy>, record: WorkingCopy) {
    if !record.path.as_os_str().is_empty() {
        worktrees.push(record);
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_parse_worktree_list() {
        let output = r#"worktree /path/to/main
HEAD abc123def456
branch refs/heads/main

worktree /path/to/feature
HEAD def456abc123
branch refs/heads/feature-branch
"#;

        let worktrees = parse_worktree_list(output);
        assert_eq!(
            worktrees,
            vec![
                WorkingCopy {
                    path: PathBuf::from("/path/to/main"),
                    head: "abc123def456".to_string(),
                    branch: "main".to_string(),
                },
                WorkingCopy {
                    path: PathBuf::from("/path/to/feature"),
                    head: "def456abc123".to_string(),
                    branch: "feature-branch".to_string(),
                },
            ]
        );
    }

    #[test]
    fn test_parse_unterminated_last_record() {
        let output = "worktree /repo\nHEAD 111\nbranch refs/heads/main\n\nworktree /home/u/.wt/repo-x\nHEAD 222\nbranch refs/heads/wt-x";

        let worktrees = parse_worktree_list(output);
        assert_eq!(worktrees.len(), 2);
        assert_eq!(worktrees[1].path, PathBuf::from("/home/u/.wt/repo-x"));
        assert_eq!(worktrees[1].head, "222");
        assert_eq!(worktrees[1].branch, "wt-x");
    }

    #[test]
    fn test_parse_ignores_unknown_lines() {
        let output = "worktree /repo.git\nbare\n\nworktree /tmp/detached\nHEAD 333\ndetached\nlocked reason here\nprunable gitdir file points to non-existent location\n\n";

        let worktrees = parse_worktree_list(output);
        assert_eq!(
            worktrees,
            vec![
                WorkingCopy {
                    path: PathBuf::from("/repo.git"),
                    head: String::new(),
                    branch: String::new(),
                },
                WorkingCopy {
                    path: PathBuf::from("/tmp/detached"),
                    head: "333".to_string(),
                    branch: String::new(),
                },
            ]
        );
    }

    #[test]
    fn test_parse_edge_cases() {
        assert!(parse_worktree_list("").is_empty());
        assert!(parse_worktree_list("\n\n\n").is_empty());

        // Record with no worktree line is dropped
        assert!(parse_worktree_list("HEAD 444\nbranch refs/heads/orphan\n").is_empty());

        // CRLF output and multiple blank lines between records
        let worktrees =
            parse_worktree_list("worktree /a\r\nHEAD 1\r\n\r\n\r\nworktree /b\r\nbranch refs/heads/b\r\n");
        assert_eq!(worktrees.len(), 2);
        assert_eq!(worktrees[0].path, PathBuf::from("/a"));
        assert_eq!(worktrees[1].branch, "b");
    }

    #[test]
    fn test_parse_path_with_spaces() {
        let worktrees = parse_worktree_list("worktree /home/u/My Projects/repo\nHEAD 555\n");
        assert_eq!(worktrees[0].path, PathBuf::from("/home/u/My Projects/repo"));
    }
}
