//! Interactive process launching
//!
//! Everything wt starts for the user (the coding assistant, a subshell) goes
//! through the `Launcher` trait: program, arguments, working directory, extra
//! environment, inherited standard streams. Commands receive a launcher so
//! tests can record requests instead of spawning anything.

use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::sync::Mutex;

use async_trait::async_trait;
use tokio::process::Command;
use tracing::{debug, info};

use crate::error::{LaunchError, Result};
use crate::session::Session;

/// Environment variable set inside `wt cd` shells
pub const SESSION_ENV: &str = "WT_SESSION";

/// A process to run interactively in the foreground
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LaunchRequest {
    pub program: String,
    pub args: Vec<String>,
    pub cwd: PathBuf,
    /// Added to the inherited environment
    pub env: Vec<(String, String)>,
}

/// Runs interactive processes to completion
#[async_trait]
pub trait Launcher: Send + Sync {
    async fn launch(&self, request: &LaunchRequest) -> Result<()>;
}

/// Launcher that spawns the process with inherited stdin/stdout/stderr and waits for it
#[derive(Debug, Clone, Copy, Default)]
pub struct ShellLauncher;

#[async_trait]
impl Launcher for ShellLauncher {
    async fn launch(&self, request: &LaunchRequest) -> Result<()> {
        info!(
            program = %request.program,
            args = ?request.args,
            cwd = %request.cwd.display(),
            "Launching interactive process"
        );

        let status = Command::new(&request.program)
            .args(&request.args)
            .current_dir(&request.cwd)
            .envs(request.env.iter().map(|(k, v)| (k, v)))
            .stdin(Stdio::inherit())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit())
            .status()
            .await
            .map_err(|e| LaunchError::Spawn {
                program: request.program.clone(),
                reason: e.to_string(),
            })?;

        debug!(status = %status, "Interactive process exited");

        if !status.success() {
            return Err(LaunchError::Exited {
                program: request.program.clone(),
                code: status.code(),
            }
            .into());
        }

        Ok(())
    }
}

/// Launcher that only remembers what it was asked to run
#[derive(Debug, Default)]
pub struct RecordingLauncher {
    requests: Mutex<Vec<LaunchRequest>>,
}

impl RecordingLauncher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn requests(&self) -> Vec<LaunchRequest> {
        self.requests.lock().map(|r| r.clone()).unwrap_or_default()
    }
}

#[async_trait]
impl Launcher for RecordingLauncher {
    async fn launch(&self, request: &LaunchRequest) -> Result<()> {
        if let Ok(mut requests) = self.requests.lock() {
            requests.push(request.clone());
        }
        Ok(())
    }
}

/// Start the assistant in `worktree` through an interactive shell so aliases resolve
///
/// `resume` adds `--continue`; `repo_root` is passed as `--add-dir` when it
/// differs from the worktree.
pub fn assistant_request(
    shell: &str,
    program: &str,
    worktree: &Path,
    repo_root: Option<&Path>,
    resume: bool,
) -> LaunchRequest {
    let mut command = program.to_string();

    if resume {
        command.push_str(" --continue");
    }

    if let Some(root) = repo_root.filter(|root| *root != worktree) {
        command.push_str(" --add-dir ");
        command.push_str(&shell_quote(&root.to_string_lossy()));
    }

    LaunchRequest {
        program: shell.to_string(),
        args: vec!["-i".to_string(), "-c".to_string(), command],
        cwd: worktree.to_path_buf(),
        env: Vec::new(),
    }
}

/// Open an interactive shell in a session's worktree
pub fn shell_request(shell: &str, session: &Session) -> LaunchRequest {
    LaunchRequest {
        program: shell.to_string(),
        args: Vec::new(),
        cwd: session.path.clone(),
        env: vec![(SESSION_ENV.to_string(), session.name.clone())],
    }
}

/// Single-quote `value` for a POSIX shell
pub fn shell_quote(value: &str) -> String {
    format!("'{}'", value.replace('\'', r"'\''"))
}
