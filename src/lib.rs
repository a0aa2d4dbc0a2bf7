//! wt - isolated git worktrees for parallel coding assistant sessions
//!
//! Each session is a git worktree under `~/.wt/<repo>-<name>` with its own
//! `wt-<name>` branch. Nothing is stored besides what git already tracks:
//! sessions are rediscovered from `git worktree list` on every command.
//!
//! # Modules
//!
//! - [`git`] - Repository adapter over the git CLI
//! - [`session`] - Naming convention and session lifecycle
//! - [`launch`] - Interactive process launching
//! - [`commands`] - Handlers behind the `wt` subcommands
//! - [`config`] - Layered user configuration
//! - [`error`] - Error types

pub mod commands;
pub mod config;
pub mod error;
pub mod git;
pub mod launch;
pub mod session;

pub use config::Config;
pub use error::{Error, Result};
pub use session::{Session, SessionManager};

/// Application version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Application name
pub const APP_NAME: &str = env!("CARGO_PKG_NAME");
