//! Git operations through the git CLI
//!
//! - `GitRepository` - The adapter seam the session manager depends on
//! - `GitCli` - Implementation shelling out to `git`, one process per call
//! - `WorkingCopy` / `parse_worktree_list` - Porcelain worktree listing

mod backend;
mod worktree;

pub use backend::*;
pub use worktree::*;
