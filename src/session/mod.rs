//! Session management module
//!
//! - `Session` and the naming convention mapping a session name to its branch and path
//! - `SessionManager` - list/find/create/remove workflows
//! - `Reporter` - where progress and advisory warnings go

mod manager;
mod reporter;
mod types;

pub use manager::*;
pub use reporter::*;
pub use types::*;
