//! Configuration module
//!
//! Handles user configuration (`<config dir>/wt/config.toml` plus `WT_*`
//! environment variables). Sessions themselves are never persisted here.

mod settings;

pub use settings::*;
