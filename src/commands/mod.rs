//! CLI commands for pin-updater
//!
//! - **update**: bump niv or npins pins and commit each change with a changelog
//!
//! Commands accept `&RunContext` so config and paths are loaded once.

pub mod update;

pub use update::{UpdateOptions, run_update};
