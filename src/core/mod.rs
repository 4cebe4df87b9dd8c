//! Core building blocks shared by the update command
//!
//! - **config**: config file (`update_niv.toml` / `config.toml`) parsing
//! - **context**: per-run context built once in main.rs
//! - **error**: error types with contextual help messages
//! - **vcs**: git operations (SystemGit) for the project repo and mirrors

pub mod config;
pub mod context;
pub mod error;
pub mod vcs;
