pub mod system_git;
mod system_git_ops;

pub use system_git::SystemGit;

/// Arguments shared by both changelog variants: one line per commit, merges dropped
pub const LOG_ARGS: [&str; 4] = ["log", "--oneline", "--no-decorate", "--no-merges"];

/// `<old>..<new>` range spec
pub fn revision_range(old_rev: &str, new_rev: &str) -> String {
  format!("{}..{}", old_rev, new_rev)
}
