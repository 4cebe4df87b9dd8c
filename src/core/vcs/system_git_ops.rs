//! Operations on SystemGit: preflight queries, staging/committing, fetch and log

use super::system_git::{SystemGit, output_lines};
use super::{LOG_ARGS, revision_range};
use crate::core::config::FetchRemote;
use crate::core::error::UpdaterResult;

impl SystemGit {
  /// Paths staged in the index relative to HEAD
  pub fn staged_files(&self) -> UpdaterResult<Vec<String>> {
    let output = self.run(&["diff", "--cached", "--name-only"])?;
    Ok(output_lines(&output))
  }

  /// Whether `pathspec` has unstaged changes (index vs. working tree)
  pub fn has_unstaged_changes(&self, pathspec: &str) -> UpdaterResult<bool> {
    let output = self.run(&["diff", "--name-only", "--", pathspec])?;
    Ok(!output_lines(&output).is_empty())
  }

  /// Stage a single path and commit it
  ///
  /// With `sign`, the commit is GPG-signed via `git commit -S`.
  pub fn commit_path(&self, pathspec: &str, message: &str, sign: bool) -> UpdaterResult<()> {
    self.run(&["add", "--", pathspec])?;

    let mut args = vec!["commit", "-m", message];
    if sign {
      args.push("-S");
    }
    self.run(&args)?;

    Ok(())
  }

  /// Fetch according to a `[repo]` entry's `fetch` setting
  ///
  /// Returns false when fetching was skipped.
  pub fn fetch(&self, remote: &FetchRemote) -> UpdaterResult<bool> {
    match remote {
      FetchRemote::Skip => Ok(false),
      FetchRemote::DefaultRemote => {
        self.run(&["fetch"])?;
        Ok(true)
      }
      FetchRemote::Named(name) => {
        self.run(&["fetch", name])?;
        Ok(true)
      }
    }
  }

  /// One-line, merge-free log of `old_rev..new_rev`
  pub fn log_oneline(&self, old_rev: &str, new_rev: &str) -> UpdaterResult<String> {
    let range = revision_range(old_rev, new_rev);
    let mut args: Vec<&str> = LOG_ARGS.to_vec();
    args.push(range.as_str());

    let output = self.run(&args)?;
    Ok(String::from_utf8_lossy(&output.stdout).trim_end().to_string())
  }
}
