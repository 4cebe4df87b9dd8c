//! Changelog extraction between two revisions of an upstream repository
//!
//! A matched `[repo]` entry provides the history in one of two ways:
//!
//! - `cmd`: a shell prefix (e.g. `git -C ~/src/foo`) that gets the log
//!   sub-command appended and runs through `sh -c`
//! - `path`: a local mirror clone, optionally fetched first, read with
//!   `git log` directly

use crate::core::config::{FetchRemote, RepoEntry};
use crate::core::error::{ConfigError, ResultExt, UpdaterError, UpdaterResult};
use crate::core::vcs::{LOG_ARGS, SystemGit, revision_range};
use std::path::{Path, PathBuf};
use std::process::Command;

/// How to get history for one matched entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChangelogSource<'a> {
  Command { template: &'a str },
  Mirror { path: PathBuf, fetch: &'a FetchRemote },
}

/// Extracted history, or the reason it could not be read
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Changelog {
  Entries(String),
  Unavailable { reason: String },
}

impl<'a> ChangelogSource<'a> {
  /// Pick the variant for an entry; `cmd` takes precedence over `path`
  ///
  /// Relative mirror paths are resolved against `root`.
  pub fn from_entry(entry: &'a RepoEntry, source_url: &str, root: &Path) -> UpdaterResult<Self> {
    if let Some(template) = entry.cmd.as_deref().filter(|c| !c.trim().is_empty()) {
      return Ok(ChangelogSource::Command { template });
    }

    match &entry.path {
      Some(path) if !path.as_os_str().is_empty() => Ok(ChangelogSource::Mirror {
        path: root.join(path),
        fetch: &entry.fetch,
      }),
      _ => Err(UpdaterError::Config(ConfigError::NoChangelogSource {
        entry: entry.name.clone(),
        url: source_url.to_string(),
      })),
    }
  }

  /// Extract `old_rev..new_rev`
  ///
  /// Errors are fatal: a failing shell command or a failed mirror fetch.
  /// A failing `git log` in a mirror comes back as [`Changelog::Unavailable`].
  pub fn extract(&self, root: &Path, old_rev: &str, new_rev: &str) -> UpdaterResult<Changelog> {
    match self {
      ChangelogSource::Command { template } => run_log_command(template, root, old_rev, new_rev),
      ChangelogSource::Mirror { path, fetch } => read_mirror_log(path, fetch, old_rev, new_rev),
    }
  }
}

/// Full shell command line for the `cmd` variant
pub fn log_command_line(template: &str, old_rev: &str, new_rev: &str) -> String {
  format!(
    "{} {} \"{}\"",
    template.trim_end(),
    LOG_ARGS.join(" "),
    revision_range(old_rev, new_rev)
  )
}

fn run_log_command(template: &str, root: &Path, old_rev: &str, new_rev: &str) -> UpdaterResult<Changelog> {
  let command = log_command_line(template, old_rev, new_rev);

  let output = Command::new("sh")
    .arg("-c")
    .arg(&command)
    .current_dir(root)
    .output()
    .with_context(|| format!("Failed to run changelog command: {}", command))?;

  let stderr = String::from_utf8_lossy(&output.stderr);

  if !output.status.success() {
    return Err(
      UpdaterError::with_help(
        format!(
          "Changelog command failed with exit code {}: {}",
          output.status.code().unwrap_or(-1),
          command
        ),
        "Check the `cmd` of the matching [repo] entry, or run with --no-changelog.",
      )
      .context(stderr.trim_end().to_string()),
    );
  }

  if !stderr.trim().is_empty() {
    eprintln!("⚠️  {}", stderr.trim_end());
  }

  Ok(Changelog::Entries(
    String::from_utf8_lossy(&output.stdout).trim_end().to_string(),
  ))
}

fn read_mirror_log(path: &Path, fetch: &FetchRemote, old_rev: &str, new_rev: &str) -> UpdaterResult<Changelog> {
  let mirror = SystemGit::open(path)?;

  match fetch {
    FetchRemote::Skip => {}
    FetchRemote::DefaultRemote => println!("   Fetching {}", path.display()),
    FetchRemote::Named(remote) => println!("   Fetching {} from {}", path.display(), remote),
  }
  mirror
    .fetch(fetch)
    .map_err(|e| UpdaterError::message(format!("Error fetching {}", path.display())).context(e.to_string()))?;

  match mirror.log_oneline(old_rev, new_rev) {
    Ok(log) => Ok(Changelog::Entries(log)),
    Err(e) => Ok(Changelog::Unavailable { reason: e.to_string() }),
  }
}
