//! System git backend
//!
//! Every operation shells out to `git -C <repo>` with a scrubbed environment,
//! so the same type drives both the project repository (preflight, commits)
//! and local mirror clones (fetch, log).

use crate::core::error::{GitError, ResultExt, UpdaterError, UpdaterResult};
use crate::utils;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};

/// Environment variables passed through to git
///
/// Signing needs the gpg/ssh agent and pinentry variables, mirror fetches
/// need proxy and ssh settings; everything else is dropped.
const ENV_WHITELIST: &[&str] = &[
  "PATH",
  "HOME",
  "LANG",
  "TERM",
  "XDG_CONFIG_HOME",
  "XDG_RUNTIME_DIR",
  // signing
  "GNUPGHOME",
  "GPG_TTY",
  "GPG_AGENT_INFO",
  "DBUS_SESSION_BUS_ADDRESS",
  "SSH_AUTH_SOCK",
  "DISPLAY",
  "WAYLAND_DISPLAY",
  // fetch
  "HTTP_PROXY",
  "HTTPS_PROXY",
  "NO_PROXY",
  "http_proxy",
  "https_proxy",
  "no_proxy",
  "GIT_SSH",
  "GIT_SSH_COMMAND",
  "GIT_CONFIG_GLOBAL",
  "GIT_AUTHOR_NAME",
  "GIT_AUTHOR_EMAIL",
  "GIT_COMMITTER_NAME",
  "GIT_COMMITTER_EMAIL",
];

/// Git backend using system git
pub struct SystemGit {
  /// Directory every command runs against (`git -C`)
  pub(crate) repo_path: PathBuf,
}

impl SystemGit {
  /// Open a git repository
  ///
  /// `path` may be any directory inside the work tree; relative pathspecs
  /// passed to later calls are resolved against it. One `rev-parse` call
  /// checks that it is one.
  pub fn open(path: &Path) -> UpdaterResult<Self> {
    let output = Command::new("git")
      .arg("-C")
      .arg(path)
      .args(["rev-parse", "--show-toplevel"])
      .output()
      .context("Failed to execute git rev-parse")?;

    if !output.status.success() {
      let stderr = String::from_utf8_lossy(&output.stderr);
      if stderr.contains("not a git repository") || stderr.contains("cannot change to") {
        return Err(UpdaterError::Git(GitError::RepoNotFound {
          path: path.to_path_buf(),
        }));
      }
      return Err(UpdaterError::message(format!(
        "Failed to open git repository at {}: {}",
        path.display(),
        stderr.trim_end()
      )));
    }

    Ok(Self {
      repo_path: path.to_path_buf(),
    })
  }

  /// Run a git command and return its output, failing on non-zero exit
  pub(crate) fn run(&self, args: &[&str]) -> UpdaterResult<Output> {
    let output = self
      .git_cmd()
      .args(args)
      .output()
      .with_context(|| format!("Failed to execute {}", display_command(args)))?;

    if !output.status.success() {
      let stderr = String::from_utf8_lossy(&output.stderr);
      return Err(UpdaterError::Git(GitError::CommandFailed {
        command: display_command(args),
        stderr: stderr.to_string(),
      }));
    }

    Ok(output)
  }

  /// Create a safe git command with isolated environment
  ///
  /// - Sets working directory to repo path
  /// - Clears environment variables except [`ENV_WHITELIST`]
  /// - Adds safe configuration overrides
  pub(crate) fn git_cmd(&self) -> Command {
    let mut cmd = Command::new("git");

    cmd.arg("-C").arg(&self.repo_path);

    cmd.env_clear();
    for key in ENV_WHITELIST {
      if let Some(value) = std::env::var_os(key) {
        cmd.env(key, value);
      }
    }

    cmd.arg("-c").arg("advice.detachedHead=false");
    cmd.arg("-c").arg("core.quotePath=false"); // Don't escape non-ASCII
    cmd.arg("-c").arg("color.ui=false");

    cmd
  }
}

/// Command line for error messages, with `-m` values cut to their first line
fn display_command(args: &[&str]) -> String {
  let mut line = String::from("git");
  let mut message_follows = false;
  for arg in args {
    if message_follows {
      line.push_str(&format!(" \"{}\"", utils::first_line_with_ellipsis(arg)));
    } else {
      line.push(' ');
      line.push_str(arg);
    }
    message_follows = *arg == "-m";
  }
  line
}

/// Split command output into trimmed, non-empty lines
pub(crate) fn output_lines(output: &Output) -> Vec<String> {
  String::from_utf8_lossy(&output.stdout)
    .lines()
    .map(|s| s.trim().to_string())
    .filter(|s| !s.is_empty())
    .collect()
}
