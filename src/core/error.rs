//! Error types for pin-updater with contextual messages
//!
//! Two severities exist in practice: errors that bubble up to `main` abort the
//! whole run with exit code 1, while per-source failures are printed where they
//! happen and the loop moves on. This module only models the first kind.

use std::fmt;
use std::io;
use std::path::PathBuf;

/// Exit code used for every fatal error
pub const FAILURE_EXIT_CODE: i32 = 1;

/// Main error type for pin-updater
#[derive(Debug)]
pub enum UpdaterError {
  /// Configuration file errors
  Config(ConfigError),

  /// Pin store (sources.json) errors
  PinStore(PinStoreError),

  /// Git operation errors
  Git(GitError),

  /// I/O errors
  Io(io::Error),

  /// Generic error with message and optional context
  Message {
    message: String,
    context: Option<String>,
    help: Option<String>,
  },
}

impl UpdaterError {
  /// Create a simple error message
  pub fn message(msg: impl Into<String>) -> Self {
    UpdaterError::Message {
      message: msg.into(),
      context: None,
      help: None,
    }
  }

  /// Create an error with help text
  pub fn with_help(msg: impl Into<String>, help: impl Into<String>) -> Self {
    UpdaterError::Message {
      message: msg.into(),
      context: None,
      help: Some(help.into()),
    }
  }

  /// Add context to an existing error
  pub fn context(self, ctx: impl Into<String>) -> Self {
    let ctx_str = ctx.into();
    match self {
      UpdaterError::Message { message, context, help } => UpdaterError::Message {
        message,
        context: Some(context.map(|c| format!("{}\n{}", ctx_str, c)).unwrap_or(ctx_str)),
        help,
      },
      UpdaterError::Io(err) => UpdaterError::Message {
        message: format!("{}: {}", ctx_str, err),
        context: None,
        help: None,
      },
      _ => self,
    }
  }

  /// Get contextual help message for this error
  pub fn help_message(&self) -> Option<String> {
    match self {
      UpdaterError::Config(e) => e.help_message(),
      UpdaterError::PinStore(e) => e.help_message(),
      UpdaterError::Git(e) => e.help_message(),
      UpdaterError::Message { help, .. } => help.clone(),
      UpdaterError::Io(_) => None,
    }
  }
}

impl fmt::Display for UpdaterError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      UpdaterError::Config(e) => write!(f, "{}", e),
      UpdaterError::PinStore(e) => write!(f, "{}", e),
      UpdaterError::Git(e) => write!(f, "{}", e),
      UpdaterError::Io(e) => write!(f, "I/O error: {}", e),
      UpdaterError::Message { message, context, .. } => {
        write!(f, "{}", message)?;
        if let Some(ctx) = context {
          write!(f, "\n{}", ctx)?;
        }
        Ok(())
      }
    }
  }
}

impl std::error::Error for UpdaterError {
  fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
    match self {
      UpdaterError::Io(e) => Some(e),
      _ => None,
    }
  }
}

impl From<io::Error> for UpdaterError {
  fn from(err: io::Error) -> Self {
    UpdaterError::Io(err)
  }
}

impl From<String> for UpdaterError {
  fn from(msg: String) -> Self {
    UpdaterError::message(msg)
  }
}

impl From<&str> for UpdaterError {
  fn from(msg: &str) -> Self {
    UpdaterError::message(msg)
  }
}

impl From<toml_edit::de::Error> for UpdaterError {
  fn from(err: toml_edit::de::Error) -> Self {
    UpdaterError::message(format!("TOML deserialization error: {}", err))
  }
}

impl From<serde_json::Error> for UpdaterError {
  fn from(err: serde_json::Error) -> Self {
    UpdaterError::message(format!("JSON error: {}", err))
  }
}

/// Configuration-related errors
#[derive(Debug)]
pub enum ConfigError {
  /// Config file does not exist
  NotFound { path: PathBuf },

  /// Config file exists but is not valid TOML for our schema
  Invalid { path: PathBuf, reason: String },

  /// Missing required field
  MissingField { field: String },

  /// No `[repo.*]` entry matched a source URL
  NoMatch { url: String },

  /// Matched entry has neither a mirror path nor a log command
  NoChangelogSource { entry: String, url: String },
}

impl ConfigError {
  fn help_message(&self) -> Option<String> {
    match self {
      ConfigError::NotFound { .. } => {
        Some("Pass a configuration file with --config (see --help for the default location).".to_string())
      }
      ConfigError::NoMatch { url } => Some(format!(
        "Add a [repo.<name>] entry whose url is a substring of {}, or run with --no-changelog.",
        url
      )),
      ConfigError::NoChangelogSource { entry, .. } => {
        Some(format!("Set either `path` or `cmd` for [repo.{}].", entry))
      }
      _ => None,
    }
  }
}

impl fmt::Display for ConfigError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      ConfigError::NotFound { path } => write!(f, "{} not found", path.display()),
      ConfigError::Invalid { path, reason } => write!(f, "Error decoding {}: {}", path.display(), reason),
      ConfigError::MissingField { field } => write!(f, "Missing required field in config: {}", field),
      ConfigError::NoMatch { url } => write!(f, "No config match found for {}", url),
      ConfigError::NoChangelogSource { url, .. } => write!(f, "No path or cmd found in config for {}", url),
    }
  }
}

/// Pin store errors
#[derive(Debug)]
pub enum PinStoreError {
  /// sources.json missing
  NotFound { path: PathBuf },

  /// sources.json is not valid JSON (or not the expected shape)
  Malformed { path: PathBuf, reason: String },

  /// npins schema version outside the allow-list
  UnsupportedVersion { found: Option<u64> },

  /// No pins at all
  Empty { path: PathBuf },

  /// Requested source is not present
  SourceNotFound { name: String, path: PathBuf },
}

impl PinStoreError {
  fn help_message(&self) -> Option<String> {
    match self {
      PinStoreError::NotFound { .. } => Some("Run from the project root or pass --root.".to_string()),
      PinStoreError::UnsupportedVersion { .. } => {
        Some("Upgrade the pin file with `npins upgrade` or use a supported npins release.".to_string())
      }
      _ => None,
    }
  }
}

impl fmt::Display for PinStoreError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      PinStoreError::NotFound { path } => write!(f, "{} file not found", path.display()),
      PinStoreError::Malformed { path, reason } => write!(f, "Error decoding {}: {}", path.display(), reason),
      PinStoreError::UnsupportedVersion { found: Some(v) } => {
        write!(f, "unsupported npins sources version: {}", v)
      }
      PinStoreError::UnsupportedVersion { found: None } => write!(f, "unsupported npins sources version: missing"),
      PinStoreError::Empty { path } => write!(f, "no sources found in {}", path.display()),
      PinStoreError::SourceNotFound { name, path } => write!(f, "{} not found in {}", name, path.display()),
    }
  }
}

/// Git operation errors
#[derive(Debug)]
pub enum GitError {
  /// Git command failed
  CommandFailed { command: String, stderr: String },

  /// Repository not found
  RepoNotFound { path: PathBuf },

  /// Preflight: something is already staged
  StagedFiles { files: Vec<String> },

  /// Preflight: the pin file has uncommitted changes
  UncommittedChanges { path: String },
}

impl GitError {
  fn help_message(&self) -> Option<String> {
    match self {
      GitError::RepoNotFound { path } => Some(format!(
        "Check the path or clone the repository first: {}",
        path.display()
      )),
      GitError::StagedFiles { .. } => Some("Commit or unstage them before proceeding.".to_string()),
      GitError::UncommittedChanges { path } => Some(format!("Commit or stash the changes to {} first.", path)),
      GitError::CommandFailed { .. } => None,
    }
  }
}

impl fmt::Display for GitError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      GitError::CommandFailed { command, stderr } => {
        write!(f, "Git command failed: {}\n{}", command, stderr.trim_end())
      }
      GitError::RepoNotFound { path } => write!(f, "Git repository not found at: {}", path.display()),
      GitError::StagedFiles { files } => {
        write!(f, "There are already staged files: {}", files.join(", "))
      }
      GitError::UncommittedChanges { path } => write!(f, "There are uncommitted changes in {}", path),
    }
  }
}

/// Result type alias for pin-updater
pub type UpdaterResult<T> = Result<T, UpdaterError>;

/// Helper trait to add context to Results
pub trait ResultExt<T> {
  /// Add context to an error result
  fn context(self, ctx: impl Into<String>) -> UpdaterResult<T>;

  /// Add context using a closure (lazy evaluation)
  fn with_context<F>(self, f: F) -> UpdaterResult<T>
  where
    F: FnOnce() -> String;
}

impl<T, E> ResultExt<T> for Result<T, E>
where
  E: Into<UpdaterError>,
{
  fn context(self, ctx: impl Into<String>) -> UpdaterResult<T> {
    self.map_err(|e| e.into().context(ctx))
  }

  fn with_context<F>(self, f: F) -> UpdaterResult<T>
  where
    F: FnOnce() -> String,
  {
    self.map_err(|e| e.into().context(f()))
  }
}

/// Pretty-print an error to stderr with help text
pub fn print_error(error: &UpdaterError) {
  eprintln!("\n❌ {}\n", error);

  if let Some(help) = error.help_message() {
    eprintln!("💡 Help: {}\n", help);
  }
}
