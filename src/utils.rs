//! Small helpers for paths and console output

use std::path::{Path, PathBuf};

/// Expand a leading `~` or `~/` to the user's home directory
///
/// Anything else (including `~user`) is returned unchanged, as is the input
/// when no home directory can be determined.
pub fn expand_home(path: &str) -> PathBuf {
  let rest = if path == "~" {
    ""
  } else if let Some(rest) = path.strip_prefix("~/") {
    rest
  } else {
    return PathBuf::from(path);
  };

  match dirs::home_dir() {
    Some(home) if rest.is_empty() => home,
    Some(home) => home.join(rest),
    None => PathBuf::from(path),
  }
}

/// Convert a path to Git format (always forward slashes)
///
/// Git expects paths with forward slashes, even on Windows.
pub fn path_to_git_format(path: &Path) -> String {
  #[cfg(target_os = "windows")]
  {
    path.to_string_lossy().replace('\\', "/")
  }
  #[cfg(not(target_os = "windows"))]
  {
    path.to_string_lossy().to_string()
  }
}

/// First line of a message, with ` ...` appended when more lines follow
pub fn first_line_with_ellipsis(message: &str) -> String {
  let mut lines = message.split('\n');
  let first = lines.next().unwrap_or_default();
  if lines.next().is_some() {
    format!("{} ...", first)
  } else {
    first.to_string()
  }
}
