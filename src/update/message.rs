//! Commit message for one bumped source

use crate::pins::PinTool;
use std::fmt;

/// `<tool>: update <name>`, then optional compare link and changelog blocks
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitMessage {
  summary: String,
  compare_url: Option<String>,
  changelog: Option<String>,
}

impl CommitMessage {
  pub fn new(tool: PinTool, name: &str) -> Self {
    Self {
      summary: format!("{}: update {}", tool.name(), name),
      compare_url: None,
      changelog: None,
    }
  }

  pub fn with_compare_url(mut self, url: impl Into<String>) -> Self {
    self.compare_url = Some(url.into());
    self
  }

  /// Attach a changelog; blank logs are dropped
  pub fn with_changelog(mut self, log: &str) -> Self {
    let log = log.trim_end();
    if !log.trim().is_empty() {
      self.changelog = Some(log.to_string());
    }
    self
  }
}

impl fmt::Display for CommitMessage {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}", self.summary)?;
    if let Some(url) = &self.compare_url {
      write!(f, "\n\nView changes: {}", url)?;
    }
    if let Some(log) = &self.changelog {
      write!(f, "\n\nChangelog:\n\n{}", log)?;
    }
    Ok(())
  }
}
