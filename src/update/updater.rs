//! Invocation of the external pinning tool

use crate::core::error::{ResultExt, UpdaterError, UpdaterResult};
use crate::pins::PinTool;
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::Command;

/// Environment variable niv reads its GitHub token from
pub const NIV_TOKEN_VAR: &str = "NIV_GITHUB_TOKEN";

/// Runs `niv update` / `npins update` in the project root
///
/// The tool rewrites the pin file; nothing comes back except the exit status.
pub struct PinUpdater {
  tool: PinTool,
  program: OsString,
  root: PathBuf,
  github_token: Option<String>,
}

impl PinUpdater {
  pub fn new(tool: PinTool, root: &Path, github_token: Option<String>) -> Self {
    Self {
      tool,
      program: OsString::from(tool.name()),
      root: root.to_path_buf(),
      github_token,
    }
  }

  /// Use a different executable than the tool's name on `PATH`
  #[cfg(test)]
  pub fn with_program(mut self, program: impl Into<OsString>) -> Self {
    self.program = program.into();
    self
  }

  fn command(&self, name: Option<&str>) -> Command {
    let mut cmd = Command::new(&self.program);
    cmd.current_dir(&self.root).arg("update");
    if let Some(name) = name {
      cmd.arg(name);
    }

    if self.tool == PinTool::Niv
      && let Some(token) = &self.github_token
    {
      cmd.env(NIV_TOKEN_VAR, token);
    }

    cmd
  }

  /// Update one source, or every source when `name` is `None`
  pub fn run(&self, name: Option<&str>) -> UpdaterResult<()> {
    let tool = self.tool.name();
    let status = self
      .command(name)
      .status()
      .with_context(|| format!("Failed to execute {} update", tool))?;

    if !status.success() {
      return Err(UpdaterError::message(format!(
        "{} update failed with exit code: {}",
        tool,
        status.code().unwrap_or(-1)
      )));
    }

    Ok(())
  }
}
