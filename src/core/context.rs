//! Run context - built once in main.rs, passed by reference to the command
//!
//! Holds everything that is fixed for the duration of a run: the project
//! root, which pinning tool is in use, the loaded config and the pin store.
//! Nothing downstream consults the process working directory.

use crate::core::config::UpdaterConfig;
use crate::core::error::UpdaterResult;
use crate::pins::{PinStore, PinTool};
use crate::utils;
use std::path::{Path, PathBuf};

pub struct RunContext {
  /// Project repository root
  pub root: PathBuf,

  /// niv or npins
  pub tool: PinTool,

  /// Loaded config
  pub config: UpdaterConfig,

  /// The tool's sources.json under `root`
  pub store: PinStore,
}

impl RunContext {
  /// Load the config and set up the pin store for `tool`
  ///
  /// `config_path` falls back to the tool's default location.
  pub fn build(root: &Path, tool: PinTool, config_path: Option<PathBuf>) -> UpdaterResult<Self> {
    let config_path = config_path.unwrap_or_else(|| tool.default_config_path(root));
    let config = UpdaterConfig::load(&config_path)?;

    Ok(Self::with_config(root, tool, config))
  }

  pub fn with_config(root: &Path, tool: PinTool, config: UpdaterConfig) -> Self {
    Self {
      root: root.to_path_buf(),
      tool,
      config,
      store: PinStore::new(tool, root),
    }
  }

  /// Pin file as a git pathspec relative to `root`
  pub fn pin_pathspec(&self) -> String {
    utils::path_to_git_format(Path::new(self.tool.pin_file()))
  }
}
