//! Pin stores: the `sources.json` files written by niv and npins
//!
//! The pinning tools are opaque subprocesses, so the only way to see what an
//! update did is to read the store again. [`PinStore::observe`] packages that
//! as one protocol: snapshot before, invoke, snapshot after, diff one source.

pub mod niv;
pub mod npins;

use crate::core::error::{PinStoreError, ResultExt, UpdaterError, UpdaterResult};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// The two supported pinning tools
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PinTool {
  Niv,
  Npins,
}

impl PinTool {
  /// CLI name of the tool, also used as the commit summary prefix
  pub fn name(self) -> &'static str {
    match self {
      PinTool::Niv => "niv",
      PinTool::Npins => "npins",
    }
  }

  /// Pin file location relative to the project root
  pub fn pin_file(self) -> &'static str {
    match self {
      PinTool::Niv => "nix/sources.json",
      PinTool::Npins => "npins/sources.json",
    }
  }

  /// Config file used when `--config` is not given
  pub fn default_config_path(self, root: &Path) -> PathBuf {
    match self {
      PinTool::Niv => root.join("update_niv.toml"),
      PinTool::Npins => crate::utils::expand_home("~/.config/npins-updater/config.toml"),
    }
  }

  fn parse_store(self, content: &str, path: &Path) -> UpdaterResult<Vec<SourceRecord>> {
    match self {
      PinTool::Niv => niv::parse(content, path),
      PinTool::Npins => npins::parse(content, path),
    }
  }
}

/// Where a source is hosted, as far as compare links are concerned
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Hosting {
  GitHub { owner: Option<String>, repo: Option<String> },
  Other,
}

/// One named source from a pin store
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceRecord {
  pub name: String,
  /// Recorded revision (`rev` for niv, `revision` for npins)
  pub revision: Option<String>,
  /// URL matched against `[repo]` entries
  pub url: Option<String>,
  pub hosting: Hosting,
  /// Why this source cannot be bumped by this tool, if it can't
  pub unsupported: Option<String>,
}

impl SourceRecord {
  /// GitHub compare URL for `old...new`, when owner and repo are known
  pub fn compare_url(&self, old_rev: &str, new_rev: &str) -> Option<String> {
    match &self.hosting {
      Hosting::GitHub {
        owner: Some(owner),
        repo: Some(repo),
      } => Some(format!(
        "https://github.com/{}/{}/compare/{}...{}",
        owner, repo, old_rev, new_rev
      )),
      _ => None,
    }
  }

  pub fn is_github(&self) -> bool {
    matches!(self.hosting, Hosting::GitHub { .. })
  }
}

/// Result of comparing one source across two snapshots
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RevisionChange {
  Unchanged,
  Changed { old: String, new: String },
}

/// Immutable read of a pin store
#[derive(Debug, Clone)]
pub struct Snapshot {
  sources: Vec<SourceRecord>,
}

impl Snapshot {
  pub fn new(sources: Vec<SourceRecord>) -> Self {
    Self { sources }
  }

  pub fn get(&self, name: &str) -> Option<&SourceRecord> {
    self.sources.iter().find(|s| s.name == name)
  }

  pub fn sources(&self) -> &[SourceRecord] {
    &self.sources
  }

  /// Compare `name` between this snapshot and a later one
  pub fn revision_change(&self, after: &Snapshot, name: &str, store_path: &Path) -> UpdaterResult<RevisionChange> {
    let not_found = || {
      UpdaterError::PinStore(PinStoreError::SourceNotFound {
        name: name.to_string(),
        path: store_path.to_path_buf(),
      })
    };

    let old = self.get(name).ok_or_else(not_found)?.revision.clone();
    let new = after.get(name).ok_or_else(not_found)?.revision.clone();

    match (old, new) {
      (Some(old), Some(new)) if old != new => Ok(RevisionChange::Changed { old, new }),
      (Some(_), Some(_)) | (None, None) => Ok(RevisionChange::Unchanged),
      (old, new) => Err(UpdaterError::message(format!(
        "Revision of {} in {} went from {} to {}",
        name,
        store_path.display(),
        old.as_deref().unwrap_or("<none>"),
        new.as_deref().unwrap_or("<none>")
      ))),
    }
  }
}

/// Outcome of one [`PinStore::observe`] round
#[derive(Debug, Clone)]
pub struct Observation {
  pub after: Snapshot,
  pub change: RevisionChange,
}

/// A pin store on disk
#[derive(Debug, Clone)]
pub struct PinStore {
  tool: PinTool,
  path: PathBuf,
}

impl PinStore {
  pub fn new(tool: PinTool, root: &Path) -> Self {
    Self {
      tool,
      path: root.join(tool.pin_file()),
    }
  }

  /// Absolute (root-joined) path of the pin file
  pub fn path(&self) -> &Path {
    &self.path
  }

  /// Read and validate the store
  pub fn snapshot(&self) -> UpdaterResult<Snapshot> {
    let content = match fs::read_to_string(&self.path) {
      Ok(content) => content,
      Err(e) if e.kind() == io::ErrorKind::NotFound => {
        return Err(UpdaterError::PinStore(PinStoreError::NotFound {
          path: self.path.clone(),
        }));
      }
      Err(e) => return Err(e).with_context(|| format!("Failed to read {}", self.path.display())),
    };

    let sources = self.tool.parse_store(&content, &self.path)?;
    if sources.is_empty() {
      return Err(UpdaterError::PinStore(PinStoreError::Empty {
        path: self.path.clone(),
      }));
    }

    Ok(Snapshot::new(sources))
  }

  /// Run `invoke`, re-read the store and report how `name` changed
  pub fn observe<F>(&self, before: &Snapshot, name: &str, invoke: F) -> UpdaterResult<Observation>
  where
    F: FnOnce(),
  {
    invoke();
    let after = self.snapshot()?;
    let change = before.revision_change(&after, name, &self.path)?;
    Ok(Observation { after, change })
  }
}

pub(crate) fn malformed(path: &Path, err: impl std::fmt::Display) -> UpdaterError {
  UpdaterError::PinStore(PinStoreError::Malformed {
    path: path.to_path_buf(),
    reason: err.to_string(),
  })
}

/// Treat empty strings like missing values
pub(crate) fn non_empty(value: Option<String>) -> Option<String> {
  value.filter(|v| !v.trim().is_empty())
}
