use crate::core::error::{ConfigError, ResultExt, UpdaterError, UpdaterResult};
use crate::utils;
use serde::Deserialize;
use serde::de::{self, Deserializer, MapAccess, Visitor};
use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Configuration for pin-updater
///
/// ```toml
/// github_token = "ghp_..."
///
/// [repo.nixpkgs]
/// url = "github.com/NixOS/nixpkgs"
/// path = "~/src/nixpkgs"
/// fetch = "upstream"
///
/// [repo.home-manager]
/// url = "github.com/nix-community/home-manager"
/// cmd = "git -C ~/src/home-manager"
/// ```
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UpdaterConfig {
  /// Token forwarded to niv as `NIV_GITHUB_TOKEN`
  #[serde(default)]
  pub github_token: Option<String>,

  /// Known upstream repositories, in file order
  #[serde(default)]
  pub repo: RepoTable,
}

/// A `[repo.<name>]` entry
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RepoEntry {
  /// Table key; filled in by [`RepoTable`]'s deserializer
  #[serde(skip)]
  pub name: String,

  /// Registered URL, matched as a substring of a pin's source URL
  pub url: String,

  /// Local mirror clone
  #[serde(default)]
  pub path: Option<PathBuf>,

  /// Whether (and from where) to fetch the mirror before reading its log
  #[serde(default)]
  pub fetch: FetchRemote,

  /// Shell command prefix that runs git against the mirror, e.g. `git -C ~/src/foo`
  #[serde(default)]
  pub cmd: Option<String>,
}

/// Fetch behavior for a mirror: `fetch = true | false | "<remote>"`
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
#[serde(from = "RawFetch")]
pub enum FetchRemote {
  /// Plain `git fetch`
  #[default]
  DefaultRemote,
  /// `git fetch <remote>`
  Named(String),
  /// Use the mirror as-is
  Skip,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawFetch {
  Flag(bool),
  Remote(String),
}

impl From<RawFetch> for FetchRemote {
  fn from(raw: RawFetch) -> Self {
    match raw {
      RawFetch::Flag(true) => FetchRemote::DefaultRemote,
      RawFetch::Flag(false) => FetchRemote::Skip,
      RawFetch::Remote(name) => FetchRemote::Named(name),
    }
  }
}

/// The `[repo]` table with document order preserved
#[derive(Debug, Clone, Default)]
pub struct RepoTable(Vec<RepoEntry>);

impl RepoTable {
  pub fn entries(&self) -> &[RepoEntry] {
    &self.0
  }
}

impl<'de> Deserialize<'de> for RepoTable {
  fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
  where
    D: Deserializer<'de>,
  {
    struct RepoTableVisitor;

    impl<'de> Visitor<'de> for RepoTableVisitor {
      type Value = RepoTable;

      fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a table of [repo.<name>] entries")
      }

      fn visit_map<A>(self, mut map: A) -> Result<Self::Value, A::Error>
      where
        A: MapAccess<'de>,
      {
        let mut entries = Vec::with_capacity(map.size_hint().unwrap_or(0));
        while let Some((name, mut entry)) = map.next_entry::<String, RepoEntry>()? {
          if entries.iter().any(|e: &RepoEntry| e.name == name) {
            return Err(de::Error::custom(format!("duplicate repo entry '{}'", name)));
          }
          entry.name = name;
          entries.push(entry);
        }
        Ok(RepoTable(entries))
      }
    }

    deserializer.deserialize_map(RepoTableVisitor)
  }
}

impl UpdaterConfig {
  /// Load and validate a config file
  pub fn load(path: &Path) -> UpdaterResult<Self> {
    let content = match fs::read_to_string(path) {
      Ok(content) => content,
      Err(e) if e.kind() == io::ErrorKind::NotFound => {
        return Err(UpdaterError::Config(ConfigError::NotFound {
          path: path.to_path_buf(),
        }));
      }
      Err(e) => return Err(e).with_context(|| format!("Failed to read config from {}", path.display())),
    };

    Self::parse(&content).map_err(|e| match e {
      UpdaterError::Message { message, .. } => UpdaterError::Config(ConfigError::Invalid {
        path: path.to_path_buf(),
        reason: message,
      }),
      other => other,
    })
  }

  /// Parse config text, validate entries and expand `~` in mirror paths
  pub fn parse(content: &str) -> UpdaterResult<Self> {
    let mut config: UpdaterConfig = toml_edit::de::from_str(content)?;

    for entry in &mut config.repo.0 {
      if entry.url.trim().is_empty() {
        return Err(UpdaterError::Config(ConfigError::MissingField {
          field: format!("url for [repo.{}]", entry.name),
        }));
      }
      if let Some(path) = &entry.path {
        entry.path = Some(utils::expand_home(&path.to_string_lossy()));
      }
    }

    Ok(config)
  }
}
