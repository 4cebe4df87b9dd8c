//! npins' `npins/sources.json`: `{ "version": N, "pins": { ... } }`

use super::{Hosting, SourceRecord, malformed, non_empty};
use crate::core::error::{PinStoreError, UpdaterError, UpdaterResult};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::Path;

/// Store format versions this tool understands
pub const SUPPORTED_VERSIONS: &[u64] = &[3, 4, 5];

/// Pin types that carry a git revision
const GIT_PIN_TYPES: &[&str] = &["Git", "GitRelease"];

#[derive(Debug, Deserialize)]
struct NpinsPin {
  #[serde(default, rename = "type")]
  kind: Option<String>,
  #[serde(default)]
  revision: Option<String>,
  #[serde(default)]
  url: Option<String>,
  #[serde(default)]
  repository: Option<NpinsRepository>,
}

#[derive(Debug, Deserialize)]
struct NpinsRepository {
  #[serde(default, rename = "type")]
  kind: Option<String>,
  #[serde(default)]
  owner: Option<String>,
  #[serde(default)]
  repo: Option<String>,
  #[serde(default)]
  url: Option<String>,
}

pub fn parse(content: &str, path: &Path) -> UpdaterResult<Vec<SourceRecord>> {
  let mut value: serde_json::Value = serde_json::from_str(content).map_err(|e| malformed(path, e))?;

  let version = value.get("version").and_then(serde_json::Value::as_u64);
  match version {
    Some(v) if SUPPORTED_VERSIONS.contains(&v) => {}
    found => {
      return Err(UpdaterError::PinStore(PinStoreError::UnsupportedVersion { found }));
    }
  }

  let pins = match value.get_mut("pins").map(serde_json::Value::take) {
    Some(serde_json::Value::Null) | None => {
      return Err(UpdaterError::PinStore(PinStoreError::Empty {
        path: path.to_path_buf(),
      }));
    }
    Some(pins) => pins,
  };
  let pins: BTreeMap<String, NpinsPin> = serde_json::from_value(pins).map_err(|e| malformed(path, e))?;

  Ok(pins.into_iter().map(|(name, pin)| to_record(name, pin)).collect())
}

fn to_record(name: String, pin: NpinsPin) -> SourceRecord {
  let repository = pin.repository;

  let hosting = match &repository {
    Some(repo) if repo.kind.as_deref() == Some("GitHub") => Hosting::GitHub {
      owner: non_empty(repo.owner.clone()),
      repo: non_empty(repo.repo.clone()),
    },
    _ => Hosting::Other,
  };

  let url = non_empty(pin.url).or_else(|| repository.and_then(|r| non_empty(r.url)));

  let unsupported = match pin.kind.as_deref() {
    Some(kind) if GIT_PIN_TYPES.contains(&kind) => None,
    Some(kind) => Some(format!("{} pins are not git sources", kind)),
    None => Some("pin has no type".to_string()),
  };

  SourceRecord {
    name,
    revision: non_empty(pin.revision),
    url,
    hosting,
    unsupported,
  }
}
