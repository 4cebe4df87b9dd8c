//! niv's `nix/sources.json`: an unversioned map of source name to attributes

use super::{Hosting, SourceRecord, malformed, non_empty};
use crate::core::error::UpdaterResult;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::Path;

/// URL template niv writes for GitHub-hosted sources
pub const GITHUB_ARCHIVE_TEMPLATE: &str = "https://github.com/<owner>/<repo>/archive/<rev>.tar.gz";

#[derive(Debug, Deserialize)]
struct NivSource {
  #[serde(default)]
  rev: Option<String>,
  #[serde(default)]
  url: Option<String>,
  #[serde(default)]
  url_template: Option<String>,
  #[serde(default)]
  owner: Option<String>,
  #[serde(default)]
  repo: Option<String>,
}

pub fn parse(content: &str, path: &Path) -> UpdaterResult<Vec<SourceRecord>> {
  let raw: BTreeMap<String, NivSource> = serde_json::from_str(content).map_err(|e| malformed(path, e))?;

  Ok(
    raw
      .into_iter()
      .map(|(name, source)| {
        let hosting = if source.url_template.as_deref() == Some(GITHUB_ARCHIVE_TEMPLATE) {
          Hosting::GitHub {
            owner: non_empty(source.owner),
            repo: non_empty(source.repo),
          }
        } else {
          Hosting::Other
        };
        let revision = non_empty(source.rev);
        let unsupported = revision.is_none().then(|| "no rev recorded".to_string());

        SourceRecord {
          name,
          revision,
          url: non_empty(source.url),
          hosting,
          unsupported,
        }
      })
      .collect(),
  )
}
