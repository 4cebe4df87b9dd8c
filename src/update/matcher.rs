//! Longest-substring matching of source URLs against `[repo]` entries

use crate::core::config::RepoEntry;

/// Find the entry whose registered URL is the longest substring of `url`
///
/// Only a strictly longer match replaces the current best, so among equally
/// long matches the first entry wins.
pub fn find_best_match<'a>(url: &str, entries: &'a [RepoEntry]) -> Option<&'a RepoEntry> {
  let mut best: Option<&RepoEntry> = None;
  let mut longest = 0;

  for entry in entries {
    if url.contains(entry.url.as_str()) && entry.url.len() > longest {
      longest = entry.url.len();
      best = Some(entry);
    }
  }

  best
}
