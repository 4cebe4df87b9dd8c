//! `pin-updater niv|npins` - bump pins one source at a time
//!
//! Flow for a run:
//! 1. Preflight: nothing staged, no uncommitted edits to the pin file
//! 2. Snapshot the pin store
//! 3. Per source: run the updater, re-read the store, and when the revision
//!    moved, build a commit message (compare link, changelog) and commit
//!    only the pin file
//!
//! Any error returned from here aborts the run. Updater and commit failures
//! for a single source are printed and the loop continues.

use crate::core::context::RunContext;
use crate::core::error::{ConfigError, GitError, PinStoreError, UpdaterError, UpdaterResult};
use crate::core::vcs::SystemGit;
use crate::pins::{RevisionChange, Snapshot, SourceRecord};
use crate::update::{Changelog, ChangelogSource, CommitMessage, PinUpdater, find_best_match};
use crate::utils;

/// Options from the command line
#[derive(Debug, Clone, Default)]
pub struct UpdateOptions {
  /// Only update this source
  pub package: Option<String>,
  /// Append a changelog block to each commit
  pub changelog: bool,
  /// GPG-sign commits
  pub sign: bool,
}

/// What happened to one source
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceOutcome {
  /// Not a source this tool can bump
  Skipped,
  /// Revision did not move
  Unchanged,
  Committed,
  CommitFailed,
}

/// Per-outcome counts for the final report
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UpdateSummary {
  pub committed: usize,
  pub unchanged: usize,
  pub skipped: usize,
  pub failed: usize,
}

impl UpdateSummary {
  fn record(&mut self, outcome: SourceOutcome) {
    match outcome {
      SourceOutcome::Skipped => self.skipped += 1,
      SourceOutcome::Unchanged => self.unchanged += 1,
      SourceOutcome::Committed => self.committed += 1,
      SourceOutcome::CommitFailed => self.failed += 1,
    }
  }
}

/// Run the update command
pub fn run_update(ctx: &RunContext, opts: &UpdateOptions) -> UpdaterResult<UpdateSummary> {
  let repo = SystemGit::open(&ctx.root)?;
  let pathspec = ctx.pin_pathspec();
  preflight(&repo, &pathspec)?;

  println!("🔍 Reading {}", ctx.store.path().display());
  let mut current = ctx.store.snapshot()?;

  let names: Vec<String> = match &opts.package {
    Some(name) => {
      if current.get(name).is_none() {
        return Err(UpdaterError::PinStore(PinStoreError::SourceNotFound {
          name: name.clone(),
          path: ctx.tool.pin_file().into(),
        }));
      }
      println!("Updating {}", name);
      vec![name.clone()]
    }
    None => current.sources().iter().map(|s| s.name.clone()).collect(),
  };

  let updater = PinUpdater::new(ctx.tool, &ctx.root, ctx.config.github_token.clone());
  let mut summary = UpdateSummary::default();

  for name in &names {
    let source = current
      .get(name)
      .ok_or_else(|| {
        UpdaterError::PinStore(PinStoreError::SourceNotFound {
          name: name.clone(),
          path: ctx.tool.pin_file().into(),
        })
      })?;

    if let Some(reason) = &source.unsupported {
      println!("⏭️  Skipping {}: {}", name, reason);
      summary.record(SourceOutcome::Skipped);
      continue;
    }

    println!("🔄 {} update {}", ctx.tool.name(), name);
    let observation = ctx.store.observe(&current, name, || match updater.run(Some(name.as_str())) {
      Ok(()) => println!("   ✅ {} update completed successfully", ctx.tool.name()),
      Err(e) => eprintln!("   ❌ {}", e),
    })?;

    let outcome = match &observation.change {
      RevisionChange::Unchanged => {
        println!("   no changes for {} detected", name);
        SourceOutcome::Unchanged
      }
      RevisionChange::Changed { old, new } => {
        println!("   {} -> {}", old, new);
        commit_change(ctx, &repo, opts, &observation.after, name, old, new)?
      }
    };

    summary.record(outcome);
    current = observation.after;
  }

  println!(
    "\n✅ Done: {} committed, {} unchanged, {} skipped, {} failed",
    summary.committed, summary.unchanged, summary.skipped, summary.failed
  );

  Ok(summary)
}

/// Refuse to run over unrelated staged work or local edits to the pin file
fn preflight(repo: &SystemGit, pathspec: &str) -> UpdaterResult<()> {
  let staged = repo.staged_files()?;
  if !staged.is_empty() {
    return Err(UpdaterError::Git(GitError::StagedFiles { files: staged }));
  }

  if repo.has_unstaged_changes(pathspec)? {
    return Err(UpdaterError::Git(GitError::UncommittedChanges {
      path: pathspec.to_string(),
    }));
  }

  Ok(())
}

/// Compose the message for a changed source and commit the pin file
fn commit_change(
  ctx: &RunContext,
  repo: &SystemGit,
  opts: &UpdateOptions,
  after: &Snapshot,
  name: &str,
  old_rev: &str,
  new_rev: &str,
) -> UpdaterResult<SourceOutcome> {
  let pin_file = ctx.tool.pin_file();
  let updated = after.get(name).ok_or_else(|| {
    UpdaterError::PinStore(PinStoreError::SourceNotFound {
      name: name.to_string(),
      path: pin_file.into(),
    })
  })?;

  let mut message = CommitMessage::new(ctx.tool, name);

  if updated.is_github() {
    match updated.compare_url(old_rev, new_rev) {
      Some(url) => message = message.with_compare_url(url),
      None => eprintln!("   ⚠️  owner and/or repo not found for {} in {}", name, pin_file),
    }
  }

  if opts.changelog {
    message = attach_changelog(ctx, updated, old_rev, new_rev, message)?;
  }

  let text = message.to_string();
  match repo.commit_path(&ctx.pin_pathspec(), &text, opts.sign) {
    Ok(()) => {
      println!(
        "   📝 Committed {} with message: \"{}\"",
        pin_file,
        utils::first_line_with_ellipsis(&text)
      );
      Ok(SourceOutcome::Committed)
    }
    Err(e) => {
      eprintln!("   ❌ Error committing {}: {}", pin_file, e);
      Ok(SourceOutcome::CommitFailed)
    }
  }
}

fn attach_changelog(
  ctx: &RunContext,
  source: &SourceRecord,
  old_rev: &str,
  new_rev: &str,
  message: CommitMessage,
) -> UpdaterResult<CommitMessage> {
  let url = source.url.as_deref().ok_or_else(|| {
    UpdaterError::Config(ConfigError::NoMatch {
      url: format!("{} (no url recorded)", source.name),
    })
  })?;

  let entry = find_best_match(url, ctx.config.repo.entries()).ok_or_else(|| {
    UpdaterError::Config(ConfigError::NoMatch { url: url.to_string() })
  })?;

  let changelog = ChangelogSource::from_entry(entry, url, &ctx.root)?.extract(&ctx.root, old_rev, new_rev)?;

  match changelog {
    Changelog::Entries(log) if log.trim().is_empty() => {
      println!("   No non-merge commits between {} and {}", old_rev, new_rev);
      Ok(message)
    }
    Changelog::Entries(log) => Ok(message.with_changelog(&log)),
    Changelog::Unavailable { reason } => {
      eprintln!("   ⚠️  Could not read changelog from [repo.{}]: {}", entry.name, reason);
      Ok(message)
    }
  }
}
