//! Per-source pipeline pieces: updater invocation, URL matching, changelog
//! extraction and commit message composition

pub mod changelog;
pub mod matcher;
pub mod message;
pub mod updater;

pub use changelog::{Changelog, ChangelogSource};
pub use matcher::find_best_match;
pub use message::CommitMessage;
pub use updater::PinUpdater;
