//! Version-control collaborators
//!
//! The engine reads history only through [`HistorySource`]:
//!
//! - **git_source**: libgit2-backed reader of a real repository
//! - **memory**: whole-tree snapshots held in memory, touches and blame
//!   derived with the engine's line diff
//!
//! `progress` holds the reporter used while the history is loaded.

mod git_source;
mod memory;
mod progress;
mod source;

pub use git_source::GitSource;
pub use memory::{Change, MemorySource};
pub use progress::{BarProgress, NoopProgress, ProgressHandle, ProgressReporter, reporter};
pub use source::{BlameRecord, HistorySource, TouchRecord};
