//! History Model
//!
//! Normalized, immutable representation of a linear commit history built
//! once per run from a [`HistorySource`](crate::repository::HistorySource).

mod blame;
mod category;
mod commit;
mod history;
mod interner;
mod lifecycle;

pub use blame::{BlameMap, BlamedFile};
pub use category::{FileCategory, classify};
pub use commit::{Commit, CommitIndex, CommitMeta, FileTouch, TouchKind};
pub use history::History;
pub use interner::PathInterner;
pub use lifecycle::{FileLifecycle, FileVersion, TouchRef};

/// Interned path identifier
#[derive(Debug, Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct PathId(pub u32);

impl PathId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}
