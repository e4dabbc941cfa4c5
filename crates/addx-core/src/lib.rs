//! Core shared types for AddX.
//!
//! This crate is intentionally small: text ranges, line/column conversion and
//! the edit model shared by the syntax, project and refactoring layers.

mod edit;
mod text;

pub use edit::{apply_text_edits, normalize_text_edits, EditError, TextEdit, WorkspaceEdit};
pub use text::{LineCol, LineIndex, TextRange, TextSize};

use serde::{Deserialize, Serialize};

/// Identifier of a document inside a project snapshot.
///
/// Ids are dense indices assigned by the project in path order; they are only
/// meaningful relative to the snapshot (or its descendants) that produced them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FileId(u32);

impl FileId {
    #[inline]
    pub const fn from_raw(raw: u32) -> Self {
        Self(raw)
    }

    #[inline]
    pub const fn to_raw(self) -> u32 {
        self.0
    }

    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl std::fmt::Display for FileId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "file#{}", self.0)
    }
}
