//! Text edit primitives and utilities.

use crate::{FileId, TextRange, TextSize};
use std::collections::BTreeMap;

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct TextEdit {
    pub range: TextRange,
    pub replacement: String,
}

impl TextEdit {
    pub fn new(range: TextRange, replacement: impl Into<String>) -> Self {
        Self {
            range,
            replacement: replacement.into(),
        }
    }

    pub fn insert(offset: TextSize, text: impl Into<String>) -> Self {
        Self::new(TextRange::empty(offset), text)
    }

    pub fn is_insert(&self) -> bool {
        self.range.is_empty()
    }
}

/// A set of text edits grouped per document.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct WorkspaceEdit {
    pub changes: BTreeMap<FileId, Vec<TextEdit>>,
}

impl WorkspaceEdit {
    pub fn is_empty(&self) -> bool {
        self.changes.values().all(Vec::is_empty)
    }

    pub fn add_edit(&mut self, file: FileId, edit: TextEdit) {
        self.changes.entry(file).or_default().push(edit);
    }

    pub fn extend(&mut self, file: FileId, edits: impl IntoIterator<Item = TextEdit>) {
        self.changes.entry(file).or_default().extend(edits);
    }

    pub fn edits_for(&self, file: FileId) -> &[TextEdit] {
        self.changes.get(&file).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn files(&self) -> impl Iterator<Item = FileId> + '_ {
        self.changes
            .iter()
            .filter(|(_, edits)| !edits.is_empty())
            .map(|(file, _)| *file)
    }
}

#[derive(Debug, Clone, Eq, PartialEq, thiserror::Error)]
pub enum EditError {
    #[error("edit range {range:?} is out of bounds for text length {text_len:?}")]
    RangeOutOfBounds { range: TextRange, text_len: TextSize },
    #[error("offset {offset:?} is not a UTF-8 character boundary")]
    InvalidUtf8Boundary { offset: TextSize },
    #[error("overlapping edits: {first:?} overlaps {second:?}")]
    OverlappingEdits { first: TextRange, second: TextRange },
}

/// Apply a list of edits to a text snapshot.
///
/// Edits are sorted by `(start, end)` and applied from the end of the text
/// backwards, so the result does not depend on the order they were produced in.
pub fn apply_text_edits(text: &str, edits: &[TextEdit]) -> Result<String, EditError> {
    let mut edits = edits.to_vec();
    normalize_text_edits(text, &mut edits)?;

    let mut out = text.to_string();
    for edit in edits.into_iter().rev() {
        let start = usize::from(edit.range.start());
        let end = usize::from(edit.range.end());
        out.replace_range(start..end, &edit.replacement);
    }
    Ok(out)
}

/// Sort edits and check for overlaps / out-of-bounds ranges.
///
/// Two inserts at the same offset are rejected: their relative order would be
/// ambiguous.
pub fn normalize_text_edits(text: &str, edits: &mut Vec<TextEdit>) -> Result<(), EditError> {
    edits.sort_by_key(|e| (e.range.start(), e.range.end()));

    let text_len = TextSize::of(text);

    for edit in edits.iter() {
        if edit.range.end() > text_len {
            return Err(EditError::RangeOutOfBounds {
                range: edit.range,
                text_len,
            });
        }
        for offset in [edit.range.start(), edit.range.end()] {
            if !text.is_char_boundary(usize::from(offset)) {
                return Err(EditError::InvalidUtf8Boundary { offset });
            }
        }
    }

    for pair in edits.windows(2) {
        let (first, second) = (&pair[0], &pair[1]);
        if first.range.end() > second.range.start()
            || (first.is_insert() && second.is_insert() && first.range.start() == second.range.start())
        {
            return Err(EditError::OverlappingEdits {
                first: first.range,
                second: second.range,
            });
        }
    }

    Ok(())
}
