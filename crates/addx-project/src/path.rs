use std::fmt;
use std::path::{Component, Path, PathBuf};

use serde::Serialize;

/// A `/`-separated path relative to the project root.
///
/// The empty path denotes the root folder itself. Ordering is ordinal over the
/// normalized text, which is the order used to break ties between documents in
/// the same folder.
#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct ProjectPath {
    text: String,
}

impl ProjectPath {
    /// Builds a path from text, accepting both `/` and `\` separators and
    /// dropping empty and `.` segments.
    pub fn new(path: &str) -> Self {
        Self::from_segments(path.split(['/', '\\']))
    }

    pub fn root() -> Self {
        Self::default()
    }

    pub fn from_segments<'a>(segments: impl IntoIterator<Item = &'a str>) -> Self {
        let text = segments
            .into_iter()
            .filter(|seg| !seg.is_empty() && *seg != ".")
            .collect::<Vec<_>>()
            .join("/");
        Self { text }
    }

    /// Converts a file system path relative to the project root.
    ///
    /// Returns `None` for paths that escape the root or are not valid UTF-8.
    pub fn from_relative_path(path: &Path) -> Option<Self> {
        let mut segments = Vec::new();
        for component in path.components() {
            match component {
                Component::Normal(seg) => segments.push(seg.to_str()?),
                Component::CurDir => {}
                _ => return None,
            }
        }
        Some(Self::from_segments(segments))
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }

    pub fn segments(&self) -> impl Iterator<Item = &str> + '_ {
        self.text.split('/').filter(|seg| !seg.is_empty())
    }

    pub fn file_name(&self) -> Option<&str> {
        self.segments().last()
    }

    /// File name without its final extension (`Startup.cs` -> `Startup`).
    pub fn file_stem(&self) -> Option<&str> {
        let name = self.file_name()?;
        match name.rfind('.') {
            Some(0) | None => Some(name),
            Some(idx) => Some(&name[..idx]),
        }
    }

    /// The containing folder; the root's parent is the root.
    pub fn parent(&self) -> ProjectPath {
        match self.text.rfind('/') {
            Some(idx) => Self {
                text: self.text[..idx].to_string(),
            },
            None => Self::root(),
        }
    }

    pub fn join(&self, segment: &str) -> ProjectPath {
        Self::from_segments(self.segments().chain(segment.split(['/', '\\'])))
    }

    pub fn to_path_buf(&self, root: &Path) -> PathBuf {
        self.segments().fold(root.to_path_buf(), |acc, seg| acc.join(seg))
    }
}

impl fmt::Display for ProjectPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

/// Folder prefixes of `folder`, longest first, ending with the root.
///
/// `Top/Nested` yields `Top/Nested`, `Top`, and the root.
pub fn folder_prefixes(folder: &ProjectPath) -> Vec<ProjectPath> {
    let segments: Vec<&str> = folder.segments().collect();
    (0..=segments.len())
        .rev()
        .map(|len| ProjectPath::from_segments(segments[..len].iter().copied()))
        .collect()
}
