use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use walkdir::{DirEntry, WalkDir};

use crate::path::ProjectPath;
use crate::project::Project;

/// Folders never scanned for sources.
const SKIPPED_DIRS: &[&str] = &["bin", "obj", ".git", "node_modules"];

#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to walk {root}: {source}")]
    Walk {
        root: PathBuf,
        #[source]
        source: walkdir::Error,
    },

    #[error("project root {root} is not a directory")]
    NotADirectory { root: PathBuf },
}

/// Finds the project root for `start` (a file or directory).
///
/// This is the nearest ancestor containing a `*.csproj`, a `*.sln` or a
/// `.git` entry, falling back to `start`'s own directory.
pub fn find_project_root(start: &Path) -> PathBuf {
    let dir = if start.is_dir() {
        start
    } else {
        start.parent().unwrap_or(start)
    };

    dir.ancestors()
        .find(|candidate| is_project_root(candidate))
        .unwrap_or(dir)
        .to_path_buf()
}

fn is_project_root(dir: &Path) -> bool {
    if dir.join(".git").exists() {
        return true;
    }
    let Ok(entries) = std::fs::read_dir(dir) else {
        return false;
    };
    entries.filter_map(Result::ok).any(|entry| {
        entry
            .path()
            .extension()
            .is_some_and(|ext| ext == "csproj" || ext == "sln")
    })
}

fn is_skipped(entry: &DirEntry) -> bool {
    entry.depth() > 0
        && entry.file_type().is_dir()
        && entry
            .file_name()
            .to_str()
            .is_some_and(|name| SKIPPED_DIRS.contains(&name))
}

/// Loads every `*.cs` file beneath `root` into a [`Project`] snapshot.
pub fn load_project(root: impl AsRef<Path>) -> Result<Project, LoadError> {
    let root = root.as_ref();
    let root = std::fs::canonicalize(root).map_err(|source| LoadError::Io {
        path: root.to_path_buf(),
        source,
    })?;
    if !root.is_dir() {
        return Err(LoadError::NotADirectory { root });
    }

    let mut files = BTreeMap::new();
    for entry in WalkDir::new(&root)
        .follow_links(false)
        .into_iter()
        .filter_entry(|entry| !is_skipped(entry))
    {
        let entry = entry.map_err(|source| LoadError::Walk {
            root: root.clone(),
            source,
        })?;
        if !entry.file_type().is_file()
            || entry.path().extension().map_or(true, |ext| ext != "cs")
        {
            continue;
        }

        let Some(path) = entry
            .path()
            .strip_prefix(&root)
            .ok()
            .and_then(ProjectPath::from_relative_path)
        else {
            tracing::debug!(
                target = "addx.project",
                path = %entry.path().display(),
                "skipping file with non UTF-8 path"
            );
            continue;
        };

        let text = std::fs::read_to_string(entry.path()).map_err(|source| LoadError::Io {
            path: entry.path().to_path_buf(),
            source,
        })?;
        files.insert(path, text);
    }

    tracing::debug!(
        target = "addx.project",
        root = %root.display(),
        documents = files.len(),
        "loaded project"
    );
    Ok(Project::from_documents(Some(root), files))
}
