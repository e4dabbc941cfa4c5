use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, OnceLock};

use addx_core::FileId;
use addx_syntax::{parse_csharp, CSharpParseResult, SyntaxNode};

use crate::path::ProjectPath;
use crate::semantic::SemanticModel;

/// A single compilation unit of a [`Project`] snapshot.
///
/// The parse is computed on first use and cached for the lifetime of the
/// document; documents are never mutated in place.
#[derive(Debug)]
pub struct Document {
    path: ProjectPath,
    text: Arc<str>,
    parse: OnceLock<Arc<CSharpParseResult>>,
}

impl Document {
    fn new(path: ProjectPath, text: Arc<str>) -> Self {
        Self {
            path,
            text,
            parse: OnceLock::new(),
        }
    }

    pub fn path(&self) -> &ProjectPath {
        &self.path
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn parse(&self) -> Arc<CSharpParseResult> {
        Arc::clone(self.parse.get_or_init(|| {
            tracing::trace!(target = "addx.project", path = %self.path, "parsing document");
            Arc::new(parse_csharp(&self.text))
        }))
    }

    pub fn syntax(&self) -> SyntaxNode {
        self.parse().syntax()
    }
}

/// An immutable snapshot of every C# document in a project.
///
/// Documents are ordered by path; a document's [`FileId`] is its position in
/// that order and stays stable across [`Project::with_file_text`].
#[derive(Debug, Clone, Default)]
pub struct Project {
    root: Option<PathBuf>,
    documents: Vec<Arc<Document>>,
    semantic: OnceLock<Arc<SemanticModel>>,
}

impl Project {
    /// Builds an in-memory snapshot. Later entries win when paths repeat.
    pub fn new<P, T>(files: impl IntoIterator<Item = (P, T)>) -> Self
    where
        P: AsRef<str>,
        T: Into<String>,
    {
        let files: BTreeMap<ProjectPath, String> = files
            .into_iter()
            .map(|(path, text)| (ProjectPath::new(path.as_ref()), text.into()))
            .collect();
        Self::from_documents(None, files)
    }

    pub(crate) fn from_documents(
        root: Option<PathBuf>,
        files: BTreeMap<ProjectPath, String>,
    ) -> Self {
        let documents = files
            .into_iter()
            .map(|(path, text)| Arc::new(Document::new(path, Arc::from(text))))
            .collect();
        Self {
            root,
            documents,
            semantic: OnceLock::new(),
        }
    }

    /// Directory the snapshot was loaded from, if it came from disk.
    pub fn root(&self) -> Option<&Path> {
        self.root.as_deref()
    }

    pub fn file_ids(&self) -> impl Iterator<Item = FileId> + '_ {
        (0..self.documents.len()).map(|idx| FileId::from_raw(idx as u32))
    }

    pub fn document(&self, file: FileId) -> Option<&Document> {
        self.documents.get(file.index()).map(Arc::as_ref)
    }

    pub fn file_id(&self, path: &ProjectPath) -> Option<FileId> {
        self.documents
            .binary_search_by(|doc| doc.path.cmp(path))
            .ok()
            .map(|idx| FileId::from_raw(idx as u32))
    }

    /// Maps an absolute (or root-relative) file system path to a document.
    pub fn file_id_for_fs_path(&self, path: &Path) -> Option<FileId> {
        let relative = match &self.root {
            Some(root) if path.is_absolute() => path.strip_prefix(root).ok()?,
            _ => path,
        };
        self.file_id(&ProjectPath::from_relative_path(relative)?)
    }

    pub fn fs_path(&self, file: FileId) -> Option<PathBuf> {
        let root = self.root.as_ref()?;
        Some(self.document(file)?.path.to_path_buf(root))
    }

    pub fn path(&self, file: FileId) -> Option<&ProjectPath> {
        self.document(file).map(Document::path)
    }

    pub fn text(&self, file: FileId) -> Option<&str> {
        self.document(file).map(Document::text)
    }

    pub fn parse(&self, file: FileId) -> Option<Arc<CSharpParseResult>> {
        self.document(file).map(Document::parse)
    }

    pub fn syntax(&self, file: FileId) -> Option<SyntaxNode> {
        self.document(file).map(Document::syntax)
    }

    /// The type index over all documents, built on first use.
    pub fn semantic_model(&self) -> Arc<SemanticModel> {
        Arc::clone(
            self.semantic
                .get_or_init(|| Arc::new(SemanticModel::build(self))),
        )
    }

    /// Returns a new snapshot with `file`'s text replaced.
    ///
    /// Unchanged documents (and their cached parses) are shared with `self`.
    /// Returns `None` for unknown files.
    pub fn with_file_text(&self, file: FileId, text: impl Into<String>) -> Option<Project> {
        let old = self.documents.get(file.index())?;
        let mut documents = self.documents.clone();
        documents[file.index()] = Arc::new(Document::new(
            old.path.clone(),
            Arc::from(text.into()),
        ));
        Some(Self {
            root: self.root.clone(),
            documents,
            semantic: OnceLock::new(),
        })
    }
}
