use std::sync::Arc;

use addx_core::FileId;
use addx_project::{Project, ProjectPath, SemanticModel};
use addx_syntax::SyntaxNode;

/// Host queries the engine needs.
///
/// Every query answers from one immutable snapshot; producing a modified
/// project never mutates `self`.
pub trait RegistrationDatabase {
    fn documents(&self) -> Vec<FileId>;

    fn document_path(&self, file: FileId) -> Option<&ProjectPath>;

    fn file_text(&self, file: FileId) -> Option<&str>;

    fn syntax_root(&self, file: FileId) -> Option<SyntaxNode>;

    fn semantic_model(&self) -> Option<Arc<SemanticModel>>;

    /// A new snapshot with `file`'s text replaced.
    fn with_file_text(&self, file: FileId, text: String) -> Option<Project>;
}

impl RegistrationDatabase for Project {
    fn documents(&self) -> Vec<FileId> {
        self.file_ids().collect()
    }

    fn document_path(&self, file: FileId) -> Option<&ProjectPath> {
        self.path(file)
    }

    fn file_text(&self, file: FileId) -> Option<&str> {
        self.text(file)
    }

    fn syntax_root(&self, file: FileId) -> Option<SyntaxNode> {
        self.syntax(file)
    }

    fn semantic_model(&self) -> Option<Arc<SemanticModel>> {
        Some(Project::semantic_model(self))
    }

    fn with_file_text(&self, file: FileId, text: String) -> Option<Project> {
        Project::with_file_text(self, file, text)
    }
}
