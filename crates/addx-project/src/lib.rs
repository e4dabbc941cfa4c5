//! Project snapshots for the registration refactoring.
//!
//! A [`Project`] is an immutable set of C# documents keyed by
//! [`ProjectPath`]. It owns the per-document parse cache and a lazily built
//! [`SemanticModel`] (a syntactic type index).

mod discover;
mod path;
mod project;
mod semantic;

pub use discover::{find_project_root, load_project, LoadError};
pub use path::{folder_prefixes, ProjectPath};
pub use project::{Document, Project};
pub use semantic::{
    containing_type_names, enclosing_namespace, is_namespace_prefix, DeclarationKind,
    SemanticModel, TypeSymbol,
};
