//! A syntactic stand-in for a semantic model.
//!
//! Every type declared in the project is indexed by namespace, containing
//! types, name and arity. Type references are resolved with C#'s lookup order
//! approximated as: enclosing namespaces from innermost to the global
//! namespace, then namespaces imported by `using` directives in scope (plain
//! and `global using`). Types from referenced assemblies are never resolved.

use serde::Serialize;

use addx_core::FileId;
use addx_syntax::{AstNode, SyntaxKind, SyntaxNode, TypeDeclaration, UsingDirective};

use crate::project::Project;

/// Closed set of type declaration kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum DeclarationKind {
    Class,
    Struct,
    Interface,
    Record,
    RecordStruct,
    Enum,
    Delegate,
}

impl DeclarationKind {
    pub fn of(decl: &TypeDeclaration) -> Self {
        match decl {
            TypeDeclaration::ClassDeclaration(_) => Self::Class,
            TypeDeclaration::StructDeclaration(_) => Self::Struct,
            TypeDeclaration::InterfaceDeclaration(_) => Self::Interface,
            TypeDeclaration::RecordDeclaration(_) => Self::Record,
            TypeDeclaration::RecordStructDeclaration(_) => Self::RecordStruct,
            TypeDeclaration::EnumDeclaration(_) => Self::Enum,
            TypeDeclaration::DelegateDeclaration(_) => Self::Delegate,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TypeSymbol {
    pub file: FileId,
    pub name: String,
    pub arity: usize,
    pub kind: DeclarationKind,
    /// Dotted namespace; empty for the global namespace.
    pub namespace: String,
    /// Names of the enclosing types, outermost first.
    pub containing_types: Vec<String>,
}

impl TypeSymbol {
    /// Name relative to the namespace (`Outer.Inner`).
    pub fn nested_name(&self) -> String {
        self.containing_types
            .iter()
            .map(String::as_str)
            .chain(std::iter::once(self.name.as_str()))
            .collect::<Vec<_>>()
            .join(".")
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct ImportedNamespace {
    file: FileId,
    /// Namespace whose body declares the directive; empty at file level.
    scope: String,
    namespace: String,
    global: bool,
}

#[derive(Debug, Default)]
pub struct SemanticModel {
    types: Vec<TypeSymbol>,
    imports: Vec<ImportedNamespace>,
}

impl SemanticModel {
    pub(crate) fn build(project: &Project) -> Self {
        let mut model = SemanticModel::default();
        for file in project.file_ids() {
            let Some(root) = project.syntax(file) else {
                continue;
            };
            for node in root.descendants() {
                if let Some(decl) = TypeDeclaration::cast(node.clone()) {
                    let Some(name) = decl.name() else {
                        continue;
                    };
                    model.types.push(TypeSymbol {
                        file,
                        name,
                        arity: decl.arity(),
                        kind: DeclarationKind::of(&decl),
                        namespace: enclosing_namespace(&node),
                        containing_types: containing_type_names(&node),
                    });
                } else if let Some(using) = UsingDirective::cast(node) {
                    if using.is_static() || using.is_alias() {
                        continue;
                    }
                    let Some(name) = using.name() else {
                        continue;
                    };
                    model.imports.push(ImportedNamespace {
                        file,
                        scope: enclosing_namespace(using.syntax()),
                        namespace: name.text(),
                        global: using.is_global(),
                    });
                }
            }
        }
        tracing::debug!(
            target = "addx.project",
            types = model.types.len(),
            imports = model.imports.len(),
            "built semantic model"
        );
        model
    }

    pub fn types(&self) -> &[TypeSymbol] {
        &self.types
    }

    /// The symbol declared by `decl` in `file`, if indexed.
    pub fn declared_symbol(&self, file: FileId, decl: &TypeDeclaration) -> Option<&TypeSymbol> {
        let name = decl.name()?;
        let namespace = enclosing_namespace(decl.syntax());
        let containing = containing_type_names(decl.syntax());
        self.types.iter().find(|sym| {
            sym.file == file
                && sym.name == name
                && sym.arity == decl.arity()
                && sym.namespace == namespace
                && sym.containing_types == containing
        })
    }

    /// Resolves a type reference as written (`IFoo`, `App.Core.IFoo`,
    /// `global::App.IRepo<T>`) from a declaration inside `namespace` in `file`.
    pub fn resolve_type(&self, file: FileId, namespace: &str, text: &str) -> Option<&TypeSymbol> {
        let reference = TypeReference::parse(text)?;

        if reference.global {
            return self.lookup_qualified("", &reference);
        }

        for scope in namespace_chain(namespace) {
            if let Some(sym) = self.lookup_qualified(&scope, &reference) {
                return Some(sym);
            }
        }

        for import in self.imports_in_scope(file, namespace) {
            if let Some(sym) = self.lookup_qualified(&import.namespace, &reference) {
                return Some(sym);
            }
        }

        None
    }

    fn imports_in_scope<'a>(
        &'a self,
        file: FileId,
        namespace: &'a str,
    ) -> impl Iterator<Item = &'a ImportedNamespace> + 'a {
        let local = self.imports.iter().filter(move |import| {
            import.file == file && !import.global && is_namespace_prefix(&import.scope, namespace)
        });
        let global = self.imports.iter().filter(|import| import.global);
        local.chain(global)
    }

    /// Finds a type named by `reference` when interpreted relative to `base`.
    fn lookup_qualified(&self, base: &str, reference: &TypeReference) -> Option<&TypeSymbol> {
        let (last, qualifier) = reference.segments.split_last()?;
        let mut path: Vec<&str> = base.split('.').filter(|s| !s.is_empty()).collect();
        path.extend(qualifier.iter().map(String::as_str));

        self.types.iter().find(|sym| {
            if sym.name != *last || sym.arity != reference.arity {
                return false;
            }
            let full: Vec<&str> = sym
                .namespace
                .split('.')
                .filter(|s| !s.is_empty())
                .chain(sym.containing_types.iter().map(String::as_str))
                .collect();
            full == path
        })
    }
}

/// A parsed type reference: segments without type arguments, plus the arity
/// of the last segment.
#[derive(Debug, PartialEq, Eq)]
struct TypeReference {
    global: bool,
    segments: Vec<String>,
    arity: usize,
}

impl TypeReference {
    fn parse(text: &str) -> Option<Self> {
        let text: String = text.chars().filter(|c| !c.is_whitespace()).collect();
        let text = text.trim_end_matches('?');
        let (global, text) = match text.split_once("::") {
            Some((alias, rest)) => (alias == "global", rest),
            None => (false, text),
        };

        let mut segments = Vec::new();
        let mut arity = 0;
        let mut depth = 0usize;
        let mut current = String::new();
        for ch in text.chars() {
            match ch {
                '<' => {
                    if depth == 0 {
                        arity = 1;
                    }
                    depth += 1;
                }
                '>' => depth = depth.checked_sub(1)?,
                ',' if depth == 1 => arity += 1,
                '.' if depth == 0 => {
                    segments.push(std::mem::take(&mut current));
                    arity = 0;
                }
                _ if depth == 0 => current.push(ch),
                _ => {}
            }
        }
        segments.push(current);

        if depth != 0 || segments.iter().any(|s| s.is_empty()) {
            return None;
        }
        for seg in &mut segments {
            if let Some(stripped) = seg.strip_prefix('@') {
                *seg = stripped.to_string();
            }
        }
        Some(Self {
            global,
            segments,
            arity,
        })
    }
}

/// Dotted name of the namespaces enclosing `node`, outermost first.
pub fn enclosing_namespace(node: &SyntaxNode) -> String {
    let mut parts: Vec<String> = node
        .ancestors()
        .skip(1)
        .filter(|anc| {
            matches!(
                anc.kind(),
                SyntaxKind::NamespaceDeclaration | SyntaxKind::FileScopedNamespaceDeclaration
            )
        })
        .filter_map(|anc| {
            anc.children()
                .find_map(addx_syntax::Name::cast)
                .map(|name| name.text())
        })
        .collect();
    parts.reverse();
    parts.join(".")
}

/// Names of the type declarations enclosing `node`, outermost first.
pub fn containing_type_names(node: &SyntaxNode) -> Vec<String> {
    let mut names: Vec<String> = node
        .ancestors()
        .skip(1)
        .filter_map(TypeDeclaration::cast)
        .filter_map(|decl| decl.name())
        .collect();
    names.reverse();
    names
}

/// `App.Core.Services` -> `App.Core.Services`, `App.Core`, `App`, ``.
fn namespace_chain(namespace: &str) -> Vec<String> {
    let segments: Vec<&str> = namespace.split('.').filter(|s| !s.is_empty()).collect();
    (0..=segments.len())
        .rev()
        .map(|len| segments[..len].join("."))
        .collect()
}

/// Whether `prefix` names `namespace` or one of its enclosing namespaces.
pub fn is_namespace_prefix(prefix: &str, namespace: &str) -> bool {
    prefix.is_empty()
        || namespace == prefix
        || namespace
            .strip_prefix(prefix)
            .map_or(false, |rest| rest.starts_with('.'))
}
