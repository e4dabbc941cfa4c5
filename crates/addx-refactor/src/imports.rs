use addx_core::TextEdit;
use addx_project::{enclosing_namespace, is_namespace_prefix};
use addx_syntax::{
    AnyNamespaceDeclaration, AstNode, CompilationUnit, SyntaxKind, SyntaxNode, TextSize,
    UsingDirective,
};

/// Namespaces a registration needs in scope, in first-seen order.
///
/// Names are compared with whitespace and a leading `global::` removed, so
/// `global::App.Core` and `App . Core` are the same entry.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequiredImports {
    namespaces: Vec<String>,
}

impl RequiredImports {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `namespace` unless an equivalent one is already present.
    /// The global namespace is never recorded.
    pub fn push(&mut self, namespace: &str) -> bool {
        let normalized = normalize_namespace(namespace);
        if normalized.is_empty() || self.namespaces.contains(&normalized) {
            return false;
        }
        self.namespaces.push(normalized);
        true
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> + '_ {
        self.namespaces.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.namespaces.len()
    }

    pub fn is_empty(&self) -> bool {
        self.namespaces.is_empty()
    }
}

impl<'a> FromIterator<&'a str> for RequiredImports {
    fn from_iter<I: IntoIterator<Item = &'a str>>(iter: I) -> Self {
        let mut imports = RequiredImports::new();
        for namespace in iter {
            imports.push(namespace);
        }
        imports
    }
}

fn normalize_namespace(name: &str) -> String {
    let compact: String = name.chars().filter(|c| !c.is_whitespace()).collect();
    match compact.strip_prefix("global::") {
        Some(rest) => rest.to_string(),
        None => compact,
    }
}

/// Edits adding the `using` directives from `required` that are missing for
/// code at `anchor`.
///
/// Namespaces already imported at file level or by an enclosing namespace
/// body, and namespaces enclosing `anchor`, are skipped. New directives go
/// after the last file-level `using`; existing directives are left untouched.
pub fn reconcile_imports(
    root: &SyntaxNode,
    anchor: &SyntaxNode,
    required: &RequiredImports,
) -> Vec<TextEdit> {
    let Some(unit) = CompilationUnit::cast(root.clone()) else {
        return Vec::new();
    };
    let target_namespace = enclosing_namespace(anchor);

    let file_usings: Vec<UsingDirective> = unit.usings().collect();
    let scoped_usings = anchor
        .ancestors()
        .filter_map(AnyNamespaceDeclaration::cast)
        .flat_map(|namespace| namespace.usings());
    let imported: Vec<String> = file_usings
        .iter()
        .cloned()
        .chain(scoped_usings)
        .filter(|using| !using.is_static() && !using.is_alias())
        .filter_map(|using| using.name())
        .map(|name| normalize_namespace(&name.text()))
        .collect();

    let missing: Vec<&str> = required
        .iter()
        .filter(|namespace| !is_namespace_prefix(namespace, &target_namespace))
        .filter(|namespace| !imported.iter().any(|existing| existing.as_str() == *namespace))
        .collect();
    if missing.is_empty() {
        return Vec::new();
    }
    tracing::debug!(
        target = "addx.refactor",
        namespaces = ?missing,
        "adding using directives"
    );

    let text = root.text().to_string();
    let newline = if text.contains("\r\n") { "\r\n" } else { "\n" };

    let after_directive = file_usings.last().map(|using| using.syntax().clone()).or_else(|| {
        root.children()
            .filter(|child| child.kind() == SyntaxKind::ExternAliasDirective)
            .last()
    });
    if let Some(directive) = after_directive {
        let end = directive.text_range().end();
        let indent = line_indent(&text, directive.text_range().start());
        let inserted: String = missing
            .iter()
            .map(|namespace| format!("{newline}{indent}using {namespace};"))
            .collect();
        return vec![TextEdit::insert(end, inserted)];
    }

    let mut inserted: String = missing
        .iter()
        .map(|namespace| format!("using {namespace};{newline}"))
        .collect();
    match root.first_child() {
        Some(first) => {
            inserted.push_str(newline);
            vec![TextEdit::insert(first.text_range().start(), inserted)]
        }
        None => vec![TextEdit::insert(TextSize::from(0), inserted)],
    }
}

fn line_indent(text: &str, offset: TextSize) -> &str {
    let offset = usize::from(offset);
    let line_start = text[..offset].rfind('\n').map_or(0, |idx| idx + 1);
    let line = &text[line_start..offset];
    let len = line.len() - line.trim_start().len();
    &line[..len]
}
