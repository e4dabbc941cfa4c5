use addx_project::{enclosing_namespace, DeclarationKind};
use addx_syntax::{
    AstNode, SimpleBaseType, SyntaxKind, SyntaxNode, SyntaxToken, TextRange, TextSize,
    TypeDeclaration,
};
use rowan::TokenAtOffset;

/// A base type as written in a declaration's base list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BaseTypeRef {
    /// Source text without trivia (`IRepository<Foo>`).
    pub text: String,
    pub range: TextRange,
}

/// The declaration selected for registration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeToRegister {
    pub name: String,
    /// Name as referenced from its namespace (`Outer.Inner` for nested types).
    pub qualified_name: String,
    pub arity: usize,
    pub kind: DeclarationKind,
    pub is_static: bool,
    /// Base list entries in declaration order; the first one is primary.
    pub base_types: Vec<BaseTypeRef>,
    /// Dotted enclosing namespace, empty for the global namespace.
    pub namespace: String,
    pub declaration: TypeDeclaration,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TriggerContext {
    pub ty: TypeToRegister,
    /// Set only when the cursor sits on one of the base list entries.
    pub selected_base: Option<BaseTypeRef>,
}

/// Determines which class or record declaration the cursor at `offset`
/// selects.
///
/// Returns `None` for cursors inside members, on namespaces or usings, and
/// for structs, interfaces, enums, delegates, generic and static types.
pub fn resolve_trigger(root: &SyntaxNode, offset: TextSize) -> Option<TriggerContext> {
    let token = token_at(root, offset)?;

    let mut selected_base = None;
    let mut declaration = None;
    for node in token.parent_ancestors() {
        let kind = node.kind();
        if kind == SyntaxKind::SimpleBaseType {
            if selected_base.is_none() {
                selected_base = SimpleBaseType::cast(node).and_then(|base| base_type_ref(&base));
            }
        } else if kind.is_member_declaration() {
            return None;
        } else if kind.is_type_declaration() {
            declaration = TypeDeclaration::cast(node);
            break;
        } else if matches!(
            kind,
            SyntaxKind::NamespaceDeclaration
                | SyntaxKind::FileScopedNamespaceDeclaration
                | SyntaxKind::UsingDirective
                | SyntaxKind::CompilationUnit
        ) {
            return None;
        }
    }

    let declaration = declaration?;
    let ty = type_to_register(declaration)?;

    match ty.kind {
        DeclarationKind::Class | DeclarationKind::Record => {}
        DeclarationKind::Struct
        | DeclarationKind::RecordStruct
        | DeclarationKind::Interface
        | DeclarationKind::Enum
        | DeclarationKind::Delegate => {
            tracing::trace!(target = "addx.refactor", kind = ?ty.kind, "declaration kind is not registrable");
            return None;
        }
    }
    if ty.arity > 0 || ty.is_static {
        tracing::trace!(
            target = "addx.refactor",
            name = %ty.name,
            arity = ty.arity,
            is_static = ty.is_static,
            "declaration is generic or static"
        );
        return None;
    }

    Some(TriggerContext { ty, selected_base })
}

fn type_to_register(declaration: TypeDeclaration) -> Option<TypeToRegister> {
    let name = declaration.name()?;

    let mut containing = Vec::new();
    for outer in declaration
        .syntax()
        .ancestors()
        .skip(1)
        .filter_map(TypeDeclaration::cast)
    {
        // `Outer<T>.Inner` cannot be named without type arguments.
        if outer.arity() > 0 {
            return None;
        }
        containing.push(outer.name()?);
    }
    containing.reverse();
    containing.push(name.clone());

    let base_types = declaration
        .base_list()
        .map(|list| list.types().filter_map(|base| base_type_ref(&base)).collect())
        .unwrap_or_default();

    Some(TypeToRegister {
        name,
        qualified_name: containing.join("."),
        arity: declaration.arity(),
        kind: DeclarationKind::of(&declaration),
        is_static: declaration.has_modifier(SyntaxKind::StaticKw),
        base_types,
        namespace: enclosing_namespace(declaration.syntax()),
        declaration,
    })
}

fn base_type_ref(base: &SimpleBaseType) -> Option<BaseTypeRef> {
    let ty = base.ty()?;
    let text = ty.text();
    if text.is_empty() {
        return None;
    }
    Some(BaseTypeRef {
        text,
        range: ty.syntax().text_range(),
    })
}

/// Picks the token the cursor refers to.
///
/// Between two tokens the right one wins unless it is trivia. On trivia, the
/// previous token is used while the cursor is still on its line, the next
/// token otherwise.
fn token_at(root: &SyntaxNode, offset: TextSize) -> Option<SyntaxToken> {
    if offset > root.text_range().end() {
        return None;
    }
    let token = match root.token_at_offset(offset) {
        TokenAtOffset::None => return None,
        TokenAtOffset::Single(token) => token,
        TokenAtOffset::Between(left, right) => {
            if right.kind().is_trivia() {
                left
            } else {
                right
            }
        }
    };
    if !token.kind().is_trivia() {
        return Some(token);
    }

    let previous = std::iter::successors(token.prev_token(), |t| t.prev_token())
        .find(|t| !t.kind().is_trivia());
    if let Some(previous) = previous {
        let gap = TextRange::new(previous.text_range().end(), offset);
        if !root.text().slice(gap).contains_char('\n') {
            return Some(previous);
        }
    }
    std::iter::successors(token.next_token(), |t| t.next_token()).find(|t| !t.kind().is_trivia())
}
