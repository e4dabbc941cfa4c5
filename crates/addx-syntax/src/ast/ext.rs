use crate::ast::{
    support, AnyNamespaceDeclaration, AstNode, Attribute, BaseList, ClassDeclaration,
    DelegateDeclaration, EnumDeclaration, InterfaceDeclaration, Modifiers, Name, NamedType,
    ParameterList, RecordDeclaration, RecordStructDeclaration, StructDeclaration, Type, TypeBody,
    TypeDeclaration, TypeParameterList, UsingDirective,
};
use crate::parser::{SyntaxNode, SyntaxToken};
use crate::syntax_kind::SyntaxKind;

/// The identifier following the declaration keyword(s) of a type declaration.
fn declared_name(node: &SyntaxNode) -> Option<SyntaxToken> {
    let mut tokens = node
        .children_with_tokens()
        .filter_map(|it| it.into_token())
        .skip_while(|tok| !is_declaration_keyword(tok.kind()));
    // Skip the keyword run (`record struct`, `record class`, ...).
    tokens
        .by_ref()
        .find(|tok| !is_declaration_keyword(tok.kind()) && !tok.kind().is_trivia())
        .filter(|tok| tok.kind().is_identifier_like())
}

fn is_declaration_keyword(kind: SyntaxKind) -> bool {
    matches!(
        kind,
        SyntaxKind::ClassKw
            | SyntaxKind::StructKw
            | SyntaxKind::InterfaceKw
            | SyntaxKind::RecordKw
            | SyntaxKind::EnumKw
            | SyntaxKind::DelegateKw
    )
}

/// Segments of a dotted name, skipping any `alias::` qualifier.
fn dotted_segments(node: &SyntaxNode) -> Vec<String> {
    let tokens: Vec<SyntaxToken> = node
        .children_with_tokens()
        .filter_map(|it| it.into_token())
        .filter(|tok| !tok.kind().is_trivia())
        .collect();
    let start = tokens
        .iter()
        .position(|tok| tok.kind() == SyntaxKind::ColonColon)
        .map_or(0, |idx| idx + 1);
    tokens[start..]
        .iter()
        .filter(|tok| tok.kind().is_identifier_like())
        .map(|tok| tok.text().trim_start_matches('@').to_string())
        .collect()
}

macro_rules! type_declaration_accessors {
    ($($name:ident),* $(,)?) => {
        $(
            impl $name {
                pub fn modifiers(&self) -> Option<Modifiers> {
                    support::child::<Modifiers>(self.syntax())
                }

                pub fn name_token(&self) -> Option<SyntaxToken> {
                    declared_name(self.syntax())
                }

                pub fn type_parameter_list(&self) -> Option<TypeParameterList> {
                    support::child::<TypeParameterList>(self.syntax())
                }

                pub fn base_list(&self) -> Option<BaseList> {
                    support::child::<BaseList>(self.syntax())
                }
            }
        )*
    };
}

type_declaration_accessors!(
    ClassDeclaration,
    StructDeclaration,
    InterfaceDeclaration,
    RecordDeclaration,
    RecordStructDeclaration,
    EnumDeclaration,
    DelegateDeclaration,
);

impl ClassDeclaration {
    pub fn body(&self) -> Option<TypeBody> {
        support::child::<TypeBody>(self.syntax())
    }
}

impl RecordDeclaration {
    pub fn body(&self) -> Option<TypeBody> {
        support::child::<TypeBody>(self.syntax())
    }

    /// Primary constructor parameters (`record Point(int X, int Y)`).
    pub fn parameter_list(&self) -> Option<ParameterList> {
        support::child::<ParameterList>(self.syntax())
    }
}

impl TypeDeclaration {
    pub fn modifiers(&self) -> Option<Modifiers> {
        support::child::<Modifiers>(self.syntax())
    }

    pub fn name_token(&self) -> Option<SyntaxToken> {
        declared_name(self.syntax())
    }

    pub fn name(&self) -> Option<String> {
        self.name_token()
            .map(|tok| tok.text().trim_start_matches('@').to_string())
    }

    pub fn type_parameter_list(&self) -> Option<TypeParameterList> {
        support::child::<TypeParameterList>(self.syntax())
    }

    /// Number of declared type parameters; `0` for non-generic types.
    pub fn arity(&self) -> usize {
        self.type_parameter_list()
            .map_or(0, |list| list.type_parameters().count())
    }

    pub fn base_list(&self) -> Option<BaseList> {
        support::child::<BaseList>(self.syntax())
    }

    pub fn body(&self) -> Option<TypeBody> {
        support::child::<TypeBody>(self.syntax())
    }

    /// Whether this declaration is a reference type (`class` / `record`).
    pub fn is_class_like(&self) -> bool {
        matches!(self, Self::ClassDeclaration(_) | Self::RecordDeclaration(_))
    }

    pub fn has_modifier(&self, kind: SyntaxKind) -> bool {
        self.modifiers().map_or(false, |m| m.has(kind))
    }
}

impl AnyNamespaceDeclaration {
    pub fn name(&self) -> Option<Name> {
        match self {
            Self::NamespaceDeclaration(it) => it.name(),
            Self::FileScopedNamespaceDeclaration(it) => it.name(),
        }
    }

    pub fn usings(&self) -> Vec<UsingDirective> {
        match self {
            Self::NamespaceDeclaration(it) => it.usings().collect(),
            Self::FileScopedNamespaceDeclaration(it) => it.usings().collect(),
        }
    }

    pub fn type_declarations(&self) -> Vec<TypeDeclaration> {
        match self {
            Self::NamespaceDeclaration(it) => it.type_declarations().collect(),
            Self::FileScopedNamespaceDeclaration(it) => it.type_declarations().collect(),
        }
    }
}

impl Modifiers {
    pub fn has(&self, kind: SyntaxKind) -> bool {
        support::token(self.syntax(), kind).is_some()
    }

    pub fn attributes(&self) -> impl Iterator<Item = Attribute> + '_ {
        self.attribute_lists()
            .flat_map(|list| list.attributes().collect::<Vec<_>>())
    }
}

impl Name {
    pub fn segments(&self) -> Vec<String> {
        dotted_segments(self.syntax())
    }

    /// Dotted text without trivia or alias qualifier (`System.Text`).
    pub fn text(&self) -> String {
        self.segments().join(".")
    }
}

impl NamedType {
    /// Identifier segments of the type name, ignoring type arguments.
    pub fn segments(&self) -> Vec<String> {
        dotted_segments(self.syntax())
    }

    pub fn last_segment(&self) -> Option<String> {
        self.segments().pop()
    }

    pub fn is_generic(&self) -> bool {
        self.type_argument_lists().next().is_some()
    }
}

impl Type {
    /// Source text of the type with trivia stripped (`IRepository<Foo>`).
    pub fn text(&self) -> String {
        support::text_without_trivia(self.syntax())
    }
}
