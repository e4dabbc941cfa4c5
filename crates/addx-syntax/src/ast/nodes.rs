//! Typed wrappers over the untyped rowan tree.

use crate::ast::{support, AstNode};
use crate::parser::{SyntaxNode, SyntaxToken};
use crate::syntax_kind::SyntaxKind;

ast_node!(
    CompilationUnit,
    UsingDirective,
    Name,
    NamespaceDeclaration,
    FileScopedNamespaceDeclaration,
    GlobalStatement,
    ClassDeclaration,
    StructDeclaration,
    InterfaceDeclaration,
    RecordDeclaration,
    RecordStructDeclaration,
    EnumDeclaration,
    DelegateDeclaration,
    Modifiers,
    AttributeList,
    Attribute,
    TypeParameterList,
    TypeParameter,
    BaseList,
    SimpleBaseType,
    TypeBody,
    MethodDeclaration,
    ConstructorDeclaration,
    PropertyDeclaration,
    FieldDeclaration,
    OtherMemberDeclaration,
    EmptyDeclaration,
    ParameterList,
    Parameter,
    ArrowExpressionClause,
    VariableDeclarator,
    Type,
    NamedType,
    TypeArgumentList,
    Block,
    ReturnStatement,
    ExpressionStatement,
    EmptyStatement,
    OtherStatement,
    IdentifierName,
    GenericName,
    MemberAccessExpression,
    InvocationExpression,
    ArgumentList,
    ElementAccessExpression,
    ThisExpression,
    BaseExpression,
    LiteralExpression,
    ParenthesizedExpression,
    ObjectCreationExpression,
    PostfixExpression,
    OtherExpression,
);

ast_enum!(
    /// Declarations that introduce a named type.
    TypeDeclaration {
        ClassDeclaration,
        StructDeclaration,
        InterfaceDeclaration,
        RecordDeclaration,
        RecordStructDeclaration,
        EnumDeclaration,
        DelegateDeclaration,
    }
);

ast_enum!(
    /// Anything that may appear directly inside a type body.
    MemberDeclaration {
        MethodDeclaration,
        ConstructorDeclaration,
        PropertyDeclaration,
        FieldDeclaration,
        OtherMemberDeclaration,
        EmptyDeclaration,
        ClassDeclaration,
        StructDeclaration,
        InterfaceDeclaration,
        RecordDeclaration,
        RecordStructDeclaration,
        EnumDeclaration,
        DelegateDeclaration,
    }
);

ast_enum!(
    /// Namespace declarations of either form.
    AnyNamespaceDeclaration {
        NamespaceDeclaration,
        FileScopedNamespaceDeclaration,
    }
);

ast_enum!(
    Statement {
        Block,
        ReturnStatement,
        ExpressionStatement,
        EmptyStatement,
        OtherStatement,
    }
);

ast_enum!(
    Expression {
        IdentifierName,
        GenericName,
        MemberAccessExpression,
        InvocationExpression,
        ElementAccessExpression,
        ThisExpression,
        BaseExpression,
        LiteralExpression,
        ParenthesizedExpression,
        ObjectCreationExpression,
        PostfixExpression,
        OtherExpression,
    }
);

impl CompilationUnit {
    pub fn usings(&self) -> impl Iterator<Item = UsingDirective> + '_ {
        support::children::<UsingDirective>(&self.syntax)
    }

    pub fn namespaces(&self) -> impl Iterator<Item = AnyNamespaceDeclaration> + '_ {
        support::children::<AnyNamespaceDeclaration>(&self.syntax)
    }

    pub fn type_declarations(&self) -> impl Iterator<Item = TypeDeclaration> + '_ {
        support::children::<TypeDeclaration>(&self.syntax)
    }
}

impl UsingDirective {
    pub fn name(&self) -> Option<Name> {
        support::child::<Name>(&self.syntax)
    }

    /// Target of an alias directive (`using Alias = Target;`).
    pub fn alias_target(&self) -> Option<Type> {
        support::child::<Type>(&self.syntax)
    }

    pub fn is_static(&self) -> bool {
        support::token(&self.syntax, SyntaxKind::StaticKw).is_some()
    }

    pub fn is_global(&self) -> bool {
        support::token(&self.syntax, SyntaxKind::GlobalKw).is_some()
    }

    pub fn is_alias(&self) -> bool {
        support::token(&self.syntax, SyntaxKind::Eq).is_some()
    }

    pub fn semicolon_token(&self) -> Option<SyntaxToken> {
        support::token(&self.syntax, SyntaxKind::Semicolon)
    }
}

impl NamespaceDeclaration {
    pub fn name(&self) -> Option<Name> {
        support::child::<Name>(&self.syntax)
    }

    pub fn usings(&self) -> impl Iterator<Item = UsingDirective> + '_ {
        support::children::<UsingDirective>(&self.syntax)
    }

    pub fn namespaces(&self) -> impl Iterator<Item = AnyNamespaceDeclaration> + '_ {
        support::children::<AnyNamespaceDeclaration>(&self.syntax)
    }

    pub fn type_declarations(&self) -> impl Iterator<Item = TypeDeclaration> + '_ {
        support::children::<TypeDeclaration>(&self.syntax)
    }
}

impl FileScopedNamespaceDeclaration {
    pub fn name(&self) -> Option<Name> {
        support::child::<Name>(&self.syntax)
    }

    pub fn usings(&self) -> impl Iterator<Item = UsingDirective> + '_ {
        support::children::<UsingDirective>(&self.syntax)
    }

    pub fn type_declarations(&self) -> impl Iterator<Item = TypeDeclaration> + '_ {
        support::children::<TypeDeclaration>(&self.syntax)
    }
}

impl Modifiers {
    pub fn attribute_lists(&self) -> impl Iterator<Item = AttributeList> + '_ {
        support::children::<AttributeList>(&self.syntax)
    }
}

impl AttributeList {
    pub fn attributes(&self) -> impl Iterator<Item = Attribute> + '_ {
        support::children::<Attribute>(&self.syntax)
    }
}

impl Attribute {
    pub fn name(&self) -> Option<Name> {
        support::child::<Name>(&self.syntax)
    }
}

impl TypeParameterList {
    pub fn type_parameters(&self) -> impl Iterator<Item = TypeParameter> + '_ {
        support::children::<TypeParameter>(&self.syntax)
    }
}

impl BaseList {
    pub fn types(&self) -> impl Iterator<Item = SimpleBaseType> + '_ {
        support::children::<SimpleBaseType>(&self.syntax)
    }
}

impl SimpleBaseType {
    pub fn ty(&self) -> Option<Type> {
        support::child::<Type>(&self.syntax)
    }
}

impl TypeBody {
    pub fn members(&self) -> impl Iterator<Item = MemberDeclaration> + '_ {
        support::children::<MemberDeclaration>(&self.syntax)
    }

    pub fn l_brace_token(&self) -> Option<SyntaxToken> {
        support::token(&self.syntax, SyntaxKind::LBrace)
    }

    pub fn r_brace_token(&self) -> Option<SyntaxToken> {
        support::token(&self.syntax, SyntaxKind::RBrace)
    }
}

impl MethodDeclaration {
    pub fn modifiers(&self) -> Option<Modifiers> {
        support::child::<Modifiers>(&self.syntax)
    }

    pub fn return_type(&self) -> Option<Type> {
        support::child::<Type>(&self.syntax)
    }

    pub fn name_token(&self) -> Option<SyntaxToken> {
        support::ident_token(&self.syntax)
    }

    pub fn type_parameter_list(&self) -> Option<TypeParameterList> {
        support::child::<TypeParameterList>(&self.syntax)
    }

    pub fn parameter_list(&self) -> Option<ParameterList> {
        support::child::<ParameterList>(&self.syntax)
    }

    pub fn body(&self) -> Option<Block> {
        support::child::<Block>(&self.syntax)
    }

    pub fn expression_body(&self) -> Option<ArrowExpressionClause> {
        support::child::<ArrowExpressionClause>(&self.syntax)
    }
}

impl ConstructorDeclaration {
    pub fn modifiers(&self) -> Option<Modifiers> {
        support::child::<Modifiers>(&self.syntax)
    }

    pub fn name_token(&self) -> Option<SyntaxToken> {
        support::ident_token(&self.syntax)
    }

    pub fn parameter_list(&self) -> Option<ParameterList> {
        support::child::<ParameterList>(&self.syntax)
    }

    pub fn body(&self) -> Option<Block> {
        support::child::<Block>(&self.syntax)
    }
}

impl PropertyDeclaration {
    pub fn modifiers(&self) -> Option<Modifiers> {
        support::child::<Modifiers>(&self.syntax)
    }

    pub fn ty(&self) -> Option<Type> {
        support::child::<Type>(&self.syntax)
    }

    pub fn name_token(&self) -> Option<SyntaxToken> {
        support::ident_token(&self.syntax)
    }
}

impl FieldDeclaration {
    pub fn modifiers(&self) -> Option<Modifiers> {
        support::child::<Modifiers>(&self.syntax)
    }

    pub fn ty(&self) -> Option<Type> {
        support::child::<Type>(&self.syntax)
    }

    pub fn declarators(&self) -> impl Iterator<Item = VariableDeclarator> + '_ {
        support::children::<VariableDeclarator>(&self.syntax)
    }
}

impl VariableDeclarator {
    pub fn name_token(&self) -> Option<SyntaxToken> {
        support::ident_token(&self.syntax)
    }
}

impl ParameterList {
    pub fn parameters(&self) -> impl Iterator<Item = Parameter> + '_ {
        support::children::<Parameter>(&self.syntax)
    }
}

impl Parameter {
    pub fn modifiers(&self) -> Option<Modifiers> {
        support::child::<Modifiers>(&self.syntax)
    }

    pub fn ty(&self) -> Option<Type> {
        support::child::<Type>(&self.syntax)
    }

    pub fn name_token(&self) -> Option<SyntaxToken> {
        support::ident_token(&self.syntax)
    }
}

impl ArrowExpressionClause {
    pub fn expression(&self) -> Option<Expression> {
        support::child::<Expression>(&self.syntax)
    }
}

impl Type {
    pub fn named_type(&self) -> Option<NamedType> {
        support::child::<NamedType>(&self.syntax)
    }

    pub fn is_void(&self) -> bool {
        support::token(&self.syntax, SyntaxKind::VoidKw).is_some()
    }

    pub fn is_nullable(&self) -> bool {
        support::token(&self.syntax, SyntaxKind::Question).is_some()
    }

    pub fn is_array(&self) -> bool {
        support::token(&self.syntax, SyntaxKind::LBracket).is_some()
    }
}

impl NamedType {
    pub fn type_argument_lists(&self) -> impl Iterator<Item = TypeArgumentList> + '_ {
        support::children::<TypeArgumentList>(&self.syntax)
    }
}

impl TypeArgumentList {
    pub fn types(&self) -> impl Iterator<Item = Type> + '_ {
        support::children::<Type>(&self.syntax)
    }
}

impl Block {
    pub fn statements(&self) -> impl Iterator<Item = Statement> + '_ {
        support::children::<Statement>(&self.syntax)
    }

    pub fn l_brace_token(&self) -> Option<SyntaxToken> {
        support::token(&self.syntax, SyntaxKind::LBrace)
    }

    pub fn r_brace_token(&self) -> Option<SyntaxToken> {
        support::token(&self.syntax, SyntaxKind::RBrace)
    }
}

impl ReturnStatement {
    pub fn expression(&self) -> Option<Expression> {
        support::child::<Expression>(&self.syntax)
    }
}

impl ExpressionStatement {
    pub fn expression(&self) -> Option<Expression> {
        support::child::<Expression>(&self.syntax)
    }
}

impl IdentifierName {
    pub fn ident_token(&self) -> Option<SyntaxToken> {
        // `alias::Name` keeps the alias in the same node; the name is last.
        self.syntax
            .children_with_tokens()
            .filter_map(|it| it.into_token())
            .filter(|tok| tok.kind().is_identifier_like())
            .last()
    }
}

impl GenericName {
    pub fn ident_token(&self) -> Option<SyntaxToken> {
        support::ident_token(&self.syntax)
    }

    pub fn type_argument_list(&self) -> Option<TypeArgumentList> {
        support::child::<TypeArgumentList>(&self.syntax)
    }
}

impl MemberAccessExpression {
    /// The receiver, i.e. the expression left of the `.`.
    pub fn expression(&self) -> Option<Expression> {
        support::child::<Expression>(&self.syntax)
    }

    /// The accessed member name (an `IdentifierName` or `GenericName`).
    pub fn name(&self) -> Option<Expression> {
        support::children::<Expression>(&self.syntax).nth(1)
    }

    pub fn operator_token(&self) -> Option<SyntaxToken> {
        self.syntax
            .children_with_tokens()
            .filter_map(|it| it.into_token())
            .find(|tok| matches!(tok.kind(), SyntaxKind::Dot | SyntaxKind::QuestionDot))
    }
}

impl InvocationExpression {
    /// The invoked expression (callee).
    pub fn expression(&self) -> Option<Expression> {
        support::child::<Expression>(&self.syntax)
    }

    pub fn argument_list(&self) -> Option<ArgumentList> {
        support::child::<ArgumentList>(&self.syntax)
    }
}

impl GlobalStatement {
    pub fn statement(&self) -> Option<Statement> {
        support::child::<Statement>(&self.syntax)
    }
}
