use rowan::Language;

/// Unified syntax kind for both tokens and nodes of the C# subset tree.
///
/// Reserved words that carry no structure in this grammar (`typeof`, `sizeof`,
/// predefined type names such as `int` or `string`, ...) are lexed as plain
/// identifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(u16)]
pub enum SyntaxKind {
    // --- Trivia ---
    Whitespace,
    LineComment,
    DocComment,
    BlockComment,
    /// `#if`, `#region`, `#nullable`, ... directives, up to the end of the line.
    PreprocessorDirective,

    // --- Identifiers & literals ---
    Identifier,
    NumericLiteral,
    CharLiteral,
    /// Regular, verbatim, interpolated and raw string literals.
    StringLiteral,

    // --- Keywords (reserved) ---
    AbstractKw,
    AsKw,
    BaseKw,
    BreakKw,
    CaseKw,
    CatchKw,
    CheckedKw,
    ClassKw,
    ConstKw,
    ContinueKw,
    DefaultKw,
    DelegateKw,
    DoKw,
    ElseKw,
    EnumKw,
    EventKw,
    ExplicitKw,
    ExternKw,
    FalseKw,
    FinallyKw,
    FixedKw,
    ForKw,
    ForeachKw,
    GotoKw,
    IfKw,
    ImplicitKw,
    InKw,
    InterfaceKw,
    InternalKw,
    IsKw,
    LockKw,
    NamespaceKw,
    NewKw,
    NullKw,
    OperatorKw,
    OutKw,
    OverrideKw,
    ParamsKw,
    PrivateKw,
    ProtectedKw,
    PublicKw,
    ReadonlyKw,
    RefKw,
    ReturnKw,
    SealedKw,
    StaticKw,
    StructKw,
    SwitchKw,
    ThisKw,
    ThrowKw,
    TrueKw,
    TryKw,
    UncheckedKw,
    UnsafeKw,
    UsingKw,
    VirtualKw,
    VoidKw,
    VolatileKw,
    WhileKw,

    // --- Contextual keywords ---
    AsyncKw,
    AwaitKw,
    FileKw,
    GlobalKw,
    PartialKw,
    RecordKw,
    RequiredKw,
    VarKw,
    WhereKw,
    YieldKw,

    // --- Punctuation ---
    LBrace,
    RBrace,
    LParen,
    RParen,
    LBracket,
    RBracket,
    Semicolon,
    Comma,
    Dot,
    Colon,
    ColonColon,
    Question,
    QuestionDot,
    Less,
    Greater,
    Eq,
    FatArrow,
    Bang,
    Tilde,
    /// Any other operator (`==`, `+=`, `??`, `<<`, `&&`, ...).
    Operator,

    Error,
    Eof,

    // --- Nodes ---
    CompilationUnit,
    ExternAliasDirective,
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
    AttributeArgumentList,
    TypeParameterList,
    TypeParameter,
    TypeConstraintClause,
    BaseList,
    SimpleBaseType,
    TypeBody,
    EnumBody,

    MethodDeclaration,
    ConstructorDeclaration,
    PropertyDeclaration,
    FieldDeclaration,
    OtherMemberDeclaration,
    EmptyDeclaration,
    ParameterList,
    Parameter,
    EqualsValueClause,
    AccessorList,
    ArrowExpressionClause,
    VariableDeclarator,
    ConstructorInitializer,

    Type,
    NamedType,
    TupleType,
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
    Argument,
    ElementAccessExpression,
    ThisExpression,
    BaseExpression,
    LiteralExpression,
    ParenthesizedExpression,
    ObjectCreationExpression,
    PostfixExpression,
    OtherExpression,

    __Last,
}

impl SyntaxKind {
    pub fn is_trivia(self) -> bool {
        matches!(
            self,
            SyntaxKind::Whitespace
                | SyntaxKind::LineComment
                | SyntaxKind::DocComment
                | SyntaxKind::BlockComment
                | SyntaxKind::PreprocessorDirective
        )
    }

    pub fn is_contextual_keyword(self) -> bool {
        matches!(
            self,
            SyntaxKind::AsyncKw
                | SyntaxKind::AwaitKw
                | SyntaxKind::FileKw
                | SyntaxKind::GlobalKw
                | SyntaxKind::PartialKw
                | SyntaxKind::RecordKw
                | SyntaxKind::RequiredKw
                | SyntaxKind::VarKw
                | SyntaxKind::WhereKw
                | SyntaxKind::YieldKw
        )
    }

    pub fn is_identifier_like(self) -> bool {
        self == SyntaxKind::Identifier || self.is_contextual_keyword()
    }

    pub fn is_literal(self) -> bool {
        matches!(
            self,
            SyntaxKind::NumericLiteral
                | SyntaxKind::CharLiteral
                | SyntaxKind::StringLiteral
                | SyntaxKind::TrueKw
                | SyntaxKind::FalseKw
                | SyntaxKind::NullKw
                | SyntaxKind::DefaultKw
        )
    }

    /// Keywords that may appear in a declaration's modifier list.
    pub fn is_modifier_keyword(self) -> bool {
        matches!(
            self,
            SyntaxKind::PublicKw
                | SyntaxKind::PrivateKw
                | SyntaxKind::ProtectedKw
                | SyntaxKind::InternalKw
                | SyntaxKind::StaticKw
                | SyntaxKind::AbstractKw
                | SyntaxKind::SealedKw
                | SyntaxKind::VirtualKw
                | SyntaxKind::OverrideKw
                | SyntaxKind::ReadonlyKw
                | SyntaxKind::ExternKw
                | SyntaxKind::UnsafeKw
                | SyntaxKind::NewKw
                | SyntaxKind::ConstKw
                | SyntaxKind::VolatileKw
                | SyntaxKind::FixedKw
                | SyntaxKind::RefKw
        )
    }

    /// Contextual keywords that act as modifiers when followed by more of a
    /// declaration (`partial class`, `async Task`, `required string`).
    pub fn is_contextual_modifier(self) -> bool {
        matches!(
            self,
            SyntaxKind::PartialKw | SyntaxKind::AsyncKw | SyntaxKind::RequiredKw | SyntaxKind::FileKw
        )
    }

    pub fn is_type_declaration(self) -> bool {
        matches!(
            self,
            SyntaxKind::ClassDeclaration
                | SyntaxKind::StructDeclaration
                | SyntaxKind::InterfaceDeclaration
                | SyntaxKind::RecordDeclaration
                | SyntaxKind::RecordStructDeclaration
                | SyntaxKind::EnumDeclaration
                | SyntaxKind::DelegateDeclaration
        )
    }

    /// Non-type members of a type body.
    pub fn is_member_declaration(self) -> bool {
        matches!(
            self,
            SyntaxKind::MethodDeclaration
                | SyntaxKind::ConstructorDeclaration
                | SyntaxKind::PropertyDeclaration
                | SyntaxKind::FieldDeclaration
                | SyntaxKind::OtherMemberDeclaration
                | SyntaxKind::EmptyDeclaration
        )
    }

    pub fn from_keyword(text: &str) -> Option<SyntaxKind> {
        Some(match text {
            "abstract" => SyntaxKind::AbstractKw,
            "as" => SyntaxKind::AsKw,
            "base" => SyntaxKind::BaseKw,
            "break" => SyntaxKind::BreakKw,
            "case" => SyntaxKind::CaseKw,
            "catch" => SyntaxKind::CatchKw,
            "checked" => SyntaxKind::CheckedKw,
            "class" => SyntaxKind::ClassKw,
            "const" => SyntaxKind::ConstKw,
            "continue" => SyntaxKind::ContinueKw,
            "default" => SyntaxKind::DefaultKw,
            "delegate" => SyntaxKind::DelegateKw,
            "do" => SyntaxKind::DoKw,
            "else" => SyntaxKind::ElseKw,
            "enum" => SyntaxKind::EnumKw,
            "event" => SyntaxKind::EventKw,
            "explicit" => SyntaxKind::ExplicitKw,
            "extern" => SyntaxKind::ExternKw,
            "false" => SyntaxKind::FalseKw,
            "finally" => SyntaxKind::FinallyKw,
            "fixed" => SyntaxKind::FixedKw,
            "for" => SyntaxKind::ForKw,
            "foreach" => SyntaxKind::ForeachKw,
            "goto" => SyntaxKind::GotoKw,
            "if" => SyntaxKind::IfKw,
            "implicit" => SyntaxKind::ImplicitKw,
            "in" => SyntaxKind::InKw,
            "interface" => SyntaxKind::InterfaceKw,
            "internal" => SyntaxKind::InternalKw,
            "is" => SyntaxKind::IsKw,
            "lock" => SyntaxKind::LockKw,
            "namespace" => SyntaxKind::NamespaceKw,
            "new" => SyntaxKind::NewKw,
            "null" => SyntaxKind::NullKw,
            "operator" => SyntaxKind::OperatorKw,
            "out" => SyntaxKind::OutKw,
            "override" => SyntaxKind::OverrideKw,
            "params" => SyntaxKind::ParamsKw,
            "private" => SyntaxKind::PrivateKw,
            "protected" => SyntaxKind::ProtectedKw,
            "public" => SyntaxKind::PublicKw,
            "readonly" => SyntaxKind::ReadonlyKw,
            "ref" => SyntaxKind::RefKw,
            "return" => SyntaxKind::ReturnKw,
            "sealed" => SyntaxKind::SealedKw,
            "static" => SyntaxKind::StaticKw,
            "struct" => SyntaxKind::StructKw,
            "switch" => SyntaxKind::SwitchKw,
            "this" => SyntaxKind::ThisKw,
            "throw" => SyntaxKind::ThrowKw,
            "true" => SyntaxKind::TrueKw,
            "try" => SyntaxKind::TryKw,
            "unchecked" => SyntaxKind::UncheckedKw,
            "unsafe" => SyntaxKind::UnsafeKw,
            "using" => SyntaxKind::UsingKw,
            "virtual" => SyntaxKind::VirtualKw,
            "void" => SyntaxKind::VoidKw,
            "volatile" => SyntaxKind::VolatileKw,
            "while" => SyntaxKind::WhileKw,

            // Contextual.
            "async" => SyntaxKind::AsyncKw,
            "await" => SyntaxKind::AwaitKw,
            "file" => SyntaxKind::FileKw,
            "global" => SyntaxKind::GlobalKw,
            "partial" => SyntaxKind::PartialKw,
            "record" => SyntaxKind::RecordKw,
            "required" => SyntaxKind::RequiredKw,
            "var" => SyntaxKind::VarKw,
            "where" => SyntaxKind::WhereKw,
            "yield" => SyntaxKind::YieldKw,

            _ => return None,
        })
    }
}

impl From<SyntaxKind> for rowan::SyntaxKind {
    fn from(value: SyntaxKind) -> Self {
        rowan::SyntaxKind(value as u16)
    }
}

/// Rowan language marker for C#.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum CSharpLanguage {}

impl Language for CSharpLanguage {
    type Kind = SyntaxKind;

    fn kind_from_raw(raw: rowan::SyntaxKind) -> SyntaxKind {
        if raw.0 < SyntaxKind::__Last as u16 {
            // SAFETY: We've verified the numeric value is within the enum range.
            unsafe { std::mem::transmute::<u16, SyntaxKind>(raw.0) }
        } else {
            SyntaxKind::Error
        }
    }

    fn kind_to_raw(kind: SyntaxKind) -> rowan::SyntaxKind {
        kind.into()
    }
}
