use std::collections::VecDeque;

use rowan::{GreenNode, GreenNodeBuilder, NodeOrToken};
use text_size::TextSize;

use crate::lexer::{lex, Token};
use crate::syntax_kind::{CSharpLanguage, SyntaxKind};
use crate::{ParseError, TextRange};

pub type SyntaxNode = rowan::SyntaxNode<CSharpLanguage>;
pub type SyntaxToken = rowan::SyntaxToken<CSharpLanguage>;
pub type SyntaxElement = rowan::SyntaxElement<CSharpLanguage>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CSharpParseResult {
    pub green: GreenNode,
    pub errors: Vec<ParseError>,
}

impl CSharpParseResult {
    pub fn syntax(&self) -> SyntaxNode {
        SyntaxNode::new_root(self.green.clone())
    }

    pub fn token_at_offset(&self, offset: TextSize) -> rowan::TokenAtOffset<SyntaxToken> {
        self.syntax().token_at_offset(offset)
    }
}

/// Parse a C# compilation unit.
///
/// The parser is error tolerant and lossless: every byte of `input` ends up in
/// the tree, and malformed regions are wrapped in `Error` nodes.
pub fn parse_csharp(input: &str) -> CSharpParseResult {
    Parser::new(input).parse()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Scope {
    CompilationUnit,
    Namespace,
    FileScopedNamespace,
}

struct Parser<'a> {
    input: &'a str,
    tokens: VecDeque<Token>,
    builder: GreenNodeBuilder<'static>,
    errors: Vec<ParseError>,
}

impl<'a> Parser<'a> {
    fn new(input: &'a str) -> Self {
        Self {
            input,
            tokens: VecDeque::from(lex(input)),
            builder: GreenNodeBuilder::new(),
            errors: Vec::new(),
        }
    }

    fn parse(mut self) -> CSharpParseResult {
        self.builder.start_node(SyntaxKind::CompilationUnit.into());
        self.parse_namespace_members(Scope::CompilationUnit);
        self.eat_trivia();
        self.builder.finish_node();

        CSharpParseResult {
            green: self.builder.finish(),
            errors: self.errors,
        }
    }

    fn parse_namespace_members(&mut self, scope: Scope) {
        loop {
            match self.current() {
                SyntaxKind::Eof => break,
                SyntaxKind::RBrace if scope == Scope::Namespace => break,
                SyntaxKind::ExternKw if self.nth_text(1) == Some("alias") => {
                    self.eat_trivia();
                    self.builder.start_node(SyntaxKind::ExternAliasDirective.into());
                    self.skip_to_semicolon();
                    self.builder.finish_node();
                }
                SyntaxKind::UsingKw | SyntaxKind::GlobalKw if self.at_using_directive() => {
                    self.parse_using_directive();
                }
                SyntaxKind::NamespaceKw => self.parse_namespace_decl(),
                _ if self.at_type_declaration_start() => self.parse_member(),
                SyntaxKind::LBracket => {
                    // Assembly/module level attributes.
                    self.eat_trivia();
                    self.parse_attribute_list();
                }
                _ if scope == Scope::CompilationUnit => {
                    self.eat_trivia();
                    self.builder.start_node(SyntaxKind::GlobalStatement.into());
                    self.parse_statement();
                    self.builder.finish_node();
                }
                _ => {
                    self.eat_trivia();
                    self.builder.start_node(SyntaxKind::Error.into());
                    self.error_here("expected namespace member");
                    self.bump_any();
                    self.builder.finish_node();
                }
            }
        }
    }

    fn at_using_directive(&mut self) -> bool {
        let offset = usize::from(self.at(SyntaxKind::GlobalKw));
        if self.nth(offset) != Some(SyntaxKind::UsingKw) {
            return false;
        }
        match self.nth(offset + 1) {
            Some(SyntaxKind::StaticKw) => true,
            Some(kind) if kind.is_identifier_like() => matches!(
                self.nth(offset + 2),
                Some(
                    SyntaxKind::Eq
                        | SyntaxKind::Dot
                        | SyntaxKind::Semicolon
                        | SyntaxKind::ColonColon
                        | SyntaxKind::Less
                )
            ),
            _ => false,
        }
    }

    fn parse_using_directive(&mut self) {
        self.eat_trivia();
        self.builder.start_node(SyntaxKind::UsingDirective.into());
        if self.at(SyntaxKind::GlobalKw) {
            self.bump();
        }
        self.expect(SyntaxKind::UsingKw, "expected `using`");
        if self.at(SyntaxKind::StaticKw) {
            self.bump();
        }
        if self.at_ident_like() && self.nth(1) == Some(SyntaxKind::Eq) {
            // Alias: `using Alias = Some.Type<Arg>;`
            self.bump();
            self.bump();
            self.parse_type();
        } else {
            self.parse_name();
        }
        self.expect(SyntaxKind::Semicolon, "expected `;` after using directive");
        self.builder.finish_node();
    }

    fn parse_namespace_decl(&mut self) {
        self.eat_trivia();
        let checkpoint = self.builder.checkpoint();
        self.bump(); // namespace
        self.parse_name();
        if self.at(SyntaxKind::Semicolon) {
            self.builder
                .start_node_at(checkpoint, SyntaxKind::FileScopedNamespaceDeclaration.into());
            self.bump();
            self.parse_namespace_members(Scope::FileScopedNamespace);
            self.builder.finish_node();
            return;
        }

        self.builder
            .start_node_at(checkpoint, SyntaxKind::NamespaceDeclaration.into());
        self.expect(SyntaxKind::LBrace, "expected `{`");
        self.parse_namespace_members(Scope::Namespace);
        self.expect(SyntaxKind::RBrace, "expected `}`");
        if self.at(SyntaxKind::Semicolon) {
            self.bump();
        }
        self.builder.finish_node();
    }

    fn parse_name(&mut self) {
        self.builder.start_node(SyntaxKind::Name.into());
        self.eat_trivia();
        if self.at_ident_like() && self.nth(1) == Some(SyntaxKind::ColonColon) {
            self.bump();
            self.bump();
        }
        self.expect_ident_like("expected name");
        while self.at(SyntaxKind::Dot) && self.nth(1).map_or(false, |k| k.is_identifier_like()) {
            self.bump();
            self.bump();
        }
        self.builder.finish_node();
    }

    fn parse_type_body(&mut self) {
        self.builder.start_node(SyntaxKind::TypeBody.into());
        self.expect(SyntaxKind::LBrace, "expected `{`");
        while !self.at(SyntaxKind::RBrace) && !self.at(SyntaxKind::Eof) {
            self.parse_member();
        }
        self.expect(SyntaxKind::RBrace, "expected `}`");
        self.builder.finish_node();
    }

    fn parse_member(&mut self) {
        self.eat_trivia();
        let checkpoint = self.builder.checkpoint();
        self.parse_modifiers();

        match self.current() {
            SyntaxKind::ClassKw => self.parse_type_decl(checkpoint, SyntaxKind::ClassDeclaration, 1),
            SyntaxKind::StructKw => self.parse_type_decl(checkpoint, SyntaxKind::StructDeclaration, 1),
            SyntaxKind::InterfaceKw => {
                self.parse_type_decl(checkpoint, SyntaxKind::InterfaceDeclaration, 1)
            }
            SyntaxKind::RecordKw if self.at_record_start() => match self.nth(1) {
                Some(SyntaxKind::StructKw) => {
                    self.parse_type_decl(checkpoint, SyntaxKind::RecordStructDeclaration, 2)
                }
                Some(SyntaxKind::ClassKw) => {
                    self.parse_type_decl(checkpoint, SyntaxKind::RecordDeclaration, 2)
                }
                _ => self.parse_type_decl(checkpoint, SyntaxKind::RecordDeclaration, 1),
            },
            SyntaxKind::EnumKw => self.parse_enum_decl(checkpoint),
            SyntaxKind::DelegateKw => self.parse_delegate_decl(checkpoint),
            SyntaxKind::Semicolon => {
                self.builder
                    .start_node_at(checkpoint, SyntaxKind::EmptyDeclaration.into());
                self.bump();
                self.builder.finish_node();
            }
            SyntaxKind::Tilde
            | SyntaxKind::EventKw
            | SyntaxKind::ImplicitKw
            | SyntaxKind::ExplicitKw => self.parse_other_member(checkpoint),
            _ if self.at_ident_like() && self.nth(1) == Some(SyntaxKind::LParen) => {
                self.parse_constructor_decl(checkpoint)
            }
            _ if self.at_type_start() => {
                self.parse_type();
                self.parse_member_after_type(checkpoint);
            }
            _ => {
                self.builder.start_node_at(checkpoint, SyntaxKind::Error.into());
                self.error_here("unexpected token in type body");
                if !self.at(SyntaxKind::RBrace) && !self.at(SyntaxKind::Eof) {
                    self.bump_any();
                }
                self.builder.finish_node();
            }
        }
    }

    fn parse_member_after_type(&mut self, checkpoint: rowan::Checkpoint) {
        if !self.at_ident_like() {
            if matches!(self.current(), SyntaxKind::OperatorKw | SyntaxKind::ThisKw) {
                self.parse_other_member(checkpoint);
            } else {
                self.builder.start_node_at(checkpoint, SyntaxKind::Error.into());
                self.error_here("expected member name");
                self.skip_member_rest();
                self.builder.finish_node();
            }
            return;
        }

        match self.nth(1) {
            // Explicit interface implementation (`void IFoo.Bar()`).
            Some(SyntaxKind::Dot | SyntaxKind::ColonColon) => self.parse_other_member(checkpoint),
            Some(SyntaxKind::LParen) => self.parse_method_decl(checkpoint),
            Some(SyntaxKind::Less) => {
                let after = skip_angle_brackets(&self.tokens, self.nth_index(1));
                match kind_at(&self.tokens, skip_trivia(&self.tokens, after)) {
                    SyntaxKind::LParen => self.parse_method_decl(checkpoint),
                    _ => self.parse_other_member(checkpoint),
                }
            }
            Some(SyntaxKind::LBrace | SyntaxKind::FatArrow) => self.parse_property_decl(checkpoint),
            _ => self.parse_field_decl(checkpoint),
        }
    }

    fn parse_type_decl(&mut self, checkpoint: rowan::Checkpoint, kind: SyntaxKind, keywords: usize) {
        self.builder.start_node_at(checkpoint, kind.into());
        for _ in 0..keywords {
            self.bump();
        }
        self.expect_ident_like("expected type name");
        if self.at(SyntaxKind::Less) {
            self.parse_type_parameter_list();
        }
        if self.at(SyntaxKind::LParen) {
            self.parse_parameter_list();
        }
        if self.at(SyntaxKind::Colon) {
            self.parse_base_list();
        }
        while self.at(SyntaxKind::WhereKw) {
            self.parse_constraint_clause();
        }
        match self.current() {
            SyntaxKind::LBrace => {
                self.parse_type_body();
                if self.at(SyntaxKind::Semicolon) {
                    self.bump();
                }
            }
            SyntaxKind::Semicolon => self.bump(),
            _ => self.error_here("expected `{` or `;`"),
        }
        self.builder.finish_node();
    }

    fn parse_enum_decl(&mut self, checkpoint: rowan::Checkpoint) {
        self.builder
            .start_node_at(checkpoint, SyntaxKind::EnumDeclaration.into());
        self.bump(); // enum
        self.expect_ident_like("expected enum name");
        if self.at(SyntaxKind::Colon) {
            self.parse_base_list();
        }
        if self.at(SyntaxKind::LBrace) {
            self.builder.start_node(SyntaxKind::EnumBody.into());
            self.bump_balanced();
            self.builder.finish_node();
            if self.at(SyntaxKind::Semicolon) {
                self.bump();
            }
        } else {
            self.error_here("expected `{`");
        }
        self.builder.finish_node();
    }

    fn parse_delegate_decl(&mut self, checkpoint: rowan::Checkpoint) {
        self.builder
            .start_node_at(checkpoint, SyntaxKind::DelegateDeclaration.into());
        self.bump(); // delegate
        self.parse_type();
        self.expect_ident_like("expected delegate name");
        if self.at(SyntaxKind::Less) {
            self.parse_type_parameter_list();
        }
        if self.at(SyntaxKind::LParen) {
            self.parse_parameter_list();
        } else {
            self.error_here("expected `(`");
        }
        while self.at(SyntaxKind::WhereKw) {
            self.parse_constraint_clause();
        }
        self.expect(SyntaxKind::Semicolon, "expected `;` after delegate declaration");
        self.builder.finish_node();
    }

    fn parse_method_decl(&mut self, checkpoint: rowan::Checkpoint) {
        self.builder
            .start_node_at(checkpoint, SyntaxKind::MethodDeclaration.into());
        self.bump(); // name
        if self.at(SyntaxKind::Less) {
            self.parse_type_parameter_list();
        }
        self.parse_parameter_list();
        while self.at(SyntaxKind::WhereKw) {
            self.parse_constraint_clause();
        }
        self.parse_member_body();
        self.builder.finish_node();
    }

    fn parse_constructor_decl(&mut self, checkpoint: rowan::Checkpoint) {
        self.builder
            .start_node_at(checkpoint, SyntaxKind::ConstructorDeclaration.into());
        self.bump(); // name
        self.parse_parameter_list();
        if self.at(SyntaxKind::Colon) {
            self.builder
                .start_node(SyntaxKind::ConstructorInitializer.into());
            self.bump();
            if matches!(self.current(), SyntaxKind::BaseKw | SyntaxKind::ThisKw) {
                self.bump();
            } else {
                self.error_here("expected `base` or `this`");
            }
            if self.at(SyntaxKind::LParen) {
                self.parse_argument_list();
            }
            self.builder.finish_node();
        }
        self.parse_member_body();
        self.builder.finish_node();
    }

    fn parse_property_decl(&mut self, checkpoint: rowan::Checkpoint) {
        self.builder
            .start_node_at(checkpoint, SyntaxKind::PropertyDeclaration.into());
        self.bump(); // name
        if self.at(SyntaxKind::LBrace) {
            self.builder.start_node(SyntaxKind::AccessorList.into());
            self.bump_balanced();
            self.builder.finish_node();
            if self.at(SyntaxKind::Eq) {
                self.builder.start_node(SyntaxKind::EqualsValueClause.into());
                self.bump();
                self.skip_expression_remainder();
                self.builder.finish_node();
                self.expect(SyntaxKind::Semicolon, "expected `;` after property initializer");
            }
        } else {
            self.parse_arrow_expression_clause();
            self.expect(SyntaxKind::Semicolon, "expected `;` after expression body");
        }
        self.builder.finish_node();
    }

    fn parse_field_decl(&mut self, checkpoint: rowan::Checkpoint) {
        self.builder
            .start_node_at(checkpoint, SyntaxKind::FieldDeclaration.into());
        loop {
            self.eat_trivia();
            self.builder.start_node(SyntaxKind::VariableDeclarator.into());
            self.expect_ident_like("expected field name");
            if self.at(SyntaxKind::Eq) {
                self.builder.start_node(SyntaxKind::EqualsValueClause.into());
                self.bump();
                self.skip_expression_remainder();
                self.builder.finish_node();
            }
            self.builder.finish_node();
            if self.at(SyntaxKind::Comma) {
                self.bump();
                continue;
            }
            break;
        }
        if !self.expect(SyntaxKind::Semicolon, "expected `;` after field declaration") {
            self.skip_member_rest();
        }
        self.builder.finish_node();
    }

    /// Members this grammar does not model (operators, indexers, events,
    /// destructors, explicit interface implementations) are kept as raw tokens.
    fn parse_other_member(&mut self, checkpoint: rowan::Checkpoint) {
        self.builder
            .start_node_at(checkpoint, SyntaxKind::OtherMemberDeclaration.into());
        self.skip_member_rest();
        self.builder.finish_node();
    }

    fn parse_member_body(&mut self) {
        match self.current() {
            SyntaxKind::LBrace => self.parse_block(),
            SyntaxKind::FatArrow => {
                self.parse_arrow_expression_clause();
                self.expect(SyntaxKind::Semicolon, "expected `;` after expression body");
            }
            SyntaxKind::Semicolon => self.bump(),
            _ => self.error_here("expected `{`, `=>` or `;`"),
        }
    }

    fn parse_arrow_expression_clause(&mut self) {
        self.eat_trivia();
        self.builder
            .start_node(SyntaxKind::ArrowExpressionClause.into());
        self.expect(SyntaxKind::FatArrow, "expected `=>`");
        self.parse_expression();
        self.builder.finish_node();
    }

    fn parse_modifiers(&mut self) {
        self.builder.start_node(SyntaxKind::Modifiers.into());
        loop {
            let kind = self.current();
            if kind == SyntaxKind::LBracket {
                self.parse_attribute_list();
            } else if kind.is_modifier_keyword()
                || (kind.is_contextual_modifier() && self.nth(1).map_or(false, continues_declaration))
            {
                self.bump();
            } else {
                break;
            }
        }
        self.builder.finish_node();
    }

    fn parse_attribute_list(&mut self) {
        self.builder.start_node(SyntaxKind::AttributeList.into());
        self.expect(SyntaxKind::LBracket, "expected `[`");
        let target = self.at_ident_like() || self.at(SyntaxKind::ReturnKw);
        if target && self.nth(1) == Some(SyntaxKind::Colon) {
            self.bump();
            self.bump();
        }
        while !self.at(SyntaxKind::RBracket) && !self.at(SyntaxKind::Eof) {
            self.eat_trivia();
            self.builder.start_node(SyntaxKind::Attribute.into());
            self.parse_name();
            if self.at(SyntaxKind::LParen) {
                self.builder
                    .start_node(SyntaxKind::AttributeArgumentList.into());
                self.bump_balanced();
                self.builder.finish_node();
            }
            self.builder.finish_node();
            if self.at(SyntaxKind::Comma) {
                self.bump();
                continue;
            }
            if !self.at(SyntaxKind::RBracket) {
                self.error_here("expected `,` or `]`");
                self.recover_to(&[SyntaxKind::RBracket, SyntaxKind::LBrace, SyntaxKind::Semicolon]);
            }
            break;
        }
        self.expect(SyntaxKind::RBracket, "expected `]`");
        self.builder.finish_node();
    }

    fn parse_type_parameter_list(&mut self) {
        self.builder
            .start_node(SyntaxKind::TypeParameterList.into());
        self.expect(SyntaxKind::Less, "expected `<`");
        while !self.at(SyntaxKind::Greater) && !self.at(SyntaxKind::Eof) {
            self.eat_trivia();
            self.builder.start_node(SyntaxKind::TypeParameter.into());
            while self.at(SyntaxKind::LBracket) {
                self.parse_attribute_list();
            }
            if matches!(self.current(), SyntaxKind::InKw | SyntaxKind::OutKw) {
                self.bump();
            }
            self.expect_ident_like("expected type parameter name");
            self.builder.finish_node();
            if self.at(SyntaxKind::Comma) {
                self.bump();
                continue;
            }
            break;
        }
        self.expect(SyntaxKind::Greater, "expected `>`");
        self.builder.finish_node();
    }

    fn parse_constraint_clause(&mut self) {
        self.eat_trivia();
        self.builder
            .start_node(SyntaxKind::TypeConstraintClause.into());
        self.bump(); // where
        loop {
            match self.current() {
                SyntaxKind::Eof
                | SyntaxKind::LBrace
                | SyntaxKind::Semicolon
                | SyntaxKind::FatArrow
                | SyntaxKind::WhereKw => break,
                SyntaxKind::LParen => self.bump_balanced(),
                _ => self.bump(),
            }
        }
        self.builder.finish_node();
    }

    fn parse_base_list(&mut self) {
        self.builder.start_node(SyntaxKind::BaseList.into());
        self.expect(SyntaxKind::Colon, "expected `:`");
        loop {
            self.eat_trivia();
            self.builder.start_node(SyntaxKind::SimpleBaseType.into());
            self.parse_type();
            if self.at(SyntaxKind::LParen) {
                self.parse_argument_list();
            }
            self.builder.finish_node();
            if self.at(SyntaxKind::Comma) {
                self.bump();
                continue;
            }
            break;
        }
        self.builder.finish_node();
    }

    fn parse_parameter_list(&mut self) {
        self.builder.start_node(SyntaxKind::ParameterList.into());
        self.expect(SyntaxKind::LParen, "expected `(`");
        while !self.at(SyntaxKind::RParen) && !self.at(SyntaxKind::Eof) {
            self.eat_trivia();
            self.builder.start_node(SyntaxKind::Parameter.into());
            self.builder.start_node(SyntaxKind::Modifiers.into());
            loop {
                match self.current() {
                    SyntaxKind::LBracket => self.parse_attribute_list(),
                    SyntaxKind::ThisKw
                    | SyntaxKind::RefKw
                    | SyntaxKind::OutKw
                    | SyntaxKind::InKw
                    | SyntaxKind::ParamsKw
                    | SyntaxKind::ReadonlyKw => self.bump(),
                    _ => break,
                }
            }
            self.builder.finish_node();

            if self.at_type_start() {
                self.parse_type();
            } else {
                self.error_here("expected parameter type");
            }
            self.expect_ident_like("expected parameter name");
            if self.at(SyntaxKind::Eq) {
                self.builder.start_node(SyntaxKind::EqualsValueClause.into());
                self.bump();
                self.skip_until_list_separator();
                self.builder.finish_node();
            }
            self.builder.finish_node();

            if self.at(SyntaxKind::Comma) {
                self.bump();
                continue;
            }
            if !self.at(SyntaxKind::RParen) {
                self.error_here("expected `,` or `)`");
                self.skip_until_list_separator();
                if self.at(SyntaxKind::Comma) {
                    self.bump();
                    continue;
                }
            }
            break;
        }
        self.expect(SyntaxKind::RParen, "expected `)`");
        self.builder.finish_node();
    }

    fn parse_type(&mut self) {
        self.builder.start_node(SyntaxKind::Type.into());
        match self.current() {
            SyntaxKind::VoidKw => self.bump(),
            SyntaxKind::LParen => {
                self.builder.start_node(SyntaxKind::TupleType.into());
                self.bump_balanced();
                self.builder.finish_node();
            }
            kind if kind.is_identifier_like() => self.parse_named_type(),
            _ => self.error_here("expected type"),
        }
        loop {
            match self.current() {
                SyntaxKind::Question => self.bump(),
                SyntaxKind::LBracket
                    if matches!(self.nth(1), Some(SyntaxKind::RBracket | SyntaxKind::Comma)) =>
                {
                    self.bump_balanced()
                }
                SyntaxKind::Operator if self.current_text() == "*" => self.bump(),
                _ => break,
            }
        }
        self.builder.finish_node();
    }

    fn parse_named_type(&mut self) {
        self.builder.start_node(SyntaxKind::NamedType.into());
        if self.nth(1) == Some(SyntaxKind::ColonColon) {
            self.bump();
            self.bump();
        }
        self.expect_ident_like("expected type name");
        if self.at(SyntaxKind::Less) {
            self.parse_type_argument_list();
        }
        while self.at(SyntaxKind::Dot) && self.nth(1).map_or(false, |k| k.is_identifier_like()) {
            self.bump();
            self.bump();
            if self.at(SyntaxKind::Less) {
                self.parse_type_argument_list();
            }
        }
        self.builder.finish_node();
    }

    fn parse_type_argument_list(&mut self) {
        self.builder.start_node(SyntaxKind::TypeArgumentList.into());
        self.expect(SyntaxKind::Less, "expected `<`");
        loop {
            match self.current() {
                SyntaxKind::Greater | SyntaxKind::Eof => break,
                // Omitted arguments (`typeof(Dictionary<,>)`).
                SyntaxKind::Comma => self.bump(),
                _ if self.at_type_start() => {
                    self.parse_type();
                    if self.at(SyntaxKind::Comma) {
                        self.bump();
                    } else {
                        break;
                    }
                }
                _ => break,
            }
        }
        self.expect(SyntaxKind::Greater, "expected `>`");
        self.builder.finish_node();
    }

    fn parse_block(&mut self) {
        self.eat_trivia();
        self.builder.start_node(SyntaxKind::Block.into());
        self.expect(SyntaxKind::LBrace, "expected `{`");
        while !self.at(SyntaxKind::RBrace) && !self.at(SyntaxKind::Eof) {
            self.parse_statement();
        }
        self.expect(SyntaxKind::RBrace, "expected `}`");
        self.builder.finish_node();
    }

    fn parse_statement(&mut self) {
        self.eat_trivia();
        let checkpoint = self.builder.checkpoint();
        match self.current() {
            SyntaxKind::LBrace => self.parse_block(),
            SyntaxKind::Semicolon => {
                self.builder.start_node(SyntaxKind::EmptyStatement.into());
                self.bump();
                self.builder.finish_node();
            }
            SyntaxKind::ReturnKw => {
                self.builder.start_node(SyntaxKind::ReturnStatement.into());
                self.bump();
                if !self.at(SyntaxKind::Semicolon) {
                    self.parse_expression();
                }
                self.expect(SyntaxKind::Semicolon, "expected `;` after return statement");
                self.builder.finish_node();
            }
            SyntaxKind::IfKw => {
                self.builder.start_node(SyntaxKind::OtherStatement.into());
                self.bump();
                self.parse_statement_header();
                self.parse_embedded_statement();
                if self.at(SyntaxKind::ElseKw) {
                    self.bump();
                    self.parse_embedded_statement();
                }
                self.builder.finish_node();
            }
            SyntaxKind::ForKw
            | SyntaxKind::ForeachKw
            | SyntaxKind::WhileKw
            | SyntaxKind::LockKw
            | SyntaxKind::FixedKw => {
                self.builder.start_node(SyntaxKind::OtherStatement.into());
                self.bump();
                self.parse_statement_header();
                self.parse_embedded_statement();
                self.builder.finish_node();
            }
            SyntaxKind::UsingKw if self.nth(1) == Some(SyntaxKind::LParen) => {
                self.builder.start_node(SyntaxKind::OtherStatement.into());
                self.bump();
                self.parse_statement_header();
                self.parse_embedded_statement();
                self.builder.finish_node();
            }
            SyntaxKind::DoKw => {
                self.builder.start_node(SyntaxKind::OtherStatement.into());
                self.bump();
                self.parse_embedded_statement();
                self.expect(SyntaxKind::WhileKw, "expected `while`");
                self.parse_statement_header();
                self.expect(SyntaxKind::Semicolon, "expected `;` after do statement");
                self.builder.finish_node();
            }
            SyntaxKind::TryKw => {
                self.builder.start_node(SyntaxKind::OtherStatement.into());
                self.bump();
                self.parse_block();
                while self.at(SyntaxKind::CatchKw) {
                    self.bump();
                    if self.at(SyntaxKind::LParen) {
                        self.bump_balanced();
                    }
                    if self.current_text() == "when" {
                        self.bump();
                        self.parse_statement_header();
                    }
                    self.parse_block();
                }
                if self.at(SyntaxKind::FinallyKw) {
                    self.bump();
                    self.parse_block();
                }
                self.builder.finish_node();
            }
            SyntaxKind::SwitchKw => {
                self.builder.start_node(SyntaxKind::OtherStatement.into());
                self.bump();
                self.parse_statement_header();
                if self.at(SyntaxKind::LBrace) {
                    self.bump_balanced();
                } else {
                    self.error_here("expected `{`");
                }
                self.builder.finish_node();
            }
            SyntaxKind::CheckedKw | SyntaxKind::UncheckedKw | SyntaxKind::UnsafeKw
                if self.nth(1) == Some(SyntaxKind::LBrace) =>
            {
                self.builder.start_node(SyntaxKind::OtherStatement.into());
                self.bump();
                self.parse_block();
                self.builder.finish_node();
            }
            SyntaxKind::ThrowKw
            | SyntaxKind::BreakKw
            | SyntaxKind::ContinueKw
            | SyntaxKind::GotoKw
            | SyntaxKind::UsingKw => {
                self.builder.start_node(SyntaxKind::OtherStatement.into());
                self.skip_to_semicolon();
                self.builder.finish_node();
            }
            SyntaxKind::YieldKw
                if matches!(self.nth(1), Some(SyntaxKind::ReturnKw | SyntaxKind::BreakKw)) =>
            {
                self.builder.start_node(SyntaxKind::OtherStatement.into());
                self.skip_to_semicolon();
                self.builder.finish_node();
            }
            kind if kind.is_identifier_like() && self.nth(1) == Some(SyntaxKind::Colon) => {
                // Labeled statement.
                self.builder.start_node(SyntaxKind::OtherStatement.into());
                self.bump();
                self.bump();
                self.parse_embedded_statement();
                self.builder.finish_node();
            }
            kind if (kind.is_modifier_keyword() && kind != SyntaxKind::NewKw)
                || kind == SyntaxKind::VoidKw =>
            {
                // Local constants and local functions (`const int x = 1;`,
                // `static void Helper() { }`).
                self.builder.start_node(SyntaxKind::OtherStatement.into());
                self.skip_expression_remainder();
                if self.at(SyntaxKind::Semicolon) {
                    self.bump();
                }
                self.builder.finish_node();
            }
            SyntaxKind::RParen | SyntaxKind::RBracket | SyntaxKind::RBrace | SyntaxKind::Eof => {
                self.builder.start_node(SyntaxKind::Error.into());
                self.error_here("expected statement");
                if !self.at(SyntaxKind::Eof) {
                    self.bump_any();
                }
                self.builder.finish_node();
            }
            _ => {
                self.parse_expression();
                if self.at(SyntaxKind::Semicolon) {
                    self.builder
                        .start_node_at(checkpoint, SyntaxKind::ExpressionStatement.into());
                    self.bump();
                } else {
                    // A declaration ending in a block (local function) or an
                    // unterminated expression.
                    self.builder
                        .start_node_at(checkpoint, SyntaxKind::OtherStatement.into());
                }
                self.builder.finish_node();
            }
        }
    }

    fn parse_embedded_statement(&mut self) {
        if matches!(self.current(), SyntaxKind::RBrace | SyntaxKind::Eof) {
            self.error_here("expected statement");
        } else {
            self.parse_statement();
        }
    }

    fn parse_statement_header(&mut self) {
        if self.at(SyntaxKind::LParen) {
            self.bump_balanced();
        } else {
            self.error_here("expected `(`");
        }
    }

    fn parse_expression(&mut self) {
        self.eat_trivia();
        let checkpoint = self.builder.checkpoint();
        self.parse_postfix_expression();
        if !self.at_expression_end() {
            // Binary operators, lambdas, casts, patterns, ... are kept as raw
            // tokens around the leading operand.
            self.builder
                .start_node_at(checkpoint, SyntaxKind::OtherExpression.into());
            self.skip_expression_remainder();
            self.builder.finish_node();
        }
    }

    fn at_expression_end(&mut self) -> bool {
        matches!(
            self.current(),
            SyntaxKind::Semicolon
                | SyntaxKind::RBrace
                | SyntaxKind::RParen
                | SyntaxKind::RBracket
                | SyntaxKind::Eof
        )
    }

    fn parse_postfix_expression(&mut self) {
        self.eat_trivia();
        let checkpoint = self.builder.checkpoint();
        if !self.parse_primary_expression() {
            return;
        }
        loop {
            match self.current() {
                SyntaxKind::Dot | SyntaxKind::QuestionDot
                    if self.nth(1).map_or(false, |k| k.is_identifier_like()) =>
                {
                    self.builder
                        .start_node_at(checkpoint, SyntaxKind::MemberAccessExpression.into());
                    self.bump();
                    self.parse_simple_name();
                    self.builder.finish_node();
                }
                SyntaxKind::LParen => {
                    self.builder
                        .start_node_at(checkpoint, SyntaxKind::InvocationExpression.into());
                    self.parse_argument_list();
                    self.builder.finish_node();
                }
                SyntaxKind::LBracket => {
                    self.builder
                        .start_node_at(checkpoint, SyntaxKind::ElementAccessExpression.into());
                    self.bump_balanced();
                    self.builder.finish_node();
                }
                SyntaxKind::Bang => {
                    self.builder
                        .start_node_at(checkpoint, SyntaxKind::PostfixExpression.into());
                    self.bump();
                    self.builder.finish_node();
                }
                SyntaxKind::Operator if matches!(self.current_text(), "++" | "--") => {
                    self.builder
                        .start_node_at(checkpoint, SyntaxKind::PostfixExpression.into());
                    self.bump();
                    self.builder.finish_node();
                }
                _ => break,
            }
        }
    }

    fn parse_primary_expression(&mut self) -> bool {
        match self.current() {
            kind if kind.is_identifier_like() => self.parse_simple_name(),
            SyntaxKind::ThisKw => {
                self.builder.start_node(SyntaxKind::ThisExpression.into());
                self.bump();
                self.builder.finish_node();
            }
            SyntaxKind::BaseKw => {
                self.builder.start_node(SyntaxKind::BaseExpression.into());
                self.bump();
                self.builder.finish_node();
            }
            kind if kind.is_literal() => {
                self.builder.start_node(SyntaxKind::LiteralExpression.into());
                self.bump();
                if kind == SyntaxKind::DefaultKw && self.at(SyntaxKind::LParen) {
                    self.bump_balanced();
                }
                self.builder.finish_node();
            }
            SyntaxKind::LParen => {
                self.builder
                    .start_node(SyntaxKind::ParenthesizedExpression.into());
                self.bump_balanced();
                self.builder.finish_node();
            }
            SyntaxKind::NewKw => {
                self.builder
                    .start_node(SyntaxKind::ObjectCreationExpression.into());
                self.bump();
                if self.at_ident_like() {
                    self.parse_type();
                }
                if self.at(SyntaxKind::LBracket) {
                    self.bump_balanced();
                }
                if self.at(SyntaxKind::LParen) {
                    self.parse_argument_list();
                }
                if self.at(SyntaxKind::LBrace) {
                    self.bump_balanced();
                }
                self.builder.finish_node();
            }
            _ => return false,
        }
        true
    }

    fn parse_simple_name(&mut self) {
        self.eat_trivia();
        if self.nth(1) == Some(SyntaxKind::Less) && self.at_generic_name_arguments() {
            self.builder.start_node(SyntaxKind::GenericName.into());
            self.bump();
            self.parse_type_argument_list();
            self.builder.finish_node();
            return;
        }

        self.builder.start_node(SyntaxKind::IdentifierName.into());
        if self.nth(1) == Some(SyntaxKind::ColonColon) {
            self.bump();
            self.bump();
        }
        self.expect_ident_like("expected identifier");
        self.builder.finish_node();
    }

    /// Decides whether `name <` starts a type argument list, following the C#
    /// disambiguation rule: the list must close and be followed by a token that
    /// cannot continue a relational expression.
    fn at_generic_name_arguments(&mut self) -> bool {
        let less = self.nth_index(1);
        let mut idx = less;
        let mut depth = 0usize;
        while let Some(tok) = self.tokens.get(idx) {
            match tok.kind {
                kind if kind.is_trivia() => {}
                SyntaxKind::Less => depth += 1,
                SyntaxKind::Greater => {
                    depth -= 1;
                    if depth == 0 {
                        break;
                    }
                }
                SyntaxKind::Dot
                | SyntaxKind::Comma
                | SyntaxKind::Question
                | SyntaxKind::ColonColon
                | SyntaxKind::LBracket
                | SyntaxKind::RBracket
                | SyntaxKind::LParen
                | SyntaxKind::RParen
                | SyntaxKind::VoidKw => {}
                kind if kind.is_identifier_like() => {}
                _ => return false,
            }
            idx += 1;
        }
        if depth != 0 {
            return false;
        }

        let next = skip_trivia(&self.tokens, idx + 1);
        match kind_at(&self.tokens, next) {
            SyntaxKind::LParen
            | SyntaxKind::RParen
            | SyntaxKind::RBracket
            | SyntaxKind::RBrace
            | SyntaxKind::Colon
            | SyntaxKind::Semicolon
            | SyntaxKind::Comma
            | SyntaxKind::Dot
            | SyntaxKind::QuestionDot
            | SyntaxKind::Question
            | SyntaxKind::LBracket
            | SyntaxKind::Eof => true,
            SyntaxKind::Operator => matches!(
                self.tokens.get(next).map(|t| t.text(self.input)),
                Some("==" | "!=" | "||" | "&&" | "|" | "^" | "&")
            ),
            _ => false,
        }
    }

    fn parse_argument_list(&mut self) {
        self.builder.start_node(SyntaxKind::ArgumentList.into());
        self.expect(SyntaxKind::LParen, "expected `(`");
        while !self.at(SyntaxKind::RParen) && !self.at(SyntaxKind::Eof) {
            self.eat_trivia();
            self.builder.start_node(SyntaxKind::Argument.into());
            self.skip_until_list_separator();
            self.builder.finish_node();
            if self.at(SyntaxKind::Comma) {
                self.bump();
                continue;
            }
            break;
        }
        self.expect(SyntaxKind::RParen, "expected `)`");
        self.builder.finish_node();
    }

    /// Consumes raw tokens up to a `,` or closing delimiter at nesting depth 0.
    fn skip_until_list_separator(&mut self) {
        loop {
            match self.current() {
                SyntaxKind::Eof
                | SyntaxKind::Comma
                | SyntaxKind::RParen
                | SyntaxKind::RBracket
                | SyntaxKind::RBrace
                | SyntaxKind::Semicolon => break,
                SyntaxKind::LParen | SyntaxKind::LBracket | SyntaxKind::LBrace => {
                    self.bump_balanced()
                }
                _ => self.bump(),
            }
        }
    }

    /// Consumes raw tokens up to the end of the current expression: a `;` or an
    /// unmatched closing delimiter. A braced block at depth 0 that is not
    /// followed by something continuing the expression also ends it.
    fn skip_expression_remainder(&mut self) {
        loop {
            match self.current() {
                SyntaxKind::Eof
                | SyntaxKind::Semicolon
                | SyntaxKind::RParen
                | SyntaxKind::RBracket
                | SyntaxKind::RBrace => break,
                SyntaxKind::LParen | SyntaxKind::LBracket => self.bump_balanced(),
                SyntaxKind::LBrace => {
                    self.bump_balanced();
                    if !matches!(
                        self.current(),
                        SyntaxKind::Semicolon
                            | SyntaxKind::Comma
                            | SyntaxKind::RParen
                            | SyntaxKind::RBracket
                            | SyntaxKind::Dot
                            | SyntaxKind::QuestionDot
                            | SyntaxKind::Question
                            | SyntaxKind::Colon
                            | SyntaxKind::Operator
                            | SyntaxKind::Bang
                            | SyntaxKind::Eq
                    ) {
                        break;
                    }
                }
                _ => self.bump(),
            }
        }
    }

    fn skip_to_semicolon(&mut self) {
        self.skip_expression_remainder();
        self.expect(SyntaxKind::Semicolon, "expected `;`");
    }

    fn skip_member_rest(&mut self) {
        loop {
            match self.current() {
                SyntaxKind::Eof | SyntaxKind::RBrace => return,
                SyntaxKind::Semicolon => {
                    self.bump();
                    return;
                }
                SyntaxKind::LBrace => {
                    self.bump_balanced();
                    if !self.at(SyntaxKind::Eq) {
                        return;
                    }
                }
                SyntaxKind::LParen | SyntaxKind::LBracket => self.bump_balanced(),
                _ => self.bump(),
            }
        }
    }

    /// Consumes a delimited group starting at the current opening token,
    /// including everything nested inside it.
    fn bump_balanced(&mut self) {
        let mut depth = 0usize;
        loop {
            match self.current() {
                SyntaxKind::Eof => {
                    self.error_here("unbalanced delimiters");
                    return;
                }
                SyntaxKind::LParen | SyntaxKind::LBracket | SyntaxKind::LBrace => depth += 1,
                SyntaxKind::RParen | SyntaxKind::RBracket | SyntaxKind::RBrace => {
                    depth = depth.saturating_sub(1);
                }
                _ => {}
            }
            self.bump();
            if depth == 0 {
                return;
            }
        }
    }

    fn recover_to(&mut self, recovery: &[SyntaxKind]) {
        while !self.at(SyntaxKind::Eof) {
            if recovery.contains(&self.current()) {
                break;
            }
            self.bump_any();
        }
    }

    fn at_type_declaration_start(&mut self) -> bool {
        let mut idx = skip_trivia(&self.tokens, 0);
        loop {
            let kind = kind_at(&self.tokens, idx);
            if kind == SyntaxKind::LBracket {
                idx = skip_trivia(&self.tokens, skip_balanced(&self.tokens, idx));
                continue;
            }
            if kind.is_modifier_keyword() || kind.is_contextual_modifier() {
                idx = skip_trivia(&self.tokens, idx + 1);
                continue;
            }
            return match kind {
                SyntaxKind::ClassKw
                | SyntaxKind::StructKw
                | SyntaxKind::InterfaceKw
                | SyntaxKind::EnumKw
                | SyntaxKind::DelegateKw => true,
                SyntaxKind::RecordKw => {
                    let next = kind_at(&self.tokens, skip_trivia(&self.tokens, idx + 1));
                    next.is_identifier_like() || matches!(next, SyntaxKind::ClassKw | SyntaxKind::StructKw)
                }
                _ => false,
            };
        }
    }

    fn at_record_start(&mut self) -> bool {
        self.nth(1).map_or(false, |k| {
            k.is_identifier_like() || matches!(k, SyntaxKind::ClassKw | SyntaxKind::StructKw)
        })
    }

    fn at_type_start(&mut self) -> bool {
        matches!(self.current(), SyntaxKind::VoidKw | SyntaxKind::LParen) || self.at_ident_like()
    }

    fn current(&mut self) -> SyntaxKind {
        self.eat_trivia();
        self.tokens.front().map(|t| t.kind).unwrap_or(SyntaxKind::Eof)
    }

    fn current_text(&mut self) -> &'a str {
        self.eat_trivia();
        let input = self.input;
        self.tokens.front().map(|t| t.text(input)).unwrap_or("")
    }

    /// Index into `tokens` of the `n`th non-trivia token.
    fn nth_index(&self, n: usize) -> usize {
        let mut idx = skip_trivia(&self.tokens, 0);
        for _ in 0..n {
            idx = skip_trivia(&self.tokens, idx + 1);
        }
        idx
    }

    fn nth(&self, n: usize) -> Option<SyntaxKind> {
        self.tokens.get(self.nth_index(n)).map(|t| t.kind)
    }

    fn nth_text(&self, n: usize) -> Option<&'a str> {
        let input = self.input;
        self.tokens.get(self.nth_index(n)).map(|t| t.text(input))
    }

    fn at(&mut self, kind: SyntaxKind) -> bool {
        self.current() == kind
    }

    fn at_ident_like(&mut self) -> bool {
        self.current().is_identifier_like()
    }

    fn eat_trivia(&mut self) {
        while self.tokens.front().map_or(false, |t| t.kind.is_trivia()) {
            self.bump_any();
        }
    }

    fn bump(&mut self) {
        self.eat_trivia();
        self.bump_any();
    }

    fn bump_any(&mut self) {
        // `Eof` stays in the queue so `current()` keeps reporting it.
        if self.tokens.front().map_or(true, |t| t.kind == SyntaxKind::Eof) {
            return;
        }
        if let Some(tok) = self.tokens.pop_front() {
            self.builder.token(tok.kind.into(), tok.text(self.input));
        }
    }

    fn expect(&mut self, kind: SyntaxKind, message: &str) -> bool {
        if self.at(kind) {
            self.bump();
            true
        } else {
            self.error_here(message);
            false
        }
    }

    fn expect_ident_like(&mut self, message: &str) {
        if self.at_ident_like() {
            self.bump();
        } else {
            self.error_here(message);
        }
    }

    fn error_here(&mut self, message: &str) {
        let range = self.current_range();
        self.errors.push(ParseError {
            message: message.to_string(),
            range,
        });
    }

    fn current_range(&mut self) -> TextRange {
        self.eat_trivia();
        self.tokens
            .front()
            .map(|t| t.range)
            .unwrap_or_else(|| TextRange::empty(TextSize::of(self.input)))
    }
}

/// Contextual modifiers only count as modifiers when more declaration follows.
fn continues_declaration(next: SyntaxKind) -> bool {
    next.is_identifier_like()
        || next.is_modifier_keyword()
        || matches!(
            next,
            SyntaxKind::ClassKw
                | SyntaxKind::StructKw
                | SyntaxKind::InterfaceKw
                | SyntaxKind::EnumKw
                | SyntaxKind::DelegateKw
                | SyntaxKind::VoidKw
                | SyntaxKind::LParen
        )
}

fn kind_at(tokens: &VecDeque<Token>, idx: usize) -> SyntaxKind {
    tokens.get(idx).map_or(SyntaxKind::Eof, |t| t.kind)
}

fn skip_trivia(tokens: &VecDeque<Token>, mut idx: usize) -> usize {
    while tokens.get(idx).map_or(false, |t| t.kind.is_trivia()) {
        idx += 1;
    }
    idx
}

/// Returns the index just past the delimited group opening at `idx`.
fn skip_balanced(tokens: &VecDeque<Token>, mut idx: usize) -> usize {
    let mut depth = 0usize;
    while let Some(tok) = tokens.get(idx) {
        match tok.kind {
            SyntaxKind::LParen | SyntaxKind::LBracket | SyntaxKind::LBrace => depth += 1,
            SyntaxKind::RParen | SyntaxKind::RBracket | SyntaxKind::RBrace => {
                depth = depth.saturating_sub(1);
                if depth == 0 {
                    return idx + 1;
                }
            }
            SyntaxKind::Eof => return idx,
            _ => {}
        }
        idx += 1;
    }
    idx
}

/// Returns the index just past the `<...>` group opening at `idx`.
fn skip_angle_brackets(tokens: &VecDeque<Token>, mut idx: usize) -> usize {
    let mut depth = 0usize;
    while let Some(tok) = tokens.get(idx) {
        match tok.kind {
            SyntaxKind::Less => depth += 1,
            SyntaxKind::Greater => {
                depth = depth.saturating_sub(1);
                if depth == 0 {
                    return idx + 1;
                }
            }
            SyntaxKind::Eof | SyntaxKind::LBrace | SyntaxKind::Semicolon => return idx,
            _ => {}
        }
        idx += 1;
    }
    idx
}

// --- debug helpers ---

/// Renders a tree as an indented list of kinds and token texts.
pub fn debug_dump(node: &SyntaxNode) -> String {
    fn go(node: &SyntaxNode, indent: usize, out: &mut String) {
        use std::fmt::Write;
        let _ = writeln!(out, "{:indent$}{:?}", "", node.kind(), indent = indent);
        for child in node.children_with_tokens() {
            match child {
                NodeOrToken::Node(n) => go(&n, indent + 2, out),
                NodeOrToken::Token(t) => {
                    let _ = writeln!(
                        out,
                        "{:indent$}{:?} {:?}",
                        "",
                        t.kind(),
                        t.text(),
                        indent = indent + 2
                    );
                }
            }
        }
    }

    let mut out = String::new();
    go(node, 0, &mut out);
    out
}
