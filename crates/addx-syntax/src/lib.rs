//! Lossless C# syntax trees for the subset of the language the registration
//! refactoring needs to understand.
//!
//! Declarations (namespaces, usings, types, members, parameters, attributes)
//! are parsed into full structure. Statements and expressions only get the
//! shape required to follow member-access/invocation chains; everything else
//! is preserved as raw tokens inside `Other*` nodes so the tree always covers
//! the input text byte for byte.

pub mod ast;
mod lexer;
mod parser;
mod syntax_kind;

pub use ast::*;
pub use lexer::{lex, Lexer, Token};
pub use parser::{
    debug_dump, parse_csharp, CSharpParseResult, SyntaxElement, SyntaxNode, SyntaxToken,
};
pub use syntax_kind::{CSharpLanguage, SyntaxKind};
pub use text_size::{TextRange, TextSize};

#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct ParseError {
    pub message: String,
    pub range: TextRange,
}
