use crate::syntax_kind::SyntaxKind;
use crate::TextRange;
use text_size::TextSize;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Token {
    pub kind: SyntaxKind,
    pub range: TextRange,
}

impl Token {
    pub fn text<'a>(&self, input: &'a str) -> &'a str {
        &input[self.range]
    }
}

/// Tokenize `input` into a lossless token stream (trivia included), terminated
/// by an empty `Eof` token.
pub fn lex(input: &str) -> Vec<Token> {
    Lexer::new(input).collect()
}

pub struct Lexer<'a> {
    input: &'a str,
    bytes: &'a [u8],
    pos: usize,
    /// Only whitespace has been seen since the last line break.
    line_start: bool,
    done: bool,
}

impl<'a> Lexer<'a> {
    pub fn new(input: &'a str) -> Self {
        Self {
            input,
            bytes: input.as_bytes(),
            pos: 0,
            line_start: true,
            done: false,
        }
    }

    fn peek(&self, n: usize) -> Option<u8> {
        self.bytes.get(self.pos + n).copied()
    }

    fn peek_char(&self) -> Option<char> {
        self.input[self.pos..].chars().next()
    }

    fn starts_with(&self, s: &str) -> bool {
        self.input[self.pos..].starts_with(s)
    }

    fn next_token(&mut self) -> Token {
        let start = self.pos;
        let kind = self.scan();
        debug_assert!(self.pos > start, "lexer must make progress");

        match kind {
            SyntaxKind::Whitespace => {
                if self.input[start..self.pos].contains('\n') {
                    self.line_start = true;
                }
            }
            SyntaxKind::PreprocessorDirective => self.line_start = true,
            _ if kind.is_trivia() => {}
            _ => self.line_start = false,
        }

        Token {
            kind,
            range: TextRange::new(TextSize::from(start as u32), TextSize::from(self.pos as u32)),
        }
    }

    fn scan(&mut self) -> SyntaxKind {
        let Some(c) = self.peek_char() else {
            return SyntaxKind::Eof;
        };

        if c.is_whitespace() || c == '\u{feff}' {
            while let Some(c) = self.peek_char() {
                if !(c.is_whitespace() || c == '\u{feff}') {
                    break;
                }
                self.pos += c.len_utf8();
            }
            return SyntaxKind::Whitespace;
        }

        if c == '#' && self.line_start {
            self.eat_to_line_end();
            return SyntaxKind::PreprocessorDirective;
        }

        if self.starts_with("//") {
            let kind = if self.starts_with("///") && !self.starts_with("////") {
                SyntaxKind::DocComment
            } else {
                SyntaxKind::LineComment
            };
            self.eat_to_line_end();
            return kind;
        }

        if self.starts_with("/*") {
            match self.input[self.pos + 2..].find("*/") {
                Some(end) => self.pos += 2 + end + 2,
                None => self.pos = self.input.len(),
            }
            return SyntaxKind::BlockComment;
        }

        if let Some(kind) = self.scan_string_start() {
            return kind;
        }

        if c == '@' && self.input[self.pos + 1..].chars().next().map_or(false, is_ident_start) {
            self.pos += 1;
            self.eat_ident_rest();
            return SyntaxKind::Identifier;
        }

        if is_ident_start(c) {
            let start = self.pos;
            self.eat_ident_rest();
            return SyntaxKind::from_keyword(&self.input[start..self.pos])
                .unwrap_or(SyntaxKind::Identifier);
        }

        if c.is_ascii_digit() || (c == '.' && self.peek(1).map_or(false, |b| b.is_ascii_digit())) {
            self.scan_number();
            return SyntaxKind::NumericLiteral;
        }

        if c == '\'' {
            self.pos += 1;
            self.eat_quoted_line(b'\'');
            return SyntaxKind::CharLiteral;
        }

        self.scan_punct()
    }

    fn eat_to_line_end(&mut self) {
        while let Some(b) = self.peek(0) {
            if b == b'\n' || b == b'\r' {
                break;
            }
            self.pos += 1;
        }
        // Keep `pos` on a char boundary in case the loop stopped mid-character.
        while !self.input.is_char_boundary(self.pos) {
            self.pos += 1;
        }
    }

    fn eat_ident_rest(&mut self) {
        let mut first = true;
        while let Some(c) = self.peek_char() {
            let ok = if first { is_ident_start(c) } else { is_ident_continue(c) };
            if !ok {
                break;
            }
            first = false;
            self.pos += c.len_utf8();
        }
    }

    /// Consumes a `'` or `"` delimited literal that may not span lines.
    /// The opening quote must already be consumed.
    fn eat_quoted_line(&mut self, quote: u8) {
        while let Some(b) = self.peek(0) {
            match b {
                b'\\' => {
                    self.pos += 1;
                    if self.peek(0).map_or(false, |b| b != b'\n' && b != b'\r') {
                        self.advance_char();
                    }
                }
                b'\n' | b'\r' => return,
                _ if b == quote => {
                    self.pos += 1;
                    return;
                }
                _ => self.advance_char(),
            }
        }
    }

    fn advance_char(&mut self) {
        if let Some(c) = self.peek_char() {
            self.pos += c.len_utf8();
        }
    }

    fn scan_string_start(&mut self) -> Option<SyntaxKind> {
        let rest = &self.input[self.pos..];
        let dollars = rest.bytes().take_while(|b| *b == b'$').count();
        let after_dollar = &rest[dollars..];

        let (verbatim, prefix_len) = if after_dollar.starts_with("@\"") {
            (true, dollars + 1)
        } else if dollars > 0 && after_dollar.starts_with('@') {
            return None;
        } else if dollars == 0 && rest.starts_with("@$") {
            let inner = &rest[1..];
            let d = inner.bytes().take_while(|b| *b == b'$').count();
            if !inner[d..].starts_with('"') {
                return None;
            }
            self.pos += 1 + d;
            self.scan_string_body(true, true);
            return Some(SyntaxKind::StringLiteral);
        } else if after_dollar.starts_with('"') {
            (false, dollars)
        } else {
            return None;
        };

        self.pos += prefix_len;
        if !verbatim && self.starts_with("\"\"\"") {
            self.scan_raw_string();
        } else {
            self.scan_string_body(verbatim, dollars > 0);
        }
        Some(SyntaxKind::StringLiteral)
    }

    /// Scans `"..."` starting at the opening quote. Interpolation holes may
    /// nest further string literals.
    fn scan_string_body(&mut self, verbatim: bool, interpolated: bool) {
        self.pos += 1; // opening quote
        let mut hole_depth = 0usize;
        while let Some(b) = self.peek(0) {
            if hole_depth > 0 {
                match b {
                    b'{' => hole_depth += 1,
                    b'}' => hole_depth -= 1,
                    b'"' | b'$' | b'@' => {
                        if self.scan_string_start().is_some() {
                            continue;
                        }
                    }
                    b'\'' => {
                        self.pos += 1;
                        self.eat_quoted_line(b'\'');
                        continue;
                    }
                    _ => {}
                }
                self.advance_char();
                continue;
            }

            match b {
                b'"' if verbatim && self.peek(1) == Some(b'"') => self.pos += 2,
                b'"' => {
                    self.pos += 1;
                    return;
                }
                b'\\' if !verbatim => {
                    self.pos += 1;
                    if self.peek(0).map_or(false, |b| b != b'\n' && b != b'\r') {
                        self.advance_char();
                    }
                }
                b'\n' | b'\r' if !verbatim => return,
                b'{' if interpolated && self.peek(1) == Some(b'{') => self.pos += 2,
                b'{' if interpolated => {
                    hole_depth = 1;
                    self.pos += 1;
                }
                _ => self.advance_char(),
            }
        }
    }

    fn scan_raw_string(&mut self) {
        let quotes = self.input[self.pos..].bytes().take_while(|b| *b == b'"').count();
        self.pos += quotes;
        let delimiter = "\"".repeat(quotes);
        match self.input[self.pos..].find(&delimiter) {
            Some(end) => self.pos += end + quotes,
            None => self.pos = self.input.len(),
        }
    }

    fn scan_number(&mut self) {
        if self.starts_with("0x") || self.starts_with("0X") || self.starts_with("0b") || self.starts_with("0B") {
            self.pos += 2;
            while self.peek(0).map_or(false, |b| b.is_ascii_hexdigit() || b == b'_') {
                self.pos += 1;
            }
        } else {
            self.eat_digits();
            if self.peek(0) == Some(b'.') && self.peek(1).map_or(false, |b| b.is_ascii_digit()) {
                self.pos += 1;
                self.eat_digits();
            }
            if matches!(self.peek(0), Some(b'e' | b'E')) {
                let sign = usize::from(matches!(self.peek(1), Some(b'+' | b'-')));
                if self.peek(1 + sign).map_or(false, |b| b.is_ascii_digit()) {
                    self.pos += 1 + sign;
                    self.eat_digits();
                }
            }
        }
        while matches!(
            self.peek(0),
            Some(b'u' | b'U' | b'l' | b'L' | b'f' | b'F' | b'd' | b'D' | b'm' | b'M')
        ) {
            self.pos += 1;
        }
    }

    fn eat_digits(&mut self) {
        while self.peek(0).map_or(false, |b| b.is_ascii_digit() || b == b'_') {
            self.pos += 1;
        }
    }

    fn scan_punct(&mut self) -> SyntaxKind {
        let Some(c) = self.peek_char() else {
            return SyntaxKind::Eof;
        };
        let next = self.peek(1);
        let (kind, len) = match c {
            '{' => (SyntaxKind::LBrace, 1),
            '}' => (SyntaxKind::RBrace, 1),
            '(' => (SyntaxKind::LParen, 1),
            ')' => (SyntaxKind::RParen, 1),
            '[' => (SyntaxKind::LBracket, 1),
            ']' => (SyntaxKind::RBracket, 1),
            ';' => (SyntaxKind::Semicolon, 1),
            ',' => (SyntaxKind::Comma, 1),
            '~' => (SyntaxKind::Tilde, 1),
            '.' if next == Some(b'.') => (SyntaxKind::Operator, 2),
            '.' => (SyntaxKind::Dot, 1),
            ':' if next == Some(b':') => (SyntaxKind::ColonColon, 2),
            ':' => (SyntaxKind::Colon, 1),
            '?' if next == Some(b'.') && !self.peek(2).map_or(false, |b| b.is_ascii_digit()) => {
                (SyntaxKind::QuestionDot, 2)
            }
            '?' if next == Some(b'?') => {
                if self.peek(2) == Some(b'=') {
                    (SyntaxKind::Operator, 3)
                } else {
                    (SyntaxKind::Operator, 2)
                }
            }
            '?' => (SyntaxKind::Question, 1),
            '<' if next == Some(b'<') => {
                if self.peek(2) == Some(b'=') {
                    (SyntaxKind::Operator, 3)
                } else {
                    (SyntaxKind::Operator, 2)
                }
            }
            '<' if next == Some(b'=') => (SyntaxKind::Operator, 2),
            '<' => (SyntaxKind::Less, 1),
            // `>>` is never combined here: closing type argument lists must stay
            // separate tokens.
            '>' if next == Some(b'=') => (SyntaxKind::Operator, 2),
            '>' => (SyntaxKind::Greater, 1),
            '=' if next == Some(b'>') => (SyntaxKind::FatArrow, 2),
            '=' if next == Some(b'=') => (SyntaxKind::Operator, 2),
            '=' => (SyntaxKind::Eq, 1),
            '!' if next == Some(b'=') => (SyntaxKind::Operator, 2),
            '!' => (SyntaxKind::Bang, 1),
            '+' | '-' | '&' | '|' if next == Some(c as u8) => (SyntaxKind::Operator, 2),
            '-' if next == Some(b'>') => (SyntaxKind::Operator, 2),
            '+' | '-' | '*' | '/' | '%' | '&' | '|' | '^' if next == Some(b'=') => {
                (SyntaxKind::Operator, 2)
            }
            '+' | '-' | '*' | '/' | '%' | '&' | '|' | '^' => (SyntaxKind::Operator, 1),
            _ => (SyntaxKind::Error, c.len_utf8()),
        };
        self.pos += len;
        kind
    }
}

impl Iterator for Lexer<'_> {
    type Item = Token;

    fn next(&mut self) -> Option<Token> {
        if self.done {
            return None;
        }
        if self.pos >= self.input.len() {
            self.done = true;
            let end = TextSize::from(self.input.len() as u32);
            return Some(Token {
                kind: SyntaxKind::Eof,
                range: TextRange::empty(end),
            });
        }
        Some(self.next_token())
    }
}

fn is_ident_start(c: char) -> bool {
    c == '_' || unicode_ident::is_xid_start(c)
}

fn is_ident_continue(c: char) -> bool {
    unicode_ident::is_xid_continue(c)
}
