//! Go lexer implementation
//!
//! Hand-written, operating over bytes. Automatic semicolon insertion is
//! handled here so the parser never has to reason about newlines.

use crate::token::{keyword, Span, Token, TokenKind};

/// The Go lexer
pub struct Lexer<'a> {
    /// Source code being lexed
    source: &'a str,
    /// Source as bytes for faster access
    bytes: &'a [u8],
    /// Current position in bytes
    pos: usize,
    /// Start of current token
    token_start: usize,
    /// Kind of the previously emitted token, for semicolon insertion
    prev_ends_statement: bool,
    /// Set when end of input has produced its final inserted semicolon
    eof_semicolon_done: bool,
}

impl<'a> Lexer<'a> {
    /// Create a new lexer for the given source code
    pub fn new(source: &'a str) -> Self {
        Self {
            source,
            bytes: source.as_bytes(),
            pos: 0,
            token_start: 0,
            prev_ends_statement: false,
            eof_semicolon_done: false,
        }
    }

    /// Tokenize the entire source, returning all tokens
    pub fn tokenize(mut self) -> Vec<Token<'a>> {
        // Rough estimate: one token per 4 bytes
        let mut tokens = Vec::with_capacity(self.source.len() / 4 + 1);
        loop {
            let token = self.next_token();
            let is_eof = matches!(token.kind, TokenKind::Eof);
            tokens.push(token);
            if is_eof {
                break;
            }
        }
        tokens
    }

    /// Get the next token
    pub fn next_token(&mut self) -> Token<'a> {
        if let Some(tok) = self.skip_whitespace_and_comments() {
            self.prev_ends_statement = false;
            return tok;
        }

        self.token_start = self.pos;

        if self.is_at_end() {
            if self.prev_ends_statement && !self.eof_semicolon_done {
                self.eof_semicolon_done = true;
                return self.make_token(TokenKind::Semicolon);
            }
            return self.make_token(TokenKind::Eof);
        }

        let c = self.advance();

        let token = match c {
            b'(' => self.make_token(TokenKind::LeftParen),
            b')' => self.make_token(TokenKind::RightParen),
            b'[' => self.make_token(TokenKind::LeftBracket),
            b']' => self.make_token(TokenKind::RightBracket),
            b'{' => self.make_token(TokenKind::LeftBrace),
            b'}' => self.make_token(TokenKind::RightBrace),
            b',' => self.make_token(TokenKind::Comma),
            b';' => self.make_token(TokenKind::Semicolon),
            b'~' => self.make_token(TokenKind::Tilde),

            b'.' => {
                if self.peek().is_ascii_digit() {
                    self.number(true)
                } else if self.check(b'.') && self.peek_at(1) == b'.' {
                    self.advance();
                    self.advance();
                    self.make_token(TokenKind::Ellipsis)
                } else {
                    self.make_token(TokenKind::Dot)
                }
            }

            b':' => {
                if self.match_byte(b'=') {
                    self.make_token(TokenKind::Define)
                } else {
                    self.make_token(TokenKind::Colon)
                }
            }

            b'+' => {
                if self.match_byte(b'+') {
                    self.make_token(TokenKind::Increment)
                } else if self.match_byte(b'=') {
                    self.make_token(TokenKind::PlusAssign)
                } else {
                    self.make_token(TokenKind::Plus)
                }
            }
            b'-' => {
                if self.match_byte(b'-') {
                    self.make_token(TokenKind::Decrement)
                } else if self.match_byte(b'=') {
                    self.make_token(TokenKind::MinusAssign)
                } else {
                    self.make_token(TokenKind::Minus)
                }
            }
            b'*' => {
                if self.match_byte(b'=') {
                    self.make_token(TokenKind::StarAssign)
                } else {
                    self.make_token(TokenKind::Star)
                }
            }
            b'/' => {
                // Comments are consumed by skip_whitespace_and_comments,
                // so a slash here is always an operator.
                if self.match_byte(b'=') {
                    self.make_token(TokenKind::SlashAssign)
                } else {
                    self.make_token(TokenKind::Slash)
                }
            }
            b'%' => {
                if self.match_byte(b'=') {
                    self.make_token(TokenKind::PercentAssign)
                } else {
                    self.make_token(TokenKind::Percent)
                }
            }

            b'&' => {
                if self.match_byte(b'&') {
                    self.make_token(TokenKind::AndAnd)
                } else if self.match_byte(b'^') {
                    if self.match_byte(b'=') {
                        self.make_token(TokenKind::AmpCaretAssign)
                    } else {
                        self.make_token(TokenKind::AmpCaret)
                    }
                } else if self.match_byte(b'=') {
                    self.make_token(TokenKind::AmpAssign)
                } else {
                    self.make_token(TokenKind::Amp)
                }
            }
            b'|' => {
                if self.match_byte(b'|') {
                    self.make_token(TokenKind::OrOr)
                } else if self.match_byte(b'=') {
                    self.make_token(TokenKind::PipeAssign)
                } else {
                    self.make_token(TokenKind::Pipe)
                }
            }
            b'^' => {
                if self.match_byte(b'=') {
                    self.make_token(TokenKind::CaretAssign)
                } else {
                    self.make_token(TokenKind::Caret)
                }
            }

            b'<' => {
                if self.match_byte(b'-') {
                    self.make_token(TokenKind::Arrow)
                } else if self.match_byte(b'<') {
                    if self.match_byte(b'=') {
                        self.make_token(TokenKind::ShlAssign)
                    } else {
                        self.make_token(TokenKind::Shl)
                    }
                } else if self.match_byte(b'=') {
                    self.make_token(TokenKind::LtEq)
                } else {
                    self.make_token(TokenKind::Lt)
                }
            }
            b'>' => {
                if self.match_byte(b'>') {
                    if self.match_byte(b'=') {
                        self.make_token(TokenKind::ShrAssign)
                    } else {
                        self.make_token(TokenKind::Shr)
                    }
                } else if self.match_byte(b'=') {
                    self.make_token(TokenKind::GtEq)
                } else {
                    self.make_token(TokenKind::Gt)
                }
            }
            b'=' => {
                if self.match_byte(b'=') {
                    self.make_token(TokenKind::EqEq)
                } else {
                    self.make_token(TokenKind::Assign)
                }
            }
            b'!' => {
                if self.match_byte(b'=') {
                    self.make_token(TokenKind::NotEq)
                } else {
                    self.make_token(TokenKind::Not)
                }
            }

            b'"' => self.interpreted_string(),
            b'`' => self.raw_string(),
            b'\'' => self.rune_literal(),

            b'0'..=b'9' => self.number(false),

            c if is_ident_start(c) => self.identifier(),

            _ => self.make_token(TokenKind::Illegal),
        };

        self.prev_ends_statement = token.kind.ends_statement();
        token
    }

    /// Skip whitespace and comments. Returns an inserted semicolon token
    /// when a newline terminates a statement.
    fn skip_whitespace_and_comments(&mut self) -> Option<Token<'a>> {
        loop {
            match self.peek() {
                b' ' | b'\t' | b'\r' => {
                    self.advance();
                }
                b'\n' => {
                    if self.prev_ends_statement {
                        self.token_start = self.pos;
                        self.advance();
                        return Some(Token::new(
                            TokenKind::Semicolon,
                            Span::new(self.token_start as u32, self.token_start as u32),
                        ));
                    }
                    self.advance();
                }
                b'/' if self.peek_at(1) == b'/' => {
                    while !self.is_at_end() && self.peek() != b'\n' {
                        self.advance();
                    }
                }
                b'/' if self.peek_at(1) == b'*' => {
                    self.advance();
                    self.advance();
                    let mut contains_newline = false;
                    while !self.is_at_end() {
                        if self.peek() == b'\n' {
                            contains_newline = true;
                        }
                        if self.peek() == b'*' && self.peek_at(1) == b'/' {
                            self.advance();
                            self.advance();
                            break;
                        }
                        self.advance();
                    }
                    // A block comment spanning lines acts like a newline
                    if contains_newline && self.prev_ends_statement {
                        let at = self.pos as u32;
                        return Some(Token::new(TokenKind::Semicolon, Span::new(at, at)));
                    }
                }
                _ => return None,
            }
        }
    }

    fn identifier(&mut self) -> Token<'a> {
        while is_ident_continue(self.peek()) {
            self.advance();
        }
        let text = &self.source[self.token_start..self.pos];
        match keyword(text) {
            Some(kind) => self.make_token(kind),
            None => self.make_token(TokenKind::Ident(text)),
        }
    }

    fn number(&mut self, seen_dot: bool) -> Token<'a> {
        let mut is_float = seen_dot;

        // Prefixed integers: 0x, 0o, 0b
        if !seen_dot && self.source.as_bytes()[self.token_start] == b'0' {
            match self.peek() {
                b'x' | b'X' | b'o' | b'O' | b'b' | b'B' => {
                    self.advance();
                    while self.peek().is_ascii_alphanumeric() || self.peek() == b'_' {
                        self.advance();
                    }
                    let text = &self.source[self.token_start..self.pos];
                    return self.make_token(TokenKind::Int(text));
                }
                _ => {}
            }
        }

        while self.peek().is_ascii_digit() || self.peek() == b'_' {
            self.advance();
        }

        if !seen_dot && self.peek() == b'.' && self.peek_at(1) != b'.' {
            is_float = true;
            self.advance();
            while self.peek().is_ascii_digit() || self.peek() == b'_' {
                self.advance();
            }
        }

        if matches!(self.peek(), b'e' | b'E') {
            is_float = true;
            self.advance();
            if matches!(self.peek(), b'+' | b'-') {
                self.advance();
            }
            while self.peek().is_ascii_digit() {
                self.advance();
            }
        }

        if self.peek() == b'i' {
            self.advance();
            let text = &self.source[self.token_start..self.pos];
            return self.make_token(TokenKind::Imag(text));
        }

        let text = &self.source[self.token_start..self.pos];
        if is_float {
            self.make_token(TokenKind::Float(text))
        } else {
            self.make_token(TokenKind::Int(text))
        }
    }

    fn interpreted_string(&mut self) -> Token<'a> {
        while !self.is_at_end() && self.peek() != b'"' && self.peek() != b'\n' {
            if self.peek() == b'\\' {
                self.advance();
            }
            if !self.is_at_end() {
                self.advance();
            }
        }
        if self.peek() == b'"' {
            self.advance();
        }
        let text = &self.source[self.token_start..self.pos];
        self.make_token(TokenKind::String(text))
    }

    fn raw_string(&mut self) -> Token<'a> {
        while !self.is_at_end() && self.peek() != b'`' {
            self.advance();
        }
        if self.peek() == b'`' {
            self.advance();
        }
        let text = &self.source[self.token_start..self.pos];
        self.make_token(TokenKind::String(text))
    }

    fn rune_literal(&mut self) -> Token<'a> {
        while !self.is_at_end() && self.peek() != b'\'' && self.peek() != b'\n' {
            if self.peek() == b'\\' {
                self.advance();
            }
            if !self.is_at_end() {
                self.advance();
            }
        }
        if self.peek() == b'\'' {
            self.advance();
        }
        let text = &self.source[self.token_start..self.pos];
        self.make_token(TokenKind::Rune(text))
    }

    // ========== Low-level helpers ==========

    fn is_at_end(&self) -> bool {
        self.pos >= self.bytes.len()
    }

    fn advance(&mut self) -> u8 {
        let c = self.bytes[self.pos];
        self.pos += 1;
        c
    }

    fn peek(&self) -> u8 {
        self.bytes.get(self.pos).copied().unwrap_or(0)
    }

    fn peek_at(&self, offset: usize) -> u8 {
        self.bytes.get(self.pos + offset).copied().unwrap_or(0)
    }

    fn check(&self, expected: u8) -> bool {
        self.peek() == expected
    }

    fn match_byte(&mut self, expected: u8) -> bool {
        if self.peek() == expected {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn make_token(&self, kind: TokenKind<'a>) -> Token<'a> {
        Token::new(kind, Span::new(self.token_start as u32, self.pos as u32))
    }
}

fn is_ident_start(c: u8) -> bool {
    c.is_ascii_alphabetic() || c == b'_' || c >= 0x80
}

fn is_ident_continue(c: u8) -> bool {
    c.is_ascii_alphanumeric() || c == b'_' || c >= 0x80
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(source: &str) -> Vec<TokenKind<'_>> {
        Lexer::new(source)
            .tokenize()
            .into_iter()
            .map(|t| t.kind)
            .collect()
    }

    #[test]
    fn lexes_package_clause() {
        assert_eq!(
            kinds("package main\n"),
            vec![
                TokenKind::Package,
                TokenKind::Ident("main"),
                TokenKind::Semicolon,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn inserts_semicolon_after_value() {
        let k = kinds("x = 1\ny = 2\n");
        let semis = k
            .iter()
            .filter(|k| matches!(k, TokenKind::Semicolon))
            .count();
        assert_eq!(semis, 2);
    }

    #[test]
    fn no_semicolon_after_operator() {
        let k = kinds("x = 1 +\n2\n");
        let semis = k
            .iter()
            .filter(|k| matches!(k, TokenKind::Semicolon))
            .count();
        assert_eq!(semis, 1, "no semicolon should be inserted after `+`");
    }

    #[test]
    fn inserts_semicolon_at_eof() {
        assert_eq!(
            kinds("return x"),
            vec![
                TokenKind::Return,
                TokenKind::Ident("x"),
                TokenKind::Semicolon,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn lexes_compound_operators() {
        assert_eq!(
            kinds("a += 1; b <<= 2; c &^= d"),
            vec![
                TokenKind::Ident("a"),
                TokenKind::PlusAssign,
                TokenKind::Int("1"),
                TokenKind::Semicolon,
                TokenKind::Ident("b"),
                TokenKind::ShlAssign,
                TokenKind::Int("2"),
                TokenKind::Semicolon,
                TokenKind::Ident("c"),
                TokenKind::AmpCaretAssign,
                TokenKind::Ident("d"),
                TokenKind::Semicolon,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn lexes_increment_and_define() {
        assert_eq!(
            kinds("i := 0; i++"),
            vec![
                TokenKind::Ident("i"),
                TokenKind::Define,
                TokenKind::Int("0"),
                TokenKind::Semicolon,
                TokenKind::Ident("i"),
                TokenKind::Increment,
                TokenKind::Semicolon,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn lexes_string_kinds() {
        let k = kinds(r#"a := "hi\n" + `raw`"#);
        assert!(k.contains(&TokenKind::String("\"hi\\n\"")));
        assert!(k.contains(&TokenKind::String("`raw`")));
    }

    #[test]
    fn line_comment_does_not_split_tokens() {
        let k = kinds("x // trailing\ny");
        assert_eq!(
            k,
            vec![
                TokenKind::Ident("x"),
                TokenKind::Semicolon,
                TokenKind::Ident("y"),
                TokenKind::Semicolon,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn hex_and_float_literals() {
        let k = kinds("0xff 1.5 2e10 3i");
        assert!(k.contains(&TokenKind::Int("0xff")));
        assert!(k.contains(&TokenKind::Float("1.5")));
        assert!(k.contains(&TokenKind::Float("2e10")));
        assert!(k.contains(&TokenKind::Imag("3i")));
    }

    #[test]
    fn spans_are_byte_offsets() {
        let tokens = Lexer::new("ab cd").tokenize();
        assert_eq!(tokens[0].span, Span::new(0, 2));
        assert_eq!(tokens[1].span, Span::new(3, 5));
    }
}
