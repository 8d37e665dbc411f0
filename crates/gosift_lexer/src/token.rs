//! Token definitions for Go source

/// A byte range in the source file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Span {
    /// Byte offset start (inclusive)
    pub start: u32,
    /// Byte offset end (exclusive)
    pub end: u32,
}

impl Span {
    pub fn new(start: u32, end: u32) -> Self {
        Self { start, end }
    }

    pub fn len(&self) -> u32 {
        self.end.saturating_sub(self.start)
    }

    pub fn is_empty(&self) -> bool {
        self.start >= self.end
    }

    /// Smallest span covering both spans
    pub fn to(&self, other: Span) -> Span {
        Span::new(self.start.min(other.start), self.end.max(other.end))
    }
}

/// The kind of a token
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind<'a> {
    // Identifiers and literals
    Ident(&'a str),
    Int(&'a str),
    Float(&'a str),
    Imag(&'a str),
    Rune(&'a str),
    String(&'a str),

    // Keywords
    Break,
    Case,
    Chan,
    Const,
    Continue,
    Default,
    Defer,
    Else,
    Fallthrough,
    For,
    Func,
    Go,
    Goto,
    If,
    Import,
    Interface,
    Map,
    Package,
    Range,
    Return,
    Select,
    Struct,
    Switch,
    Type,
    Var,

    // Operators and delimiters
    Plus,
    Minus,
    Star,
    Slash,
    Percent,
    Amp,
    Pipe,
    Caret,
    Shl,
    Shr,
    AmpCaret,

    PlusAssign,
    MinusAssign,
    StarAssign,
    SlashAssign,
    PercentAssign,
    AmpAssign,
    PipeAssign,
    CaretAssign,
    ShlAssign,
    ShrAssign,
    AmpCaretAssign,

    AndAnd,
    OrOr,
    Arrow,
    Increment,
    Decrement,

    EqEq,
    Lt,
    Gt,
    Assign,
    Not,
    Tilde,

    NotEq,
    LtEq,
    GtEq,
    Define,
    Ellipsis,

    LeftParen,
    LeftBracket,
    LeftBrace,
    Comma,
    Dot,

    RightParen,
    RightBracket,
    RightBrace,
    Semicolon,
    Colon,

    /// Unrecognized byte
    Illegal,
    Eof,
}

impl<'a> TokenKind<'a> {
    /// Whether a newline after this token triggers automatic
    /// semicolon insertion (Go spec, "Semicolons").
    pub fn ends_statement(&self) -> bool {
        matches!(
            self,
            TokenKind::Ident(_)
                | TokenKind::Int(_)
                | TokenKind::Float(_)
                | TokenKind::Imag(_)
                | TokenKind::Rune(_)
                | TokenKind::String(_)
                | TokenKind::Break
                | TokenKind::Continue
                | TokenKind::Fallthrough
                | TokenKind::Return
                | TokenKind::Increment
                | TokenKind::Decrement
                | TokenKind::RightParen
                | TokenKind::RightBracket
                | TokenKind::RightBrace
        )
    }
}

/// A token with its source span
#[derive(Debug, Clone, Copy)]
pub struct Token<'a> {
    pub kind: TokenKind<'a>,
    pub span: Span,
}

impl<'a> Token<'a> {
    pub fn new(kind: TokenKind<'a>, span: Span) -> Self {
        Self { kind, span }
    }
}

/// Map an identifier to its keyword kind, if any
pub(crate) fn keyword(ident: &str) -> Option<TokenKind<'static>> {
    let kind = match ident {
        "break" => TokenKind::Break,
        "case" => TokenKind::Case,
        "chan" => TokenKind::Chan,
        "const" => TokenKind::Const,
        "continue" => TokenKind::Continue,
        "default" => TokenKind::Default,
        "defer" => TokenKind::Defer,
        "else" => TokenKind::Else,
        "fallthrough" => TokenKind::Fallthrough,
        "for" => TokenKind::For,
        "func" => TokenKind::Func,
        "go" => TokenKind::Go,
        "goto" => TokenKind::Goto,
        "if" => TokenKind::If,
        "import" => TokenKind::Import,
        "interface" => TokenKind::Interface,
        "map" => TokenKind::Map,
        "package" => TokenKind::Package,
        "range" => TokenKind::Range,
        "return" => TokenKind::Return,
        "select" => TokenKind::Select,
        "struct" => TokenKind::Struct,
        "switch" => TokenKind::Switch,
        "type" => TokenKind::Type,
        "var" => TokenKind::Var,
        _ => return None,
    };
    Some(kind)
}
