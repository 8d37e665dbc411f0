//! gosift lexer - Tokenizer for Go source
//!
//! A fast, hand-written lexer producing a token stream for the parser.
//! It implements Go's automatic semicolon insertion so the parser can
//! treat statement boundaries uniformly.

mod lexer;
mod token;

pub use lexer::Lexer;
pub use token::{Span, Token, TokenKind};
