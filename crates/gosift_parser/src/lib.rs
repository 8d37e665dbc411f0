//! gosift parser - AST builder for Go source
//!
//! A hand-written recursive descent parser covering the Go subset the
//! linter analyzes: declarations, the statement grammar, and the full
//! expression grammar. Struct/interface bodies and composite literal
//! contents are consumed but kept opaque; composite literals keep the
//! list of identifiers that appeared inside, so mutation tracking can
//! account for the skipped text.

mod ast;
mod parser;

pub use ast::*;
pub use parser::{ParseError, Parser};
