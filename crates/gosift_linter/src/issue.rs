//! Issue, location, and fix types

use crate::messages::{self, RuleId};
use crate::severity::Severity;

/// A location in source code
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Location {
    /// File path
    pub file: String,
    /// 1-indexed line number
    pub line: u32,
    /// 1-indexed column number
    pub column: u32,
    /// Byte offset start
    pub start: u32,
    /// Byte offset end
    pub end: u32,
}

impl Location {
    pub fn new(file: impl Into<String>, line: u32, column: u32, start: u32, end: u32) -> Self {
        Self {
            file: file.into(),
            line,
            column,
            start,
            end,
        }
    }
}

/// A text edit
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Edit {
    /// Byte offset start
    pub start: u32,
    /// Byte offset end
    pub end: u32,
    /// Replacement text
    pub replacement: String,
}

impl Edit {
    pub fn new(start: u32, end: u32, replacement: impl Into<String>) -> Self {
        Self {
            start,
            end,
            replacement: replacement.into(),
        }
    }

    /// Create an insertion at a position
    pub fn insert(pos: u32, text: impl Into<String>) -> Self {
        Self::new(pos, pos, text)
    }

    /// Create a deletion of a range
    pub fn delete(start: u32, end: u32) -> Self {
        Self::new(start, end, "")
    }
}

/// Whether a fix preserves program behavior unconditionally
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Applicability {
    /// Always preserves behavior, applied with `--write`
    Safe,
    /// May change behavior or formatting, requires `--write --unsafe`
    Unsafe,
}

/// A suggested rewrite for an issue
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fix {
    /// Description of what this fix does
    pub message: String,
    pub applicability: Applicability,
    /// Edits to apply, non-overlapping within one fix
    pub edits: Vec<Edit>,
}

/// A reported lint finding
///
/// Issues carry raw message arguments instead of a formatted string; the
/// text is rendered once at output time (see `messages::format_message`).
#[derive(Debug, Clone)]
pub struct Issue {
    pub id: RuleId,
    pub severity: Severity,
    pub location: Location,
    pub arg_int1: i64,
    pub arg_int2: i64,
    pub arg_str: String,
    pub fix: Option<Fix>,
    /// Set when the fix was actually applied to the file
    pub fixed: bool,
}

impl Issue {
    pub fn new(id: RuleId, severity: Severity, location: Location) -> Self {
        Self {
            id,
            severity,
            location,
            arg_int1: 0,
            arg_int2: 0,
            arg_str: String::new(),
            fix: None,
            fixed: false,
        }
    }

    pub fn with_ints(mut self, a: i64, b: i64) -> Self {
        self.arg_int1 = a;
        self.arg_int2 = b;
        self
    }

    pub fn with_str(mut self, s: impl Into<String>) -> Self {
        self.arg_str = s.into();
        self
    }

    pub fn with_fix(mut self, fix: Fix) -> Self {
        self.fix = Some(fix);
        self
    }

    /// The rendered human-readable message
    pub fn message(&self) -> String {
        messages::format_message(self)
    }
}
