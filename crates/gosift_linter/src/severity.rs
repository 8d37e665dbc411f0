//! Issue severity levels

use std::fmt;

use serde::Deserialize;

/// Severity of a reported issue
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Info,
    Warning,
    Error,
}

impl Severity {
    /// Parse a severity name, falling back to `Warning` for anything
    /// unrecognized so a typo in a config never disables a rule.
    pub fn parse(name: &str) -> Severity {
        match name {
            "info" => Severity::Info,
            "error" => Severity::Error,
            _ => Severity::Warning,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Info => "info",
            Severity::Warning => "warning",
            Severity::Error => "error",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_falls_back_to_warning() {
        assert_eq!(Severity::parse("error"), Severity::Error);
        assert_eq!(Severity::parse("info"), Severity::Info);
        assert_eq!(Severity::parse("warning"), Severity::Warning);
        assert_eq!(Severity::parse("banana"), Severity::Warning);
    }

    #[test]
    fn ordering_puts_error_last() {
        assert!(Severity::Error > Severity::Warning);
        assert!(Severity::Warning > Severity::Info);
    }
}
