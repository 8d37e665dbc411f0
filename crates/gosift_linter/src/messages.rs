//! Rule identifiers and message formatting
//!
//! Every rule has a stable numeric id and a kebab-case name. Issues carry
//! the id plus raw arguments; the human-readable message is rendered here,
//! at output time, so workers never allocate formatted strings.

use std::fmt;

use crate::issue::Issue;

/// Stable rule identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u16)]
pub enum RuleId {
    NoDotImports = 10,
    ErrorStringFormat = 20,
    MaxParams = 30,
    NoDeferInLoop = 31,
    AlwaysPreferConst = 32,
    PreferIncDec = 40,
    MaxFuncLines = 50,
    EmptyBlock = 60,
}

impl RuleId {
    pub fn code(&self) -> u16 {
        *self as u16
    }

    /// The rule name used in config files and output
    pub fn name(&self) -> &'static str {
        match self {
            RuleId::NoDotImports => "no-dot-imports",
            RuleId::ErrorStringFormat => "error-string-format",
            RuleId::MaxParams => "max-params",
            RuleId::NoDeferInLoop => "no-defer-in-loop",
            RuleId::AlwaysPreferConst => "always-prefer-const",
            RuleId::PreferIncDec => "prefer-inc-dec",
            RuleId::MaxFuncLines => "max-func-lines",
            RuleId::EmptyBlock => "empty-block",
        }
    }
}

impl fmt::Display for RuleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Render the message for an issue from its rule id and arguments
pub fn format_message(issue: &Issue) -> String {
    match issue.id {
        RuleId::NoDotImports => {
            format!("dot import of \"{}\" pollutes the package namespace", issue.arg_str)
        }
        RuleId::ErrorStringFormat => {
            "error string should not be capitalized or end with punctuation".to_string()
        }
        RuleId::MaxParams => format!(
            "function {} has {} parameters, limit is {}",
            issue.arg_str, issue.arg_int1, issue.arg_int2
        ),
        RuleId::NoDeferInLoop => {
            "defer inside a loop runs only when the function returns".to_string()
        }
        RuleId::AlwaysPreferConst => {
            format!("{} is never mutated, declare it as const", issue.arg_str)
        }
        RuleId::PreferIncDec => {
            format!("use {}{} instead", issue.arg_str, if issue.arg_int1 >= 0 { "++" } else { "--" })
        }
        RuleId::MaxFuncLines => format!(
            "function {} spans {} lines, limit is {}",
            issue.arg_str, issue.arg_int1, issue.arg_int2
        ),
        RuleId::EmptyBlock => "empty block".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::issue::Location;
    use crate::severity::Severity;

    fn make(id: RuleId) -> Issue {
        Issue {
            id,
            severity: Severity::Warning,
            location: Location::new("a.go", 3, 1, 20, 25),
            arg_int1: 0,
            arg_int2: 0,
            arg_str: String::new(),
            fix: None,
            fixed: false,
        }
    }

    #[test]
    fn formats_arity_two_message() {
        let mut issue = make(RuleId::MaxParams);
        issue.arg_str = "handle".to_string();
        issue.arg_int1 = 7;
        issue.arg_int2 = 5;
        assert_eq!(
            format_message(&issue),
            "function handle has 7 parameters, limit is 5"
        );
    }

    #[test]
    fn formats_no_arg_message() {
        let issue = make(RuleId::EmptyBlock);
        assert_eq!(format_message(&issue), "empty block");
    }

    #[test]
    fn rule_codes_are_stable() {
        assert_eq!(RuleId::NoDotImports.code(), 10);
        assert_eq!(RuleId::AlwaysPreferConst.code(), 32);
        assert_eq!(RuleId::EmptyBlock.code(), 60);
    }
}
