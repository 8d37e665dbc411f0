//! error-string-format: style of `errors.New` / `fmt.Errorf` strings
//!
//! Error strings get wrapped and composed ("doing x: <msg>"), so they
//! should read mid-sentence: no leading capital followed by lowercase,
//! no trailing punctuation. Leading acronyms like "HTTP" are left alone.

use gosift_parser::{Expr, LitKind, NodeKind};
use once_cell::unsync::OnceCell;
use regex::Regex;

use crate::context::LintContext;
use crate::issue::Issue;
use crate::messages::RuleId;
use crate::rule::{Node, Rule};

pub struct ErrorStringFormat {
    capitalized: OnceCell<Regex>,
}

impl ErrorStringFormat {
    pub fn new() -> Self {
        Self {
            capitalized: OnceCell::new(),
        }
    }

    fn is_capitalized(&self, text: &str) -> bool {
        let re = self
            .capitalized
            .get_or_init(|| Regex::new(r"^[A-Z][a-z]").unwrap());
        re.is_match(text)
    }
}

impl Default for ErrorStringFormat {
    fn default() -> Self {
        Self::new()
    }
}

impl Rule for ErrorStringFormat {
    fn id(&self) -> RuleId {
        RuleId::ErrorStringFormat
    }

    fn targets(&self) -> &'static [NodeKind] {
        &[NodeKind::CallExpr]
    }

    fn check<'a>(&self, ctx: &mut LintContext<'a>, node: Node<'a>) {
        let Node::Expr(Expr::Call { fun, args, .. }) = node else {
            return;
        };
        if !is_error_constructor(fun) {
            return;
        }
        let Some(Expr::BasicLit {
            kind: LitKind::String,
            value,
            span,
        }) = args.first()
        else {
            return;
        };

        let text = value.trim_matches(|c| c == '"' || c == '`');
        if text.is_empty() {
            return;
        }

        let bad_start = self.is_capitalized(text);
        let bad_end = text.ends_with(['.', '!', '?', ':', ';']);
        if !bad_start && !bad_end {
            return;
        }

        let severity = ctx.severity(self.id(), self.default_severity());
        let location = ctx.location(*span);
        ctx.report(Issue::new(self.id(), severity, location));
    }
}

/// `errors.New(...)` or `fmt.Errorf(...)`
fn is_error_constructor(fun: &Expr<'_>) -> bool {
    let Expr::Selector { recv, sel, .. } = fun else {
        return false;
    };
    let Some(pkg) = recv.as_ident() else {
        return false;
    };
    matches!(
        (pkg.name, sel.name),
        ("errors", "New") | ("fmt", "Errorf")
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{assert_clean, assert_issue};

    #[test]
    fn flags_capitalized_error_string() {
        assert_issue(
            Box::new(ErrorStringFormat::new()),
            "package p\n\nimport \"errors\"\n\nvar errBad = errors.New(\"Something broke\")\n",
            RuleId::ErrorStringFormat,
        );
    }

    #[test]
    fn flags_trailing_punctuation() {
        assert_issue(
            Box::new(ErrorStringFormat::new()),
            "package p\n\nimport \"fmt\"\n\nfunc f() error {\n\treturn fmt.Errorf(\"timed out.\")\n}\n",
            RuleId::ErrorStringFormat,
        );
    }

    #[test]
    fn flags_trailing_colon_and_semicolon() {
        assert_issue(
            Box::new(ErrorStringFormat::new()),
            "package p\n\nimport \"errors\"\n\nvar errBad = errors.New(\"failed to open:\")\n",
            RuleId::ErrorStringFormat,
        );
        assert_issue(
            Box::new(ErrorStringFormat::new()),
            "package p\n\nimport \"errors\"\n\nvar errBad = errors.New(\"failed to open;\")\n",
            RuleId::ErrorStringFormat,
        );
    }

    #[test]
    fn lowercase_error_string_is_fine() {
        assert_clean(
            Box::new(ErrorStringFormat::new()),
            "package p\n\nimport \"errors\"\n\nvar errOk = errors.New(\"connection refused\")\n",
        );
    }

    #[test]
    fn leading_acronym_is_fine() {
        assert_clean(
            Box::new(ErrorStringFormat::new()),
            "package p\n\nimport \"errors\"\n\nvar errOk = errors.New(\"HTTP status unexpected\")\n",
        );
    }

    #[test]
    fn unrelated_calls_are_ignored() {
        assert_clean(
            Box::new(ErrorStringFormat::new()),
            "package p\n\nimport \"fmt\"\n\nfunc f() {\n\tfmt.Println(\"All done.\")\n}\n",
        );
    }
}
