//! always-prefer-const: `var` bindings that could be `const`
//!
//! Fires on `var` declarations initialized from constant literals whose
//! bindings are never written anywhere in the unit, per the mutation
//! pre-pass. When the pass was skipped (a parse failure elsewhere in the
//! unit) every binding reads as mutated, so the rule goes quiet instead
//! of guessing.

use gosift_parser::{Expr, LitKind, NodeKind, UnaryOp, ValueKeyword, ValueSpec};

use crate::context::LintContext;
use crate::issue::{Applicability, Edit, Fix, Issue};
use crate::messages::RuleId;
use crate::rule::{Node, Rule};

pub struct AlwaysPreferConst;

impl Rule for AlwaysPreferConst {
    fn id(&self) -> RuleId {
        RuleId::AlwaysPreferConst
    }

    fn targets(&self) -> &'static [NodeKind] {
        &[NodeKind::ValueSpec]
    }

    fn check<'a>(&self, ctx: &mut LintContext<'a>, node: Node<'a>) {
        let Node::ValueSpec(spec) = node else { return };
        if spec.keyword != ValueKeyword::Var {
            return;
        }
        if spec.values.len() != spec.names.len() {
            return;
        }
        if !spec.values.iter().all(is_const_expr) {
            return;
        }
        if spec
            .names
            .iter()
            .any(|name| name.name == "_" || ctx.is_mutated(name.span.start))
        {
            return;
        }

        let severity = ctx.severity(self.id(), self.default_severity());
        let location = ctx.location(spec.span);
        let mut issue = Issue::new(self.id(), severity, location).with_str(names_list(spec));

        // For a grouped spec the keyword belongs to the whole block, so
        // only a standalone `var` gets the mechanical rewrite.
        if !spec.grouped {
            issue = issue.with_fix(Fix {
                message: "declare as const".to_string(),
                applicability: Applicability::Safe,
                edits: vec![Edit::new(
                    spec.keyword_span.start,
                    spec.keyword_span.end,
                    "const",
                )],
            });
        }

        ctx.report(issue);
    }
}

/// Literal, or a sign applied to a literal. Identifiers are excluded
/// since they may name non-constant values.
fn is_const_expr(expr: &Expr<'_>) -> bool {
    match expr {
        Expr::BasicLit { kind, .. } => !matches!(kind, LitKind::Imag),
        Expr::Unary {
            op: UnaryOp::Neg | UnaryOp::Pos,
            operand,
            ..
        } => is_const_expr(operand),
        Expr::Paren { inner, .. } => is_const_expr(inner),
        _ => false,
    }
}

fn names_list(spec: &ValueSpec<'_>) -> String {
    spec.names
        .iter()
        .map(|n| n.name)
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{assert_clean, assert_fix, assert_issue};

    #[test]
    fn flags_unmutated_literal_var() {
        assert_issue(
            Box::new(AlwaysPreferConst),
            "package p\n\nvar retries = 3\n\nfunc f() {\n\tuse(retries)\n}\n",
            RuleId::AlwaysPreferConst,
        );
    }

    #[test]
    fn rewrites_var_to_const() {
        assert_fix(
            Box::new(AlwaysPreferConst),
            "package p\n\nvar name = \"gosift\"\n",
            false,
            "package p\n\nconst name = \"gosift\"\n",
        );
    }

    #[test]
    fn mutated_var_is_fine() {
        assert_clean(
            Box::new(AlwaysPreferConst),
            "package p\n\nvar count = 0\n\nfunc bump() {\n\tcount++\n}\n",
        );
    }

    #[test]
    fn address_taken_var_is_fine() {
        assert_clean(
            Box::new(AlwaysPreferConst),
            "package p\n\nvar flag = 1\n\nfunc f() {\n\tg(&flag)\n}\n",
        );
    }

    #[test]
    fn non_literal_initializer_is_fine() {
        assert_clean(
            Box::new(AlwaysPreferConst),
            "package p\n\nvar start = now()\n",
        );
    }

    #[test]
    fn grouped_spec_reports_without_fix() {
        // The issue fires but the source is left untouched
        let src = "package p\n\nvar (\n\ta = 1\n\tb = 2\n)\n";
        assert_issue(Box::new(AlwaysPreferConst), src, RuleId::AlwaysPreferConst);
        assert_fix(Box::new(AlwaysPreferConst), src, false, src);
    }

    #[test]
    fn local_vars_are_checked_too() {
        assert_issue(
            Box::new(AlwaysPreferConst),
            "package p\n\nfunc f() {\n\tvar limit = 10\n\tuse(limit)\n}\n",
            RuleId::AlwaysPreferConst,
        );
    }

    #[test]
    fn var_reassigned_in_select_is_fine() {
        assert_clean(
            Box::new(AlwaysPreferConst),
            "package p\n\nfunc f(ch chan int) {\n\tvar timeout = 30\n\tselect {\n\tcase timeout = <-ch:\n\t\tuse(timeout)\n\tdefault:\n\t}\n}\n",
        );
    }

    #[test]
    fn var_addressed_inside_composite_is_fine() {
        assert_clean(
            Box::new(AlwaysPreferConst),
            "package p\n\nfunc f() {\n\tvar x = 1\n\tuse([]*int{&x})\n}\n",
        );
    }
}
