//! prefer-inc-dec: `x += 1` and `x -= 1` as `x++` / `x--`

use gosift_parser::{AssignOp, Expr, LitKind, NodeKind, Stmt};

use crate::context::LintContext;
use crate::issue::{Applicability, Edit, Fix, Issue};
use crate::messages::RuleId;
use crate::rule::{Node, Rule};

pub struct PreferIncDec;

impl Rule for PreferIncDec {
    fn id(&self) -> RuleId {
        RuleId::PreferIncDec
    }

    fn targets(&self) -> &'static [NodeKind] {
        &[NodeKind::AssignStmt]
    }

    fn check<'a>(&self, ctx: &mut LintContext<'a>, node: Node<'a>) {
        let Node::Stmt(Stmt::Assign {
            lhs, op, rhs, span, ..
        }) = node
        else {
            return;
        };

        let is_inc = match op {
            AssignOp::Add => true,
            AssignOp::Sub => false,
            _ => return,
        };
        let [target] = lhs.as_slice() else { return };
        // Indexed targets keep the compound form
        if matches!(target, Expr::Index { .. }) {
            return;
        }
        let [Expr::BasicLit {
            kind: LitKind::Int,
            value,
            ..
        }] = rhs.as_slice()
        else {
            return;
        };
        if *value != "1" {
            return;
        }

        let operator = if is_inc { "++" } else { "--" };
        let target_span = target.span();

        let severity = ctx.severity(self.id(), self.default_severity());
        let location = ctx.location(*span);
        ctx.report(
            Issue::new(self.id(), severity, location)
                .with_str(ctx.text(target_span))
                .with_ints(if is_inc { 1 } else { -1 }, 0)
                .with_fix(Fix {
                    message: format!("replace with {}", operator),
                    applicability: Applicability::Safe,
                    edits: vec![Edit::new(target_span.end, span.end, operator)],
                }),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{assert_clean, assert_fix};

    #[test]
    fn rewrites_plus_one() {
        assert_fix(
            Box::new(PreferIncDec),
            "package p\n\nfunc f() {\n\tn := 0\n\tn += 1\n}\n",
            false,
            "package p\n\nfunc f() {\n\tn := 0\n\tn++\n}\n",
        );
    }

    #[test]
    fn rewrites_minus_one() {
        assert_fix(
            Box::new(PreferIncDec),
            "package p\n\nfunc f(n int) {\n\tn -= 1\n}\n",
            false,
            "package p\n\nfunc f(n int) {\n\tn--\n}\n",
        );
    }

    #[test]
    fn indexed_target_is_skipped() {
        assert_clean(
            Box::new(PreferIncDec),
            "package p\n\nfunc f(xs []int) {\n\txs[0] += 1\n}\n",
        );
    }

    #[test]
    fn other_amounts_are_fine() {
        assert_clean(
            Box::new(PreferIncDec),
            "package p\n\nfunc f(n int) {\n\tn += 2\n\tn -= 10\n}\n",
        );
    }

    #[test]
    fn plain_assignment_is_fine() {
        assert_clean(
            Box::new(PreferIncDec),
            "package p\n\nfunc f(n int) {\n\tn = 1\n}\n",
        );
    }
}
