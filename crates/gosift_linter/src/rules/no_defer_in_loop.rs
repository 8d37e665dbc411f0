//! no-defer-in-loop: `defer` inside `for` bodies
//!
//! A defer in a loop does not run per iteration; it piles up until the
//! surrounding function returns, which leaks descriptors in the common
//! open-inside-loop pattern. Defers inside function literals are fine
//! since the literal is the deferring function.

use gosift_parser::{Block, NodeKind, Stmt};

use crate::context::LintContext;
use crate::issue::Issue;
use crate::messages::RuleId;
use crate::rule::{Node, Rule};

pub struct NoDeferInLoop;

impl Rule for NoDeferInLoop {
    fn id(&self) -> RuleId {
        RuleId::NoDeferInLoop
    }

    fn targets(&self) -> &'static [NodeKind] {
        &[NodeKind::ForStmt, NodeKind::RangeStmt]
    }

    fn check<'a>(&self, ctx: &mut LintContext<'a>, node: Node<'a>) {
        let Node::Stmt(stmt) = node else { return };
        let body = match stmt {
            Stmt::For { body, .. } | Stmt::Range { body, .. } => body,
            _ => return,
        };

        let mut found = Vec::new();
        for stmt in &body.stmts {
            collect_defers(stmt, &mut found);
        }

        let severity = ctx.severity(self.id(), self.default_severity());
        for span in found {
            let location = ctx.location(span);
            ctx.report(Issue::new(self.id(), severity, location));
        }
    }
}

/// Find defers under a statement without descending into nested loops
/// (they report for themselves) or function literals (the literal is the
/// function the defer attaches to; literals live in expressions, which
/// this scan never enters).
fn collect_defers(stmt: &Stmt<'_>, found: &mut Vec<gosift_lexer::Span>) {
    let mut in_block = |block: &Block<'_>, found: &mut Vec<gosift_lexer::Span>| {
        for stmt in &block.stmts {
            collect_defers(stmt, found);
        }
    };

    match stmt {
        Stmt::Defer { span, .. } => found.push(*span),
        Stmt::If { then, els, .. } => {
            in_block(then, found);
            if let Some(els) = els {
                collect_defers(els, found);
            }
        }
        Stmt::Switch { cases, .. } => {
            for case in cases {
                for stmt in &case.body {
                    collect_defers(stmt, found);
                }
            }
        }
        Stmt::Select { cases, .. } => {
            for case in cases {
                for stmt in &case.body {
                    collect_defers(stmt, found);
                }
            }
        }
        Stmt::Block(b) => in_block(b, found),
        _ => {}
    }
}
