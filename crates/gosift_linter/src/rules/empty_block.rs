//! empty-block: control-flow bodies with nothing in them
//!
//! An empty `if`/`for` body is usually a leftover from a refactor or a
//! misplaced semicolon. Empty function bodies are deliberate often
//! enough (interface stubs, no-op callbacks) that they are left alone.

use gosift_parser::{Block, NodeKind, Stmt};

use crate::context::LintContext;
use crate::issue::Issue;
use crate::messages::RuleId;
use crate::rule::{Node, Rule};

pub struct EmptyBlock;

impl Rule for EmptyBlock {
    fn id(&self) -> RuleId {
        RuleId::EmptyBlock
    }

    fn targets(&self) -> &'static [NodeKind] {
        &[NodeKind::IfStmt, NodeKind::ForStmt, NodeKind::RangeStmt]
    }

    fn check<'a>(&self, ctx: &mut LintContext<'a>, node: Node<'a>) {
        let Node::Stmt(stmt) = node else { return };

        let body = match stmt {
            Stmt::If { then, els, .. } => {
                if let Some(Stmt::Block(els_block)) = els.as_deref() {
                    if is_empty(els_block) {
                        report(ctx, self, els_block);
                    }
                }
                then
            }
            Stmt::For { body, .. } | Stmt::Range { body, .. } => body,
            _ => return,
        };

        if is_empty(body) {
            report(ctx, self, body);
        }
    }
}

/// Empty, or nothing but empty statements
fn is_empty(block: &Block<'_>) -> bool {
    block.stmts.iter().all(|s| matches!(s, Stmt::Empty { .. }))
}

fn report(ctx: &mut LintContext<'_>, rule: &EmptyBlock, block: &Block<'_>) {
    let severity = ctx.severity(rule.id(), rule.default_severity());
    let location = ctx.location(block.span);
    ctx.report(Issue::new(rule.id(), severity, location));
}
