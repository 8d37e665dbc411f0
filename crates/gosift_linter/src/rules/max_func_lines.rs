//! max-func-lines: limit on function body length

use gosift_parser::NodeKind;

use crate::context::LintContext;
use crate::issue::Issue;
use crate::messages::RuleId;
use crate::rule::{Node, Rule};

const DEFAULT_LIMIT: u32 = 60;

pub struct MaxFuncLines;

impl Rule for MaxFuncLines {
    fn id(&self) -> RuleId {
        RuleId::MaxFuncLines
    }

    fn targets(&self) -> &'static [NodeKind] {
        &[NodeKind::FuncDecl]
    }

    fn check<'a>(&self, ctx: &mut LintContext<'a>, node: Node<'a>) {
        let Node::FuncDecl(func) = node else { return };
        let Some(body) = &func.body else { return };

        let limit = ctx.limit(self.id(), DEFAULT_LIMIT);
        let lines = ctx.span_lines(body.span);
        if lines <= limit {
            return;
        }

        let severity = ctx.severity(self.id(), self.default_severity());
        let location = ctx.location(func.name.span);
        ctx.report(
            Issue::new(self.id(), severity, location)
                .with_str(func.name.name)
                .with_ints(lines as i64, limit as i64),
        );
    }
}
