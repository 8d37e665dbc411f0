//! no-dot-imports: flag `import . "pkg"`
//!
//! Dot imports merge another package's exported names into the current
//! file's scope, which makes every unqualified call ambiguous to readers.

use gosift_parser::NodeKind;

use crate::context::LintContext;
use crate::issue::Issue;
use crate::messages::RuleId;
use crate::rule::{Node, Rule};

pub struct NoDotImports;

impl Rule for NoDotImports {
    fn id(&self) -> RuleId {
        RuleId::NoDotImports
    }

    fn targets(&self) -> &'static [NodeKind] {
        &[NodeKind::ImportSpec]
    }

    fn check<'a>(&self, ctx: &mut LintContext<'a>, node: Node<'a>) {
        let Node::ImportSpec(spec) = node else { return };
        let Some(alias) = &spec.alias else { return };
        if alias.name != "." {
            return;
        }

        let severity = ctx.severity(self.id(), self.default_severity());
        let location = ctx.location(spec.span);
        ctx.report(Issue::new(self.id(), severity, location).with_str(spec.path.trim_matches('"')));
    }
}
