//! max-params: limit on function parameter count
//!
//! Offers an unsafe rewrite that bundles the parameters into an options
//! struct. The rewrite only changes the signature, not the call sites or
//! the body, so it is gated behind `--unsafe`.

use gosift_parser::{FuncDecl, NodeKind};

use crate::context::LintContext;
use crate::issue::{Applicability, Edit, Fix, Issue};
use crate::messages::RuleId;
use crate::rule::{Node, Rule};

const DEFAULT_LIMIT: u32 = 5;

pub struct MaxParams;

impl Rule for MaxParams {
    fn id(&self) -> RuleId {
        RuleId::MaxParams
    }

    fn targets(&self) -> &'static [NodeKind] {
        &[NodeKind::FuncDecl]
    }

    fn check<'a>(&self, ctx: &mut LintContext<'a>, node: Node<'a>) {
        let Node::FuncDecl(func) = node else { return };

        let limit = ctx.limit(self.id(), DEFAULT_LIMIT);
        let count = func.param_count() as u32;
        if count <= limit {
            return;
        }

        let severity = ctx.severity(self.id(), self.default_severity());
        let location = ctx.location(func.params_span);
        let mut issue = Issue::new(self.id(), severity, location)
            .with_str(func.name.name)
            .with_ints(count as i64, limit as i64);

        if let Some(fix) = build_struct_fix(ctx, func) {
            issue = issue.with_fix(fix);
        }

        ctx.report(issue);
    }
}

/// Rewrite `func f(a A, b B, ...)` into a single-struct signature with a
/// generated params type declared right above the function. Only
/// possible when every parameter is named and none is variadic.
fn build_struct_fix(ctx: &LintContext<'_>, func: &FuncDecl<'_>) -> Option<Fix> {
    if func.params.is_empty() {
        return None;
    }
    for param in &func.params {
        if param.names.is_empty() || param.variadic {
            return None;
        }
    }

    let type_name = params_type_name(func.name.name);

    let mut decl = String::with_capacity(64);
    decl.push_str("type ");
    decl.push_str(&type_name);
    decl.push_str(" struct {\n");
    for param in &func.params {
        let ty = ctx.text(param.ty_span);
        for name in &param.names {
            decl.push('\t');
            decl.push_str(name.name);
            decl.push(' ');
            decl.push_str(ty);
            decl.push('\n');
        }
    }
    decl.push_str("}\n\n");

    let signature = format!("(p {})", type_name);

    Some(Fix {
        message: format!("bundle parameters into {}", type_name),
        applicability: Applicability::Unsafe,
        edits: vec![
            Edit::insert(func.span.start, decl),
            Edit::new(func.params_span.start, func.params_span.end, signature),
        ],
    })
}

fn params_type_name(func_name: &str) -> String {
    let mut chars = func_name.chars();
    let mut name: String = match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    };
    name.push_str("Params");
    name
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{assert_clean, assert_fix, assert_issue, assert_no_fix_applied};

    const WIDE: &str =
        "package p\n\nfunc handle(a int, b int, c int, d int, e int, f int) {\n\tuse(a)\n}\n";

    #[test]
    fn flags_too_many_params() {
        assert_issue(Box::new(MaxParams), WIDE, RuleId::MaxParams);
    }

    #[test]
    fn five_params_are_fine() {
        assert_clean(
            Box::new(MaxParams),
            "package p\n\nfunc ok(a, b, c, d, e int) {}\n",
        );
    }

    #[test]
    fn unsafe_fix_requires_opt_in() {
        assert_no_fix_applied(Box::new(MaxParams), WIDE);
    }

    #[test]
    fn unsafe_fix_bundles_params() {
        let expected = "package p\n\ntype HandleParams struct {\n\ta int\n\tb int\n\tc int\n\td int\n\te int\n\tf int\n}\n\nfunc handle(p HandleParams) {\n\tuse(a)\n}\n";
        assert_fix(Box::new(MaxParams), WIDE, true, expected);
    }

    #[test]
    fn variadic_gets_no_fix() {
        let src = "package p\n\nfunc v(a, b, c, d, e int, rest ...string) {}\n";
        assert_issue(Box::new(MaxParams), src, RuleId::MaxParams);
        assert_no_fix_applied(Box::new(MaxParams), src);
    }

    #[test]
    fn type_name_is_exported() {
        assert_eq!(params_type_name("handle"), "HandleParams");
        assert_eq!(params_type_name("Serve"), "ServeParams");
    }
}
