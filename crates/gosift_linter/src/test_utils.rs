//! Shared helpers for rule tests

use std::path::Path;

use gosift_parser::Parser;

use crate::config::{Config, RuleSetting};
use crate::context::{IssueBudget, LineIndex, LintContext};
use crate::fixer;
use crate::issue::Issue;
use crate::messages::RuleId;
use crate::mutation::MutatedBindings;
use crate::rule::Rule;

/// Run one rule over one file and collect its issues
pub fn check_with(rule: Box<dyn Rule>, source: &str) -> Vec<Issue> {
    check_with_config(rule, source, &Config::all_rules())
}

pub fn check_with_config(rule: Box<dyn Rule>, source: &str, config: &Config) -> Vec<Issue> {
    let file = match Parser::new(source).parse() {
        Ok(f) => f,
        Err(e) => panic!("parse errors in test source: {:?}", e),
    };

    let refs = [(0u32, &file)];
    let mutated = MutatedBindings::analyze(&refs);
    let lines = LineIndex::new(source);
    let budget = IssueBudget::new(None);
    let mut ctx = LintContext::new(
        source,
        Path::new("test.go"),
        0,
        &lines,
        config,
        &mutated,
        &budget,
    );

    let targets = rule.targets();
    crate::walker::walk_file(&file, &mut |node| {
        if targets.contains(&node.kind()) {
            rule.check(&mut ctx, node);
        }
        true
    });

    ctx.issues
}

/// A full-rules config with one rule's limit overridden
pub fn config_with_limit(id: RuleId, limit: u32) -> Config {
    let mut config = Config::all_rules();
    let group = config.groups.get_mut("default").unwrap();
    group.rules.insert(
        id.name().to_string(),
        RuleSetting {
            severity: None,
            limit: Some(limit),
        },
    );
    config
}

pub fn assert_issue(rule: Box<dyn Rule>, source: &str, expected: RuleId) {
    let issues = check_with(rule, source);
    let found = issues.iter().any(|i| i.id == expected);
    if !found {
        let ids: Vec<_> = issues.iter().map(|i| i.id).collect();
        panic!("expected issue {}, found: {:?}", expected, ids);
    }
}

pub fn assert_clean(rule: Box<dyn Rule>, source: &str) {
    let issues = check_with(rule, source);
    if !issues.is_empty() {
        let msgs: Vec<_> = issues
            .iter()
            .map(|i| format!("[{}] {}", i.id, i.message()))
            .collect();
        panic!("expected no issues, found: {:?}", msgs);
    }
}

/// Check, apply fixes, and compare the rewritten source
pub fn assert_fix(rule: Box<dyn Rule>, source: &str, allow_unsafe: bool, expected: &str) {
    let mut issues = check_with(rule, source);
    let fixed = fixer::apply_fixes(source, &mut issues, allow_unsafe)
        .unwrap_or_else(|| source.to_string());
    assert_eq!(fixed, expected, "fixed source does not match");
}

/// The rule's fix must not apply without the unsafe opt-in
pub fn assert_no_fix_applied(rule: Box<dyn Rule>, source: &str) {
    let mut issues = check_with(rule, source);
    assert!(
        fixer::apply_fixes(source, &mut issues, false).is_none(),
        "fix applied without the unsafe opt-in"
    );
}
