//! Rule registry and node-kind dispatch
//!
//! The registry maps each node kind to the indices of rules that asked
//! for it, so traversal touches only interested rules. Registration
//! order is fixed by the rule table, which keeps issue order within a
//! file deterministic regardless of config layout.

use gosift_parser::NodeKind;
use rustc_hash::FxHashMap;
use smallvec::SmallVec;

use crate::config::Config;
use crate::context::LintContext;
use crate::rule::{Node, Rule};

pub struct Registry {
    rules: Vec<Box<dyn Rule>>,
    by_kind: FxHashMap<NodeKind, SmallVec<[u16; 4]>>,
}

impl Registry {
    /// Build a registry containing the rules the config enables.
    ///
    /// Each worker builds its own registry, so rule instances are never
    /// shared between threads.
    pub fn build(config: &Config) -> Self {
        let rules = crate::rules::enabled_rules(config);

        let mut by_kind: FxHashMap<NodeKind, SmallVec<[u16; 4]>> = FxHashMap::default();
        for (index, rule) in rules.iter().enumerate() {
            for kind in rule.targets() {
                by_kind.entry(*kind).or_default().push(index as u16);
            }
        }

        Self { rules, by_kind }
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    /// Run every rule registered for this node's kind
    pub fn dispatch<'a>(&self, ctx: &mut LintContext<'a>, node: Node<'a>) {
        let Some(indices) = self.by_kind.get(&node.kind()) else {
            return;
        };
        for &index in indices {
            if ctx.should_stop() {
                return;
            }
            self.rules[index as usize].check(ctx, node);
        }
    }
}
