//! Built-in rules
//!
//! Rule files are flat, one per rule, named after the rule. New rules
//! register by adding a `RuleId` variant and an arm in `build`.

mod always_prefer_const;
mod empty_block;
mod error_string_format;
mod max_func_lines;
mod max_params;
mod no_defer_in_loop;
mod no_dot_imports;
mod prefer_inc_dec;

pub use always_prefer_const::AlwaysPreferConst;
pub use empty_block::EmptyBlock;
pub use error_string_format::ErrorStringFormat;
pub use max_func_lines::MaxFuncLines;
pub use max_params::MaxParams;
pub use no_defer_in_loop::NoDeferInLoop;
pub use no_dot_imports::NoDotImports;
pub use prefer_inc_dec::PreferIncDec;

use crate::config::{Config, ALL_RULES};
use crate::messages::RuleId;
use crate::rule::Rule;

/// Instantiate the rules the config enables, in stable id order
pub fn enabled_rules(config: &Config) -> Vec<Box<dyn Rule>> {
    ALL_RULES
        .iter()
        .filter(|id| config.rule_setting(**id).is_some())
        .map(|id| build(*id))
        .collect()
}

fn build(id: RuleId) -> Box<dyn Rule> {
    match id {
        RuleId::NoDotImports => Box::new(NoDotImports),
        RuleId::ErrorStringFormat => Box::new(ErrorStringFormat::new()),
        RuleId::MaxParams => Box::new(MaxParams),
        RuleId::NoDeferInLoop => Box::new(NoDeferInLoop),
        RuleId::AlwaysPreferConst => Box::new(AlwaysPreferConst),
        RuleId::PreferIncDec => Box::new(PreferIncDec),
        RuleId::MaxFuncLines => Box::new(MaxFuncLines),
        RuleId::EmptyBlock => Box::new(EmptyBlock),
    }
}
