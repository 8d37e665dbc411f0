//! gosift linter core
//!
//! Rule engine and concurrent analysis pipeline. The flow: a producer
//! walks the roots and groups Go files into per-directory units, a
//! worker pool parses and checks each unit (mutation pre-pass first,
//! then node-kind dispatch over registered rules), and the caller
//! aggregates issues up to a global cap. Fix application rewrites files
//! in place when enabled.

pub mod checker;
pub mod config;
pub mod context;
pub mod error;
pub mod fixer;
mod fs;
pub mod issue;
pub mod messages;
pub mod mutation;
pub mod pipeline;
pub mod registry;
pub mod rule;
pub mod rules;
pub mod severity;
mod walker;

#[cfg(test)]
mod test_utils;

#[cfg(test)]
#[path = "pipeline_tests.rs"]
mod pipeline_tests;

pub use config::Config;
pub use context::{IssueBudget, LintContext};
pub use error::LintError;
pub use issue::{Applicability, Edit, Fix, Issue, Location};
pub use messages::{format_message, RuleId};
pub use pipeline::{CancelToken, LintReport, Linter};
pub use rule::{Node, Rule};
pub use severity::Severity;
