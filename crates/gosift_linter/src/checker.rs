//! Unit analysis
//!
//! A unit is one directory's worth of Go files, analyzed together so the
//! mutation pre-pass sees the whole package scope. Files that fail to
//! parse are reported and dropped; the remaining files still run, with
//! the mutation pass degraded to its conservative answer since it could
//! not see the whole unit.

use std::path::PathBuf;

use gosift_parser::{File, Parser};
use tracing::{debug, warn};

use crate::config::Config;
use crate::context::{IssueBudget, LineIndex, LintContext};
use crate::error::LintError;
use crate::fixer;
use crate::fs::read_file_fast;
use crate::issue::Issue;
use crate::mutation::MutatedBindings;
use crate::registry::Registry;

pub struct CheckOptions<'c> {
    pub config: &'c Config,
    /// Apply fixes and rewrite files on disk
    pub write: bool,
    /// Allow fixes marked unsafe
    pub allow_unsafe: bool,
}

#[derive(Debug, Default)]
pub struct UnitOutcome {
    pub issues: Vec<Issue>,
    pub errors: Vec<LintError>,
    pub files_checked: usize,
    pub files_fixed: usize,
}

/// Analyze every file of one unit
pub fn analyze_unit(
    paths: &[PathBuf],
    opts: &CheckOptions<'_>,
    registry: &Registry,
    budget: &IssueBudget,
) -> UnitOutcome {
    let mut outcome = UnitOutcome::default();

    let mut sources: Vec<(PathBuf, String)> = Vec::with_capacity(paths.len());
    for path in paths {
        if budget.exhausted() {
            return outcome;
        }
        match read_file_fast(path) {
            Ok(source) => sources.push((path.clone(), source)),
            Err(e) => {
                warn!(error = %e, "skipping unreadable file");
                outcome.errors.push(e);
            }
        }
    }

    let mut parsed: Vec<(u32, &PathBuf, &str, File<'_>)> = Vec::with_capacity(sources.len());
    let mut parse_failed = false;
    for (idx, (path, source)) in sources.iter().enumerate() {
        match Parser::new(source).parse() {
            Ok(file) => parsed.push((idx as u32, path, source.as_str(), file)),
            Err(errors) => {
                parse_failed = true;
                let lines = LineIndex::new(source);
                let first = &errors[0];
                debug!(path = %path.display(), count = errors.len(), "parse failed");
                outcome.errors.push(LintError::Parse {
                    path: path.clone(),
                    count: errors.len(),
                    line: lines.line_of(first.span.start),
                    message: first.message.clone(),
                });
            }
        }
    }

    // Mutation pre-pass over the whole unit. With any file missing the
    // package scope is incomplete, so fall back to the conservative
    // answer instead of guessing.
    let mutated = if parse_failed {
        MutatedBindings::unanalyzed()
    } else {
        let refs: Vec<(u32, &File<'_>)> = parsed.iter().map(|(i, _, _, f)| (*i, f)).collect();
        MutatedBindings::analyze(&refs)
    };

    for (file_idx, path, source, file) in &parsed {
        if budget.exhausted() {
            break;
        }

        let lines = LineIndex::new(source);
        let mut ctx = LintContext::new(
            source,
            path.as_path(),
            *file_idx,
            &lines,
            opts.config,
            &mutated,
            budget,
        );

        crate::walker::walk_file(file, &mut |node| {
            if ctx.should_stop() {
                return false;
            }
            registry.dispatch(&mut ctx, node);
            true
        });

        let mut issues = ctx.issues;
        outcome.files_checked += 1;

        if opts.write {
            if let Some(content) = fixer::apply_fixes(source, &mut issues, opts.allow_unsafe) {
                match fixer::write_fixed(path, &content) {
                    Ok(()) => outcome.files_fixed += 1,
                    Err(e) => {
                        warn!(error = %e, "could not write fixes");
                        outcome.errors.push(e);
                    }
                }
            }
        }

        outcome.issues.append(&mut issues);
    }

    outcome
}
