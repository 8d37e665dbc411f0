//! Fix application
//!
//! Fixes are span edits against the original source. They are applied
//! back to front so earlier offsets stay valid, one whole fix at a time;
//! a fix whose edits would overlap an already-applied one is skipped and
//! its issue stays unfixed. Each file is written independently, so a
//! failed write never blocks fixes elsewhere.

use std::path::Path;

use crate::error::LintError;
use crate::issue::{Applicability, Issue};

/// Apply every eligible fix to the source text.
///
/// Safe fixes are always eligible here (the caller gates on write mode);
/// unsafe fixes need `allow_unsafe`. Applied issues get `fixed` set.
/// Returns the rewritten content, or `None` when nothing applied.
pub fn apply_fixes(source: &str, issues: &mut [Issue], allow_unsafe: bool) -> Option<String> {
    // Candidate order: by start descending, so application never shifts
    // the offsets of fixes still to come.
    let mut order: Vec<usize> = issues
        .iter()
        .enumerate()
        .filter(|(_, issue)| match &issue.fix {
            Some(fix) => {
                !fix.edits.is_empty()
                    && (fix.applicability == Applicability::Safe || allow_unsafe)
            }
            None => false,
        })
        .map(|(i, _)| i)
        .collect();

    if order.is_empty() {
        return None;
    }

    order.sort_by(|&a, &b| {
        let sa = fix_range(&issues[a]).0;
        let sb = fix_range(&issues[b]).0;
        sb.cmp(&sa)
    });

    let mut content = source.to_string();
    let mut frontier = content.len() as u32;
    let mut applied = 0usize;

    for index in order {
        let (start, end) = fix_range(&issues[index]);
        if end > frontier {
            continue;
        }

        let fix = issues[index].fix.as_ref().unwrap();
        let mut edits: Vec<_> = fix.edits.iter().cloned().collect();
        edits.sort_by(|a, b| b.start.cmp(&a.start));
        for edit in edits {
            content.replace_range(edit.start as usize..edit.end as usize, &edit.replacement);
        }

        issues[index].fixed = true;
        frontier = start;
        applied += 1;
    }

    if applied == 0 {
        None
    } else {
        Some(content)
    }
}

/// The byte range a fix touches
fn fix_range(issue: &Issue) -> (u32, u32) {
    let edits = &issue.fix.as_ref().unwrap().edits;
    let start = edits.iter().map(|e| e.start).min().unwrap_or(0);
    let end = edits.iter().map(|e| e.end).max().unwrap_or(0);
    (start, end)
}

pub fn write_fixed(path: &Path, content: &str) -> Result<(), LintError> {
    std::fs::write(path, content).map_err(|source| LintError::WriteFix {
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::issue::{Edit, Fix, Location};
    use crate::messages::RuleId;
    use crate::severity::Severity;

    fn issue_with_fix(applicability: Applicability, edits: Vec<Edit>) -> Issue {
        Issue::new(
            RuleId::PreferIncDec,
            Severity::Warning,
            Location::new("a.go", 1, 1, 0, 1),
        )
        .with_fix(Fix {
            message: "rewrite".to_string(),
            applicability,
            edits,
        })
    }

    #[test]
    fn applies_safe_fix() {
        let mut issues = vec![issue_with_fix(
            Applicability::Safe,
            vec![Edit::new(1, 6, "++")],
        )];
        let out = apply_fixes("x += 1\n", &mut issues, false).unwrap();
        assert_eq!(out, "x++\n");
        assert!(issues[0].fixed);
    }

    #[test]
    fn unsafe_fix_needs_opt_in() {
        let mut issues = vec![issue_with_fix(
            Applicability::Unsafe,
            vec![Edit::new(0, 1, "y")],
        )];
        assert!(apply_fixes("x\n", &mut issues, false).is_none());
        assert!(!issues[0].fixed);

        let out = apply_fixes("x\n", &mut issues, true).unwrap();
        assert_eq!(out, "y\n");
        assert!(issues[0].fixed);
    }

    #[test]
    fn overlapping_fix_is_skipped() {
        let mut issues = vec![
            issue_with_fix(Applicability::Safe, vec![Edit::new(0, 4, "aa")]),
            issue_with_fix(Applicability::Safe, vec![Edit::new(2, 6, "bb")]),
        ];
        let out = apply_fixes("123456", &mut issues, false).unwrap();
        // The later-starting fix wins the scan; the overlapping one skips
        assert_eq!(out, "12bb");
        assert!(issues[1].fixed);
        assert!(!issues[0].fixed);
    }

    #[test]
    fn fix_is_idempotent_on_fixed_source() {
        let mut issues = vec![issue_with_fix(
            Applicability::Safe,
            vec![Edit::new(1, 6, "++")],
        )];
        let first = apply_fixes("x += 1\n", &mut issues, false).unwrap();
        // A second run over the rewritten source finds nothing to fix
        let mut none: Vec<Issue> = Vec::new();
        assert!(apply_fixes(&first, &mut none, false).is_none());
    }
}
