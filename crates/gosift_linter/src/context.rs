//! Per-file analysis context

use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use gosift_lexer::Span;
use memchr::memchr_iter;

use crate::config::Config;
use crate::issue::{Issue, Location};
use crate::messages::RuleId;
use crate::mutation::MutatedBindings;
use crate::severity::Severity;

/// Byte offsets of line starts, for offset to line/column mapping
pub struct LineIndex {
    starts: Vec<u32>,
}

impl LineIndex {
    pub fn new(source: &str) -> Self {
        let mut starts = Vec::with_capacity(source.len() / 32 + 1);
        starts.push(0);
        for pos in memchr_iter(b'\n', source.as_bytes()) {
            starts.push(pos as u32 + 1);
        }
        Self { starts }
    }

    /// 1-indexed line containing a byte offset
    pub fn line_of(&self, offset: u32) -> u32 {
        match self.starts.binary_search(&offset) {
            Ok(i) => i as u32 + 1,
            Err(i) => i as u32,
        }
    }

    /// 1-indexed line and column of a byte offset
    pub fn line_col(&self, offset: u32) -> (u32, u32) {
        let line = self.line_of(offset);
        let start = self.starts[line as usize - 1];
        (line, offset - start + 1)
    }

    /// Number of source lines a span covers
    pub fn span_lines(&self, span: Span) -> u32 {
        let end = span.end.saturating_sub(1).max(span.start);
        self.line_of(end) - self.line_of(span.start) + 1
    }
}

/// Shared issue accounting across all workers
///
/// `charge` is called once per reported issue; once the cap is reached,
/// `exhausted` turns true for everyone and analysis winds down. Workers
/// may overshoot slightly between the check and the add; the aggregator
/// trims the overshoot so output never exceeds the cap.
#[derive(Clone)]
pub struct IssueBudget {
    total: Arc<AtomicUsize>,
    cap: Option<usize>,
}

impl IssueBudget {
    pub fn new(cap: Option<usize>) -> Self {
        Self {
            total: Arc::new(AtomicUsize::new(0)),
            cap,
        }
    }

    pub fn charge(&self) {
        self.total.fetch_add(1, Ordering::Relaxed);
    }

    pub fn exhausted(&self) -> bool {
        match self.cap {
            Some(cap) => self.total.load(Ordering::Relaxed) >= cap,
            None => false,
        }
    }

    pub fn cap(&self) -> Option<usize> {
        self.cap
    }
}

/// Context handed to rules while one file is being checked
pub struct LintContext<'a> {
    source: &'a str,
    file: &'a Path,
    file_idx: u32,
    lines: &'a LineIndex,
    config: &'a Config,
    mutated: &'a MutatedBindings,
    budget: &'a IssueBudget,
    pub(crate) issues: Vec<Issue>,
}

impl<'a> LintContext<'a> {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        source: &'a str,
        file: &'a Path,
        file_idx: u32,
        lines: &'a LineIndex,
        config: &'a Config,
        mutated: &'a MutatedBindings,
        budget: &'a IssueBudget,
    ) -> Self {
        Self {
            source,
            file,
            file_idx,
            lines,
            config,
            mutated,
            budget,
            issues: Vec::new(),
        }
    }

    pub fn source(&self) -> &'a str {
        self.source
    }

    pub fn file_path(&self) -> &'a Path {
        self.file
    }

    /// Source text under a span
    pub fn text(&self, span: Span) -> &'a str {
        &self.source[span.start as usize..span.end as usize]
    }

    pub fn location(&self, span: Span) -> Location {
        let (line, column) = self.lines.line_col(span.start);
        Location::new(
            self.file.to_string_lossy(),
            line,
            column,
            span.start,
            span.end,
        )
    }

    pub fn span_lines(&self, span: Span) -> u32 {
        self.lines.span_lines(span)
    }

    /// Configured severity for a rule
    pub fn severity(&self, id: RuleId, default: Severity) -> Severity {
        self.config.severity_for(id, default)
    }

    /// Configured threshold for a limit-style rule
    pub fn limit(&self, id: RuleId, default: u32) -> u32 {
        self.config.limit_for(id, default)
    }

    /// Whether the binding declared at `name_start` in this file is ever
    /// written (conservatively true when the mutation pass was skipped)
    pub fn is_mutated(&self, name_start: u32) -> bool {
        self.mutated.is_mutated((self.file_idx, name_start))
    }

    /// Record an issue and charge the global budget
    pub fn report(&mut self, issue: Issue) {
        self.budget.charge();
        self.issues.push(issue);
    }

    /// True once the global issue cap has been reached
    pub fn should_stop(&self) -> bool {
        self.budget.exhausted()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn line_index_maps_offsets() {
        let index = LineIndex::new("ab\ncde\n\nf");
        assert_eq!(index.line_col(0), (1, 1));
        assert_eq!(index.line_col(1), (1, 2));
        assert_eq!(index.line_col(3), (2, 1));
        assert_eq!(index.line_col(5), (2, 3));
        assert_eq!(index.line_col(7), (3, 1));
        assert_eq!(index.line_col(8), (4, 1));
    }

    #[test]
    fn span_lines_counts_inclusive() {
        let index = LineIndex::new("a\nb\nc\n");
        assert_eq!(index.span_lines(Span::new(0, 1)), 1);
        assert_eq!(index.span_lines(Span::new(0, 3)), 2);
        assert_eq!(index.span_lines(Span::new(0, 5)), 3);
    }

    #[test]
    fn budget_exhausts_at_cap() {
        let budget = IssueBudget::new(Some(2));
        assert!(!budget.exhausted());
        budget.charge();
        assert!(!budget.exhausted());
        budget.charge();
        assert!(budget.exhausted());

        let unlimited = IssueBudget::new(None);
        for _ in 0..1000 {
            unlimited.charge();
        }
        assert!(!unlimited.exhausted());
    }
}
