//! Concurrent analysis pipeline
//!
//! One producer thread discovers units (directories of Go files) and
//! feeds a bounded job channel; a pool of workers analyzes units and
//! sends their outcomes over a bounded results channel; the calling
//! thread aggregates. Cancellation is a channel whose single sender is
//! dropped exactly once; every blocking channel operation is paired with
//! it in a `select!`, so all stages unblock promptly no matter which
//! side stalls.

use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::thread;

use crossbeam_channel::{bounded, select, Receiver, Sender, TryRecvError};
use rustc_hash::FxHashSet;
use tracing::{debug, info};

use crate::checker::{analyze_unit, CheckOptions};
use crate::config::Config;
use crate::context::IssueBudget;
use crate::error::LintError;
use crate::issue::Issue;
use crate::registry::Registry;

/// Default ceiling on individual file size (2 MiB); larger files are
/// almost always generated and only slow everything down.
pub const DEFAULT_MAX_FILE_SIZE: u64 = 2 * 1024 * 1024;

/// Cooperative cancellation handle
///
/// Cancelling drops the lone sender, which disconnects every cloned
/// receiver at once. Safe to call from any thread, any number of times.
pub struct CancelToken {
    tx: Mutex<Option<Sender<()>>>,
    rx: Receiver<()>,
}

impl CancelToken {
    pub fn new() -> Self {
        let (tx, rx) = bounded::<()>(0);
        Self {
            tx: Mutex::new(Some(tx)),
            rx,
        }
    }

    /// Signal cancellation. Idempotent.
    pub fn cancel(&self) {
        if let Ok(mut guard) = self.tx.lock() {
            guard.take();
        }
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self.rx.try_recv(), Err(TryRecvError::Disconnected))
    }

    /// A receiver that unblocks when the token is cancelled
    pub fn receiver(&self) -> Receiver<()> {
        self.rx.clone()
    }
}

impl Default for CancelToken {
    fn default() -> Self {
        Self::new()
    }
}

/// One unit of work: the Go files of a single directory
type Unit = Vec<PathBuf>;

/// Pipeline entry point and knobs
pub struct Linter {
    pub config: Config,
    /// Apply fixes and rewrite files
    pub write: bool,
    /// Allow fixes marked unsafe (requires `write`)
    pub allow_unsafe: bool,
    pub max_file_size: u64,
    /// Worker count; `None` means one per available core
    pub workers: Option<usize>,
}

/// Aggregated result of one run
#[derive(Debug, Default)]
pub struct LintReport {
    /// Sorted by file, then position, then rule
    pub issues: Vec<Issue>,
    pub errors: Vec<LintError>,
    pub files_checked: usize,
    pub files_fixed: usize,
    /// True when the issue cap cut reporting short
    pub truncated: bool,
}

impl Linter {
    pub fn new(config: Config) -> Self {
        Self {
            config,
            write: false,
            allow_unsafe: false,
            max_file_size: DEFAULT_MAX_FILE_SIZE,
            workers: None,
        }
    }

    /// Analyze every Go file under the given roots
    pub fn run(&self, roots: &[PathBuf], cancel: &CancelToken) -> LintReport {
        // A lone file skips the whole pipeline
        if let [root] = roots {
            if root.is_file() {
                return self.run_single(root);
            }
        }

        let workers = self
            .workers
            .unwrap_or_else(|| {
                thread::available_parallelism()
                    .map(|n| n.get())
                    .unwrap_or(4)
            })
            .max(1);

        let budget = IssueBudget::new(self.config.max_issues);
        let (job_tx, job_rx) = bounded::<Unit>(workers * 2);
        let (result_tx, result_rx) = bounded::<crate::checker::UnitOutcome>(workers);

        let mut report = LintReport::default();

        thread::scope(|scope| {
            // Discovery producer
            {
                let cancel_rx = cancel.receiver();
                let config = &self.config;
                let max_file_size = self.max_file_size;
                scope.spawn(move || {
                    discover(roots, config, max_file_size, &job_tx, &cancel_rx);
                    // job_tx drops here; workers drain and exit
                });
            }

            // Worker pool
            for worker_id in 0..workers {
                let job_rx = job_rx.clone();
                let result_tx = result_tx.clone();
                let cancel_rx = cancel.receiver();
                let budget = budget.clone();
                let config = &self.config;
                let write = self.write;
                let allow_unsafe = self.allow_unsafe;
                scope.spawn(move || {
                    let registry = Registry::build(config);
                    let opts = CheckOptions {
                        config,
                        write,
                        allow_unsafe,
                    };
                    debug!(worker_id, rules = registry.len(), "worker started");

                    loop {
                        let unit = select! {
                            recv(job_rx) -> job => match job {
                                Ok(unit) => unit,
                                Err(_) => break,
                            },
                            recv(cancel_rx) -> _ => break,
                        };

                        if budget.exhausted() {
                            continue;
                        }
                        let outcome = analyze_unit(&unit, &opts, &registry, &budget);

                        select! {
                            send(result_tx, outcome) -> sent => {
                                if sent.is_err() {
                                    break;
                                }
                            }
                            recv(cancel_rx) -> _ => break,
                        }
                    }
                });
            }
            drop(job_rx);
            drop(result_tx);

            // Aggregator: runs on the calling thread until every worker
            // has dropped its sender.
            let cap = budget.cap();
            while let Ok(mut outcome) = result_rx.recv() {
                report.files_checked += outcome.files_checked;
                report.files_fixed += outcome.files_fixed;
                report.errors.append(&mut outcome.errors);

                if let Some(cap) = cap {
                    let remaining = cap.saturating_sub(report.issues.len());
                    if outcome.issues.len() > remaining {
                        outcome.issues.truncate(remaining);
                        report.truncated = true;
                    }
                }
                report.issues.append(&mut outcome.issues);

                if cap.is_some_and(|cap| report.issues.len() >= cap) {
                    report.truncated = report.truncated || budget.exhausted();
                    cancel.cancel();
                }
            }
        });

        finish_report(&mut report);
        report
    }

    /// Analyze one file inline on the calling thread
    fn run_single(&self, path: &Path) -> LintReport {
        let mut report = LintReport::default();
        if !is_go_file(path) || self.config.is_excluded(path) {
            return report;
        }

        let budget = IssueBudget::new(self.config.max_issues);
        let registry = Registry::build(&self.config);
        let opts = CheckOptions {
            config: &self.config,
            write: self.write,
            allow_unsafe: self.allow_unsafe,
        };
        let unit = vec![path.to_path_buf()];
        let mut outcome = analyze_unit(&unit, &opts, &registry, &budget);

        report.files_checked = outcome.files_checked;
        report.files_fixed = outcome.files_fixed;
        report.errors.append(&mut outcome.errors);
        if let Some(cap) = budget.cap() {
            if outcome.issues.len() > cap {
                outcome.issues.truncate(cap);
                report.truncated = true;
            }
        }
        report.issues = outcome.issues;

        finish_report(&mut report);
        report
    }
}

fn finish_report(report: &mut LintReport) {
    sort_issues(&mut report.issues);
    info!(
        files = report.files_checked,
        issues = report.issues.len(),
        errors = report.errors.len(),
        "lint run finished"
    );
}

/// Stable output order: file path, position, then rule code
fn sort_issues(issues: &mut [Issue]) {
    issues.sort_by(|a, b| {
        (
            &a.location.file,
            a.location.line,
            a.location.column,
            a.id.code(),
        )
            .cmp(&(
                &b.location.file,
                b.location.line,
                b.location.column,
                b.id.code(),
            ))
    });
}

/// Directory names that are never descended into
fn skip_dir(name: &str) -> bool {
    name == "vendor" || name == "testdata" || name.starts_with('.')
}

fn is_go_file(path: &Path) -> bool {
    path.extension().is_some_and(|ext| ext == "go")
}

/// Walk the roots, grouping Go files by directory into units and sending
/// each unit downstream. A directory reached through several roots is
/// visited once.
fn discover(
    roots: &[PathBuf],
    config: &Config,
    max_file_size: u64,
    job_tx: &Sender<Unit>,
    cancel_rx: &Receiver<()>,
) {
    let mut seen: FxHashSet<PathBuf> = FxHashSet::default();
    let mut stack: Vec<PathBuf> = Vec::new();

    for root in roots {
        // A single-file root becomes its own unit
        if root.is_file() {
            let file = root.canonicalize().unwrap_or_else(|_| root.clone());
            if is_go_file(&file) && !config.is_excluded(&file) && seen.insert(file.clone()) {
                if !send_unit(vec![file], job_tx, cancel_rx) {
                    return;
                }
            }
            continue;
        }
        let dir = root.canonicalize().unwrap_or_else(|_| root.clone());
        if seen.insert(dir.clone()) {
            stack.push(dir);
        }
    }

    while let Some(dir) = stack.pop() {
        if cancel_ready(cancel_rx) {
            return;
        }

        let entries = match std::fs::read_dir(&dir) {
            Ok(entries) => entries,
            Err(e) => {
                debug!(dir = %dir.display(), error = %e, "cannot read directory");
                continue;
            }
        };

        let mut unit: Unit = Vec::new();
        for entry in entries.flatten() {
            let path = entry.path();
            let Ok(file_type) = entry.file_type() else {
                continue;
            };

            if file_type.is_dir() {
                let name = entry.file_name();
                if skip_dir(&name.to_string_lossy()) {
                    continue;
                }
                let sub = path.canonicalize().unwrap_or(path);
                if seen.insert(sub.clone()) {
                    stack.push(sub);
                }
                continue;
            }

            if !file_type.is_file() || !is_go_file(&path) || config.is_excluded(&path) {
                continue;
            }
            if let Ok(meta) = entry.metadata() {
                if meta.len() > max_file_size {
                    debug!(path = %path.display(), size = meta.len(), "skipping oversized file");
                    continue;
                }
            }
            unit.push(path);
        }

        if !unit.is_empty() {
            // Deterministic unit composition regardless of readdir order
            unit.sort();
            if !send_unit(unit, job_tx, cancel_rx) {
                return;
            }
        }
    }
}

fn cancel_ready(cancel_rx: &Receiver<()>) -> bool {
    matches!(cancel_rx.try_recv(), Err(TryRecvError::Disconnected))
}

/// Send one unit, returning false if the pipeline is shutting down
fn send_unit(unit: Unit, job_tx: &Sender<Unit>, cancel_rx: &Receiver<()>) -> bool {
    select! {
        send(job_tx, unit) -> sent => sent.is_ok(),
        recv(cancel_rx) -> _ => false,
    }
}
