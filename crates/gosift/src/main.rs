//! gosift CLI - a fast Go linter
//!
//! Usage: gosift [OPTIONS] [PATHS]...
//!
//! Exit codes: 0 clean, 1 issues found, 2 error-severity issues found,
//! 3 internal failure.

use std::io::Write;
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Instant;

use anyhow::{Context, Result};
use clap::Parser;
use colored::Colorize;
use tracing_subscriber::EnvFilter;

use gosift_linter::{CancelToken, Config, Issue, LintReport, Linter, Severity};

/// An extremely fast Go linter
#[derive(Parser, Debug)]
#[command(name = "gosift")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Files or directories to lint
    #[arg(default_value = ".")]
    paths: Vec<PathBuf>,

    /// Configuration file (JSON); all rules run when omitted
    #[arg(long, short = 'c')]
    config: Option<PathBuf>,

    /// Apply safe fixes and rewrite files
    #[arg(long)]
    write: bool,

    /// Also apply fixes marked unsafe (needs --write)
    #[arg(long = "unsafe", requires = "write")]
    allow_unsafe: bool,

    /// Stop after this many issues
    #[arg(long)]
    max_issues: Option<usize>,

    /// Worker threads (default: one per core)
    #[arg(long, short = 'j')]
    jobs: Option<usize>,

    /// Output format (text, json)
    #[arg(long, default_value = "text")]
    format: String,

    /// Suppress output (exit code only)
    #[arg(long, short = 'q')]
    quiet: bool,

    /// Disable colored output
    #[arg(long)]
    no_color: bool,
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    if cli.no_color {
        colored::control::set_override(false);
    }

    match run(&cli) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("{} {:#}", "error:".red().bold(), e);
            ExitCode::from(3)
        }
    }
}

fn run(cli: &Cli) -> Result<ExitCode> {
    let start = Instant::now();

    let mut config = match &cli.config {
        Some(path) => Config::load(path).context("loading configuration")?,
        None => Config::all_rules(),
    };
    if cli.max_issues.is_some() {
        config.max_issues = cli.max_issues;
    }

    let mut linter = Linter::new(config);
    linter.write = cli.write || linter.config.assistance.autofix;
    linter.allow_unsafe = cli.allow_unsafe;
    linter.workers = cli.jobs;

    let cancel = CancelToken::new();
    let report = linter.run(&cli.paths, &cancel);

    if !cli.quiet {
        match cli.format.as_str() {
            "json" => print_json(&report)?,
            _ => print_text(&report, start.elapsed().as_millis()),
        }
    }

    let errors = report
        .issues
        .iter()
        .filter(|i| i.severity == Severity::Error)
        .count();
    if errors > 0 {
        Ok(ExitCode::from(2))
    } else if !report.issues.is_empty() {
        Ok(ExitCode::from(1))
    } else {
        Ok(ExitCode::SUCCESS)
    }
}

fn print_text(report: &LintReport, elapsed_ms: u128) {
    let stdout = std::io::stdout();
    let mut out = std::io::BufWriter::new(stdout.lock());

    for issue in &report.issues {
        let _ = writeln!(out, "{}", render_issue(issue));
    }
    for error in &report.errors {
        let _ = writeln!(out, "{} {}", "error:".red(), error);
    }

    let mut counts = (0usize, 0usize, 0usize);
    for issue in &report.issues {
        match issue.severity {
            Severity::Error => counts.0 += 1,
            Severity::Warning => counts.1 += 1,
            Severity::Info => counts.2 += 1,
        }
    }

    let _ = writeln!(out);
    if report.issues.is_empty() && report.errors.is_empty() {
        let _ = writeln!(out, "{}", "All checks passed!".green().bold());
    } else {
        let mut parts = Vec::new();
        if counts.0 > 0 {
            parts.push(format!("{} error(s)", counts.0).red().bold().to_string());
        }
        if counts.1 > 0 {
            parts.push(format!("{} warning(s)", counts.1).yellow().to_string());
        }
        if counts.2 > 0 {
            parts.push(format!("{} info", counts.2).cyan().to_string());
        }
        let _ = writeln!(out, "Found {}", parts.join(", "));
    }
    if report.truncated {
        let _ = writeln!(
            out,
            "{}",
            "Issue cap reached; output truncated".yellow()
        );
    }
    if report.files_fixed > 0 {
        let _ = writeln!(out, "Fixed {} file(s)", report.files_fixed);
    }
    let _ = writeln!(
        out,
        "Checked {} file(s) in {}ms",
        report.files_checked, elapsed_ms
    );
}

fn render_issue(issue: &Issue) -> String {
    let severity = match issue.severity {
        Severity::Error => "error".red().bold(),
        Severity::Warning => "warning".yellow().bold(),
        Severity::Info => "info".cyan(),
    };
    let fixed = if issue.fixed { " [fixed]".green().to_string() } else { String::new() };
    format!(
        "{}:{}:{}: {} [{}] {}{}",
        issue.location.file,
        issue.location.line,
        issue.location.column,
        severity,
        issue.id,
        issue.message(),
        fixed,
    )
}

fn print_json(report: &LintReport) -> Result<()> {
    let issues: Vec<serde_json::Value> = report
        .issues
        .iter()
        .map(|issue| {
            serde_json::json!({
                "rule": issue.id.name(),
                "code": issue.id.code(),
                "severity": issue.severity.as_str(),
                "file": issue.location.file,
                "line": issue.location.line,
                "column": issue.location.column,
                "message": issue.message(),
                "fixed": issue.fixed,
            })
        })
        .collect();

    let doc = serde_json::json!({
        "issues": issues,
        "errors": report.errors.iter().map(|e| e.to_string()).collect::<Vec<_>>(),
        "filesChecked": report.files_checked,
        "filesFixed": report.files_fixed,
        "truncated": report.truncated,
    });

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    serde_json::to_writer_pretty(&mut out, &doc).context("writing json output")?;
    let _ = writeln!(out);
    Ok(())
}
