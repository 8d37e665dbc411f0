//! Error types for the analysis pipeline

use std::path::PathBuf;

use thiserror::Error;

/// Errors surfaced by the pipeline and file analysis
#[derive(Debug, Error)]
pub enum LintError {
    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{}: file is not valid UTF-8", path.display())]
    NonUtf8 { path: PathBuf },

    #[error("{}: {count} parse error(s), first at line {line}: {message}", path.display())]
    Parse {
        path: PathBuf,
        count: usize,
        line: u32,
        message: String,
    },

    #[error("failed to write fixed file {}: {source}", path.display())]
    WriteFix {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid configuration: {0}")]
    Config(String),
}
