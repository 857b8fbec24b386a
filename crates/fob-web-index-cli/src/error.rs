//! Error handling for the web index CLI.
//!
//! Generation errors keep their [`miette::Diagnostic`] codes and help text all
//! the way to the terminal; CLI-level failures are reported as plain
//! messages with a hint.

use std::path::PathBuf;

use fob_web_index::WebIndexError;
use miette::Report;
use thiserror::Error;

/// Top-level CLI error type
#[derive(Debug, Error)]
pub enum CliError {
    /// Generation failed
    #[error(transparent)]
    WebIndex(#[from] WebIndexError),

    /// Config layers could not be merged or extracted
    #[error("Configuration error: {0}")]
    Config(#[from] figment::Error),

    /// File or directory not found
    #[error("File not found: {}", .0.display())]
    FileNotFound(PathBuf),

    /// File watching errors
    #[error("File watcher error: {0}")]
    Watch(#[from] notify::Error),

    /// I/O errors from file system operations
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T, E = CliError> = std::result::Result<T, E>;

/// Convert a CliError to a miette Report
pub fn cli_error_to_miette(err: CliError) -> Report {
    match err {
        CliError::WebIndex(e) => Report::new(e),
        CliError::Config(e) => miette::miette!(
            "Configuration error: {}\n\nHint: Check web-index.config.json syntax and field types",
            e
        ),
        CliError::FileNotFound(path) => miette::miette!(
            "File not found: {}\n\nHint: Pass the build manifest with --manifest <FILE>",
            path.display()
        ),
        other => miette::miette!("{}", other),
    }
}
