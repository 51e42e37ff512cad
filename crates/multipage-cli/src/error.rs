//! Error handling for the multipage CLI.
//!
//! [`CliError`] is what every command returns. Library errors convert into it
//! through `#[from]`, and [`BuildError`] covers failures that only exist at the
//! command level (failed units, interrupted builds). Messages carry a
//! `Hint:` line where there is something concrete to try.
//!
//! # Example
//!
//! ```rust,no_run
//! use multipage_cli::error::{Result, ResultExt};
//! use std::path::Path;
//!
//! fn read_template(path: &Path) -> Result<String> {
//!     std::fs::read_to_string(path)
//!         .with_path(path)
//!         .with_hint("Set `template` in multipage.toml")
//! }
//! ```

mod report;

use std::path::PathBuf;
use thiserror::Error;

pub use report::cli_error_to_miette;

/// Top-level CLI error type.
#[derive(Debug, Error)]
pub enum CliError {
    /// Configuration could not be found, parsed or validated
    #[error("Configuration error: {0}")]
    Config(#[from] multipage_config::ConfigError),

    /// Planning, synthesis or output assembly failed
    #[error("{0}")]
    Core(#[from] multipage_core::Error),

    /// One or more bundler runs failed
    #[error("Build error: {0}")]
    Build(#[from] BuildError),

    /// Invalid command-line arguments or options
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// File or directory not found
    #[error("File not found: {}", .0.display())]
    FileNotFound(PathBuf),

    /// I/O errors from file system operations
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Development server errors
    #[error("Server error: {0}")]
    Server(String),

    /// JSON serialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Generic errors with custom messages
    #[error("{0}")]
    Custom(String),
}

/// Build process errors.
#[derive(Debug, Error)]
pub enum BuildError {
    /// At least one unit failed; successful outputs are left in place
    #[error("{failed} of {total} builds failed\n\nHint: Re-run with --debug to see the full bundler output")]
    UnitsFailed {
        /// Number of failed units
        failed: usize,
        /// Number of units started
        total: usize,
    },

    /// Ctrl-C arrived while units were running
    #[error("Build cancelled")]
    Cancelled,

    /// `resolve` was run outside a build
    #[error("No build unit to resolve\n\nHint: Pass --unit <manifest> or run under `multipage build`, which sets {var}")]
    NoUnit {
        /// Environment variable that was checked
        var: &'static str,
    },

    /// Output directory exists but is not a directory
    #[error("Output path is not a directory: {}\n\nHint: Set `outDir` to a directory path", .0.display())]
    OutputNotDirectory(PathBuf),
}

/// Result type alias using `CliError` as the default error type.
pub type Result<T, E = CliError> = std::result::Result<T, E>;

/// Extension trait for adding context to `Result` types.
pub trait ResultExt<T> {
    /// Turn a not-found I/O error into [`CliError::FileNotFound`] for `path`.
    fn with_path(self, path: impl AsRef<std::path::Path>) -> Result<T>;

    /// Append a `Hint:` line to the error.
    fn with_hint(self, hint: impl std::fmt::Display) -> Result<T>;

    /// Prefix the error with a message.
    fn context(self, msg: impl std::fmt::Display) -> Result<T>;
}

impl<T, E: Into<CliError>> ResultExt<T> for std::result::Result<T, E> {
    fn with_path(self, path: impl AsRef<std::path::Path>) -> Result<T> {
        self.map_err(|e| {
            let err: CliError = e.into();
            match err {
                CliError::Io(io_err) if io_err.kind() == std::io::ErrorKind::NotFound => {
                    CliError::FileNotFound(path.as_ref().to_path_buf())
                }
                other => other,
            }
        })
    }

    fn with_hint(self, hint: impl std::fmt::Display) -> Result<T> {
        self.map_err(|e| {
            let err: CliError = e.into();
            CliError::Custom(format!("{err}\n\nHint: {hint}"))
        })
    }

    fn context(self, msg: impl std::fmt::Display) -> Result<T> {
        self.map_err(|e| {
            let err: CliError = e.into();
            CliError::Custom(format!("{msg}: {err}"))
        })
    }
}
