//! Miette report conversion for CLI errors.

use crate::error::CliError;
use miette::Report;
use multipage_core::Error as CoreError;

/// Convert a [`CliError`] into a miette report for `main`.
pub fn cli_error_to_miette(err: CliError) -> Report {
    match err {
        CliError::Core(CoreError::Config(e)) | CliError::Config(e) => {
            miette::miette!("Configuration error: {}", e)
        }
        CliError::Core(e) => miette::miette!("{}", e),
        _ => miette::miette!("{}", err),
    }
}
