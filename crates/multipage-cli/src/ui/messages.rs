//! Status message functions for terminal output.
//!
//! Each line is a symbol followed by the message. Colors follow
//! [`init_colors`](super::init_colors); without them the symbols still
//! print.

use std::fmt::Display;

use owo_colors::OwoColorize;

use super::colors_enabled;

fn line(symbol: impl Display, plain_symbol: &str, message: impl Display, plain: &str) {
    if colors_enabled() {
        eprintln!("{symbol} {message}");
    } else {
        eprintln!("{plain_symbol} {plain}");
    }
}

/// Print a success message to stderr.
///
/// # Arguments
///
/// * `message` - Message to display
///
/// # Examples
///
/// ```no_run
/// use multipage_cli::ui::success;
///
/// success("Build completed successfully");
/// ```
pub fn success(message: &str) {
    line("✓".green().bold(), "✓", message, message);
}

/// Print an info message to stderr.
///
/// # Arguments
///
/// * `message` - Message to display
///
/// # Examples
///
/// ```no_run
/// use multipage_cli::ui::info;
///
/// info("Loading configuration...");
/// ```
pub fn info(message: &str) {
    line("ℹ".blue().bold(), "ℹ", message, message);
}

/// Print a warning message to stderr.
///
/// # Arguments
///
/// * `message` - Message to display
///
/// # Examples
///
/// ```no_run
/// use multipage_cli::ui::warning;
///
/// warning("No entries matched src/pages/*/main.{js,ts}");
/// ```
pub fn warning(message: &str) {
    line("⚠".yellow().bold(), "⚠", message.yellow(), message);
}

/// Print an error message to stderr.
///
/// # Arguments
///
/// * `message` - Message to display
///
/// # Examples
///
/// ```no_run
/// use multipage_cli::ui::error;
///
/// error("Bundler exited with status 1");
/// ```
pub fn error(message: &str) {
    line("✗".red().bold(), "✗", message.red(), message);
}
