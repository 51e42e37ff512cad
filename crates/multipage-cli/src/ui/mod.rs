//! Terminal UI utilities for progress bars and formatted output.
//!
//! This module displays build progress, status messages and the per-unit
//! summary. Everything goes to stderr so stdout stays clean for
//! `multipage resolve`. Colors and spinners are dropped when the terminal
//! (or CI) can't show them.
//!
//! # Examples
//!
//! ```no_run
//! use multipage_cli::ui;
//! use std::time::Duration;
//!
//! // Decide color support once, honoring `--no-color`
//! ui::init_colors(false);
//!
//! // One spinner per build unit under an overall bar
//! let mut progress = ui::BuildProgress::new(2, true);
//! let default = progress.add_task("default");
//! let mobile = progress.add_task("mobile");
//! progress.finish_task(default, "default", Duration::from_millis(840));
//! progress.fail_task(mobile, "mobile");
//! progress.finish("1 of 2 builds failed");
//!
//! // Simple spinner for quick tasks
//! let spinner = ui::Spinner::new("Loading configuration...");
//! spinner.finish("Configuration loaded");
//!
//! // Status messages
//! ui::success("Build successful");
//! ui::error("Bundler exited with status 1");
//! println!("{}", ui::format_duration(Duration::from_millis(1500)));
//! ```

mod format;
mod messages;
mod progress;
mod spinner;

use std::sync::atomic::{AtomicBool, Ordering};

pub use format::{format_duration, print_unit_summary};
pub use messages::{error, info, success, warning};
pub use progress::BuildProgress;
pub use spinner::Spinner;

static COLORS: AtomicBool = AtomicBool::new(false);

/// Check if running in a CI environment.
///
/// Detects common CI environment variables from GitHub Actions, GitLab CI,
/// CircleCI, and Travis CI.
///
/// # Returns
///
/// `true` if running in CI
pub fn is_ci() -> bool {
    ["CI", "GITHUB_ACTIONS", "GITLAB_CI", "CIRCLECI", "TRAVIS"]
        .iter()
        .any(|var| std::env::var_os(var).is_some())
}

/// Check if color output should be enabled.
///
/// `NO_COLOR` wins over `FORCE_COLOR`, which wins over terminal capability
/// detection on stderr.
///
/// # Returns
///
/// `true` if colors should be used
pub fn should_use_color() -> bool {
    if std::env::var_os("NO_COLOR").is_some() {
        return false;
    }
    if std::env::var_os("FORCE_COLOR").is_some() {
        return true;
    }
    console::user_attended_stderr()
}

/// Decide once whether status output is colored.
///
/// # Arguments
///
/// * `no_color` - The `--no-color` flag; when set, colors stay off regardless
///   of the environment
///
/// # Examples
///
/// ```no_run
/// use multipage_cli::ui;
///
/// ui::init_colors(false);
/// ui::warning("No entries matched src/pages/*/main.{js,ts}");
/// ```
pub fn init_colors(no_color: bool) {
    COLORS.store(!no_color && should_use_color(), Ordering::Relaxed);
}

pub(crate) fn colors_enabled() -> bool {
    COLORS.load(Ordering::Relaxed)
}

/// Whether spinners make sense: an attended terminal outside CI.
///
/// Commands fall back to plain status lines when this is `false`.
pub fn interactive() -> bool {
    console::user_attended_stderr() && !is_ci()
}
