//! Simple spinner for tasks without known duration.
//!
//! # Examples
//!
//! ```no_run
//! use multipage_cli::ui::Spinner;
//!
//! let spinner = Spinner::new("Discovering pages...");
//! spinner.set_message("Resolving page configs...");
//! spinner.finish("Planned 2 builds for 5 pages");
//! ```

use std::time::Duration;

use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};
use owo_colors::OwoColorize;

/// Spinner for quick steps like planning. Hidden when stderr is not a
/// terminal.
pub struct Spinner {
    pb: ProgressBar,
}

impl Spinner {
    /// Start a spinner with an initial message.
    ///
    /// Outside an attended terminal the spinner is hidden, and [`finish`]
    /// and [`fail`] print a plain status line instead.
    ///
    /// [`finish`]: Spinner::finish
    /// [`fail`]: Spinner::fail
    pub fn new(message: &str) -> Self {
        let pb = ProgressBar::new_spinner();
        if super::interactive() {
            pb.set_style(
                ProgressStyle::default_spinner()
                    .template("{spinner:.cyan} {msg}")
                    .expect("valid template")
                    .tick_strings(&["◐", "◓", "◑", "◒", "●"]),
            );
            pb.enable_steady_tick(Duration::from_millis(100));
        } else {
            pb.set_draw_target(ProgressDrawTarget::hidden());
        }
        pb.set_message(message.to_string());

        Self { pb }
    }

    /// Replace the spinner text.
    pub fn set_message(&self, message: &str) {
        self.pb.set_message(message.to_string());
    }

    /// Finish with a green checkmark.
    pub fn finish(&self, message: &str) {
        if self.pb.is_hidden() {
            super::success(message);
        } else {
            self.pb.finish_with_message(format!("{} {}", "✓".green(), message));
        }
    }

    /// Finish with a red X.
    pub fn fail(&self, message: &str) {
        if self.pb.is_hidden() {
            super::error(message);
        } else {
            self.pb.finish_with_message(format!("{} {}", "✗".red(), message));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_spinner_lifecycle() {
        let spinner = Spinner::new("Planning...");
        spinner.set_message("Still planning");
        spinner.finish("Planned");
    }

    #[test]
    fn test_spinner_fail() {
        Spinner::new("Planning").fail("Failed");
    }
}
