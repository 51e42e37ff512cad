//! Progress display for parallel build units.
//!
//! An overall bar counts finished units; each unit gets its own spinner
//! underneath that turns into a checkmark or a cross.
//!
//! # Examples
//!
//! ```no_run
//! use multipage_cli::ui::BuildProgress;
//! use std::time::Duration;
//!
//! let mut progress = BuildProgress::new(3, true);
//! let tasks: Vec<usize> = ["default", "mobile", "tablet"]
//!     .iter()
//!     .map(|id| progress.add_task(id))
//!     .collect();
//!
//! progress.finish_task(tasks[0], "default", Duration::from_millis(900));
//! progress.finish_task(tasks[1], "mobile", Duration::from_millis(1200));
//! progress.fail_task(tasks[2], "tablet");
//! progress.finish("2 of 3 builds succeeded");
//! ```

use std::time::Duration;

use indicatif::{MultiProgress, ProgressBar, ProgressDrawTarget, ProgressStyle};
use owo_colors::OwoColorize;

use super::format_duration;

/// Progress display for a parallel build. Task ids are unit indices.
///
/// Draws nothing when `enabled` is false, which is the case in debug mode
/// where the bundlers write straight to the terminal.
pub struct BuildProgress {
    multi: MultiProgress,
    main_bar: ProgressBar,
    task_bars: Vec<ProgressBar>,
}

impl BuildProgress {
    /// Create the display for `total_units` units.
    ///
    /// # Arguments
    ///
    /// * `total_units` - Length of the overall bar
    /// * `enabled` - Draw to stderr; a hidden display still tracks state
    pub fn new(total_units: u64, enabled: bool) -> Self {
        let multi = MultiProgress::new();
        if !enabled {
            multi.set_draw_target(ProgressDrawTarget::hidden());
        }

        let main_bar = multi.add(ProgressBar::new(total_units));
        main_bar.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} {msg}")
                .expect("valid template")
                .progress_chars("█▓▒░"),
        );
        if enabled {
            main_bar.enable_steady_tick(Duration::from_millis(100));
        }

        Self {
            multi,
            main_bar,
            task_bars: Vec::new(),
        }
    }

    /// Add a spinner for a unit and return its task id.
    pub fn add_task(&mut self, name: &str) -> usize {
        let pb = self.multi.add(ProgressBar::new_spinner());
        pb.set_style(
            ProgressStyle::default_spinner()
                .template("  {spinner:.blue} {msg}")
                .expect("valid template")
                .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "⠿"]),
        );
        pb.set_message(format!("{}", name.dimmed()));
        if !self.multi.is_hidden() {
            pb.enable_steady_tick(Duration::from_millis(80));
        }

        let idx = self.task_bars.len();
        self.task_bars.push(pb);
        idx
    }

    /// Mark a unit as built and advance the overall bar.
    ///
    /// Unknown task ids only advance the bar.
    pub fn finish_task(&self, task_id: usize, name: &str, duration: Duration) {
        if let Some(pb) = self.task_bars.get(task_id) {
            pb.finish_with_message(format!(
                "{} {} {}",
                "✓".green(),
                name,
                format!("({})", format_duration(duration)).dimmed()
            ));
        }
        self.main_bar.inc(1);
    }

    /// Mark a unit as failed and advance the overall bar.
    pub fn fail_task(&self, task_id: usize, name: &str) {
        if let Some(pb) = self.task_bars.get(task_id) {
            pb.finish_with_message(format!("{} {}", "✗".red(), name));
        }
        self.main_bar.inc(1);
    }

    /// Finish the overall bar with a final message.
    pub fn finish(&self, message: &str) {
        self.main_bar.finish_with_message(message.to_string());
    }
}

impl Drop for BuildProgress {
    fn drop(&mut self) {
        for bar in &self.task_bars {
            if !bar.is_finished() {
                bar.finish_and_clear();
            }
        }
        if !self.main_bar.is_finished() {
            self.main_bar.finish_and_clear();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_task_ids_follow_insertion_order() {
        let mut progress = BuildProgress::new(2, false);
        assert_eq!(progress.add_task("default"), 0);
        assert_eq!(progress.add_task("mobile"), 1);
        progress.finish_task(0, "default", Duration::from_millis(10));
        progress.fail_task(1, "mobile");
        progress.fail_task(7, "missing");
        progress.finish("done");
    }
}
