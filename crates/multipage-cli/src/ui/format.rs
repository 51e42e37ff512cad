//! Formatting for durations and the per-unit build summary.

use std::time::Duration;

use console::Term;
use multipage_core::BuildResult;
use owo_colors::OwoColorize;

use super::colors_enabled;

/// Format a duration as `50ms`, `1.50s` or `1m 30s`.
///
/// ```
/// use std::time::Duration;
/// use multipage_cli::ui::format_duration;
///
/// assert_eq!(format_duration(Duration::from_millis(50)), "50ms");
/// assert_eq!(format_duration(Duration::from_millis(1500)), "1.50s");
/// assert_eq!(format_duration(Duration::from_secs(90)), "1m 30s");
/// ```
pub fn format_duration(duration: Duration) -> String {
    let total_ms = duration.as_millis();

    if total_ms < 1000 {
        format!("{total_ms}ms")
    } else if total_ms < 60_000 {
        format!("{:.2}s", duration.as_secs_f64())
    } else {
        let secs = duration.as_secs();
        format!("{}m {}s", secs / 60, secs % 60)
    }
}

/// Print one line per unit followed by a totals line, to stderr.
///
/// Failed units get their error indented beneath them, so the bundler's
/// own output stays readable.
///
/// # Examples
///
/// ```no_run
/// use multipage_cli::ui::print_unit_summary;
/// use multipage_core::{BuildResult, UnitKind};
/// use std::path::PathBuf;
/// use std::time::Duration;
///
/// let result = BuildResult {
///     id: "default".into(),
///     kind: UnitKind::Strategy,
///     success: true,
///     error: None,
///     out_dir: PathBuf::from("dist/.temp.mp.default"),
///     duration: Duration::from_millis(850),
/// };
/// print_unit_summary(&[result], Duration::from_secs(1));
/// ```
pub fn print_unit_summary(results: &[BuildResult], elapsed: Duration) {
    let width = (Term::stderr().size().1 as usize).clamp(20, 80);
    let color = colors_enabled();

    if color {
        eprintln!("\n{}", "Build Summary".bold().underline());
    } else {
        eprintln!("\nBuild Summary");
    }
    eprintln!("{}", "─".repeat(width));

    for result in results {
        let timing = format!("({})", format_duration(result.duration));
        let kind = result.kind.as_str();
        match (result.success, color) {
            (true, true) => eprintln!(
                "  {} {} {} {}",
                "✓".green(),
                result.id.bright_white().bold(),
                kind.dimmed(),
                timing.dimmed()
            ),
            (true, false) => eprintln!("  ✓ {} {kind} {timing}", result.id),
            (false, true) => eprintln!(
                "  {} {} {} {}",
                "✗".red(),
                result.id.bright_white().bold(),
                kind.dimmed(),
                timing.dimmed()
            ),
            (false, false) => eprintln!("  ✗ {} {kind} {timing}", result.id),
        }
        if let Some(error) = &result.error {
            for line in error.lines() {
                eprintln!("      {line}");
            }
        }
    }

    eprintln!("{}", "─".repeat(width));
    let failed = results.iter().filter(|r| !r.success).count();
    let totals = format!(
        "{} succeeded, {failed} failed in {}",
        results.len() - failed,
        format_duration(elapsed)
    );
    match (failed, color) {
        (0, true) => eprintln!("  {}", totals.green()),
        (_, true) => eprintln!("  {}", totals.red()),
        _ => eprintln!("  {totals}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use multipage_core::UnitKind;
    use std::path::PathBuf;

    #[test]
    fn test_format_duration_milliseconds() {
        assert_eq!(format_duration(Duration::from_millis(0)), "0ms");
        assert_eq!(format_duration(Duration::from_millis(999)), "999ms");
    }

    #[test]
    fn test_format_duration_seconds() {
        assert_eq!(format_duration(Duration::from_millis(1000)), "1.00s");
        assert_eq!(format_duration(Duration::from_millis(59_999)), "60.00s");
    }

    #[test]
    fn test_format_duration_minutes() {
        assert_eq!(format_duration(Duration::from_secs(60)), "1m 0s");
        assert_eq!(format_duration(Duration::from_secs(125)), "2m 5s");
    }

    #[test]
    fn test_summary_does_not_panic() {
        let ok = BuildResult {
            id: "default".into(),
            kind: UnitKind::Strategy,
            success: true,
            error: None,
            out_dir: PathBuf::from("dist/.temp.mp.default"),
            duration: Duration::from_millis(120),
        };
        let failed = BuildResult {
            id: "mobile".into(),
            success: false,
            error: Some("bundler exited with code 1:\nboom".into()),
            ..ok.clone()
        };
        print_unit_summary(&[ok, failed], Duration::from_secs(2));
    }
}
