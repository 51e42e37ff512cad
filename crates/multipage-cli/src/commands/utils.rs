//! Shared utilities for command implementations.

use std::fs;
use std::path::{Path, PathBuf};

use multipage_config::{load, ConfigContext, LoadedOptions};

use crate::error::{BuildError, CliError, Result, ResultExt};
use crate::ui;

/// Bundler flags naming an output directory. Each unit gets its own, so
/// these are consumed instead of forwarded.
const OUT_DIR_FLAGS: &[&str] = &["--outDir", "--out-dir"];

/// Resolve a path relative to a working directory.
pub fn resolve_path(path: &Path, cwd: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        cwd.join(path)
    }
}

/// The directory every command works in: `--cwd` relative to the process's
/// current directory, or the current directory itself.
pub fn project_root(cwd: Option<&Path>) -> Result<PathBuf> {
    let current = std::env::current_dir().context("Failed to get current directory")?;
    let root = match cwd {
        Some(dir) => resolve_path(dir, &current),
        None => return Ok(current),
    };
    if !root.is_dir() {
        return Err(CliError::FileNotFound(root));
    }
    Ok(root)
}

/// Load options for `root` and report where they came from.
pub fn load_options(root: &Path, config: Option<&Path>, ctx: &ConfigContext) -> Result<LoadedOptions> {
    let loaded = load(root, config, ctx)?;
    match &loaded.source {
        Some(path) => tracing::debug!(config = %path.display(), "loaded configuration"),
        None => ui::info("No configuration file found, using defaults"),
    }
    if loaded.source.is_some() && loaded.options.is_effectively_empty() {
        ui::warning("Configuration file only contains defaults");
    }
    Ok(loaded)
}

/// Remove an `--outDir` flag (and its value) from forwarded bundler args.
///
/// The last occurrence wins, as it would for the bundler itself.
pub fn extract_out_dir(args: &mut Vec<String>) -> Option<String> {
    let mut found = None;
    let mut kept = Vec::with_capacity(args.len());
    let mut iter = std::mem::take(args).into_iter();

    while let Some(arg) = iter.next() {
        if let Some((flag, value)) = arg.split_once('=') {
            if OUT_DIR_FLAGS.contains(&flag) {
                found = Some(value.to_string());
                continue;
            }
        }
        if OUT_DIR_FLAGS.contains(&arg.as_str()) {
            match iter.next() {
                Some(value) => found = Some(value),
                None => tracing::warn!(flag = %arg, "output directory flag without a value ignored"),
            }
            continue;
        }
        kept.push(arg);
    }

    *args = kept;
    found
}

/// Empty `out_dir`, creating it if needed.
///
/// Refuses to touch the project root or any of its ancestors.
pub fn clean_output_dir(out_dir: &Path, root: &Path) -> Result<()> {
    if root.starts_with(out_dir) {
        return Err(CliError::InvalidArgument(format!(
            "Refusing to clean {}: it contains the project",
            out_dir.display()
        )));
    }

    if !out_dir.exists() {
        fs::create_dir_all(out_dir).with_path(out_dir)?;
        return Ok(());
    }
    if !out_dir.is_dir() {
        return Err(BuildError::OutputNotDirectory(out_dir.to_path_buf()).into());
    }

    for entry in fs::read_dir(out_dir)? {
        let path = entry?.path();
        if path.is_dir() {
            fs::remove_dir_all(&path)?;
        } else {
            fs::remove_file(&path)?;
        }
    }
    Ok(())
}

/// Open the URL in the default browser. Failures are reported, not returned.
pub fn open_browser(url: &str) {
    use std::process::Command;

    let result = if cfg!(target_os = "macos") {
        Command::new("open").arg(url).spawn()
    } else if cfg!(target_os = "windows") {
        Command::new("cmd").args(["/C", "start", url]).spawn()
    } else {
        Command::new("xdg-open").arg(url).spawn()
    };

    match result {
        Ok(_) => ui::info(&format!("Opened browser at {url}")),
        Err(e) => ui::warning(&format!("Failed to open browser: {e}")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn strings(args: &[&str]) -> Vec<String> {
        args.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_resolve_path() {
        let cwd = Path::new("/project");
        assert_eq!(resolve_path(Path::new("dist"), cwd), PathBuf::from("/project/dist"));
        assert_eq!(resolve_path(Path::new("/abs"), cwd), PathBuf::from("/abs"));
    }

    #[test]
    fn test_extract_out_dir_forms() {
        let mut args = strings(&["--mode", "staging", "--outDir", "build", "--force"]);
        assert_eq!(extract_out_dir(&mut args).as_deref(), Some("build"));
        assert_eq!(args, strings(&["--mode", "staging", "--force"]));

        let mut args = strings(&["--out-dir=first", "--outDir=second"]);
        assert_eq!(extract_out_dir(&mut args).as_deref(), Some("second"));
        assert!(args.is_empty());

        let mut args = strings(&["--minify"]);
        assert_eq!(extract_out_dir(&mut args), None);
        assert_eq!(args, strings(&["--minify"]));
    }

    #[test]
    fn test_clean_output_dir_empties_contents() {
        let dir = TempDir::new().unwrap();
        let out = dir.path().join("dist");
        fs::create_dir_all(out.join("assets")).unwrap();
        fs::write(out.join("index.html"), "").unwrap();

        clean_output_dir(&out, dir.path()).unwrap();

        assert!(out.is_dir());
        assert_eq!(fs::read_dir(&out).unwrap().count(), 0);
    }

    #[test]
    fn test_clean_output_dir_refuses_project_root() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("index.html"), "").unwrap();

        assert!(clean_output_dir(dir.path(), dir.path()).is_err());
        assert!(clean_output_dir(dir.path().parent().unwrap(), dir.path()).is_err());
        assert!(dir.path().join("index.html").exists());
    }

    #[test]
    fn test_clean_output_dir_rejects_files() {
        let dir = TempDir::new().unwrap();
        let out = dir.path().join("dist");
        fs::write(&out, "").unwrap();
        assert!(matches!(
            clean_output_dir(&out, dir.path()),
            Err(CliError::Build(BuildError::OutputNotDirectory(_)))
        ));
    }
}
