//! Scoped ownership of `.temp.mp.*` files.

use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{IoResultExt, Result};

/// Prefix shared by every intermediate file and directory.
pub const TEMP_PREFIX: &str = ".temp.mp.";

/// Name of the temporary template for a page.
pub fn temp_html_name(page: &str) -> String {
    format!("{TEMP_PREFIX}{page}.html")
}

/// Files written during a pass. Everything tracked is removed when the guard
/// drops, whichever way the pass ends.
#[derive(Debug, Default)]
pub struct TempArtifacts {
    files: Vec<PathBuf>,
}

impl TempArtifacts {
    pub fn new() -> Self {
        Self::default()
    }

    /// Write `contents` to `path` and take ownership of the file.
    pub fn write(&mut self, path: impl Into<PathBuf>, contents: impl AsRef<[u8]>) -> Result<()> {
        let path = path.into();
        fs::write(&path, contents).at(&path)?;
        tracing::debug!(path = %path.display(), "created temporary file");
        self.track(path);
        Ok(())
    }

    pub fn track(&mut self, path: PathBuf) {
        if !self.files.contains(&path) {
            self.files.push(path);
        }
    }

    pub fn paths(&self) -> &[PathBuf] {
        &self.files
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// Remove every tracked file. Failures are logged, not returned.
    pub fn cleanup(&mut self) -> usize {
        let mut removed = 0;
        for path in self.files.drain(..) {
            match fs::remove_file(&path) {
                Ok(()) => removed += 1,
                Err(err) if err.kind() == std::io::ErrorKind::NotFound => {}
                Err(err) => {
                    tracing::warn!(path = %path.display(), %err, "failed to remove temporary file");
                }
            }
        }
        if removed > 0 {
            tracing::debug!(removed, "cleaned temporary files");
        }
        removed
    }
}

impl Drop for TempArtifacts {
    fn drop(&mut self) {
        self.cleanup();
    }
}

/// Remove `.temp.mp.*` files left in `root` by an interrupted run.
pub fn sweep_stale(root: &Path) -> Result<usize> {
    let mut removed = 0;
    for entry in fs::read_dir(root).at(root)? {
        let entry = entry.at(root)?;
        let name = entry.file_name();
        let is_temp = name.to_str().is_some_and(|n| n.starts_with(TEMP_PREFIX));
        if !is_temp || !entry.file_type().at(&entry.path())?.is_file() {
            continue;
        }
        match fs::remove_file(entry.path()) {
            Ok(()) => removed += 1,
            Err(err) => {
                tracing::warn!(path = %entry.path().display(), %err, "failed to remove stale temporary file");
            }
        }
    }
    Ok(removed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn files_are_removed_on_drop() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(temp_html_name("home"));
        {
            let mut temps = TempArtifacts::new();
            temps.write(&path, "<html></html>").unwrap();
            assert!(path.exists());
        }
        assert!(!path.exists());
    }

    #[test]
    fn files_are_removed_on_error_paths() {
        fn failing_pass(path: &Path) -> Result<()> {
            let mut temps = TempArtifacts::new();
            temps.write(path, "x")?;
            fs::read(path.with_extension("missing")).at(path)?;
            Ok(())
        }

        let dir = TempDir::new().unwrap();
        let path = dir.path().join(temp_html_name("about"));
        assert!(failing_pass(&path).is_err());
        assert!(!path.exists());
    }

    #[test]
    fn cleanup_tolerates_already_removed_files() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(temp_html_name("gone"));
        let mut temps = TempArtifacts::new();
        temps.write(&path, "x").unwrap();
        fs::remove_file(&path).unwrap();
        assert_eq!(temps.cleanup(), 0);
        assert!(temps.is_empty());
    }

    #[test]
    fn sweep_removes_only_temp_files() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join(".temp.mp.old.html"), "").unwrap();
        fs::write(dir.path().join(".temp.mp.default.unit.json"), "{}").unwrap();
        fs::write(dir.path().join("index.html"), "").unwrap();

        assert_eq!(sweep_stale(dir.path()).unwrap(), 2);
        assert!(dir.path().join("index.html").exists());
    }
}
