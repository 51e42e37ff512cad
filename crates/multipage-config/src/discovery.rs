//! File-based config discovery.
//!
//! Finds the project's configuration file and reads it into a raw
//! `serde_json::Value`. Turning that value into [`MultiPageOptions`] is the
//! job of [`crate::loading`].
//!
//! [`MultiPageOptions`]: crate::MultiPageOptions

use std::fs;
use std::path::{Path, PathBuf};

use serde_json::Value;

use crate::error::{ConfigError, Result};

/// Config file names, highest priority first.
pub const CONFIG_FILE_NAMES: &[&str] = &["multipage.toml", "multipage.config.toml"];

/// Field read from `package.json` when no dedicated file exists.
pub const PACKAGE_JSON_FIELD: &str = "multipage";

pub struct ConfigDiscovery {
    root: PathBuf,
}

impl ConfigDiscovery {
    pub fn new(root: impl AsRef<Path>) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
        }
    }

    /// Find a config file in the root directory.
    ///
    /// Searches in this order:
    /// 1. `multipage.toml`
    /// 2. `multipage.config.toml`
    /// 3. `package.json` with a non-null `multipage` field
    pub fn find(&self) -> Option<PathBuf> {
        for name in CONFIG_FILE_NAMES {
            let path = self.root.join(name);
            if path.is_file() {
                return Some(path);
            }
        }

        let pkg_path = self.root.join("package.json");
        let content = fs::read_to_string(&pkg_path).ok()?;
        let parsed: Value = serde_json::from_str(&content).ok()?;
        parsed
            .get(PACKAGE_JSON_FIELD)
            .is_some_and(|field| !field.is_null())
            .then_some(pkg_path)
    }

    /// Read a config file into a JSON value.
    pub fn read_value(&self, path: &Path) -> Result<Value> {
        if path.file_name().is_some_and(|name| name == "package.json") {
            return read_package_json(path);
        }

        match path.extension().and_then(|ext| ext.to_str()) {
            Some("toml") => read_toml(path),
            Some("json") => {
                let content = fs::read_to_string(path)?;
                serde_json::from_str(&content).map_err(|e| ConfigError::InvalidJson {
                    path: path.to_path_buf(),
                    message: e.to_string(),
                })
            }
            _ => Err(ConfigError::UnsupportedFormat(path.to_path_buf())),
        }
    }
}

fn read_toml(path: &Path) -> Result<Value> {
    let content = fs::read_to_string(path)?;
    let table: toml::Table = toml::from_str(&content).map_err(|e| ConfigError::InvalidToml {
        path: path.to_path_buf(),
        message: e.to_string(),
    })?;

    serde_json::to_value(table).map_err(|e| ConfigError::InvalidToml {
        path: path.to_path_buf(),
        message: format!("TOML to JSON conversion failed: {e}"),
    })
}

fn read_package_json(path: &Path) -> Result<Value> {
    let content = fs::read_to_string(path)?;
    let mut parsed: Value = serde_json::from_str(&content).map_err(|e| ConfigError::InvalidJson {
        path: path.to_path_buf(),
        message: e.to_string(),
    })?;

    match parsed.get_mut(PACKAGE_JSON_FIELD).map(Value::take) {
        Some(Value::Null) | None => Err(ConfigError::invalid(
            PACKAGE_JSON_FIELD,
            "add a 'multipage' object to package.json",
        )),
        Some(value) => Ok(value),
    }
}
