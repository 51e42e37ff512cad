//! Schema validation (no filesystem checks).

use crate::error::{ConfigError, Result};
use crate::options::MultiPageOptions;

impl MultiPageOptions {
    pub fn validate(&self) -> Result<()> {
        if self.entry.trim().is_empty() {
            return Err(ConfigError::invalid(
                "entry",
                "provide a glob such as \"src/pages/**/*.{ts,js}\"",
            ));
        }

        if self.placeholder.is_empty() {
            return Err(ConfigError::invalid(
                "placeholder",
                "the placeholder cannot be empty",
            ));
        }

        if self.bundler.command.is_empty() || self.bundler.command[0].trim().is_empty() {
            return Err(ConfigError::invalid(
                "bundler.command",
                "give the program and its arguments, e.g. [\"npx\", \"vite\", \"build\"]",
            ));
        }

        if self.bundler.timeout_secs == 0 {
            return Err(ConfigError::invalid(
                "bundler.timeoutSecs",
                "the timeout must be at least one second",
            ));
        }

        for name in self.strategies.keys() {
            validate_strategy_name(name)?;
        }

        for (key, page) in &self.page_configs {
            let strategy = page.strategy_name();
            if self.strategy(strategy).is_none() {
                return Err(ConfigError::UnknownStrategy {
                    page: key.clone(),
                    strategy: strategy.to_string(),
                    available: self.strategy_names().join(", "),
                });
            }
        }

        Ok(())
    }
}

/// Names that cannot become output directories: the merged tree keeps its
/// shared assets there until reorganization deletes them.
pub const RESERVED_OUTPUT_NAMES: &[&str] = &["assets"];

/// Strategy names become directory and file name components.
pub fn validate_strategy_name(name: &str) -> Result<()> {
    if name.trim().is_empty() {
        return Err(ConfigError::invalid(
            "strategies",
            "strategy names cannot be empty",
        ));
    }
    if name.contains(['/', '\\']) || name == "." || name == ".." {
        return Err(ConfigError::invalid(
            format!("strategies.{name}"),
            "strategy names cannot contain path separators",
        ));
    }
    if RESERVED_OUTPUT_NAMES.contains(&name) {
        return Err(ConfigError::invalid(
            format!("strategies.{name}"),
            format!("'{name}' is reserved for the shared asset directory"),
        ));
    }
    Ok(())
}
