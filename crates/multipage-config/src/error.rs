//! Error types for configuration loading and validation.

use std::path::PathBuf;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, ConfigError>;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config file not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("unsupported configuration format: {}", .0.display())]
    UnsupportedFormat(PathBuf),

    #[error("invalid TOML in {}: {message}", path.display())]
    InvalidToml { path: PathBuf, message: String },

    #[error("invalid JSON in {}: {message}", path.display())]
    InvalidJson { path: PathBuf, message: String },

    #[error("invalid config value for '{field}'{}", hint_suffix(.hint))]
    InvalidValue { field: String, hint: Option<String> },

    #[error("invalid override '{key}': {message}")]
    InvalidOverride { key: String, message: String },

    #[error("page config '{page}' refers to unknown strategy '{strategy}' (available: {available})")]
    UnknownStrategy {
        page: String,
        strategy: String,
        available: String,
    },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl ConfigError {
    pub(crate) fn invalid(field: impl Into<String>, hint: impl Into<String>) -> Self {
        Self::InvalidValue {
            field: field.into(),
            hint: Some(hint.into()),
        }
    }
}

fn hint_suffix(hint: &Option<String>) -> String {
    hint.as_ref().map(|h| format!(": {h}")).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_value_includes_hint_when_present() {
        let err = ConfigError::invalid("merge", "expected one of all, page, strategy");
        assert_eq!(
            err.to_string(),
            "invalid config value for 'merge': expected one of all, page, strategy"
        );

        let bare = ConfigError::InvalidValue {
            field: "entry".into(),
            hint: None,
        };
        assert_eq!(bare.to_string(), "invalid config value for 'entry'");
    }
}
