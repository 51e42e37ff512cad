//! Error types for the build pipeline.

use std::io;
use std::path::{Path, PathBuf};

use multipage_config::{ConfigError, MultiPageOptions};
use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("no entry files found matching '{pattern}'\n\nHint: a minimal configuration looks like:\n\n{}", MultiPageOptions::example_config())]
    NoEntries { pattern: String },

    #[error("invalid glob pattern '{pattern}': {message}")]
    InvalidPattern { pattern: String, message: String },

    #[error("unknown strategy '{name}' (available: {available})")]
    UnknownStrategy { name: String, available: String },

    #[error("page '{page}' resolved to unknown strategy '{strategy}' (available: {available})")]
    PageStrategy {
        page: String,
        strategy: String,
        available: String,
    },

    #[error("{kind} '{name}' would be written into the shared '{name}' directory\n\nHint: rename it, or use merge = \"all\"")]
    ReservedName { kind: &'static str, name: String },

    #[error("unknown page '{name}' (available: {available})")]
    UnknownPage { name: String, available: String },

    #[error("no pages left to build\n\nHint: check the --strategy/--page filters and that every page has a template\n\n{}", MultiPageOptions::example_config())]
    NoStrategies,

    #[error("template not found: {}\n\nHint: create it or set 'template' in the configuration", .0.display())]
    TemplateNotFound(PathBuf),

    #[error("invalid build unit manifest {}: {message}", path.display())]
    Manifest { path: PathBuf, message: String },

    #[error("{}: {source}", path.display())]
    Fs {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to walk {}: {source}", path.display())]
    Walk {
        path: PathBuf,
        #[source]
        source: walkdir::Error,
    },

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Attach the offending path to I/O errors.
pub(crate) trait IoResultExt<T> {
    fn at(self, path: &Path) -> Result<T>;
}

impl<T> IoResultExt<T> for std::result::Result<T, io::Error> {
    fn at(self, path: &Path) -> Result<T> {
        self.map_err(|source| Error::Fs {
            path: path.to_path_buf(),
            source,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_entries_message_carries_example() {
        let err = Error::NoEntries {
            pattern: "src/pages/**/*.ts".into(),
        };
        let message = err.to_string();
        assert!(message.contains("src/pages/**/*.ts"));
        assert!(message.contains("[strategies.default]"));
    }

    #[test]
    fn fs_errors_name_the_path() {
        let err = std::fs::read("/definitely/not/here")
            .at(Path::new("/definitely/not/here"))
            .unwrap_err();
        assert!(err.to_string().starts_with("/definitely/not/here: "));
    }
}
