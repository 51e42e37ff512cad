//! Loading context and the override sections it selects.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    Development,
    Production,
}

impl Mode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Development => "development",
            Self::Production => "production",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CommandKind {
    Serve,
    Build,
}

impl CommandKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Serve => "serve",
            Self::Build => "build",
        }
    }
}

/// What the configuration is being loaded for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfigContext {
    pub mode: Mode,
    pub command: CommandKind,
    pub is_cli: bool,
}

impl ConfigContext {
    /// `multipage build`: production, build, CLI.
    pub fn cli_build() -> Self {
        Self {
            mode: Mode::Production,
            command: CommandKind::Build,
            is_cli: true,
        }
    }

    /// `multipage dev`: development, serve, CLI.
    pub fn cli_serve() -> Self {
        Self {
            mode: Mode::Development,
            command: CommandKind::Serve,
            is_cli: true,
        }
    }

    /// Override sections that apply, in the order they are merged.
    pub fn override_keys(&self) -> Vec<&'static str> {
        let mut keys = vec![self.mode.as_str(), self.command.as_str()];
        if self.is_cli {
            keys.push("cli");
        }
        keys
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn override_keys_follow_mode_command_cli_order() {
        assert_eq!(
            ConfigContext::cli_build().override_keys(),
            vec!["production", "build", "cli"]
        );

        let library = ConfigContext {
            mode: Mode::Development,
            command: CommandKind::Serve,
            is_cli: false,
        };
        assert_eq!(library.override_keys(), vec!["development", "serve"]);
    }
}
