//! Default values for the options schema.

use std::path::PathBuf;

use indexmap::IndexMap;

use crate::options::{StrategyConfig, DEFAULT_STRATEGY};

pub const DEFAULT_ENTRY: &str = "src/pages/**/*.{ts,js}";
pub const DEFAULT_TEMPLATE: &str = "index.html";
pub const DEFAULT_PLACEHOLDER: &str = "{{ENTRY_FILE}}";
pub const DEFAULT_TIMEOUT_SECS: u64 = 600;

pub fn default_entry() -> String {
    DEFAULT_ENTRY.to_string()
}

pub fn default_template() -> PathBuf {
    PathBuf::from(DEFAULT_TEMPLATE)
}

pub fn default_placeholder() -> String {
    DEFAULT_PLACEHOLDER.to_string()
}

pub fn default_out_dir() -> PathBuf {
    PathBuf::from("dist")
}

pub fn default_public_dir() -> PathBuf {
    PathBuf::from("public")
}

pub fn default_strategies() -> IndexMap<String, StrategyConfig> {
    let mut strategies = IndexMap::new();
    strategies.insert(DEFAULT_STRATEGY.to_string(), StrategyConfig::default());
    strategies
}

pub fn default_bundler_command() -> Vec<String> {
    ["npx", "vite", "build"].map(String::from).to_vec()
}

pub fn default_timeout_secs() -> u64 {
    DEFAULT_TIMEOUT_SECS
}
