//! The options schema.
//!
//! Keys are camelCase and unknown keys are rejected everywhere except inside
//! [`StrategyConfig::bundler`], which is forwarded to the bundler untouched.

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use std::sync::OnceLock;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::defaults::*;

/// Strategy used for pages that do not name one.
pub const DEFAULT_STRATEGY: &str = "default";

/// How per-unit build outputs are assembled into the final tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MergeMode {
    /// Flatten every unit into the output root.
    #[default]
    All,
    /// One self-contained directory per page.
    Page,
    /// One self-contained directory per strategy.
    Strategy,
}

impl MergeMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::All => "all",
            Self::Page => "page",
            Self::Strategy => "strategy",
        }
    }

    /// Whether pages end up in their own directories after the merge.
    pub fn is_isolated(&self) -> bool {
        !matches!(self, Self::All)
    }
}

impl fmt::Display for MergeMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MergeMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "all" => Ok(Self::All),
            "page" => Ok(Self::Page),
            "strategy" => Ok(Self::Strategy),
            other => Err(format!(
                "unknown merge mode '{other}' (expected all, page or strategy)"
            )),
        }
    }
}

/// A named group of bundler settings shared by the pages assigned to it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct StrategyConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub template: Option<PathBuf>,

    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub define: IndexMap<String, Value>,

    /// Opaque bundler settings, deep-merged into the final config.
    #[serde(default, skip_serializing_if = "Value::is_null")]
    pub bundler: Value,
}

/// One pattern or a list of patterns.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MatchPatterns {
    One(String),
    Many(Vec<String>),
}

impl MatchPatterns {
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        let slice: &[String] = match self {
            Self::One(pattern) => std::slice::from_ref(pattern),
            Self::Many(patterns) => patterns,
        };
        slice.iter().map(String::as_str)
    }
}

/// Per-page overrides.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct PageConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub strategy: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub template: Option<PathBuf>,

    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub define: IndexMap<String, Value>,

    #[serde(rename = "match", default, skip_serializing_if = "Option::is_none")]
    pub match_patterns: Option<MatchPatterns>,

    /// Extra environment for the page's build process. Only honored when the
    /// page is built in isolation.
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub env: IndexMap<String, String>,
}

impl PageConfig {
    /// Strategy this page builds with, `"default"` when unset.
    pub fn strategy_name(&self) -> &str {
        self.strategy.as_deref().unwrap_or(DEFAULT_STRATEGY)
    }

    /// A copy without the `match` list, as handed to callers after a match.
    pub fn without_match(&self) -> Self {
        Self {
            match_patterns: None,
            ..self.clone()
        }
    }
}

/// How the bundler is invoked for each build unit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct BundlerSettings {
    /// Program and arguments. `{unit}`, `{outDir}` and `{id}` are substituted.
    #[serde(default = "default_bundler_command")]
    pub command: Vec<String>,

    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for BundlerSettings {
    fn default() -> Self {
        Self {
            command: default_bundler_command(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct MultiPageOptions {
    #[serde(default = "default_entry")]
    pub entry: String,

    #[serde(default)]
    pub exclude: Vec<String>,

    #[serde(default = "default_template")]
    pub template: PathBuf,

    #[serde(default = "default_placeholder")]
    pub placeholder: String,

    #[serde(default)]
    pub debug: bool,

    #[serde(default)]
    pub merge: MergeMode,

    #[serde(default = "default_out_dir")]
    pub out_dir: PathBuf,

    #[serde(default = "default_public_dir")]
    pub public_dir: PathBuf,

    #[serde(default = "default_strategies", alias = "buildStrategies")]
    pub strategies: IndexMap<String, StrategyConfig>,

    #[serde(default)]
    pub page_configs: IndexMap<String, PageConfig>,

    #[serde(default)]
    pub bundler: BundlerSettings,
}

impl Default for MultiPageOptions {
    fn default() -> Self {
        Self {
            entry: default_entry(),
            exclude: Vec::new(),
            template: default_template(),
            placeholder: default_placeholder(),
            debug: false,
            merge: MergeMode::default(),
            out_dir: default_out_dir(),
            public_dir: default_public_dir(),
            strategies: default_strategies(),
            page_configs: IndexMap::new(),
            bundler: BundlerSettings::default(),
        }
    }
}

impl MultiPageOptions {
    /// Look up a strategy. `"default"` always resolves, to an empty strategy
    /// when it is not configured.
    pub fn strategy(&self, name: &str) -> Option<&StrategyConfig> {
        self.strategies
            .get(name)
            .or_else(|| (name == DEFAULT_STRATEGY).then(empty_strategy))
    }

    /// Every valid strategy name, configured ones first.
    pub fn strategy_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.strategies.keys().map(String::as_str).collect();
        if !self.strategies.contains_key(DEFAULT_STRATEGY) {
            names.push(DEFAULT_STRATEGY);
        }
        names
    }

    /// True when nothing beyond the defaults has been configured.
    pub fn is_effectively_empty(&self) -> bool {
        self == &Self::default()
    }

    /// A minimal configuration file, used in error messages.
    pub fn example_config() -> &'static str {
        r#"# multipage.toml
entry = "src/pages/**/*.{ts,js}"
template = "index.html"

[strategies.default]

[strategies.mobile]
define = { IS_MOBILE = true }

[pageConfigs.mobile]
strategy = "mobile"
"#
    }
}

fn empty_strategy() -> &'static StrategyConfig {
    static EMPTY: OnceLock<StrategyConfig> = OnceLock::new();
    EMPTY.get_or_init(StrategyConfig::default)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn defaults_match_documented_values() {
        let opts = MultiPageOptions::default();
        assert_eq!(opts.entry, "src/pages/**/*.{ts,js}");
        assert_eq!(opts.template, PathBuf::from("index.html"));
        assert_eq!(opts.placeholder, "{{ENTRY_FILE}}");
        assert_eq!(opts.merge, MergeMode::All);
        assert_eq!(opts.out_dir, PathBuf::from("dist"));
        assert_eq!(opts.strategies.keys().collect::<Vec<_>>(), vec!["default"]);
        assert_eq!(opts.bundler.command, vec!["npx", "vite", "build"]);
        assert_eq!(opts.bundler.timeout_secs, 600);
        assert!(opts.is_effectively_empty());
    }

    #[test]
    fn default_strategy_is_implicit() {
        let mut opts = MultiPageOptions::default();
        opts.strategies.clear();
        opts.strategies
            .insert("mobile".into(), StrategyConfig::default());

        assert!(opts.strategy("default").is_some());
        assert!(opts.strategy("mobile").is_some());
        assert!(opts.strategy("tablet").is_none());
        assert_eq!(opts.strategy_names(), vec!["mobile", "default"]);
    }

    #[test]
    fn match_accepts_string_or_list() {
        let one: PageConfig = serde_json::from_value(json!({ "match": "admin/*" })).unwrap();
        let many: PageConfig =
            serde_json::from_value(json!({ "match": ["a/*", "b/**"] })).unwrap();

        assert_eq!(one.match_patterns.unwrap().iter().collect::<Vec<_>>(), vec!["admin/*"]);
        assert_eq!(many.match_patterns.unwrap().iter().collect::<Vec<_>>(), vec!["a/*", "b/**"]);
    }

    #[test]
    fn unknown_keys_are_rejected_outside_bundler_blob() {
        let err = serde_json::from_value::<StrategyConfig>(json!({ "defines": {} }));
        assert!(err.is_err());

        let ok: StrategyConfig = serde_json::from_value(json!({
            "bundler": { "build": { "anything": { "goes": true } } }
        }))
        .unwrap();
        assert_eq!(ok.bundler["build"]["anything"]["goes"], json!(true));
    }

    #[test]
    fn build_strategies_alias_is_accepted() {
        let opts: MultiPageOptions = serde_json::from_value(json!({
            "buildStrategies": { "mobile": {} }
        }))
        .unwrap();
        assert!(opts.strategies.contains_key("mobile"));
    }

    #[test]
    fn merge_mode_parses_from_str() {
        assert_eq!("page".parse::<MergeMode>().unwrap(), MergeMode::Page);
        assert!("flat".parse::<MergeMode>().is_err());
        assert!(MergeMode::Strategy.is_isolated());
        assert!(!MergeMode::All.is_isolated());
    }
}
