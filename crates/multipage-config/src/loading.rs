//! Layered loading: defaults < config file (with context overrides) < env.
//!
//! Every layer is merged as a `serde_json::Value` with [`merge_values`], so
//! map keys keep the order they were declared in. figment only reads the
//! `MULTIPAGE_*` environment layer.

use std::path::{Path, PathBuf};

use figment::{providers::Env, Figment};
use serde_json::Value;

use crate::context::ConfigContext;
use crate::discovery::ConfigDiscovery;
use crate::error::{ConfigError, Result};
use crate::merge::merge_values;
use crate::options::MultiPageOptions;

pub const ENV_PREFIX: &str = "MULTIPAGE_";

/// Options that may be set through `MULTIPAGE_*` variables.
pub const ENV_KEYS: &[&str] = &["entry", "template", "placeholder", "debug", "merge"];

pub const OVERRIDES_KEY: &str = "overrides";
const OVERRIDE_SECTIONS: &[&str] = &["development", "production", "serve", "build", "cli"];
const LEGACY_STRATEGIES_KEY: &str = "buildStrategies";

#[derive(Debug, Clone)]
pub struct LoadedOptions {
    pub options: MultiPageOptions,
    /// File the options were read from, `None` when running on defaults.
    pub source: Option<PathBuf>,
}

/// Discover, layer and validate the options for a project.
///
/// `explicit` replaces discovery and must exist. Relative paths resolve
/// against `root`.
pub fn load(root: &Path, explicit: Option<&Path>, ctx: &ConfigContext) -> Result<LoadedOptions> {
    let discovery = ConfigDiscovery::new(root);
    let source = match explicit {
        Some(path) => {
            let path = root.join(path);
            if !path.is_file() {
                return Err(ConfigError::NotFound(path));
            }
            Some(path)
        }
        None => discovery.find(),
    };

    // Layers stay as JSON values until the end: figment's dictionaries are
    // sorted, and `strategies`/`pageConfigs` must keep declaration order.
    let mut value = serde_json::to_value(MultiPageOptions::default())
        .map_err(|e| ConfigError::invalid("configuration", e.to_string()))?;

    if let Some(path) = &source {
        tracing::debug!(path = %path.display(), "loading config file");
        let raw = discovery.read_value(path)?;
        merge_values(&mut value, &apply_context(raw, ctx)?);
    }

    let env: Value = Figment::from(Env::prefixed(ENV_PREFIX).only(ENV_KEYS))
        .extract()
        .map_err(|e| {
            let field = if e.path.is_empty() {
                ENV_PREFIX.trim_end_matches('_').to_string()
            } else {
                format!("{ENV_PREFIX}{}", e.path.join(".").to_uppercase())
            };
            ConfigError::InvalidValue {
                field,
                hint: Some(e.kind.to_string()),
            }
        })?;
    merge_values(&mut value, &env);

    let options: MultiPageOptions = serde_json::from_value(value)
        .map_err(|e| ConfigError::invalid("configuration", e.to_string()))?;

    options.validate()?;
    Ok(LoadedOptions { options, source })
}

/// Normalize a raw config table and fold in the override sections that
/// apply to `ctx`.
///
/// Sections merge in [`ConfigContext::override_keys`] order, so `cli` wins
/// over `build`, which wins over `production`.
pub fn apply_context(mut value: Value, ctx: &ConfigContext) -> Result<Value> {
    let overrides = {
        let Value::Object(map) = &mut value else {
            return Err(ConfigError::invalid(
                "configuration",
                "the top level must be a table",
            ));
        };
        rename_legacy_keys(map)?;
        map.remove(OVERRIDES_KEY)
    };

    let Some(overrides) = overrides else {
        return Ok(value);
    };
    let Value::Object(sections) = overrides else {
        return Err(ConfigError::InvalidOverride {
            key: OVERRIDES_KEY.to_string(),
            message: "expected a table of sections".to_string(),
        });
    };

    if let Some(unknown) = sections
        .keys()
        .find(|key| !OVERRIDE_SECTIONS.contains(&key.as_str()))
    {
        return Err(ConfigError::InvalidOverride {
            key: unknown.clone(),
            message: format!("expected one of {}", OVERRIDE_SECTIONS.join(", ")),
        });
    }

    for key in ctx.override_keys() {
        let Some(section) = sections.get(key) else {
            continue;
        };
        let mut section = section.clone();
        let Value::Object(section_map) = &mut section else {
            return Err(ConfigError::InvalidOverride {
                key: key.to_string(),
                message: "expected a table".to_string(),
            });
        };
        rename_legacy_keys(section_map)?;
        if section_map.contains_key(OVERRIDES_KEY) {
            return Err(ConfigError::InvalidOverride {
                key: key.to_string(),
                message: "override sections cannot be nested".to_string(),
            });
        }
        tracing::debug!(section = key, "applying config overrides");
        merge_values(&mut value, &section);
    }

    Ok(value)
}

fn rename_legacy_keys(map: &mut serde_json::Map<String, Value>) -> Result<()> {
    let Some(legacy) = map.remove(LEGACY_STRATEGIES_KEY) else {
        return Ok(());
    };
    if map.contains_key("strategies") {
        return Err(ConfigError::invalid(
            LEGACY_STRATEGIES_KEY,
            "use either 'strategies' or 'buildStrategies', not both",
        ));
    }
    map.insert("strategies".to_string(), legacy);
    Ok(())
}

impl MultiPageOptions {
    /// Build options from an in-memory value, without env layering.
    pub fn from_value(value: Value, ctx: &ConfigContext) -> Result<Self> {
        let value = apply_context(value, ctx)?;
        let options: Self = serde_json::from_value(value)
            .map_err(|e| ConfigError::invalid("configuration", e.to_string()))?;
        options.validate()?;
        Ok(options)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::{CommandKind, Mode};
    use serde_json::json;

    #[test]
    fn overrides_apply_in_context_order() {
        let raw = json!({
            "debug": false,
            "overrides": {
                "production": { "debug": true, "template": "prod.html" },
                "build": { "template": "build.html" },
                "development": { "template": "dev.html" }
            }
        });

        let value = apply_context(raw, &ConfigContext::cli_build()).unwrap();
        assert_eq!(value["debug"], json!(true));
        assert_eq!(value["template"], json!("build.html"));
        assert!(value.get("overrides").is_none());
    }

    #[test]
    fn cli_section_only_applies_for_cli() {
        let raw = json!({ "overrides": { "cli": { "merge": "page" } } });
        let library = ConfigContext {
            mode: Mode::Production,
            command: CommandKind::Build,
            is_cli: false,
        };

        let value = apply_context(raw.clone(), &library).unwrap();
        assert!(value.get("merge").is_none());

        let value = apply_context(raw, &ConfigContext::cli_build()).unwrap();
        assert_eq!(value["merge"], json!("page"));
    }

    #[test]
    fn unknown_override_section_is_rejected() {
        let raw = json!({ "overrides": { "staging": {} } });
        let err = apply_context(raw, &ConfigContext::cli_build()).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidOverride { key, .. } if key == "staging"));
    }

    #[test]
    fn legacy_strategies_key_is_renamed() {
        let raw = json!({ "buildStrategies": { "mobile": {} } });
        let value = apply_context(raw, &ConfigContext::cli_serve()).unwrap();
        assert!(value["strategies"]["mobile"].is_object());
    }
}
