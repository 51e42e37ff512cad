//! Per-strategy bundler configuration.
//!
//! Precedence, lowest first: the base config (inputs, asset naming,
//! non-destructive output), the strategy's `bundler` block, the re-applied
//! inputs and output directory, the strategy's `define`, then each page's
//! `define` in page order.

use std::fs;
use std::path::{Path, PathBuf};

use indexmap::IndexMap;
use multipage_config::{merge_values, MultiPageOptions, PageConfig, StrategyConfig};
use serde_json::{json, Map, Value};

use crate::error::{Error, IoResultExt, Result};
use crate::page_config::PageConfigSource;
use crate::plan::PlannedPage;
use crate::temp::{temp_html_name, TempArtifacts};
use crate::template::substitute;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TemplateOrigin {
    /// `<root>/<page>.html`
    PageFile,
    /// The page config's `template`.
    Page,
    /// The strategy's `template`.
    Strategy,
    /// The top-level `template`.
    Global,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TemplateChoice {
    pub path: PathBuf,
    pub origin: TemplateOrigin,
}

/// Result of synthesizing one strategy (or one isolated page).
#[derive(Debug, Clone, PartialEq)]
pub struct StrategyBuild {
    pub strategy: String,
    /// Page name to temporary template.
    pub input: IndexMap<String, PathBuf>,
    pub define: IndexMap<String, Value>,
    /// Accumulated page `env` entries.
    pub env: IndexMap<String, String>,
    pub config: Value,
    /// Pages dropped because their template was missing.
    pub skipped: Vec<String>,
}

impl StrategyBuild {
    pub fn pages(&self) -> impl Iterator<Item = &str> {
        self.input.keys().map(String::as_str)
    }
}

pub struct StrategyConfigBuilder<'a> {
    root: &'a Path,
    options: &'a MultiPageOptions,
    source: &'a PageConfigSource,
}

impl<'a> StrategyConfigBuilder<'a> {
    pub fn new(root: &'a Path, options: &'a MultiPageOptions, source: &'a PageConfigSource) -> Self {
        Self {
            root,
            options,
            source,
        }
    }

    /// Write the temporary templates for `pages` and produce the final
    /// bundler config for `strategy`.
    pub fn build(
        &self,
        strategy: &str,
        pages: &[&PlannedPage],
        out_dir: &Path,
        temps: &mut TempArtifacts,
    ) -> Result<StrategyBuild> {
        let strategy_config = self.strategy_config(strategy)?;

        let mut input = IndexMap::new();
        let mut page_define = IndexMap::new();
        let mut env = IndexMap::new();
        let mut skipped = Vec::new();

        for page in pages {
            let page_config = self.page_config(page, strategy);
            let choice = self.resolve_template(page.name(), page_config.as_ref(), strategy_config);

            if !choice.path.is_file() {
                if choice.origin == TemplateOrigin::Global {
                    return Err(Error::TemplateNotFound(choice.path));
                }
                tracing::warn!(
                    page = %page.name(),
                    template = %choice.path.display(),
                    "template not found, skipping page"
                );
                skipped.push(page.name().to_string());
                continue;
            }

            let html = fs::read_to_string(&choice.path).at(&choice.path)?;
            if !html.contains(&self.options.placeholder) {
                tracing::warn!(
                    template = %choice.path.display(),
                    placeholder = %self.options.placeholder,
                    "template has no placeholder"
                );
            }
            let html = substitute(&html, &self.options.placeholder, &page.entry.import_path());
            let temp_path = self.root.join(temp_html_name(page.name()));
            temps.write(&temp_path, html)?;
            input.insert(page.name().to_string(), temp_path);

            if let Some(config) = page_config {
                page_define.extend(config.define);
                env.extend(config.env);
            }
        }

        let mut define = strategy_config.define.clone();
        define.extend(page_define);

        let config = final_config(out_dir, &input, &strategy_config.bundler, &define);
        Ok(StrategyBuild {
            strategy: strategy.to_string(),
            input,
            define,
            env,
            config,
            skipped,
        })
    }

    /// `<root>/<page>.html`, then page template, then strategy template,
    /// then the global template.
    pub fn resolve_template(
        &self,
        page: &str,
        page_config: Option<&PageConfig>,
        strategy_config: &StrategyConfig,
    ) -> TemplateChoice {
        let page_file = self.root.join(format!("{page}.html"));
        if page_file.is_file() {
            return TemplateChoice {
                path: page_file,
                origin: TemplateOrigin::PageFile,
            };
        }

        let (path, origin) = if let Some(template) = page_config.and_then(|c| c.template.as_ref()) {
            (template, TemplateOrigin::Page)
        } else if let Some(template) = &strategy_config.template {
            (template, TemplateOrigin::Strategy)
        } else {
            (&self.options.template, TemplateOrigin::Global)
        };

        TemplateChoice {
            path: self.root.join(path),
            origin,
        }
    }

    /// Page config looked up with the page's strategy known.
    pub fn page_config(&self, page: &PlannedPage, strategy: &str) -> Option<PageConfig> {
        let ctx = page.context(self.root, Some(strategy));
        self.source.resolve(&ctx).or_else(|| page.config.clone())
    }

    pub fn strategy_config(&self, strategy: &str) -> Result<&'a StrategyConfig> {
        self.options
            .strategy(strategy)
            .ok_or_else(|| Error::UnknownStrategy {
                name: strategy.to_string(),
                available: self.options.strategy_names().join(", "),
            })
    }
}

/// Assemble the bundler config handed to one build process.
pub fn final_config(
    out_dir: &Path,
    input: &IndexMap<String, PathBuf>,
    bundler: &Value,
    define: &IndexMap<String, Value>,
) -> Value {
    let out_dir = Value::String(out_dir.to_string_lossy().into_owned());
    let input: Map<String, Value> = input
        .iter()
        .map(|(page, path)| (page.clone(), Value::String(path.to_string_lossy().into_owned())))
        .collect();
    let input = Value::Object(input);

    let mut config = json!({
        "build": {
            "outDir": out_dir.clone(),
            "emptyOutDir": false,
            "rollupOptions": {
                "input": input.clone(),
                "output": {
                    "entryFileNames": "assets/[name]-[hash].js",
                    "chunkFileNames": "assets/[name]-[hash].js",
                    "assetFileNames": "assets/[name]-[hash].[ext]"
                }
            }
        }
    });

    if !bundler.is_null() {
        merge_values(&mut config, bundler);
    }

    set_path(&mut config, &["build", "rollupOptions", "input"], input);
    set_path(&mut config, &["build", "outDir"], out_dir);
    set_path(&mut config, &["build", "emptyOutDir"], Value::Bool(false));

    if !define.is_empty() {
        let define: Map<String, Value> = define.clone().into_iter().collect();
        merge_values(&mut config, &json!({ "define": define }));
    }

    config
}

fn set_path(target: &mut Value, path: &[&str], value: Value) {
    let Some((last, parents)) = path.split_last() else {
        *target = value;
        return;
    };
    let mut slot = target;
    for key in parents {
        slot = object_mut(slot)
            .entry(key.to_string())
            .or_insert(Value::Null);
    }
    object_mut(slot).insert(last.to_string(), value);
}

fn object_mut(value: &mut Value) -> &mut Map<String, Value> {
    if !value.is_object() {
        *value = Value::Object(Map::new());
    }
    match value {
        Value::Object(map) => map,
        _ => unreachable!("slot was replaced with an object"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entry::EntryFile;
    use tempfile::TempDir;

    fn planned(name: &str, file: &str, strategy: &str) -> PlannedPage {
        PlannedPage {
            entry: EntryFile {
                name: name.into(),
                file: file.into(),
            },
            strategy: strategy.into(),
            config: None,
        }
    }

    fn options() -> MultiPageOptions {
        let mut options = MultiPageOptions::default();
        let mut mobile = StrategyConfig::default();
        mobile.define.insert("IS_MOBILE".into(), json!(true));
        mobile.define.insert("X".into(), json!("\"b\""));
        mobile.bundler = json!({
            "build": {
                "outDir": "somewhere-else",
                "emptyOutDir": true,
                "minify": "terser",
                "rollupOptions": { "input": { "hijack": "x.html" }, "external": ["vue"] }
            }
        });
        options.strategies.insert("mobile".into(), mobile);
        options
    }

    #[test]
    fn page_define_beats_strategy_define() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("index.html"), "<script src=\"{{ENTRY_FILE}}\"></script>").unwrap();
        let options = options();
        let mut configs = IndexMap::new();
        let mut page = PageConfig::default();
        page.define.insert("X".into(), json!("\"a\""));
        configs.insert("m".to_string(), page);
        let source = PageConfigSource::from(configs);

        let builder = StrategyConfigBuilder::new(dir.path(), &options, &source);
        let mut temps = TempArtifacts::new();
        let page = planned("m", "src/pages/m/main.ts", "mobile");
        let build = builder
            .build("mobile", &[&page], &dir.path().join("dist/.temp.mp.mobile"), &mut temps)
            .unwrap();

        assert_eq!(build.define["X"], json!("\"a\""));
        assert_eq!(build.config["define"]["X"], json!("\"a\""));
        assert_eq!(build.config["define"]["IS_MOBILE"], json!(true));
    }

    #[test]
    fn strategy_bundler_cannot_override_inputs_or_output() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("index.html"), "{{ENTRY_FILE}}").unwrap();
        let options = options();
        let source = PageConfigSource::default();
        let builder = StrategyConfigBuilder::new(dir.path(), &options, &source);
        let mut temps = TempArtifacts::new();
        let out_dir = dir.path().join("dist/.temp.mp.mobile");

        let page = planned("home", "src/pages/home.js", "mobile");
        let build = builder.build("mobile", &[&page], &out_dir, &mut temps).unwrap();
        let config = &build.config["build"];

        assert_eq!(config["outDir"], json!(out_dir.to_string_lossy()));
        assert_eq!(config["emptyOutDir"], json!(false));
        assert_eq!(config["minify"], json!("terser"));
        assert_eq!(config["rollupOptions"]["external"], json!(["vue"]));
        let input = config["rollupOptions"]["input"].as_object().unwrap();
        assert_eq!(input.keys().collect::<Vec<_>>(), vec!["home"]);
        assert_eq!(
            config["rollupOptions"]["output"]["entryFileNames"],
            json!("assets/[name]-[hash].js")
        );
    }

    #[test]
    fn temp_template_has_entry_substituted() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("index.html"), "<script src=\"{{ENTRY_FILE}}\"></script>").unwrap();
        let options = MultiPageOptions::default();
        let source = PageConfigSource::default();
        let builder = StrategyConfigBuilder::new(dir.path(), &options, &source);
        let mut temps = TempArtifacts::new();

        let page = planned("home", "src/pages/home.js", "default");
        let build = builder
            .build("default", &[&page], &dir.path().join("out"), &mut temps)
            .unwrap();

        let temp = &build.input["home"];
        assert_eq!(temp, &dir.path().join(".temp.mp.home.html"));
        let html = fs::read_to_string(temp).unwrap();
        assert_eq!(html, "<script src=\"/src/pages/home.js\"></script>");

        drop(temps);
        assert!(!temp.exists());
    }

    #[test]
    fn template_precedence() {
        let dir = TempDir::new().unwrap();
        let options = MultiPageOptions::default();
        let source = PageConfigSource::default();
        let builder = StrategyConfigBuilder::new(dir.path(), &options, &source);
        let strategy = StrategyConfig {
            template: Some("strategy.html".into()),
            ..Default::default()
        };
        let page = PageConfig {
            template: Some("page.html".into()),
            ..Default::default()
        };

        let choice = builder.resolve_template("home", Some(&page), &strategy);
        assert_eq!(choice.origin, TemplateOrigin::Page);

        let choice = builder.resolve_template("home", None, &strategy);
        assert_eq!(choice.origin, TemplateOrigin::Strategy);

        let choice = builder.resolve_template("home", None, &StrategyConfig::default());
        assert_eq!(choice.origin, TemplateOrigin::Global);
        assert_eq!(choice.path, dir.path().join("index.html"));

        fs::write(dir.path().join("home.html"), "").unwrap();
        let choice = builder.resolve_template("home", Some(&page), &strategy);
        assert_eq!(choice.origin, TemplateOrigin::PageFile);
    }

    #[test]
    fn missing_page_template_skips_missing_global_fails() {
        let dir = TempDir::new().unwrap();
        let options = MultiPageOptions::default();
        let mut configs = IndexMap::new();
        configs.insert(
            "odd".to_string(),
            PageConfig {
                template: Some("missing.html".into()),
                ..Default::default()
            },
        );
        let source = PageConfigSource::from(configs);
        let builder = StrategyConfigBuilder::new(dir.path(), &options, &source);
        let mut temps = TempArtifacts::new();

        let odd = planned("odd", "src/pages/odd.js", "default");
        let build = builder
            .build("default", &[&odd], &dir.path().join("out"), &mut temps)
            .unwrap();
        assert_eq!(build.skipped, vec!["odd"]);
        assert!(build.input.is_empty());

        let home = planned("home", "src/pages/home.js", "default");
        let err = builder
            .build("default", &[&home], &dir.path().join("out"), &mut temps)
            .unwrap_err();
        assert!(matches!(err, Error::TemplateNotFound(_)));
    }
}
