//! Build units and their manifests.
//!
//! A unit is one bundler run. The child learns which unit it is building from
//! a JSON manifest whose path is passed both as a command token and through
//! its own environment; the parent's environment is never touched.

use std::fs;
use std::path::{Path, PathBuf};

use indexmap::IndexMap;
use multipage_config::{MergeMode, MultiPageOptions, RESERVED_OUTPUT_NAMES};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{Error, IoResultExt, Result};
use crate::page_config::PageConfigSource;
use crate::plan::BuildPlan;
use crate::strategy::StrategyConfigBuilder;
use crate::temp::{TempArtifacts, TEMP_PREFIX};

/// Environment variable carrying the manifest path into the child.
pub const UNIT_ENV_VAR: &str = "MULTIPAGE_BUILD_UNIT";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UnitKind {
    /// Every page of one strategy.
    Strategy,
    /// One page in isolation.
    Page,
}

impl UnitKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Strategy => "strategy",
            Self::Page => "page",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BuildUnit {
    pub id: String,
    pub kind: UnitKind,
    pub strategy: String,
    pub pages: Vec<String>,
    pub out_dir: PathBuf,
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub env: IndexMap<String, String>,
    /// Final bundler configuration.
    pub config: Value,
}

impl BuildUnit {
    /// `<root>/.temp.mp.<id>.unit.json`
    pub fn manifest_path(&self, root: &Path) -> PathBuf {
        root.join(format!("{TEMP_PREFIX}{}.unit.json", self.id))
    }

    pub fn write_manifest(&self, root: &Path, temps: &mut TempArtifacts) -> Result<PathBuf> {
        let path = self.manifest_path(root);
        let json = serde_json::to_vec_pretty(self)?;
        temps.write(&path, json)?;
        Ok(path)
    }

    pub fn read_manifest(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).at(path)?;
        serde_json::from_str(&content).map_err(|e| Error::Manifest {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
    }
}

/// Staging directory for a unit inside the output directory.
pub fn unit_out_dir(out_dir: &Path, id: &str) -> PathBuf {
    out_dir.join(format!("{TEMP_PREFIX}{id}"))
}

/// Turn a plan into build units, writing temporary templates and manifests
/// under `temps`.
///
/// `all` and `strategy` merges build one unit per strategy; `page` merges, or
/// `isolate_pages`, build one unit per page so that per-page `env` and
/// `define` never leak between pages.
pub fn synthesize(
    root: &Path,
    out_dir: &Path,
    options: &MultiPageOptions,
    source: &PageConfigSource,
    plan: &BuildPlan,
    isolate_pages: bool,
    temps: &mut TempArtifacts,
) -> Result<Vec<BuildUnit>> {
    let builder = StrategyConfigBuilder::new(root, options, source);
    let per_page = isolate_pages || options.merge == MergeMode::Page;
    let mut units = Vec::new();

    if options.merge == MergeMode::Page {
        if let Some(page) = plan.pages.iter().find(|page| RESERVED_OUTPUT_NAMES.contains(&page.name())) {
            return Err(Error::ReservedName {
                kind: "page",
                name: page.name().to_string(),
            });
        }
    }

    for (strategy, names) in &plan.groups {
        let pages = plan.group(strategy);
        if per_page {
            for page in pages {
                let id = page.name().to_string();
                let dir = unit_out_dir(out_dir, &id);
                let build = builder.build(strategy, &[page], &dir, temps)?;
                if build.input.is_empty() {
                    continue;
                }
                units.push(BuildUnit {
                    id,
                    kind: UnitKind::Page,
                    strategy: strategy.clone(),
                    pages: build.pages().map(str::to_string).collect(),
                    out_dir: dir,
                    env: build.env,
                    config: build.config,
                });
            }
        } else {
            let dir = unit_out_dir(out_dir, strategy);
            let build = builder.build(strategy, &pages, &dir, temps)?;
            if build.input.is_empty() {
                tracing::warn!(strategy = %strategy, pages = names.len(), "no buildable pages in strategy");
                continue;
            }
            if !build.env.is_empty() {
                tracing::debug!(strategy = %strategy, "page env is only applied to isolated page builds");
            }
            units.push(BuildUnit {
                id: strategy.clone(),
                kind: UnitKind::Strategy,
                strategy: strategy.clone(),
                pages: build.pages().map(str::to_string).collect(),
                out_dir: dir,
                env: IndexMap::new(),
                config: build.config,
            });
        }
    }

    if units.is_empty() {
        return Err(Error::NoStrategies);
    }

    for unit in &units {
        unit.write_manifest(root, temps)?;
    }
    Ok(units)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::plan::plan;
    use multipage_config::{PageConfig, StrategyConfig};
    use serde_json::json;
    use tempfile::TempDir;

    fn project() -> TempDir {
        let dir = TempDir::new().unwrap();
        for file in ["src/pages/home.js", "src/pages/about.js", "src/pages/mobile/main.ts"] {
            let path = dir.path().join(file);
            fs::create_dir_all(path.parent().unwrap()).unwrap();
            fs::write(path, "").unwrap();
        }
        fs::write(dir.path().join("index.html"), "<script src=\"{{ENTRY_FILE}}\"></script>").unwrap();
        dir
    }

    fn options(merge: MergeMode) -> MultiPageOptions {
        let mut options = MultiPageOptions::default();
        options.merge = merge;
        let mut mobile = StrategyConfig::default();
        mobile.define.insert("IS_MOBILE".into(), json!(true));
        options.strategies.insert("mobile".into(), mobile);
        let mut env = IndexMap::new();
        env.insert("TARGET".to_string(), "phone".to_string());
        options.page_configs.insert(
            "mobile".into(),
            PageConfig {
                strategy: Some("mobile".into()),
                env,
                ..Default::default()
            },
        );
        options
    }

    #[test]
    fn one_unit_per_strategy_by_default() {
        let dir = project();
        let root = dir.path();
        let options = options(MergeMode::All);
        let source = PageConfigSource::from(options.page_configs.clone());
        let plan = plan(root, &options, &source).unwrap();
        let mut temps = TempArtifacts::new();

        let units = synthesize(root, &root.join("dist"), &options, &source, &plan, false, &mut temps).unwrap();

        let ids: Vec<_> = units.iter().map(|u| (u.id.as_str(), u.kind)).collect();
        assert_eq!(ids, vec![("default", UnitKind::Strategy), ("mobile", UnitKind::Strategy)]);
        assert_eq!(units[0].pages, vec!["about", "home"]);
        assert_eq!(units[1].out_dir, root.join("dist/.temp.mp.mobile"));
        assert_eq!(units[1].config["define"]["IS_MOBILE"], json!(true));
        assert!(units[1].env.is_empty());

        let manifest = units[1].manifest_path(root);
        assert_eq!(BuildUnit::read_manifest(&manifest).unwrap(), units[1]);
    }

    #[test]
    fn page_merge_isolates_pages_and_carries_env() {
        let dir = project();
        let root = dir.path();
        let options = options(MergeMode::Page);
        let source = PageConfigSource::from(options.page_configs.clone());
        let plan = plan(root, &options, &source).unwrap();
        let mut temps = TempArtifacts::new();

        let units = synthesize(root, &root.join("dist"), &options, &source, &plan, false, &mut temps).unwrap();

        assert_eq!(units.len(), 3);
        assert!(units.iter().all(|u| u.kind == UnitKind::Page && u.pages == vec![u.id.clone()]));
        let mobile = units.iter().find(|u| u.id == "mobile").unwrap();
        assert_eq!(mobile.strategy, "mobile");
        assert_eq!(mobile.env["TARGET"], "phone");
    }

    #[test]
    fn manifests_and_templates_are_cleaned_with_guard() {
        let dir = project();
        let root = dir.path();
        let options = options(MergeMode::All);
        let source = PageConfigSource::from(options.page_configs.clone());
        let plan = plan(root, &options, &source).unwrap();

        let manifest = {
            let mut temps = TempArtifacts::new();
            let units = synthesize(root, &root.join("dist"), &options, &source, &plan, false, &mut temps).unwrap();
            let manifest = units[0].manifest_path(root);
            assert!(manifest.exists());
            assert!(root.join(".temp.mp.home.html").exists());
            manifest
        };
        assert!(!manifest.exists());
        assert!(!root.join(".temp.mp.home.html").exists());
    }

    #[test]
    fn malformed_manifest_is_reported() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("bad.unit.json");
        fs::write(&path, "{ \"id\": 1 }").unwrap();
        assert!(matches!(BuildUnit::read_manifest(&path), Err(Error::Manifest { .. })));
    }

    #[test]
    fn page_named_assets_is_rejected_for_page_merge() {
        let dir = project();
        let root = dir.path();
        fs::create_dir_all(root.join("src/pages/assets")).unwrap();
        fs::write(root.join("src/pages/assets/main.js"), "").unwrap();
        let options = options(MergeMode::Page);
        let source = PageConfigSource::from(options.page_configs.clone());
        let plan = plan(root, &options, &source).unwrap();
        let mut temps = TempArtifacts::new();

        let err = synthesize(root, &root.join("dist"), &options, &source, &plan, false, &mut temps).unwrap_err();

        assert!(matches!(err, Error::ReservedName { ref name, .. } if name == "assets"));
        assert!(temps.is_empty());
    }
}
