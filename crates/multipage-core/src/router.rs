//! Dev-time page routing.
//!
//! Pages are resolved once when the router is built. Each request re-reads
//! the page's template so template edits show up on reload.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use indexmap::IndexMap;
use multipage_config::MultiPageOptions;
use regex::Regex;
use serde_json::Value;

use crate::entry::EntryFile;
use crate::error::{Error, IoResultExt, Result};
use crate::page_config::PageConfigSource;
use crate::plan::{plan, BuildPlan};
use crate::strategy::StrategyConfigBuilder;
use crate::template::render_page;

static PAGE_PATH: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^/([^/.]+)(\.html)?$").expect("valid regex"));

#[derive(Debug, Clone, PartialEq)]
pub struct DevPage {
    pub entry: EntryFile,
    pub strategy: String,
    pub template: PathBuf,
    /// Strategy defines overlaid with the page's own.
    pub define: IndexMap<String, Value>,
}

impl DevPage {
    pub fn name(&self) -> &str {
        &self.entry.name
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DevRoute {
    /// Send the client elsewhere.
    Redirect(String),
    /// Rendered page HTML.
    Page(String),
    /// Not a page; let static file serving handle it.
    Passthrough,
}

#[derive(Debug, Clone)]
pub struct DevRouter {
    placeholder: String,
    pages: IndexMap<String, DevPage>,
}

impl DevRouter {
    /// Resolve every page, optionally limited to some strategies.
    ///
    /// A project without entry files yields an empty page table; every
    /// request then falls through to static files.
    pub fn new(
        root: &Path,
        options: &MultiPageOptions,
        source: &PageConfigSource,
        strategies: &[String],
    ) -> Result<Self> {
        let plan = match plan(root, options, source) {
            Ok(plan) => plan,
            Err(Error::NoEntries { pattern }) => {
                tracing::warn!(%pattern, "no entry files found, serving static files only");
                BuildPlan::default()
            }
            Err(err) => return Err(err),
        }
        .retain_strategies(strategies, options)?;
        let builder = StrategyConfigBuilder::new(root, options, source);

        let mut pages = IndexMap::new();
        for page in &plan.pages {
            let strategy_config = builder.strategy_config(&page.strategy)?;
            let page_config = builder.page_config(page, &page.strategy);
            let template = builder
                .resolve_template(page.name(), page_config.as_ref(), strategy_config)
                .path;

            let mut define = strategy_config.define.clone();
            if let Some(config) = page_config {
                define.extend(config.define);
            }

            pages.insert(
                page.name().to_string(),
                DevPage {
                    entry: page.entry.clone(),
                    strategy: page.strategy.clone(),
                    template,
                    define,
                },
            );
        }

        Ok(Self {
            placeholder: options.placeholder.clone(),
            pages,
        })
    }

    pub fn pages(&self) -> impl Iterator<Item = &DevPage> {
        self.pages.values()
    }

    pub fn page(&self, name: &str) -> Option<&DevPage> {
        self.pages.get(name)
    }

    /// `index` when present, else the first page.
    pub fn default_page(&self) -> Option<&str> {
        if self.pages.contains_key("index") {
            return Some("index");
        }
        self.pages.keys().next().map(String::as_str)
    }

    pub fn route(&self, path: &str) -> Result<DevRoute> {
        let path = path.split(['?', '#']).next().unwrap_or(path);

        if path == "/" {
            return Ok(match self.default_page() {
                Some(page) => DevRoute::Redirect(format!("/{page}")),
                None => DevRoute::Passthrough,
            });
        }

        let Some(caps) = PAGE_PATH.captures(path) else {
            return Ok(DevRoute::Passthrough);
        };
        let Some(page) = self.pages.get(&caps[1]) else {
            return Ok(DevRoute::Passthrough);
        };

        if !page.template.is_file() {
            tracing::warn!(page = %page.name(), template = %page.template.display(), "template not found");
            return Ok(DevRoute::Passthrough);
        }
        let template = fs::read_to_string(&page.template).at(&page.template)?;
        if !template.contains(&self.placeholder) {
            tracing::warn!(
                template = %page.template.display(),
                placeholder = %self.placeholder,
                "template has no placeholder"
            );
            return Ok(DevRoute::Passthrough);
        }

        tracing::debug!(page = %page.name(), strategy = %page.strategy, "serving page");
        Ok(DevRoute::Page(render_page(
            &template,
            &self.placeholder,
            &page.entry.import_path(),
            &page.define,
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use multipage_config::{PageConfig, StrategyConfig};
    use serde_json::json;
    use tempfile::TempDir;

    fn project() -> (TempDir, MultiPageOptions) {
        let dir = TempDir::new().unwrap();
        for file in ["src/pages/home.js", "src/pages/mobile/main.ts"] {
            let path = dir.path().join(file);
            fs::create_dir_all(path.parent().unwrap()).unwrap();
            fs::write(path, "").unwrap();
        }
        fs::write(
            dir.path().join("index.html"),
            "<html><head></head><body><script type=\"module\" src=\"{{ENTRY_FILE}}\"></script></body></html>",
        )
        .unwrap();

        let mut options = MultiPageOptions::default();
        let mut mobile = StrategyConfig::default();
        mobile.define.insert("IS_MOBILE".into(), json!(true));
        mobile.define.insert("API".into(), json!("\"/strategy\""));
        options.strategies.insert("mobile".into(), mobile);
        let mut page = PageConfig {
            strategy: Some("mobile".into()),
            ..Default::default()
        };
        page.define.insert("API".into(), json!("\"/page\""));
        options.page_configs.insert("mobile".into(), page);
        (dir, options)
    }

    #[test]
    fn root_redirects_to_first_page_without_index() {
        let (dir, options) = project();
        let source = PageConfigSource::from(options.page_configs.clone());
        let router = DevRouter::new(dir.path(), &options, &source, &[]).unwrap();

        assert_eq!(router.route("/").unwrap(), DevRoute::Redirect("/home".into()));
        assert_eq!(router.route("/?x=1").unwrap(), DevRoute::Redirect("/home".into()));
    }

    #[test]
    fn page_routes_render_with_defines() {
        let (dir, options) = project();
        let source = PageConfigSource::from(options.page_configs.clone());
        let router = DevRouter::new(dir.path(), &options, &source, &[]).unwrap();

        let DevRoute::Page(html) = router.route("/mobile.html").unwrap() else {
            panic!("expected a page");
        };
        assert!(html.contains("src=\"/src/pages/mobile/main.ts\""));
        assert!(html.contains("globalThis.IS_MOBILE = true;"));
        assert!(html.contains("globalThis.API = \"/page\";"));

        let DevRoute::Page(home) = router.route("/home").unwrap() else {
            panic!("expected a page");
        };
        assert!(!home.contains("globalThis"));
    }

    #[test]
    fn unknown_paths_pass_through() {
        let (dir, options) = project();
        let source = PageConfigSource::from(options.page_configs.clone());
        let router = DevRouter::new(dir.path(), &options, &source, &[]).unwrap();

        assert_eq!(router.route("/contact").unwrap(), DevRoute::Passthrough);
        assert_eq!(router.route("/src/pages/home.js").unwrap(), DevRoute::Passthrough);
        assert_eq!(router.route("/assets/app.css").unwrap(), DevRoute::Passthrough);
    }

    #[test]
    fn strategy_filter_limits_pages() {
        let (dir, options) = project();
        let source = PageConfigSource::from(options.page_configs.clone());
        let router =
            DevRouter::new(dir.path(), &options, &source, &["mobile".to_string()]).unwrap();

        assert_eq!(router.pages().count(), 1);
        assert_eq!(router.default_page(), Some("mobile"));
        assert_eq!(router.route("/home").unwrap(), DevRoute::Passthrough);
    }

    #[test]
    fn project_without_entries_has_no_pages() {
        let dir = TempDir::new().unwrap();
        let options = MultiPageOptions::default();
        let source = PageConfigSource::default();
        let router = DevRouter::new(dir.path(), &options, &source, &[]).unwrap();

        assert_eq!(router.pages().count(), 0);
        assert_eq!(router.default_page(), None);
        assert_eq!(router.route("/").unwrap(), DevRoute::Passthrough);
        assert_eq!(router.route("/index").unwrap(), DevRoute::Passthrough);
    }

    #[test]
    fn unknown_strategy_filter_is_fatal_without_entries() {
        let dir = TempDir::new().unwrap();
        let options = MultiPageOptions::default();
        let source = PageConfigSource::default();

        let err = DevRouter::new(dir.path(), &options, &source, &["tablet".to_string()]).unwrap_err();
        assert!(matches!(err, Error::UnknownStrategy { .. }));
    }
}
