//! Discovery plus page-config resolution, grouped by strategy.

use std::path::Path;

use indexmap::IndexMap;
use multipage_config::{MultiPageOptions, PageConfig};

use crate::entry::{discover, EntryFile};
use crate::error::{Error, Result};
use crate::page_config::{PageConfigSource, PageContext};

#[derive(Debug, Clone, PartialEq)]
pub struct PlannedPage {
    pub entry: EntryFile,
    pub strategy: String,
    pub config: Option<PageConfig>,
}

impl PlannedPage {
    pub fn name(&self) -> &str {
        &self.entry.name
    }

    /// Lookup context for this page.
    pub fn context(&self, root: &Path, strategy: Option<&str>) -> PageContext {
        page_context(root, &self.entry, strategy)
    }
}

/// Every discovered page, each in exactly one strategy group.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BuildPlan {
    pub pages: Vec<PlannedPage>,
    /// Strategy name to page names, in discovery order.
    pub groups: IndexMap<String, Vec<String>>,
}

impl BuildPlan {
    pub fn page(&self, name: &str) -> Option<&PlannedPage> {
        self.pages.iter().find(|page| page.name() == name)
    }

    pub fn page_names(&self) -> Vec<&str> {
        self.pages.iter().map(PlannedPage::name).collect()
    }

    /// Pages of one strategy group, in discovery order.
    pub fn group(&self, strategy: &str) -> Vec<&PlannedPage> {
        self.groups
            .get(strategy)
            .into_iter()
            .flatten()
            .filter_map(|name| self.page(name))
            .collect()
    }

    /// Keep only the named strategies. Unknown names are fatal.
    pub fn retain_strategies(self, names: &[String], options: &MultiPageOptions) -> Result<Self> {
        if names.is_empty() {
            return Ok(self);
        }
        if let Some(unknown) = names.iter().find(|name| options.strategy(name).is_none()) {
            return Err(Error::UnknownStrategy {
                name: unknown.clone(),
                available: options.strategy_names().join(", "),
            });
        }
        Ok(self.retain(|page| names.contains(&page.strategy)))
    }

    /// Keep a single page. Unknown names are fatal.
    pub fn retain_page(self, name: &str) -> Result<Self> {
        if self.page(name).is_none() {
            return Err(Error::UnknownPage {
                name: name.to_string(),
                available: self.page_names().join(", "),
            });
        }
        Ok(self.retain(|page| page.name() == name))
    }

    fn retain(self, keep: impl Fn(&PlannedPage) -> bool) -> Self {
        let pages: Vec<PlannedPage> = self.pages.into_iter().filter(|p| keep(p)).collect();
        let groups = group_pages(&pages);
        Self { pages, groups }
    }
}

/// Discover pages and assign each one a strategy.
pub fn plan(root: &Path, options: &MultiPageOptions, source: &PageConfigSource) -> Result<BuildPlan> {
    let entries = discover(root, &options.entry, &options.exclude)?;
    if entries.is_empty() {
        return Err(Error::NoEntries {
            pattern: options.entry.clone(),
        });
    }

    let mut pages = Vec::with_capacity(entries.len());
    for entry in entries {
        let ctx = page_context(root, &entry, None);
        let config = source.resolve(&ctx);
        let strategy = config
            .as_ref()
            .map(PageConfig::strategy_name)
            .unwrap_or(multipage_config::DEFAULT_STRATEGY)
            .to_string();

        if options.strategy(&strategy).is_none() {
            return Err(Error::PageStrategy {
                page: entry.name,
                strategy,
                available: options.strategy_names().join(", "),
            });
        }

        tracing::debug!(page = %entry.name, file = %entry.file, strategy = %strategy, "planned page");
        pages.push(PlannedPage {
            entry,
            strategy,
            config,
        });
    }

    let groups = group_pages(&pages);
    Ok(BuildPlan { pages, groups })
}

fn group_pages(pages: &[PlannedPage]) -> IndexMap<String, Vec<String>> {
    let mut groups: IndexMap<String, Vec<String>> = IndexMap::new();
    for page in pages {
        groups
            .entry(page.strategy.clone())
            .or_default()
            .push(page.name().to_string());
    }
    groups
}

fn page_context(root: &Path, entry: &EntryFile, strategy: Option<&str>) -> PageContext {
    let absolute = root.join(&entry.file);
    PageContext {
        page_name: entry.name.clone(),
        file_path: absolute.to_string_lossy().replace('\\', "/"),
        relative_path: entry.file.clone(),
        strategy: strategy.map(str::to_string),
        is_matched: strategy.is_some(),
    }
}
