//! Per-page configuration lookup.
//!
//! A static `pageConfigs` map is searched in three passes, and the first pass
//! with a hit decides:
//!
//! 1. a key equal to the page name, wherever it is declared;
//! 2. the first entry, in declaration order, whose `match` list hits;
//! 3. the first key, in declaration order, that matches the page name as a
//!    pattern.
//!
//! So `home` beats an earlier `*`, and `zeta*` declared before `*` wins for
//! `zetapage`. Declaration order is the order of the config file; the loader
//! keeps it.

use std::fmt;
use std::sync::Arc;

use indexmap::IndexMap;
use multipage_config::PageConfig;

use crate::pattern::simple_match;

/// What a page config lookup knows about the page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageContext {
    pub page_name: String,
    /// Absolute path of the entry file, `/`-separated.
    pub file_path: String,
    /// Entry file relative to the project root, `/`-separated.
    pub relative_path: String,
    /// Strategy the page has been grouped under, once known.
    pub strategy: Option<String>,
    /// Whether the page has already been assigned to `strategy`.
    pub is_matched: bool,
}

pub type PageConfigFn = dyn Fn(&PageContext) -> Option<PageConfig> + Send + Sync;

/// Where page configs come from.
#[derive(Clone)]
pub enum PageConfigSource {
    /// Keyed by exact page name or pattern, with optional `match` lists.
    Static(IndexMap<String, PageConfig>),
    /// Computed per page.
    Dynamic(Arc<PageConfigFn>),
}

impl PageConfigSource {
    pub fn dynamic<F>(f: F) -> Self
    where
        F: Fn(&PageContext) -> Option<PageConfig> + Send + Sync + 'static,
    {
        Self::Dynamic(Arc::new(f))
    }

    /// Look up the config for a page.
    ///
    /// For static maps an exact key wins, then the first entry whose `match`
    /// list hits the page name, relative path or file path (returned without
    /// its `match`), then the first key that matches the page name as a
    /// pattern.
    pub fn resolve(&self, ctx: &PageContext) -> Option<PageConfig> {
        let configs = match self {
            Self::Dynamic(f) => return f(ctx),
            Self::Static(configs) => configs,
        };

        if let Some(config) = configs.get(&ctx.page_name) {
            tracing::debug!(page = %ctx.page_name, "page config: exact key");
            return Some(config.clone());
        }

        for (key, config) in configs {
            let Some(patterns) = &config.match_patterns else {
                continue;
            };
            let hit = patterns.iter().any(|pattern| {
                simple_match(pattern, &ctx.page_name)
                    || simple_match(pattern, &ctx.relative_path)
                    || simple_match(pattern, &ctx.file_path)
            });
            if hit {
                tracing::debug!(page = %ctx.page_name, key = %key, "page config: match list");
                return Some(config.without_match());
            }
        }

        for (key, config) in configs {
            if simple_match(key, &ctx.page_name) {
                tracing::debug!(page = %ctx.page_name, key = %key, "page config: key pattern");
                return Some(config.clone());
            }
        }

        None
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, Self::Static(configs) if configs.is_empty())
    }
}

impl Default for PageConfigSource {
    fn default() -> Self {
        Self::Static(IndexMap::new())
    }
}

impl From<IndexMap<String, PageConfig>> for PageConfigSource {
    fn from(configs: IndexMap<String, PageConfig>) -> Self {
        Self::Static(configs)
    }
}

impl fmt::Debug for PageConfigSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Static(configs) => f.debug_tuple("Static").field(configs).finish(),
            Self::Dynamic(_) => f.write_str("Dynamic(..)"),
        }
    }
}
