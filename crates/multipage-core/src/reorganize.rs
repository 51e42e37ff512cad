//! Assembling per-unit build outputs into the final tree.
//!
//! [`merge_all`] flattens every successful unit into the output root,
//! deduplicating byte-identical assets. For `page` and `strategy` merges,
//! [`reorganize`] then moves each page's HTML into its own directory together
//! with a private copy of every asset it owns and of the public files.
//!
//! A page owns the assets its HTML references under `/assets/`, the assets
//! named `mp<page>-*`, and, transitively, any asset whose file name appears in
//! the text of an asset it already owns.

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use multipage_config::{MergeMode, DEFAULT_STRATEGY};
use regex::{Captures, Regex};
use walkdir::WalkDir;

use crate::entry::root_relative;
use crate::error::{Error, IoResultExt, Result};
use crate::orchestrator::BuildResult;
use crate::temp::TEMP_PREFIX;

/// Asset path (relative to `assets/`) to the pages referencing it.
pub type AssetUsageMap = BTreeMap<String, Vec<String>>;

const ASSETS_DIR: &str = "assets";

/// Extensions scanned for references to other assets.
const TEXT_EXTENSIONS: &[&str] = &["js", "mjs", "cjs", "css", "html", "json", "map"];

static ASSET_REF: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"(?:src|href)="/assets/([^"]+)""#).expect("valid regex"));

static ABSOLUTE_ASSET_ATTR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"(src|href)="/assets/"#).expect("valid regex"));

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenamedAsset {
    pub unit: String,
    pub from: String,
    pub to: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MergeSummary {
    pub copied: usize,
    pub deduplicated: usize,
    pub renamed: Vec<RenamedAsset>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReorganizeSummary {
    /// Final HTML files, relative to the output directory.
    pub pages: Vec<String>,
    pub usage: AssetUsageMap,
    /// Non-fatal problems (missing HTML or assets).
    pub warnings: Vec<String>,
}

/// Copy every successful unit's output into `out_dir`.
///
/// Colliding assets are compared byte for byte: identical files are kept
/// once, different ones are copied as `<stem>-<unit><ext>` and that unit's
/// HTML is rewritten to the new name.
pub fn merge_all(out_dir: &Path, results: &[BuildResult]) -> Result<MergeSummary> {
    let mut summary = MergeSummary::default();
    fs::create_dir_all(out_dir).at(out_dir)?;

    for result in results.iter().filter(|r| r.success) {
        let unit_dir = &result.out_dir;
        if !unit_dir.is_dir() {
            tracing::debug!(unit = %result.id, dir = %unit_dir.display(), "unit produced no output");
            continue;
        }

        let mut renames: HashMap<String, String> = HashMap::new();
        let mut html_files = Vec::new();

        for entry in WalkDir::new(unit_dir).min_depth(1).sort_by_file_name() {
            let entry = entry.map_err(|source| Error::Walk {
                path: unit_dir.clone(),
                source,
            })?;
            let Some(relative) = root_relative(unit_dir, entry.path()) else {
                continue;
            };
            let dest = out_dir.join(&relative);

            if entry.file_type().is_dir() {
                fs::create_dir_all(&dest).at(&dest)?;
                continue;
            }

            let Some(asset) = relative.strip_prefix("assets/") else {
                copy_file(entry.path(), &dest)?;
                if is_top_level_html(&relative) {
                    html_files.push(dest);
                }
                continue;
            };

            if !dest.exists() {
                copy_file(entry.path(), &dest)?;
                summary.copied += 1;
                continue;
            }

            if same_contents(entry.path(), &dest)? {
                tracing::debug!(asset = %asset, unit = %result.id, "identical asset deduplicated");
                summary.deduplicated += 1;
                continue;
            }

            let renamed = suffixed(asset, &result.id);
            copy_file(entry.path(), &out_dir.join(ASSETS_DIR).join(&renamed))?;
            tracing::debug!(from = %asset, to = %renamed, unit = %result.id, "asset collision renamed");
            summary.renamed.push(RenamedAsset {
                unit: result.id.clone(),
                from: asset.to_string(),
                to: renamed.clone(),
            });
            renames.insert(asset.to_string(), renamed);
        }

        if !renames.is_empty() {
            for html in &html_files {
                rewrite_references(html, &renames)?;
            }
        }
    }

    Ok(summary)
}

/// Second pass for `page` and `strategy` merges. `page_strategies` maps each
/// page to the strategy it was built with.
pub fn reorganize(
    out_dir: &Path,
    mode: MergeMode,
    page_strategies: &HashMap<String, String>,
    public_dir: &Path,
) -> Result<ReorganizeSummary> {
    let mut summary = ReorganizeSummary::default();
    let html_files = top_level_html(out_dir)?;

    if !mode.is_isolated() {
        summary.pages = html_files
            .iter()
            .filter_map(|path| root_relative(out_dir, path))
            .collect();
        return Ok(summary);
    }

    let assets_dir = out_dir.join(ASSETS_DIR);

    // Phase 1: who references what.
    let mut pages = Vec::with_capacity(html_files.len());
    for html in html_files {
        let name = page_name(&html);
        let content = fs::read_to_string(&html).at(&html)?;
        let refs: BTreeSet<String> = asset_refs(&content).into_iter().collect();
        for asset in &refs {
            summary
                .usage
                .entry(asset.clone())
                .or_default()
                .push(name.clone());
        }
        pages.push((name, html, refs));
    }

    for page in page_strategies.keys() {
        if !pages.iter().any(|(name, _, _)| name == page) {
            summary
                .warnings
                .push(format!("no HTML output found for page '{page}'"));
        }
    }

    // The shared directory is deleted in phase 5 and cannot double as a target.
    for (name, _, _) in &pages {
        if target_name(mode, name, page_strategies) == ASSETS_DIR {
            let kind = if mode == MergeMode::Strategy { "strategy" } else { "page" };
            return Err(Error::ReservedName {
                kind,
                name: ASSETS_DIR.to_string(),
            });
        }
    }

    let all_assets = list_files(&assets_dir)?;
    let public_files = list_files(public_dir)?;
    let mut text_cache = HashMap::new();
    let mut targets = BTreeSet::new();

    // Phase 2: private asset copies.
    for (name, _, refs) in &pages {
        let target = out_dir.join(target_name(mode, name, page_strategies));
        let page_assets = target.join(ASSETS_DIR);
        fs::create_dir_all(&page_assets).at(&page_assets)?;

        let owned = owned_assets(name, refs, &all_assets, &assets_dir, &mut text_cache)?;
        for asset in &owned {
            let source = assets_dir.join(asset);
            if !source.is_file() {
                summary
                    .warnings
                    .push(format!("asset not found: assets/{asset} (referenced by '{name}')"));
                continue;
            }
            copy_file(&source, &page_assets.join(asset))?;
        }
        tracing::debug!(page = %name, assets = owned.len(), target = %target.display(), "copied page assets");
        targets.insert(target);
    }

    // Phase 3: public files into every target.
    for target in &targets {
        for file in &public_files {
            let source = out_dir.join(file);
            if source.is_file() {
                copy_file(&source, &target.join(file))?;
            }
        }
    }

    // Phase 4: move the HTML.
    for (name, html, _) in &pages {
        let target = out_dir.join(target_name(mode, name, page_strategies));
        let dest = match mode {
            MergeMode::Page => target.join("index.html"),
            _ => target.join(format!("{name}.html")),
        };
        let content = fs::read_to_string(html).at(html)?;
        let rewritten = ABSOLUTE_ASSET_ATTR.replace_all(&content, r#"$1="./assets/"#);
        fs::write(&dest, rewritten.as_bytes()).at(&dest)?;
        if &dest != html {
            fs::remove_file(html).at(html)?;
        }
        if let Some(relative) = root_relative(out_dir, &dest) {
            summary.pages.push(relative);
        }
    }

    // Phase 5: drop the shared copies.
    if assets_dir.is_dir() {
        if let Err(err) = fs::remove_dir_all(&assets_dir) {
            tracing::warn!(dir = %assets_dir.display(), %err, "failed to remove shared assets");
        }
    }
    for file in &public_files {
        let root_copy = out_dir.join(file);
        if root_copy.is_file() {
            if let Err(err) = fs::remove_file(&root_copy) {
                tracing::warn!(path = %root_copy.display(), %err, "failed to remove root public file");
                continue;
            }
        }
        if let Some(parent) = root_copy.parent() {
            prune_empty_dirs(parent, out_dir);
        }
    }

    summary.pages.sort();
    Ok(summary)
}

/// Asset paths referenced by `src="/assets/..."` or `href="/assets/..."`.
pub fn asset_refs(html: &str) -> Vec<String> {
    ASSET_REF
        .captures_iter(html)
        .map(|caps| caps[1].to_string())
        .collect()
}

/// Assets a page owns.
pub fn owned_assets(
    page: &str,
    refs: &BTreeSet<String>,
    all_assets: &[String],
    assets_dir: &Path,
    text_cache: &mut HashMap<String, Option<String>>,
) -> Result<BTreeSet<String>> {
    let mut owned = refs.clone();
    let prefix = format!("mp{page}-");
    owned.extend(
        all_assets
            .iter()
            .filter(|asset| file_name(asset).starts_with(&prefix))
            .cloned(),
    );

    let mut queue: Vec<String> = owned.iter().cloned().collect();
    while let Some(asset) = queue.pop() {
        let Some(text) = text_content(assets_dir, &asset, text_cache)? else {
            continue;
        };
        for candidate in all_assets {
            if owned.contains(candidate) || !text.contains(file_name(candidate)) {
                continue;
            }
            owned.insert(candidate.clone());
            queue.push(candidate.clone());
        }
    }

    Ok(owned)
}

fn text_content<'c>(
    assets_dir: &Path,
    asset: &str,
    cache: &'c mut HashMap<String, Option<String>>,
) -> Result<Option<&'c String>> {
    if !cache.contains_key(asset) {
        let path = assets_dir.join(asset);
        let is_text = Path::new(asset)
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| TEXT_EXTENSIONS.contains(&ext));
        let content = if is_text && path.is_file() {
            let bytes = fs::read(&path).at(&path)?;
            Some(String::from_utf8_lossy(&bytes).into_owned())
        } else {
            None
        };
        cache.insert(asset.to_string(), content);
    }
    Ok(cache.get(asset).and_then(Option::as_ref))
}

fn target_name(mode: MergeMode, page: &str, page_strategies: &HashMap<String, String>) -> String {
    match mode {
        MergeMode::Strategy => page_strategies
            .get(page)
            .cloned()
            .unwrap_or_else(|| DEFAULT_STRATEGY.to_string()),
        _ => page.to_string(),
    }
}

fn page_name(html: &Path) -> String {
    let stem = html
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    stem.strip_prefix(TEMP_PREFIX)
        .map(str::to_string)
        .unwrap_or(stem)
}

/// `app-1a2b.js` + `mobile` -> `app-1a2b-mobile.js`, keeping subdirectories.
fn suffixed(asset: &str, unit: &str) -> String {
    let (dir, name) = match asset.rsplit_once('/') {
        Some((dir, name)) => (Some(dir), name),
        None => (None, asset),
    };
    let renamed = match name.rsplit_once('.') {
        Some((stem, ext)) if !stem.is_empty() => format!("{stem}-{unit}.{ext}"),
        _ => format!("{name}-{unit}"),
    };
    match dir {
        Some(dir) => format!("{dir}/{renamed}"),
        None => renamed,
    }
}

fn rewrite_references(html: &Path, renames: &HashMap<String, String>) -> Result<()> {
    let content = fs::read_to_string(html).at(html)?;
    let rewritten = ASSET_REF.replace_all(&content, |caps: &Captures| {
        match renames.get(&caps[1]) {
            Some(renamed) => caps[0].replacen(&caps[1], renamed, 1),
            None => caps[0].to_string(),
        }
    });
    if rewritten != content {
        fs::write(html, rewritten.as_bytes()).at(html)?;
    }
    Ok(())
}

fn file_name(asset: &str) -> &str {
    asset.rsplit('/').next().unwrap_or(asset)
}

fn is_top_level_html(relative: &str) -> bool {
    !relative.contains('/') && relative.ends_with(".html")
}

fn top_level_html(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    if !dir.is_dir() {
        return Ok(files);
    }
    for entry in fs::read_dir(dir).at(dir)? {
        let path = entry.at(dir)?.path();
        if path.is_file() && path.extension().is_some_and(|ext| ext == "html") {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

fn list_files(dir: &Path) -> Result<Vec<String>> {
    let mut files = Vec::new();
    if !dir.is_dir() {
        return Ok(files);
    }
    for entry in WalkDir::new(dir).min_depth(1).sort_by_file_name() {
        let entry = entry.map_err(|source| Error::Walk {
            path: dir.to_path_buf(),
            source,
        })?;
        if entry.file_type().is_file() {
            if let Some(relative) = root_relative(dir, entry.path()) {
                files.push(relative);
            }
        }
    }
    Ok(files)
}

fn copy_file(from: &Path, to: &Path) -> Result<()> {
    if let Some(parent) = to.parent() {
        fs::create_dir_all(parent).at(parent)?;
    }
    fs::copy(from, to).at(from)?;
    Ok(())
}

fn same_contents(a: &Path, b: &Path) -> Result<bool> {
    let len_a = fs::metadata(a).at(a)?.len();
    let len_b = fs::metadata(b).at(b)?.len();
    if len_a != len_b {
        return Ok(false);
    }
    Ok(fs::read(a).at(a)? == fs::read(b).at(b)?)
}

/// Remove empty directories from `dir` upwards, stopping at `stop`.
fn prune_empty_dirs(dir: &Path, stop: &Path) {
    let mut current = dir.to_path_buf();
    while current != stop && current.starts_with(stop) {
        let is_empty = fs::read_dir(&current).is_ok_and(|mut entries| entries.next().is_none());
        if !is_empty || fs::remove_dir(&current).is_err() {
            break;
        }
        tracing::debug!(dir = %current.display(), "removed empty directory");
        match current.parent() {
            Some(parent) => current = parent.to_path_buf(),
            None => break,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn suffix_goes_before_extension() {
        assert_eq!(suffixed("app-1a2b.js", "mobile"), "app-1a2b-mobile.js");
        assert_eq!(suffixed("img/logo.png", "tablet"), "img/logo-tablet.png");
        assert_eq!(suffixed("LICENSE", "m"), "LICENSE-m");
    }

    #[test]
    fn refs_are_collected_from_src_and_href() {
        let html = r#"<script type="module" src="/assets/home-1.js"></script>
<link rel="stylesheet" href="/assets/home-2.css"><img src="/logo.png">"#;
        assert_eq!(asset_refs(html), vec!["home-1.js", "home-2.css"]);
    }

    #[test]
    fn page_names_drop_temp_prefix() {
        assert_eq!(page_name(Path::new("/d/.temp.mp.home.html")), "home");
        assert_eq!(page_name(Path::new("/d/about.html")), "about");
    }

    #[test]
    fn ownership_follows_prefix_and_text_references() {
        let dir = TempDir::new().unwrap();
        let assets = dir.path();
        fs::write(assets.join("home-1.js"), "import './chunk-9.js'").unwrap();
        fs::write(assets.join("chunk-9.js"), "new URL('font-3.woff2', import.meta.url)").unwrap();
        fs::write(assets.join("font-3.woff2"), [0u8, 1, 2]).unwrap();
        fs::write(assets.join("mphome-extra.css"), "").unwrap();
        fs::write(assets.join("about-4.js"), "").unwrap();

        let all = list_files(assets).unwrap();
        let refs: BTreeSet<String> = ["home-1.js".to_string()].into();
        let owned = owned_assets("home", &refs, &all, assets, &mut HashMap::new()).unwrap();

        let owned: Vec<&str> = owned.iter().map(String::as_str).collect();
        assert_eq!(owned, vec!["chunk-9.js", "font-3.woff2", "home-1.js", "mphome-extra.css"]);
    }

    #[test]
    fn prune_stops_at_non_empty_or_root() {
        let dir = TempDir::new().unwrap();
        let root = dir.path();
        fs::create_dir_all(root.join("a/b/c")).unwrap();
        fs::write(root.join("a/keep.txt"), "").unwrap();

        prune_empty_dirs(&root.join("a/b/c"), root);
        assert!(!root.join("a/b").exists());
        assert!(root.join("a").exists());
    }
}
