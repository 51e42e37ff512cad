//! Entry file discovery and page naming.
//!
//! Files directly under the pattern's static base directory become pages
//! named after their stem. A `main` file inside a subdirectory names the page
//! after that subdirectory and wins over a same-named top-level file.

use std::collections::HashSet;
use std::path::Path;

use globset::{Glob, GlobBuilder, GlobMatcher, GlobSet, GlobSetBuilder};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use walkdir::WalkDir;

use crate::error::{Error, Result};
use crate::pattern::has_wildcard;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntryFile {
    pub name: String,
    /// Root-relative path, `/`-separated.
    pub file: String,
}

impl EntryFile {
    /// Path the page's HTML uses to load the entry.
    pub fn import_path(&self) -> String {
        format!("/{}", self.file)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CandidateFile {
    pub entry: EntryFile,
    pub priority: u8,
}

/// Discover the entry files for `pattern` under `root`.
///
/// An empty result is not an error here; callers decide how loud to be.
pub fn discover(root: &Path, pattern: &str, exclude: &[String]) -> Result<Vec<EntryFile>> {
    let pattern = normalize(pattern);
    let base = static_base(&pattern);
    let matcher = compile(&pattern)?;
    let exclusions = Exclusions::new(exclude)?;

    let walk_root = if base.is_empty() {
        root.to_path_buf()
    } else {
        root.join(base)
    };
    if !walk_root.is_dir() {
        tracing::debug!(dir = %walk_root.display(), "entry base directory does not exist");
        return Ok(Vec::new());
    }

    let mut files = Vec::new();
    for entry in WalkDir::new(&walk_root).follow_links(true) {
        let entry = entry.map_err(|source| Error::Walk {
            path: walk_root.clone(),
            source,
        })?;
        if !entry.file_type().is_file() {
            continue;
        }
        let Some(relative) = root_relative(root, entry.path()) else {
            continue;
        };
        if !matcher.is_match(&relative) {
            continue;
        }
        if exclusions.contains(&relative) {
            tracing::debug!(file = %relative, "excluded");
            continue;
        }
        files.push(relative);
    }
    files.sort();

    let candidates = files
        .into_iter()
        .filter_map(|file| {
            let candidate = candidate(base, &file);
            if candidate.is_none() {
                tracing::debug!(file = %file, "not a page entry");
            }
            candidate
        })
        .collect();

    Ok(select(candidates))
}

/// Leading path segments that contain no wildcard.
pub fn static_base(pattern: &str) -> &str {
    let mut end = 0;
    let segments: Vec<&str> = pattern.split('/').collect();
    for (index, segment) in segments.iter().enumerate() {
        if has_wildcard(segment) {
            return pattern[..end].trim_end_matches('/');
        }
        // A literal final segment is the file itself, not part of the base.
        if index + 1 == segments.len() {
            break;
        }
        end += segment.len() + 1;
    }
    pattern[..end].trim_end_matches('/')
}

/// Name a matched file, or drop it.
pub fn candidate(base: &str, file: &str) -> Option<CandidateFile> {
    let relative = if base.is_empty() {
        file
    } else {
        file.strip_prefix(base)?.strip_prefix('/')?
    };
    let parts: Vec<&str> = relative.split('/').collect();
    let stem = |part: &str| {
        Path::new(part)
            .file_stem()
            .and_then(|stem| stem.to_str())
            .map(str::to_string)
    };

    let (name, priority) = match parts.as_slice() {
        [single] => (stem(*single)?, 1),
        [dir, .., last] if stem(*last).as_deref() == Some("main") => (dir.to_string(), 2),
        _ => return None,
    };

    Some(CandidateFile {
        entry: EntryFile {
            name,
            file: file.to_string(),
        },
        priority,
    })
}

/// Keep one candidate per name: higher priority wins, ties keep the first.
pub fn select(candidates: Vec<CandidateFile>) -> Vec<EntryFile> {
    let mut chosen: IndexMap<String, CandidateFile> = IndexMap::new();
    for candidate in candidates {
        match chosen.get_mut(&candidate.entry.name) {
            Some(existing) if candidate.priority > existing.priority => {
                tracing::debug!(
                    page = %candidate.entry.name,
                    replaced = %existing.entry.file,
                    with = %candidate.entry.file,
                    "higher priority entry"
                );
                *existing = candidate;
            }
            Some(existing) => {
                tracing::debug!(
                    page = %candidate.entry.name,
                    kept = %existing.entry.file,
                    skipped = %candidate.entry.file,
                    "conflicting entry skipped"
                );
            }
            None => {
                chosen.insert(candidate.entry.name.clone(), candidate);
            }
        }
    }
    chosen.into_values().map(|c| c.entry).collect()
}

fn normalize(pattern: &str) -> String {
    let pattern = pattern.replace('\\', "/");
    pattern.trim_start_matches("./").to_string()
}

fn compile(pattern: &str) -> Result<GlobMatcher> {
    GlobBuilder::new(pattern)
        .literal_separator(true)
        .build()
        .map(|glob| glob.compile_matcher())
        .map_err(|e| Error::InvalidPattern {
            pattern: pattern.to_string(),
            message: e.to_string(),
        })
}

pub(crate) fn root_relative(root: &Path, path: &Path) -> Option<String> {
    let relative = path.strip_prefix(root).ok()?;
    let parts: Option<Vec<&str>> = relative.iter().map(|part| part.to_str()).collect();
    Some(parts?.join("/"))
}

/// Exclusions: literal root-relative paths plus glob patterns.
struct Exclusions {
    literal: HashSet<String>,
    globs: Option<GlobSet>,
}

impl Exclusions {
    fn new(exclude: &[String]) -> Result<Self> {
        let mut literal = HashSet::new();
        let mut builder = GlobSetBuilder::new();
        let mut any_glob = false;
        for raw in exclude {
            let pattern = normalize(raw);
            if pattern.split('/').any(has_wildcard) {
                let glob = Glob::new(&pattern).map_err(|e| Error::InvalidPattern {
                    pattern: raw.clone(),
                    message: e.to_string(),
                })?;
                builder.add(glob);
                any_glob = true;
            } else {
                literal.insert(pattern);
            }
        }
        let globs = if any_glob {
            Some(builder.build().map_err(|e| Error::InvalidPattern {
                pattern: exclude.join(", "),
                message: e.to_string(),
            })?)
        } else {
            None
        };
        Ok(Self { literal, globs })
    }

    fn contains(&self, relative: &str) -> bool {
        self.literal.contains(relative)
            || self
                .globs
                .as_ref()
                .is_some_and(|globs| globs.is_match(relative))
    }
}
