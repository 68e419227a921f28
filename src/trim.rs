//! Post-walk trimming of the structure with flat exclude patterns

use std::collections::HashSet;
use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use glob::Pattern;
use log::info;
use serde::Deserialize;

use crate::structure::{DirectoryEntry, DirectoryStructure};

/// Built-in exclude patterns applied when trimming is enabled and no custom
/// config is given: version-control metadata, dependency and virtualenv
/// directories, bytecode caches, build output, packaging artifacts.
pub const DEFAULT_EXCLUDE_PATTERNS: &[&str] = &[
    ".git",
    ".hg",
    ".svn",
    "node_modules",
    "venv",
    ".venv",
    "site-packages",
    "__pycache__",
    ".ipynb_checkpoints",
    ".mypy_cache",
    ".pytest_cache",
    ".tox",
    "target",
    "build",
    "dist",
    "*.egg-info",
    "*.dist-info",
    "*.pyc",
];

/// On-disk shape of an exclude config file.
#[derive(Debug, Deserialize)]
pub struct ExcludeConfig {
    pub exclude_patterns: Vec<String>,
}

/// Flat, non-negating exclude patterns used for trimming.
///
/// Unlike gitignore rules these carry no polarity or directory anchoring: a
/// pattern matches a path if it glob-matches any single path segment or the
/// full path. Matching a directory removes its entire subtree.
pub struct ExcludePatterns {
    patterns: Vec<Pattern>,
}

impl ExcludePatterns {
    pub fn compile<S: AsRef<str>>(patterns: &[S]) -> Result<Self> {
        let patterns = patterns
            .iter()
            .map(|p| {
                Pattern::new(p.as_ref())
                    .with_context(|| format!("invalid exclude pattern '{}'", p.as_ref()))
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { patterns })
    }

    /// The built-in default set.
    pub fn defaults() -> Self {
        Self::compile(DEFAULT_EXCLUDE_PATTERNS).expect("default exclude patterns are valid globs")
    }

    /// Load patterns from a JSON file of the form
    /// `{"exclude_patterns": ["<glob>", ...]}`.
    pub fn from_config_file(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)
            .with_context(|| format!("cannot read exclude config {}", path.display()))?;
        let config: ExcludeConfig = serde_json::from_str(&text)
            .with_context(|| format!("malformed exclude config {}", path.display()))?;
        info!(
            "loaded {} exclude patterns from {}",
            config.exclude_patterns.len(),
            path.display()
        );
        Self::compile(&config.exclude_patterns)
    }

    pub fn len(&self) -> usize {
        self.patterns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }

    /// Whether `path` matches any pattern, testing the full path and each
    /// path segment. Bare names are a single segment.
    pub fn matches(&self, path: &str) -> bool {
        self.patterns.iter().any(|pattern| {
            pattern.matches(path)
                || Path::new(path)
                    .components()
                    .any(|c| pattern.matches(&c.as_os_str().to_string_lossy()))
        })
    }
}

/// Remove everything matching `patterns` from `structure`.
///
/// Entries whose key matches are dropped along with their whole subtree.
/// Surviving entries lose matching file names from `files`; `dirs` loses
/// names that match or whose entry was dropped, so it never names a
/// trimmed-away entry. Operates purely in memory.
pub fn trim(structure: &DirectoryStructure, patterns: &ExcludePatterns) -> DirectoryStructure {
    if patterns.is_empty() {
        return structure.clone();
    }

    // A pattern may match a directory's full path without matching any
    // segment of its descendants' keys, so descendants of a removed key
    // must be removed by ancestry, not by their own match.
    let removed: Vec<&Path> = structure
        .keys()
        .filter(|path| patterns.matches(path))
        .map(|path| Path::new(path.as_str()))
        .collect();
    let kept: HashSet<&str> = structure
        .keys()
        .map(|path| path.as_str())
        .filter(|path| !removed.iter().any(|gone| Path::new(path).starts_with(gone)))
        .collect();

    let mut trimmed = DirectoryStructure::new();
    for (path, entry) in structure.iter() {
        if !kept.contains(path.as_str()) {
            continue;
        }
        let files = entry
            .files
            .iter()
            .filter(|name| !patterns.matches(name))
            .cloned()
            .collect();
        let dirs = entry
            .dirs
            .iter()
            .filter(|name| {
                if patterns.matches(name) {
                    return false;
                }
                let child = Path::new(path).join(name.as_str()).display().to_string();
                // Keep names with no entry at all (structures loaded from
                // older files may omit them); drop only trimmed children.
                !structure.contains_key(&child) || kept.contains(child.as_str())
            })
            .cloned()
            .collect();
        trimmed.insert(path.clone(), DirectoryEntry { files, dirs });
    }

    info!(
        "trimmed structure: {} directories kept, {} excluded",
        trimmed.len(),
        structure.len() - trimmed.len()
    );
    trimmed
}
