//! The flat path-keyed directory structure and its entries

use std::path::Path;

use hashlink::LinkedHashMap;
use serde::{Deserialize, Serialize};

/// The immediate contents of a single directory.
///
/// `files` and `dirs` hold bare names (no path prefix), sorted
/// lexicographically by the walker.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DirectoryEntry {
    pub files: Vec<String>,
    pub dirs: Vec<String>,
}

/// Flat mapping from directory path to its immediate contents.
///
/// Keys are inserted in traversal order (root first, preorder depth-first)
/// and that order is preserved through serde round-trips, so encoding the
/// same structure always yields byte-identical text.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DirectoryStructure {
    entries: LinkedHashMap<String, DirectoryEntry>,
}

impl DirectoryStructure {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn insert(&mut self, path: String, entry: DirectoryEntry) {
        self.entries.insert(path, entry);
    }

    pub fn get(&self, path: &str) -> Option<&DirectoryEntry> {
        self.entries.get(path)
    }

    pub fn get_mut(&mut self, path: &str) -> Option<&mut DirectoryEntry> {
        self.entries.get_mut(path)
    }

    pub fn contains_key(&self, path: &str) -> bool {
        self.entries.contains_key(path)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &DirectoryEntry)> {
        self.entries.iter()
    }

    pub fn keys(&self) -> impl Iterator<Item = &String> {
        self.entries.keys()
    }

    /// Rewrite absolute keys as paths relative to `base`, preserving order.
    ///
    /// The entry for `base` itself is keyed by the basename of `base`. Keys
    /// outside `base` are kept unchanged.
    pub fn to_relative(&self, base: &Path) -> DirectoryStructure {
        let mut relative = DirectoryStructure::new();
        for (path, entry) in self.iter() {
            let key = match Path::new(path).strip_prefix(base) {
                Ok(rel) if rel.as_os_str().is_empty() => base
                    .file_name()
                    .map(|n| n.to_string_lossy().to_string())
                    .unwrap_or_else(|| ".".to_string()),
                Ok(rel) => rel.display().to_string(),
                Err(_) => path.clone(),
            };
            relative.insert(key, entry.clone());
        }
        relative
    }
}

impl FromIterator<(String, DirectoryEntry)> for DirectoryStructure {
    fn from_iter<T: IntoIterator<Item = (String, DirectoryEntry)>>(iter: T) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}
