//! TreeWalker - builds the flat directory structure from the filesystem

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Result, bail};
use log::{debug, warn};

use crate::gitignore::IgnoreRules;
use crate::structure::{DirectoryEntry, DirectoryStructure};

/// Recursive directory walker.
///
/// Produces one [`DirectoryEntry`] per non-ignored directory, keyed by
/// absolute path, in preorder depth-first order. Entries within a directory
/// are sorted by name before processing, so repeated walks of an unchanged
/// tree produce identical structures.
///
/// Symlinks are never followed: a symlink resolving to a regular file is
/// listed in `files`; a symlink to a directory is neither descended into nor
/// listed, which keeps every key reachable through `dirs` and rules out
/// cycles.
pub struct TreeWalker {
    rules: IgnoreRules,
}

impl TreeWalker {
    pub fn new(rules: IgnoreRules) -> Self {
        Self { rules }
    }

    /// Walk `root` and build the structure.
    ///
    /// Fails if `root` is not an existing directory. Errors reading
    /// individual entries are logged and skipped, never aborting the walk;
    /// an unreadable directory still contributes an entry with empty
    /// sequences.
    pub fn walk(&self, root: &Path) -> Result<DirectoryStructure> {
        if !root.is_dir() {
            bail!("'{}' is not a directory", root.display());
        }
        let mut structure = DirectoryStructure::new();
        self.walk_dir(root, Path::new(""), &mut structure);
        Ok(structure)
    }

    fn walk_dir(&self, abs: &Path, rel: &Path, structure: &mut DirectoryStructure) {
        let key = abs.display().to_string();

        let entries = match fs::read_dir(abs) {
            Ok(read_dir) => read_dir,
            Err(err) => {
                warn!("cannot read directory {}: {}", abs.display(), err);
                structure.insert(key, DirectoryEntry::default());
                return;
            }
        };
        let mut entries: Vec<_> = entries
            .filter_map(|entry| match entry {
                Ok(entry) => Some(entry),
                Err(err) => {
                    warn!("skipping entry in {}: {}", abs.display(), err);
                    None
                }
            })
            .collect();
        entries.sort_by_key(|entry| entry.file_name());

        let mut files = Vec::new();
        let mut subdirs: Vec<(String, PathBuf, PathBuf)> = Vec::new();

        for entry in entries {
            let name = entry.file_name().to_string_lossy().to_string();
            let entry_rel = rel.join(&name);
            let file_type = match entry.file_type() {
                Ok(file_type) => file_type,
                Err(err) => {
                    warn!("skipping {}: {}", entry_rel.display(), err);
                    continue;
                }
            };

            if file_type.is_dir() {
                if self.rules.matches(&entry_rel, true) {
                    debug!("excluding directory {}", entry_rel.display());
                    continue;
                }
                subdirs.push((name, entry.path(), entry_rel));
            } else if file_type.is_file() {
                if self.rules.matches(&entry_rel, false) {
                    debug!("excluding file {}", entry_rel.display());
                    continue;
                }
                files.push(name);
            } else if file_type.is_symlink() {
                // Never followed. A link to a regular file is listed as a
                // file; a link to a directory is omitted entirely.
                match entry.path().metadata() {
                    Ok(meta) if meta.is_file() => {
                        if !self.rules.matches(&entry_rel, false) {
                            files.push(name);
                        }
                    }
                    Ok(_) => {
                        debug!("not following directory symlink {}", entry_rel.display());
                    }
                    Err(err) => {
                        warn!("skipping symlink {}: {}", entry_rel.display(), err);
                    }
                }
            }
        }

        debug!(
            "scanned {}: {} files, {} directories",
            abs.display(),
            files.len(),
            subdirs.len()
        );
        structure.insert(
            key,
            DirectoryEntry {
                files,
                dirs: subdirs.iter().map(|(name, _, _)| name.clone()).collect(),
            },
        );

        for (_, child_abs, child_rel) in subdirs {
            self.walk_dir(&child_abs, &child_rel, structure);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::TestTree;

    fn key(tree: &TestTree, rel: &str) -> String {
        if rel.is_empty() {
            tree.path().display().to_string()
        } else {
            tree.path().join(rel).display().to_string()
        }
    }

    #[test]
    fn test_walk_rejects_missing_root() {
        let tree = TestTree::new();
        let walker = TreeWalker::new(IgnoreRules::empty());
        let missing = tree.path().join("nope");
        assert!(walker.walk(&missing).is_err());
    }

    #[test]
    fn test_walk_rejects_file_root() {
        let tree = TestTree::new();
        let file = tree.add_file("plain.txt", "data");
        let walker = TreeWalker::new(IgnoreRules::empty());
        assert!(walker.walk(&file).is_err());
    }

    #[test]
    fn test_walk_is_preorder_and_sorted() {
        let tree = TestTree::new();
        tree.add_file("b.txt", "");
        tree.add_file("a.txt", "");
        tree.add_file("zeta/deep/leaf.txt", "");
        tree.add_file("alpha/one.txt", "");

        let walker = TreeWalker::new(IgnoreRules::empty());
        let structure = walker.walk(tree.path()).unwrap();

        let keys: Vec<_> = structure.keys().cloned().collect();
        assert_eq!(
            keys,
            vec![
                key(&tree, ""),
                key(&tree, "alpha"),
                key(&tree, "zeta"),
                key(&tree, "zeta/deep"),
            ]
        );
        let root = structure.get(&key(&tree, "")).unwrap();
        assert_eq!(root.files, vec!["a.txt", "b.txt"]);
        assert_eq!(root.dirs, vec!["alpha", "zeta"]);
    }

    #[test]
    fn test_empty_directory_still_has_entry() {
        let tree = TestTree::new();
        tree.add_dir("empty");

        let walker = TreeWalker::new(IgnoreRules::empty());
        let structure = walker.walk(tree.path()).unwrap();

        let entry = structure.get(&key(&tree, "empty")).unwrap();
        assert!(entry.files.is_empty());
        assert!(entry.dirs.is_empty());
    }

    #[test]
    fn test_ignored_directory_is_not_descended() {
        let tree = TestTree::new();
        tree.add_file("keep/file.txt", "");
        tree.add_file("skipme/inner/file.txt", "");

        let rules = IgnoreRules::from_patterns(tree.path(), &["skipme/"]).unwrap();
        let structure = TreeWalker::new(rules).walk(tree.path()).unwrap();

        assert!(!structure.contains_key(&key(&tree, "skipme")));
        assert!(!structure.contains_key(&key(&tree, "skipme/inner")));
        let root = structure.get(&key(&tree, "")).unwrap();
        assert_eq!(root.dirs, vec!["keep"]);
    }

    #[test]
    fn test_ignored_file_is_omitted_from_parent() {
        let tree = TestTree::new();
        tree.add_file("sub/b.log", "");
        tree.add_file("sub/keep.txt", "");

        let rules = IgnoreRules::from_patterns(tree.path(), &["*.log"]).unwrap();
        let structure = TreeWalker::new(rules).walk(tree.path()).unwrap();

        let sub = structure.get(&key(&tree, "sub")).unwrap();
        assert_eq!(sub.files, vec!["keep.txt"]);
    }

    #[test]
    fn test_fully_ignored_directory_keeps_entry_when_files_filtered() {
        // A directory whose files are all ignored still appears, with
        // files: [].
        let tree = TestTree::new();
        tree.add_file("sub/b.log", "");

        let rules = IgnoreRules::from_patterns(tree.path(), &["*.log"]).unwrap();
        let structure = TreeWalker::new(rules).walk(tree.path()).unwrap();

        let sub = structure.get(&key(&tree, "sub")).unwrap();
        assert!(sub.files.is_empty());
        assert!(sub.dirs.is_empty());
    }

    #[test]
    fn test_repeated_walks_are_identical() {
        let tree = TestTree::new();
        tree.add_file("a.txt", "");
        tree.add_file("sub/b.txt", "");

        let walker = TreeWalker::new(IgnoreRules::empty());
        let first = walker.walk(tree.path()).unwrap();
        let second = walker.walk(tree.path()).unwrap();
        assert_eq!(first, second);
    }

    #[cfg(unix)]
    #[test]
    fn test_symlink_policy() {
        use std::os::unix::fs::symlink;

        let tree = TestTree::new();
        tree.add_file("target.txt", "data");
        tree.add_file("realdir/inner.txt", "");
        symlink(tree.path().join("target.txt"), tree.path().join("filelink")).unwrap();
        symlink(tree.path().join("realdir"), tree.path().join("dirlink")).unwrap();

        let walker = TreeWalker::new(IgnoreRules::empty());
        let structure = walker.walk(tree.path()).unwrap();

        let root = structure.get(&key(&tree, "")).unwrap();
        assert!(root.files.contains(&"filelink".to_string()));
        assert!(!root.dirs.contains(&"dirlink".to_string()));
        assert!(!structure.contains_key(&key(&tree, "dirlink")));
        assert!(structure.contains_key(&key(&tree, "realdir")));
    }

    #[cfg(unix)]
    #[test]
    fn test_symlink_cycle_does_not_hang() {
        use std::os::unix::fs::symlink;

        let tree = TestTree::new();
        tree.add_file("subdir/file.txt", "");
        symlink("..", tree.path().join("subdir").join("parent")).unwrap();

        let walker = TreeWalker::new(IgnoreRules::empty());
        let structure = walker.walk(tree.path()).unwrap();
        assert!(structure.contains_key(&key(&tree, "subdir")));
    }

    #[cfg(unix)]
    #[test]
    fn test_broken_symlink_is_skipped() {
        use std::os::unix::fs::symlink;

        let tree = TestTree::new();
        symlink(tree.path().join("missing"), tree.path().join("broken")).unwrap();

        let walker = TreeWalker::new(IgnoreRules::empty());
        let structure = walker.walk(tree.path()).unwrap();
        let root = structure.get(&key(&tree, "")).unwrap();
        assert!(root.files.is_empty());
        assert!(root.dirs.is_empty());
    }

    #[cfg(unix)]
    #[test]
    fn test_unreadable_directory_yields_empty_entry() {
        use std::fs;
        use std::os::unix::fs::PermissionsExt;

        let tree = TestTree::new();
        let locked = tree.add_dir("locked");
        tree.add_file("visible.txt", "");
        fs::set_permissions(&locked, fs::Permissions::from_mode(0o000)).unwrap();

        let walker = TreeWalker::new(IgnoreRules::empty());
        let structure = walker.walk(tree.path()).unwrap();

        fs::set_permissions(&locked, fs::Permissions::from_mode(0o755)).unwrap();

        let entry = structure.get(&key(&tree, "locked")).unwrap();
        assert!(entry.files.is_empty());
        assert!(entry.dirs.is_empty());
        let root = structure.get(&key(&tree, "")).unwrap();
        assert_eq!(root.files, vec!["visible.txt"]);
    }
}
