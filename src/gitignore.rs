//! Gitignore-style rule loading and matching

use std::path::Path;

use anyhow::{Context, Result};
use ignore::gitignore::{Gitignore, GitignoreBuilder};
use log::{info, warn};

/// Compiled `.gitignore` rules for a walk root.
///
/// Full gitignore semantics apply: `*` matches within a path segment, `**`
/// across segments, a trailing `/` anchors a pattern to directories, a
/// leading `/` anchors it to the root, `!` negates, and the last matching
/// rule wins.
pub struct IgnoreRules {
    matcher: Gitignore,
}

impl IgnoreRules {
    /// Load `.gitignore` from `root`.
    ///
    /// A missing or unreadable file is not an error: the walk proceeds
    /// unfiltered with an empty rule set, and the condition is logged.
    pub fn load(root: &Path) -> Self {
        let gitignore_path = root.join(".gitignore");
        if !gitignore_path.is_file() {
            info!(
                "no .gitignore found at {}, continuing without it",
                gitignore_path.display()
            );
            return Self::empty();
        }

        let mut builder = GitignoreBuilder::new(root);
        if let Some(err) = builder.add(&gitignore_path) {
            warn!("cannot read {}: {}", gitignore_path.display(), err);
            return Self::empty();
        }
        match builder.build() {
            Ok(matcher) => {
                info!("loaded .gitignore from {}", gitignore_path.display());
                Self { matcher }
            }
            Err(err) => {
                warn!("cannot compile {}: {}", gitignore_path.display(), err);
                Self::empty()
            }
        }
    }

    /// An empty rule set that matches nothing.
    pub fn empty() -> Self {
        Self {
            matcher: Gitignore::empty(),
        }
    }

    /// Compile rules from explicit pattern lines, anchored at `root`.
    pub fn from_patterns(root: &Path, patterns: &[&str]) -> Result<Self> {
        let mut builder = GitignoreBuilder::new(root);
        for pattern in patterns {
            builder
                .add_line(None, pattern)
                .with_context(|| format!("invalid ignore pattern '{pattern}'"))?;
        }
        let matcher = builder.build().context("cannot compile ignore patterns")?;
        Ok(Self { matcher })
    }

    pub fn is_empty(&self) -> bool {
        self.matcher.is_empty()
    }

    /// Whether `relative` (a path relative to the walk root) is ignored.
    ///
    /// The walker consults this per entry while descending, so ancestors of
    /// `relative` are already known not to match.
    pub fn matches(&self, relative: &Path, is_dir: bool) -> bool {
        self.matcher.matched(relative, is_dir).is_ignore()
    }
}
