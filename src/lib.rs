//! dirmap - Map a directory structure to JSON, YAML, or XML, respecting .gitignore

pub mod encode;
pub mod gitignore;
pub mod pipeline;
pub mod structure;
#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;
pub mod trim;
pub mod walker;

pub use encode::{Format, decode, encode};
pub use gitignore::IgnoreRules;
pub use pipeline::{MapOptions, TrimFileOptions, create_map, trim_structure_file};
pub use structure::{DirectoryEntry, DirectoryStructure};
pub use trim::{DEFAULT_EXCLUDE_PATTERNS, ExcludePatterns};
pub use walker::TreeWalker;
