//! JSON encoding of the directory structure

use anyhow::{Context, Result};

use crate::structure::DirectoryStructure;

/// Pretty-printed flat map, keys in structure order.
pub fn encode(structure: &DirectoryStructure) -> Result<String> {
    let mut text = serde_json::to_string_pretty(structure)
        .context("failed to serialize structure as JSON")?;
    text.push('\n');
    Ok(text)
}

pub fn decode(text: &str) -> Result<DirectoryStructure> {
    serde_json::from_str(text).context("failed to parse JSON structure file")
}
