//! Structure serialization
//!
//! Each format carries the same logical shape: a flat mapping from directory
//! path to its `files` and `dirs` lists, in structure order. Encoding is
//! deterministic: the same structure always yields byte-identical text.

mod json;
mod xml;
mod yaml;

use std::fmt;
use std::path::Path;

use anyhow::{Result, bail};
use clap::ValueEnum;

use crate::structure::DirectoryStructure;

/// Supported output formats.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum Format {
    #[default]
    Json,
    Yaml,
    Xml,
}

impl Format {
    pub fn extension(self) -> &'static str {
        match self {
            Format::Json => "json",
            Format::Yaml => "yaml",
            Format::Xml => "xml",
        }
    }

    /// Infer the format from a file extension.
    pub fn from_path(path: &Path) -> Option<Format> {
        match path.extension()?.to_str()?.to_lowercase().as_str() {
            "json" => Some(Format::Json),
            "yaml" | "yml" => Some(Format::Yaml),
            "xml" => Some(Format::Xml),
            _ => None,
        }
    }
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

/// Serialize `structure` in the requested format.
pub fn encode(structure: &DirectoryStructure, format: Format) -> Result<String> {
    match format {
        Format::Json => json::encode(structure),
        Format::Yaml => yaml::encode(structure),
        Format::Xml => Ok(xml::encode(structure)),
    }
}

/// Parse a previously encoded structure.
///
/// JSON and YAML are supported; XML input is rejected.
pub fn decode(text: &str, format: Format) -> Result<DirectoryStructure> {
    match format {
        Format::Json => json::decode(text),
        Format::Yaml => yaml::decode(text),
        Format::Xml => bail!("XML structure files cannot be loaded; use JSON or YAML"),
    }
}
