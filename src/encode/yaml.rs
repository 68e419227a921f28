//! YAML encoding of the directory structure

use std::borrow::Cow;

use anyhow::{Context, Result, anyhow};
use hashlink::LinkedHashMap;
use saphyr::{LoadableYamlNode, Scalar, Yaml, YamlEmitter};

use crate::structure::{DirectoryEntry, DirectoryStructure};

fn yaml_str(s: &str) -> Yaml<'static> {
    Yaml::Value(Scalar::String(Cow::Owned(s.to_string())))
}

fn yaml_seq(items: &[String]) -> Yaml<'static> {
    Yaml::Sequence(items.iter().map(|item| yaml_str(item)).collect())
}

/// Block-style mapping with the same shape as the JSON output; empty
/// sequences render as `[]`.
pub fn encode(structure: &DirectoryStructure) -> Result<String> {
    let mut root: LinkedHashMap<Yaml, Yaml> = LinkedHashMap::new();
    for (path, entry) in structure.iter() {
        let mut value: LinkedHashMap<Yaml, Yaml> = LinkedHashMap::new();
        value.insert(yaml_str("files"), yaml_seq(&entry.files));
        value.insert(yaml_str("dirs"), yaml_seq(&entry.dirs));
        root.insert(yaml_str(path), Yaml::Mapping(value));
    }
    let document = Yaml::Mapping(root);

    let mut text = String::new();
    let mut emitter = YamlEmitter::new(&mut text);
    emitter
        .dump(&document)
        .context("failed to serialize structure as YAML")?;
    text.push('\n');
    Ok(text)
}

pub fn decode(text: &str) -> Result<DirectoryStructure> {
    let documents =
        Yaml::load_from_str(text).context("failed to parse YAML structure file")?;
    let document = documents
        .first()
        .ok_or_else(|| anyhow!("empty YAML structure file"))?;
    let mapping = document
        .as_mapping()
        .ok_or_else(|| anyhow!("top level of a structure file must be a mapping"))?;

    let mut structure = DirectoryStructure::new();
    for (key, value) in mapping.iter() {
        let path = key
            .as_str()
            .ok_or_else(|| anyhow!("structure keys must be strings"))?;
        let entry = value
            .as_mapping()
            .ok_or_else(|| anyhow!("entry for '{path}' must be a mapping"))?;
        structure.insert(
            path.to_string(),
            DirectoryEntry {
                files: string_seq(entry, "files")?,
                dirs: string_seq(entry, "dirs")?,
            },
        );
    }
    Ok(structure)
}

fn string_seq<'a>(
    mapping: &LinkedHashMap<Yaml<'a>, Yaml<'a>>,
    field: &'static str,
) -> Result<Vec<String>> {
    let Some(value) = mapping.get(&Yaml::Value(Scalar::String(field.into()))) else {
        return Ok(Vec::new());
    };
    let sequence = value
        .as_sequence()
        .ok_or_else(|| anyhow!("'{field}' must be a sequence"))?;
    sequence
        .iter()
        .map(|item| {
            item.as_str()
                .map(str::to_string)
                .ok_or_else(|| anyhow!("'{field}' entries must be strings"))
        })
        .collect()
}
