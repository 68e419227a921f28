//! Pipeline orchestration: walk, trim, encode, write

use std::env;
use std::fs;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, anyhow};
use log::{info, warn};

use crate::encode::{self, Format};
use crate::gitignore::IgnoreRules;
use crate::structure::DirectoryStructure;
use crate::trim::{self, ExcludePatterns};
use crate::walker::TreeWalker;

/// Options for [`create_map`].
#[derive(Debug, Clone, Default)]
pub struct MapOptions {
    /// Directory to map; the current working directory when `None`.
    pub directory: Option<PathBuf>,
    pub format: Format,
    /// Disable the default trimming pass.
    pub no_trim: bool,
    /// JSON file with `{"exclude_patterns": [...]}`; built-in defaults when
    /// `None`.
    pub exclude_config: Option<PathBuf>,
    /// Output file; `<root>/structure.<format>` when `None`.
    pub output: Option<PathBuf>,
    /// Use root-relative paths as structure keys.
    pub relative_paths: bool,
}

/// Options for [`trim_structure_file`].
#[derive(Debug, Clone)]
pub struct TrimFileOptions {
    /// Previously written structure file (JSON or YAML).
    pub input: PathBuf,
    /// Format to re-emit in.
    pub format: Format,
    pub exclude_config: Option<PathBuf>,
    /// Output file; `<input_stem>_trimmed.<format>` next to the input when
    /// `None`.
    pub output: Option<PathBuf>,
}

/// Walk, trim, encode, and atomically write the structure.
///
/// Returns the path actually written. When no explicit output is given and
/// the root is not writable, falls back to the current working directory.
pub fn create_map(options: &MapOptions) -> Result<PathBuf> {
    let root = resolve_root(options.directory.as_deref())?;
    info!("mapping directory {}", root.display());

    let file_name = format!("structure.{}", options.format.extension());
    let destination = options
        .output
        .clone()
        .unwrap_or_else(|| root.join(&file_name));

    let rules = IgnoreRules::load(&root);
    let mut structure = TreeWalker::new(rules).walk(&root)?;
    exclude_destination(&mut structure, &destination);

    if !options.no_trim {
        let patterns = load_exclude_patterns(options.exclude_config.as_deref())?;
        if patterns.is_empty() {
            info!("no exclude patterns configured, skipping trim");
        } else {
            info!("trimming structure with {} exclude patterns", patterns.len());
            structure = trim::trim(&structure, &patterns);
        }
    }

    if options.relative_paths {
        structure = structure.to_relative(&root);
        info!("converted structure keys to paths relative to {}", root.display());
    }

    let text = encode::encode(&structure, options.format)?;

    let written = match atomic_write(&destination, &text) {
        Ok(()) => destination,
        Err(err) if options.output.is_none() => {
            warn!(
                "cannot write to {} ({}), falling back to the current directory",
                destination.display(),
                err
            );
            let fallback = env::current_dir()
                .context("cannot determine current directory")?
                .join(&file_name);
            atomic_write(&fallback, &text)
                .with_context(|| format!("cannot write output to {}", fallback.display()))?;
            fallback
        }
        Err(err) => {
            return Err(err)
                .with_context(|| format!("cannot write output to {}", destination.display()));
        }
    };

    info!("directory structure saved at {}", written.display());
    Ok(written)
}

/// Trim a previously written structure file without walking the filesystem.
///
/// The input format is inferred from the file extension; the result is
/// re-encoded in `options.format` and written atomically.
pub fn trim_structure_file(options: &TrimFileOptions) -> Result<PathBuf> {
    let input_format = Format::from_path(&options.input).ok_or_else(|| {
        anyhow!(
            "cannot infer the format of '{}'; expected a .json or .yaml structure file",
            options.input.display()
        )
    })?;
    let text = fs::read_to_string(&options.input)
        .with_context(|| format!("cannot read structure file {}", options.input.display()))?;
    let structure = encode::decode(&text, input_format)
        .with_context(|| format!("cannot load structure file {}", options.input.display()))?;
    info!(
        "loaded {} directories from {}",
        structure.len(),
        options.input.display()
    );

    let patterns = load_exclude_patterns(options.exclude_config.as_deref())?;
    let trimmed = trim::trim(&structure, &patterns);

    let encoded = encode::encode(&trimmed, options.format)?;
    let destination = options
        .output
        .clone()
        .unwrap_or_else(|| default_trimmed_path(&options.input, options.format));
    atomic_write(&destination, &encoded)
        .with_context(|| format!("cannot write output to {}", destination.display()))?;

    info!("trimmed structure saved at {}", destination.display());
    Ok(destination)
}

fn resolve_root(directory: Option<&Path>) -> Result<PathBuf> {
    let given = match directory {
        Some(path) => path.to_path_buf(),
        None => env::current_dir().context("cannot determine current directory")?,
    };
    if !given.is_dir() {
        anyhow::bail!("'{}' is not a directory", given.display());
    }
    given
        .canonicalize()
        .with_context(|| format!("cannot resolve '{}'", given.display()))
}

fn load_exclude_patterns(config: Option<&Path>) -> Result<ExcludePatterns> {
    match config {
        // An explicitly requested config that cannot be loaded is fatal.
        Some(path) => ExcludePatterns::from_config_file(path),
        None => Ok(ExcludePatterns::defaults()),
    }
}

/// Drop the destination file from its parent's entry, if present.
///
/// A previous run's output would otherwise show up in its own report and
/// break run-to-run idempotence.
fn exclude_destination(structure: &mut DirectoryStructure, destination: &Path) {
    let Some(parent) = destination.parent() else {
        return;
    };
    let Ok(parent) = parent.canonicalize() else {
        return;
    };
    let Some(name) = destination.file_name().map(|n| n.to_string_lossy().to_string()) else {
        return;
    };
    if let Some(entry) = structure.get_mut(&parent.display().to_string()) {
        entry.files.retain(|file| *file != name);
    }
}

fn default_trimmed_path(input: &Path, format: Format) -> PathBuf {
    let stem = input
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("structure");
    input.with_file_name(format!("{stem}_trimmed.{}", format.extension()))
}

/// Write via a temporary sibling plus rename, so the destination is either
/// fully written or unchanged.
fn atomic_write(path: &Path, contents: &str) -> io::Result<()> {
    let mut tmp_name = path.as_os_str().to_owned();
    tmp_name.push(".tmp");
    let tmp = PathBuf::from(tmp_name);

    let result = (|| {
        let file = fs::File::create(&tmp)?;
        let mut writer = BufWriter::new(file);
        writer.write_all(contents.as_bytes())?;
        writer.flush()?;
        writer.get_ref().sync_all()?;
        fs::rename(&tmp, path)
    })();

    if result.is_err() {
        let _ = fs::remove_file(&tmp);
    }
    result
}
