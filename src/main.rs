//! CLI entry point for dirmap

use std::path::PathBuf;
use std::process;

use clap::Parser;
use dirmap::{Format, MapOptions, TrimFileOptions, create_map, trim_structure_file};

#[derive(Parser, Debug)]
#[command(name = "dirmap")]
#[command(about = "Map a directory structure to JSON, YAML, or XML, respecting .gitignore")]
#[command(version)]
struct Args {
    /// Output format
    #[arg(short, long, value_enum, default_value_t = Format::Json)]
    format: Format,

    /// Directory to map (default: current working directory)
    #[arg(short, long)]
    directory: Option<PathBuf>,

    /// Disable the default trimming pass
    #[arg(long = "no-trim")]
    no_trim: bool,

    /// JSON file with {"exclude_patterns": [...]} used for trimming
    #[arg(long = "exclude-config", value_name = "PATH")]
    exclude_config: Option<PathBuf>,

    /// Write the output here instead of <root>/structure.<format>
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Trim an existing structure file instead of walking the filesystem
    #[arg(
        long = "trim-file",
        value_name = "PATH",
        conflicts_with_all = ["directory", "no_trim", "trim_paths"]
    )]
    trim_file: Option<PathBuf>,

    /// Use root-relative paths as structure keys
    #[arg(long = "trim-paths")]
    trim_paths: bool,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,
}

fn init_logging(verbose: bool) {
    let level = if verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp(None)
        .format_target(false)
        .init();
}

fn main() {
    let args = Args::parse();
    init_logging(args.verbose);

    let result = if let Some(input) = args.trim_file {
        trim_structure_file(&TrimFileOptions {
            input,
            format: args.format,
            exclude_config: args.exclude_config,
            output: args.output,
        })
    } else {
        create_map(&MapOptions {
            directory: args.directory,
            format: args.format,
            no_trim: args.no_trim,
            exclude_config: args.exclude_config,
            output: args.output,
            relative_paths: args.trim_paths,
        })
    };

    match result {
        Ok(path) => println!("{}", path.display()),
        Err(err) => {
            eprintln!("dirmap: error: {err:#}");
            process::exit(1);
        }
    }
}
