use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use memusage::{compute_profile_with, describe_record, Describe, Profile, ProfileConfig, Sharing};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "memusage", about = "Estimate the in-memory footprint of common data shapes")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    #[command(flatten)]
    options: ReportOptions,
}

#[derive(Args, Debug)]
struct ReportOptions {
    /// Count shared storage once per path instead of once overall.
    #[arg(long, global = true)]
    per_path: bool,
    /// Number of types to list in the report.
    #[arg(long, default_value_t = 10, global = true)]
    top: usize,
    /// Log walk summaries (and per-node events with RUST_LOG=trace).
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Profile a file loaded as one `String` per line.
    Lines {
        /// Text file to load.
        file: PathBuf,
    },
    /// Profile a word-frequency map built from a file.
    Words {
        /// Text file to load.
        file: PathBuf,
    },
    /// Profile a small built-in record graph.
    Sample,
}

struct Entry {
    id: i64,
    body: Box<Body>,
}

struct Body {
    name: String,
    samples: Vec<i64>,
}

describe_record!(Entry { id, body });
describe_record!(Body { name, samples });

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.options.verbose);

    let sharing = if cli.options.per_path {
        Sharing::CountPerPath
    } else {
        Sharing::CountOnce
    };
    let config = ProfileConfig::new()
        .with_sharing(sharing)
        .with_trace_nodes(cli.options.verbose);

    let profile = match cli.command {
        Commands::Lines { file } => {
            let lines = load_lines(&file)?;
            info!(lines = lines.len(), "loaded {}", file.display());
            profile_of(&lines, &config)
        }
        Commands::Words { file } => {
            let counts = word_counts(&load_lines(&file)?);
            info!(words = counts.len(), "counted {}", file.display());
            profile_of(&counts, &config)
        }
        Commands::Sample => {
            let entry = Entry {
                id: 3,
                body: Box::new(Body {
                    name: "123456".to_string(),
                    samples: vec![3, 2, 1],
                }),
            };
            profile_of(&entry, &config)
        }
    };

    print!("{}", profile.report(Some(cli.options.top)));
    Ok(())
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn profile_of<T: Describe>(value: &T, config: &ProfileConfig) -> Profile {
    compute_profile_with(value, config)
}

fn load_lines(path: &Path) -> Result<Vec<String>> {
    let contents = fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    Ok(contents.lines().map(str::to_string).collect())
}

fn word_counts(lines: &[String]) -> HashMap<String, u64> {
    let mut counts = HashMap::new();
    for word in lines.iter().flat_map(|line| line.split_whitespace()) {
        *counts.entry(word.to_lowercase()).or_insert(0) += 1;
    }
    counts
}
