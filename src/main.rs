//! changelog - CLI entry point.

use std::io::Read;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use changelog_core::{Changelog, Constraint, Operator, ReleaseEntry};

/// Query a serialized changelog document.
#[derive(Parser, Debug)]
#[command(name = "changelog")]
#[command(about = "Query a serialized changelog document")]
#[command(version)]
struct Cli {
    /// Path to the changelog document (JSON), or `-` for stdin
    #[arg(short = 'f', long, default_value = "changelog.json")]
    file: PathBuf,

    /// Enable debug logging (overridden by RUST_LOG)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List every version, in stored order
    Versions,

    /// Print the latest entry's version
    Latest,

    /// Print the first version matching `<entry> <OP> <VERSION>`
    Find {
        version: String,

        /// Comparison operator (==, !=, <, <=, >, >=)
        #[arg(long, default_value = "==")]
        op: Operator,
    },

    /// Print every version satisfying all constraints, e.g. '>=1.5.0' '<2.5.0'
    Filter {
        #[arg(required = true)]
        constraints: Vec<Constraint>,
    },

    /// Print an entry's changes grouped by category
    Show { version: String },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let changelog = load_changelog(&cli.file)?;

    match cli.command {
        Command::Versions => {
            for version in changelog.versions() {
                println!("{}", version);
            }
        }
        Command::Latest => {
            let Some(entry) = changelog.latest_entry() else {
                bail!("Changelog has no entries");
            };
            println!("{}", entry.version);
        }
        Command::Find { version, op } => {
            let entry = changelog
                .find_entry_by_version(&version, op)
                .context("Failed to search changelog")?;
            match entry {
                Some(entry) => println!("{}", entry.version),
                None => bail!("No entry matches {}{}", op, version),
            }
        }
        Command::Filter { constraints } => {
            let entries = changelog
                .find_entries_matching(&constraints)
                .context("Failed to filter changelog")?;
            for entry in entries {
                println!("{}", entry.version);
            }
        }
        Command::Show { version } => {
            let entry = changelog
                .find_entry_by_version(&version, Operator::Eq)
                .context("Failed to search changelog")?
                .with_context(|| format!("Version {} not found in changelog", version))?;
            print_entry(entry);
        }
    }

    Ok(())
}

/// Install the stderr subscriber. `RUST_LOG` wins over `--verbose`.
fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Read and rebuild the changelog document at `path` (`-` reads stdin).
fn load_changelog(path: &Path) -> Result<Changelog> {
    let content = if path == Path::new("-") {
        let mut buf = String::new();
        std::io::stdin()
            .read_to_string(&mut buf)
            .context("Failed to read changelog document from stdin")?;
        buf
    } else {
        std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read changelog document {}", path.display()))?
    };

    Changelog::from_json_str(&content)
        .with_context(|| format!("Failed to load changelog document {}", path.display()))
}

/// Print a release entry's header and grouped changes.
fn print_entry(entry: &ReleaseEntry) {
    match entry.timestamp {
        Some(ts) => println!("## [{}] - {}\n", entry.version, ts.format("%Y-%m-%d")),
        None => println!("## [{}]\n", entry.version),
    }

    for (category, changes) in entry.changes_by_category() {
        println!("### {}\n", category);
        for change in changes {
            println!("- {}", change.description);
        }
        println!();
    }
}
