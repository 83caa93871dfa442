//! # tabquery CLI (`tq`)
//!
//! The `tq` binary manages aliased tabular sources and runs interactive
//! substring queries against them.
//!
//! ## Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `tq add <alias> <location>` | Register (or replace) a source under an alias |
//! | `tq remove <alias>` | Unregister a source |
//! | `tq sources` | List registered sources |
//! | `tq search <alias> "<query>"` | Substring-search the source's configured column |
//! | `tq preload <alias>` | Materialize a source's table ahead of the first query |
//!
//! ## Examples
//!
//! ```bash
//! # Register a local CSV, searching its second column
//! tq add contacts ./contacts.csv --search-column 1
//!
//! # Register a published sheet (the /edit URL is rewritten automatically)
//! tq add prices "https://docs.google.com/spreadsheets/d/abc/edit" --remote
//!
//! # Query it
//! tq search contacts "dupont"
//!
//! # Cap results for this query only
//! tq search contacts "dupont" --limit 3
//! ```

use anyhow::{bail, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use tabquery::error::TabQueryError;
use tabquery::model::{SourceDescriptor, SourceKind};
use tabquery::{load_config, Engine};

/// tabquery — alias-registered tabular sources with fast substring search.
#[derive(Parser)]
#[command(
    name = "tq",
    about = "Register delimited files and published sheets under aliases and run fast substring queries against them",
    version
)]
struct Cli {
    /// Path to a TOML configuration file.
    ///
    /// When omitted, the catalog lives at the platform's per-user data
    /// directory and remote fetches use a 10 second timeout.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Enable debug logging.
    #[arg(long, global = true)]
    debug: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Top-level CLI commands.
#[derive(Subcommand)]
enum Commands {
    /// Register a source under an alias.
    ///
    /// Registering an alias that already exists replaces its configuration
    /// and drops any cached data for it.
    Add {
        /// Short name the source is queried by.
        alias: String,

        /// File path for local sources, URL for remote ones.
        location: String,

        /// Treat the location as a published-sheet URL instead of a file path.
        #[arg(long)]
        remote: bool,

        /// Zero-based index of the column queries run against (default: 0).
        #[arg(long)]
        search_column: Option<usize>,

        /// Comma-separated zero-based column indices shown in result
        /// details. Omit for all columns.
        #[arg(long, value_delimiter = ',')]
        result_columns: Vec<usize>,

        /// One-based row number whose cells are the column headers.
        #[arg(long, default_value_t = 1)]
        header_row: usize,

        /// Maximum number of results a search returns.
        #[arg(long, default_value_t = 10)]
        max_results: usize,
    },

    /// Unregister a source and drop its cached data.
    Remove {
        /// Alias of the source to remove.
        alias: String,
    },

    /// List registered sources.
    Sources,

    /// Search a source's configured column for a substring.
    ///
    /// Matching is case-insensitive; results follow table order and are
    /// capped at the source's max-results setting.
    Search {
        /// Alias of the source to query.
        alias: String,

        /// The query string.
        query: String,

        /// Cap results for this query, overriding the source's setting.
        #[arg(long)]
        limit: Option<usize>,
    },

    /// Fetch and parse a source now, so the first search is instant.
    Preload {
        /// Alias of the source to materialize.
        alias: String,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_filter = if cli.debug { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter)),
        )
        .with_writer(std::io::stderr)
        .init();

    let config = load_config(cli.config.as_deref())?;
    let engine = Engine::open(&config);

    match cli.command {
        Commands::Add {
            alias,
            location,
            remote,
            search_column,
            result_columns,
            header_row,
            max_results,
        } => {
            if header_row == 0 {
                bail!("--header-row is 1-based and must be >= 1");
            }
            if max_results == 0 {
                bail!("--max-results must be >= 1");
            }

            let kind = if remote {
                SourceKind::Remote
            } else {
                SourceKind::Local
            };
            let descriptor = SourceDescriptor {
                alias: alias.clone(),
                kind,
                location,
                search_column,
                result_columns,
                header_row,
                max_results,
            };
            engine.register(descriptor)?;
            println!("Registered source '{alias}'.");
        }

        Commands::Remove { alias } => match engine.unregister(&alias) {
            Ok(()) => println!("Removed source '{alias}'."),
            Err(TabQueryError::UnknownSource(_)) => {
                bail!("No source registered under '{alias}'.")
            }
            Err(e) => return Err(e.into()),
        },

        Commands::Sources => {
            let sources = engine.list();
            if sources.is_empty() {
                println!("No sources registered. Add one with `tq add`.");
            } else {
                println!("{:<16} {:<8} LOCATION", "ALIAS", "KIND");
                for s in sources {
                    let kind = match s.kind {
                        SourceKind::Local => "local",
                        SourceKind::Remote => "remote",
                    };
                    println!("{:<16} {:<8} {}", s.alias, kind, s.location);
                }
            }
        }

        Commands::Search {
            alias,
            query,
            limit,
        } => match engine.search_with_limit(&alias, &query, limit) {
            Ok(results) if results.is_empty() => println!("No results."),
            Ok(results) => {
                for (i, result) in results.iter().enumerate() {
                    println!("{}. {}", i + 1, result.primary);
                    if !result.details.is_empty() {
                        println!("    {}", result.details);
                    }
                }
            }
            Err(TabQueryError::UnknownSource(_)) => {
                bail!("No source registered under '{alias}'.")
            }
            Err(e) => return Err(e.into()),
        },

        Commands::Preload { alias } => match engine.preload(&alias) {
            Ok(table) => println!(
                "Loaded '{alias}': {} rows, {} columns.",
                table.rows.len(),
                table.width()
            ),
            Err(TabQueryError::UnknownSource(_)) => {
                bail!("No source registered under '{alias}'.")
            }
            Err(e) => bail!("Failed to load '{alias}': {e}"),
        },
    }

    Ok(())
}
