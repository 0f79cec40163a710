//! docsift CLI - inspect and page through OpenSearch indices.
//!
//! # Commands
//!
//! - `docsift inject --index <name> --count <n>` - Write sample documents
//! - `docsift get --index <name> --id <id>` - Look a document up by ID
//! - `docsift query --index <name> <json>` - Run a query, print one page
//! - `docsift fields --index <name>` - List every leaf field of the mapping
//! - `docsift dump --index <name>` - Print every matching document
//! - `docsift completions <shell>` - Generate shell completions

use clap::{Args, CommandFactory, Parser, Subcommand, ValueEnum};
use clap_complete::{Shell, generate};
use colored::Colorize;
use docsift::{ClientConfig, DEFAULT_PAGE_SIZE, KeepAlive, OpenSearchClient, Strategy};
use std::io;
use std::time::Duration;
use tracing::debug;

mod commands;
mod error;
mod output;

use commands::{documents, dump, fields};
use error::CliResult;

/// docsift - schema flattening and full-result pagination
#[derive(Parser)]
#[command(name = "docsift")]
#[command(author = "Pegasus Heavy Industries LLC")]
#[command(version)]
#[command(about = "Inspect OpenSearch mappings and read entire result sets")]
#[command(propagate_version = true)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    #[command(flatten)]
    connection: ConnectionArgs,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    no_color: bool,
}

#[derive(Args)]
struct ConnectionArgs {
    /// Search service URL, overriding DOCSIFT_URL
    #[arg(long, global = true)]
    url: Option<String>,

    /// Request timeout in seconds
    #[arg(long, global = true, default_value = "30")]
    timeout: u64,
}

#[derive(Subcommand)]
enum Commands {
    /// Write sample documents {key1: i, key2: 2i} with IDs 0..count
    Inject {
        /// Target index
        #[arg(short, long)]
        index: String,

        /// Number of documents to write
        #[arg(short, long, default_value = "20")]
        count: usize,
    },

    /// Print the document with the given ID
    Get {
        /// Index to search
        #[arg(short, long)]
        index: String,

        /// Document ID
        #[arg(long)]
        id: String,
    },

    /// Run a query and print its first page of results
    #[command(alias = "q")]
    Query {
        /// Index to search
        #[arg(short, long)]
        index: String,

        /// Query clause as JSON, e.g. '{"match_all": {}}'
        query: String,

        /// Number of documents to return
        #[arg(short, long, default_value_t = DEFAULT_PAGE_SIZE)]
        size: usize,
    },

    /// List every leaf field of an index mapping as a dotted path
    Fields {
        /// Index whose mapping to read
        #[arg(short, long)]
        index: String,

        /// Print paths as JSON arrays of segments
        #[arg(long)]
        json: bool,
    },

    /// Print every document matching a query
    Dump(DumpArgs),

    /// Generate shell completions
    Completions {
        /// The shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[derive(Args)]
struct DumpArgs {
    /// Index to read
    #[arg(short, long)]
    index: String,

    /// Query clause as JSON (defaults to match_all)
    #[arg(short, long)]
    query: Option<String>,

    /// Pagination strategy
    #[arg(short, long, value_enum, default_value = "offset")]
    strategy: StrategyArg,

    /// Documents per page, overriding DOCSIFT_PAGE_SIZE
    #[arg(short, long)]
    page_size: Option<usize>,

    /// Scroll lease in seconds, overriding DOCSIFT_KEEP_ALIVE_SECS
    #[arg(long)]
    keep_alive: Option<u64>,

    /// Unique field the search-after strategy sorts on
    #[arg(long, default_value = "_id")]
    sort_field: String,

    /// Print one document per line instead of a JSON array
    #[arg(long)]
    lines: bool,
}

#[derive(Clone, Copy, ValueEnum)]
enum StrategyArg {
    /// from/size windows
    Offset,
    /// Server-side scroll cursor
    Scroll,
    /// Sort-key continuation
    SearchAfter,
}

impl From<StrategyArg> for Strategy {
    fn from(arg: StrategyArg) -> Self {
        match arg {
            StrategyArg::Offset => Strategy::Offset,
            StrategyArg::Scroll => Strategy::Scroll,
            StrategyArg::SearchAfter => Strategy::SearchAfter,
        }
    }
}

/// Install the log subscriber. `RUST_LOG` overrides the level.
fn init_logging(verbose: bool) {
    use tracing_subscriber::prelude::*;
    use tracing_subscriber::{EnvFilter, fmt};

    let level = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(io::stderr))
        .init();
}

/// `DOCSIFT_*` settings with the connection flags applied on top.
fn base_config(connection: &ConnectionArgs) -> CliResult<ClientConfig> {
    let mut config = ClientConfig::from_env()?
        .with_request_timeout(Duration::from_secs(connection.timeout));

    if let Some(url) = &connection.url {
        config.urls = vec![url.clone()];
    }

    Ok(config)
}

fn connect(config: ClientConfig) -> CliResult<OpenSearchClient> {
    debug!("Connecting to {:?}", config.urls);
    Ok(OpenSearchClient::new(config)?)
}

async fn run(cli: Cli) -> CliResult<()> {
    let config = base_config(&cli.connection)?;

    match cli.command {
        Commands::Inject { index, count } => {
            let client = connect(config)?;
            documents::inject(&client, &index, count).await
        }

        Commands::Get { index, id } => {
            let client = connect(config)?;
            documents::get(&client, &index, &id).await
        }

        Commands::Query { index, query, size } => {
            let client = connect(config)?;
            documents::query(&client, &index, &query, size).await
        }

        Commands::Fields { index, json } => {
            let client = connect(config)?;
            fields::run(&client, &index, json).await
        }

        Commands::Dump(args) => {
            let mut config = config.with_sort_field(args.sort_field);
            if let Some(page_size) = args.page_size {
                config = config.with_page_size(page_size);
            }
            if let Some(secs) = args.keep_alive {
                config = config.with_keep_alive(KeepAlive::new(Duration::from_secs(secs)));
            }
            let client = connect(config)?;

            let dump_args = dump::DumpArgs {
                index: args.index,
                query: args.query,
                strategy: args.strategy.into(),
                lines: args.lines,
            };
            dump::run(&client, client.config(), dump_args).await
        }

        Commands::Completions { shell } => {
            let mut cmd = Cli::command();
            generate(shell, &mut cmd, "docsift", &mut io::stdout());
            Ok(())
        }
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    if cli.no_color {
        colored::control::set_override(false);
    }
    init_logging(cli.verbose);

    if let Err(e) = run(cli).await {
        eprintln!("\n  {} {}\n", "Error:".red().bold(), e);
        std::process::exit(1);
    }
}
