//! Baks main entry point
//!
//! This is the command-line interface for the Baks bookmark store.

use anyhow::Context;
use baks::collector::{AddOptions, Collector};
use baks::config::{load_config_or_default, resolve_database_path, Config};
use baks::output::{format_page, format_pages, format_tag_counts};
use baks::storage::{SqliteStorage, Storage};
use baks::{fetch, server, Fetcher};
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Baks: a swiss army knife for bookmarks
///
/// Baks stores bookmarks in an SQLite database with full-text search on
/// title and description. Each bookmark carries two labels: the tag, a user
/// defined class (news, culture), and the referrer, where the URL was found
/// (twitter, a newsletter). Hosts can be tagged automatically by suffix rules.
#[derive(Parser, Debug)]
#[command(name = "baks")]
#[command(version)]
#[command(about = "A swiss army knife for bookmarks", long_about = None)]
struct Cli {
    /// Path to TOML configuration file
    #[arg(long, global = true, value_name = "CONFIG")]
    config: Option<PathBuf>,

    /// Database path; `baks path` prints the default
    #[arg(long, global = true, value_name = "DB")]
    db: Option<PathBuf>,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    quiet: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Visit the urls and for each one print the title and description
    Visit {
        #[command(flatten)]
        fetch: FetchFlags,

        #[arg(required = true)]
        urls: Vec<String>,
    },

    /// Add urls, or the links of text and html files, to the database
    ///
    /// A text file holds one url per line. An html file, usually a browser
    /// bookmarks export, contributes every <a href=...>.
    Add {
        /// Tag to store; when omitted the host rules decide
        #[arg(short, long, default_value = "")]
        tag: String,

        /// Where the urls were found
        #[arg(short, long, default_value = "")]
        referrer: String,

        #[command(flatten)]
        fetch: FetchFlags,

        #[arg(required = true, value_name = "URL | FILE")]
        sources: Vec<String>,
    },

    /// Full-text search on title and description
    ///
    /// The query is an SQLite FTS5 query applied verbatim, so prefix
    /// (rust*), phrase and NEAR queries work as documented by SQLite.
    Search {
        /// Display only the result count
        #[arg(short, long)]
        count: bool,

        query: String,
    },

    /// Search titles with an SQL LIKE pattern
    Like {
        /// Display only the result count
        #[arg(short, long)]
        count: bool,

        pattern: String,
    },

    /// List urls with a tag or a referrer, or count urls per tag
    List {
        #[arg(short, long, required_unless_present_any = ["referrer", "count"])]
        tag: Option<String>,

        #[arg(short, long)]
        referrer: Option<String>,

        /// Show counts of each tag
        #[arg(short, long, conflicts_with_all = ["tag", "referrer"])]
        count: bool,
    },

    /// Print the links of urls or files, one per line
    Extract {
        /// Print anchor text
        #[arg(short = 't', long)]
        text: bool,

        /// Print absolute urls
        #[arg(short = 'a', long)]
        absolute: bool,

        #[arg(required = true, value_name = "URL | FILE")]
        sources: Vec<String>,
    },

    /// Manage host suffix tag rules
    #[command(subcommand)]
    Rules(RulesCommand),

    /// Serve the read-only HTTP API
    Serve {
        /// Address to bind, overriding the configuration
        #[arg(long)]
        listen: Option<String>,
    },

    /// Print the database path
    Path,
}

#[derive(Subcommand, Debug)]
enum RulesCommand {
    /// List rules in the order they are applied
    List,

    /// Tag hosts ending with SUFFIX as TAG
    Add { suffix: String, tag: String },
}

#[derive(Args, Debug, Clone, Copy)]
struct FetchFlags {
    /// Ignore HTTP errors
    #[arg(short = 'i', long)]
    ignore_errors: bool,

    /// Don't read content
    #[arg(short = 'n', long)]
    no_content: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    let config = load_config_or_default(cli.config.as_deref()).with_context(|| {
        format!(
            "loading configuration {}",
            cli.config
                .as_deref()
                .map(|p| p.display().to_string())
                .unwrap_or_default()
        )
    })?;

    match cli.command {
        Command::Visit { fetch, urls } => handle_visit(&config, fetch, &urls).await,
        Command::Add {
            tag,
            referrer,
            fetch,
            sources,
        } => {
            let options = AddOptions {
                tag,
                referrer,
                ignore_http_errors: fetch.ignore_errors,
                skip_content: fetch.no_content,
            };
            let storage = open_storage(&config, &cli.db)?;
            handle_add(&config, storage, &options, &sources).await
        }
        Command::Search { count, query } => {
            let storage = open_storage(&config, &cli.db)?;
            if count {
                println!("Found {} results.", storage.search_count(&query)?);
            } else {
                print!("{}", format_pages(&storage.search(&query)?));
            }
            Ok(())
        }
        Command::Like { count, pattern } => {
            let storage = open_storage(&config, &cli.db)?;
            if count {
                println!("Results: {}", storage.like_count(&pattern)?);
            } else {
                print!("{}", format_pages(&storage.like(&pattern)?));
            }
            Ok(())
        }
        Command::List {
            tag,
            referrer,
            count,
        } => {
            let storage = open_storage(&config, &cli.db)?;
            if count {
                print!("{}", format_tag_counts(&storage.tag_counts()?));
                return Ok(());
            }
            if let Some(tag) = tag {
                print!("{}", format_pages(&storage.list_by_tag(&tag)?));
            }
            if let Some(referrer) = referrer {
                print!("{}", format_pages(&storage.list_by_referrer(&referrer)?));
            }
            Ok(())
        }
        Command::Extract {
            text,
            absolute,
            sources,
        } => handle_extract(&config, text, absolute, &sources).await,
        Command::Rules(command) => {
            let mut storage = open_storage(&config, &cli.db)?;
            match command {
                RulesCommand::List => {
                    let resolver = baks::TagResolver::new(storage.load_tag_rules()?);
                    for rule in resolver.rules() {
                        println!("{}\t{}", rule.host_suffix, rule.tag);
                    }
                }
                RulesCommand::Add { suffix, tag } => {
                    storage.add_tag_rule(&suffix, &tag)?;
                    tracing::info!("Hosts ending with '{}' are now tagged '{}'", suffix, tag);
                }
            }
            Ok(())
        }
        Command::Serve { listen } => {
            let storage = open_storage(&config, &cli.db)?;
            let mut server_config = config.server.clone();
            if let Some(listen) = listen {
                server_config.listen = listen;
            }
            server::serve(storage, server_config).await?;
            Ok(())
        }
        Command::Path => {
            println!("{}", resolve_database_path(&config, cli.db.as_deref())?.display());
            Ok(())
        }
    }
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        // Only show errors
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("baks=info,warn"),
            1 => EnvFilter::new("baks=debug,info"),
            2 => EnvFilter::new("baks=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_writer(std::io::stderr)
        .init();
}

fn open_storage(config: &Config, db: &Option<PathBuf>) -> anyhow::Result<SqliteStorage> {
    let path = resolve_database_path(config, db.as_deref())?;
    tracing::debug!("Opening database {}", path.display());
    SqliteStorage::new(&path).with_context(|| format!("opening database {}", path.display()))
}

/// Handles `visit`: prints each page, logging failures and moving on
async fn handle_visit(config: &Config, flags: FetchFlags, urls: &[String]) -> anyhow::Result<()> {
    let fetcher = Fetcher::new(config.fetch.clone())?;
    for url in urls {
        match fetcher
            .fetch(url, flags.ignore_errors, flags.no_content)
            .await
        {
            Ok(outcome) => println!("{}", format_page(&outcome.page)),
            Err(e) => tracing::error!("{}", e),
        }
    }
    Ok(())
}

/// Handles `add`: urls are added directly, anything else is read as a file
async fn handle_add(
    config: &Config,
    storage: SqliteStorage,
    options: &AddOptions,
    sources: &[String],
) -> anyhow::Result<()> {
    let mut collector = Collector::new(config.fetch.clone(), storage)?;
    let mut added = 0;
    let mut failed = 0;

    for source in sources {
        let urls: Vec<String> = if source.starts_with("http") {
            vec![source.clone()]
        } else {
            match fetch::anchors_from_file(std::path::Path::new(source)) {
                Ok(anchors) => anchors.into_iter().map(|a| a.url).collect(),
                Err(e) => {
                    tracing::error!("add \"{}\": {}", source, e);
                    failed += 1;
                    continue;
                }
            }
        };

        let summary = collector.add_all(&urls, options).await;
        added += summary.added;
        failed += summary.failed;
    }

    if sources.len() > 1 {
        tracing::info!("{} added, {} failed", added, failed);
    }
    Ok(())
}

/// Handles `extract`: prints the anchors of every source
async fn handle_extract(
    config: &Config,
    text: bool,
    absolute: bool,
    sources: &[String],
) -> anyhow::Result<()> {
    let fetcher = Fetcher::new(config.fetch.clone())?;
    for source in sources {
        match fetcher.extract_anchors(source, absolute).await {
            Ok(anchors) => {
                for anchor in anchors {
                    if text {
                        println!("{} {}\n", anchor.text, anchor.url);
                    } else {
                        println!("{}", anchor.url);
                    }
                }
                println!();
            }
            Err(e) => tracing::error!("{}", e),
        }
    }
    Ok(())
}
