//! Shopcrawl main entry point
//!
//! Command-line interface for the catalog crawler: start a crawl of one
//! source, or page through what has been persisted so far.

use clap::{Parser, Subcommand};
use shopcrawl::config::load_config;
use shopcrawl::crawler::run_crawl;
use shopcrawl::items::Source;
use shopcrawl::storage::SqliteStore;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing_subscriber::EnvFilter;

/// Shopcrawl: an e-commerce catalog crawler
#[derive(Parser, Debug)]
#[command(name = "shopcrawl")]
#[command(version)]
#[command(about = "Crawl store catalogs into a local database", long_about = None)]
struct Cli {
    /// Path to TOML configuration file
    #[arg(short, long, value_name = "FILE", default_value = "config.toml")]
    config: PathBuf,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose", global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Crawl a catalog source and persist the extracted items
    Crawl {
        /// Which site to crawl: rozetka or telemart
        #[arg(value_parser = Source::from_str)]
        source: Source,

        /// Also fetch description, image and specifications per item
        /// (one or two extra requests per item)
        #[arg(long)]
        full_load: bool,
    },

    /// List persisted items, one page at a time
    List {
        /// Page number, starting at 1
        #[arg(long, default_value_t = 1)]
        page: u32,

        /// Items per page (1-100)
        #[arg(long, default_value_t = 10)]
        count: u32,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    setup_logging(cli.verbose, cli.quiet);

    tracing::info!("Loading configuration from: {}", cli.config.display());
    let config = load_config(&cli.config)?;

    match cli.command {
        Command::Crawl { source, full_load } => {
            tracing::info!("Start parsing {}", source);
            let summary = run_crawl(&config, source, full_load).await?;
            println!(
                "Crawled {} categories, saved {} items",
                summary.categories, summary.items_saved
            );
        }
        Command::List { page, count } => {
            let store = SqliteStore::open(Path::new(&config.output.database_path))?;
            let listing = store.find_all_paginate(page, count)?;

            println!(
                "Page {}/{} ({} per page)",
                listing.meta.current_page, listing.meta.total_pages, listing.meta.count_per_page
            );
            for item in &listing.content {
                println!(
                    "#{:<6} [{}] {:>10.2}  {}",
                    item.id.unwrap_or_default(),
                    item.source,
                    item.price,
                    item.title
                );
            }
        }
    }

    Ok(())
}

/// Sets up the tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("shopcrawl=info,warn"),
            1 => EnvFilter::new("shopcrawl=debug,info"),
            2 => EnvFilter::new("shopcrawl=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}
