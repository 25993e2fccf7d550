//! Listing-Harvester main entry point
//!
//! This is the command-line interface for the listing harvester.

use anyhow::{bail, Context};
use clap::Parser;
use listing_harvester::config::{load_config_with_hash, Config};
use listing_harvester::crawler::{ChromiumOptions, ChromiumRenderer, Harvest, HarvestRequest};
use listing_harvester::output::print_summary;
use std::io::{BufRead, Write};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

/// Listing-Harvester: a resilient product listing scraper
///
/// Fetches search result pages for a query, renders every product page in a
/// headless browser to extract its details, and saves the combined records
/// as CSV, JSON or XLSX (chosen by the output file's extension).
#[derive(Parser, Debug)]
#[command(name = "listing-harvester")]
#[command(version)]
#[command(about = "A resilient product listing scraper", long_about = None)]
struct Cli {
    /// Search query; prompted for on stdin when omitted
    #[arg(short = 'k', long)]
    query: Option<String>,

    /// Number of search result pages to fetch
    #[arg(short, long, default_value_t = 1, value_parser = clap::value_parser!(u32).range(1..))]
    pages: u32,

    /// Output file (.csv, .json or .xlsx)
    #[arg(short, long, default_value = "results.csv")]
    out: PathBuf,

    /// Path to TOML configuration file
    #[arg(short, long, value_name = "CONFIG")]
    config: Option<PathBuf>,

    /// Drop repeated product identifiers before rendering detail pages
    #[arg(long)]
    dedupe: bool,

    /// Chrome/Chromium binary to launch
    #[arg(long, value_name = "PATH")]
    chrome: Option<PathBuf>,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.quiet);

    match run(cli).await {
        Ok(code) => code,
        Err(e) => {
            tracing::error!("{:#}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> anyhow::Result<ExitCode> {
    let (mut config, config_hash) = match &cli.config {
        Some(path) => {
            tracing::info!("Loading configuration from: {}", path.display());
            let (config, hash) = load_config_with_hash(path)
                .with_context(|| format!("Failed to load configuration {}", path.display()))?;
            tracing::info!("Configuration loaded successfully (hash: {})", hash);
            (config, Some(hash))
        }
        None => (Config::default(), None),
    };

    if cli.dedupe {
        config.detail.dedupe = true;
    }
    if let Some(chrome) = cli.chrome {
        config.detail.chrome_executable = Some(chrome);
    }

    let query = match cli.query {
        Some(query) => query,
        None => prompt_query()?,
    };
    let query = query.trim().to_string();
    if query.is_empty() {
        bail!("Search query must not be empty");
    }

    let options = ChromiumOptions {
        executable: config.detail.chrome_executable.clone(),
        no_sandbox: config.detail.no_sandbox,
    };
    let renderer = ChromiumRenderer::launch(&options, &config.identity_pool())
        .await
        .context("Could not start the headless browser")?;

    let mut harvest = Harvest::new(&config, renderer)?;
    if let Some(hash) = config_hash {
        harvest = harvest.with_config_hash(hash);
    }

    let request = HarvestRequest {
        query,
        pages: cli.pages,
        out: cli.out,
    };
    let summary = harvest.run(request, interrupt_signal()).await;

    if !cli.quiet {
        println!();
        print_summary(&summary);
    }

    Ok(summary.status.into())
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("listing_harvester=info,warn"),
            1 => EnvFilter::new("listing_harvester=debug,info"),
            2 => EnvFilter::new("listing_harvester=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

/// Reads the search query from stdin
fn prompt_query() -> anyhow::Result<String> {
    print!("Enter search query: ");
    std::io::stdout().flush()?;

    let mut line = String::new();
    std::io::stdin()
        .lock()
        .read_line(&mut line)
        .context("Failed to read search query")?;
    Ok(line)
}

/// Resolves on Ctrl-C; never resolves if the handler cannot be installed
async fn interrupt_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!("Could not listen for Ctrl-C: {}", e);
        std::future::pending::<()>().await;
    }
}
