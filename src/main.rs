//! Flowmap main entry point
//!
//! This is the command-line interface for the Flowmap interaction mapper.

use anyhow::Context;
use clap::{Parser, Subcommand};
use flowmap::config::{load_config_with_hash, validate, Backend, Config};
use flowmap::crawler::launcher_for;
use flowmap::output::{print_statistics, CrawlStatistics, ExportData};
use flowmap::pipeline::run_pipeline_with_output;
use flowmap::StatusPublisher;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Flowmap: a single-domain interaction mapper
///
/// Flowmap crawls one domain from a seed URL, records every call-to-action
/// and form it finds, and exports the navigation paths between pages.
#[derive(Parser, Debug)]
#[command(name = "flowmap")]
#[command(version)]
#[command(about = "A single-domain interaction mapper", long_about = None)]
struct Cli {
    /// Path to TOML configuration file (defaults apply when omitted)
    #[arg(short, long, value_name = "CONFIG", global = true)]
    config: Option<PathBuf>,

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
    /// Crawl a site and write every export
    Crawl {
        /// Seed URL; a bare host gets `https://`
        url: String,

        /// Override the page budget
        #[arg(long)]
        pages: Option<usize>,

        /// Override the maximum number of hops per flow
        #[arg(long)]
        max_depth: Option<usize>,

        /// Override the maximum number of flows
        #[arg(long)]
        max_flows: Option<usize>,

        /// Use the Chromium backend
        #[arg(long)]
        chromium: bool,

        /// Show the browser window (Chromium backend only)
        #[arg(long)]
        headful: bool,
    },

    /// Run the HTTP control front end
    Serve {
        /// Override the listen address
        #[arg(long)]
        listen: Option<String>,
    },

    /// Validate the configuration and print it
    Check,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    let config = load(cli.config.as_ref())?;

    match cli.command {
        Command::Crawl {
            url,
            pages,
            max_depth,
            max_flows,
            chromium,
            headful,
        } => {
            let mut config = config;
            if let Some(pages) = pages {
                config.crawler.page_budget = pages;
            }
            if let Some(max_depth) = max_depth {
                config.flows.max_depth = max_depth;
            }
            if let Some(max_flows) = max_flows {
                config.flows.max_count = max_flows;
            }
            if chromium {
                config.crawler.backend = Backend::Chromium;
            }
            if headful {
                config.crawler.headless = false;
            }
            validate(&config).context("Invalid command-line overrides")?;
            handle_crawl(config, &url).await
        }
        Command::Serve { listen } => {
            let mut config = config;
            if let Some(listen) = listen {
                config.server.listen_addr = listen;
            }
            validate(&config).context("Invalid listen address")?;
            flowmap::server::serve(config).await
        }
        Command::Check => {
            handle_check(&config);
            Ok(())
        }
    }
}

/// Loads the config file, or the defaults when none is given
fn load(path: Option<&PathBuf>) -> anyhow::Result<Config> {
    let Some(path) = path else {
        tracing::info!("No configuration file given, using defaults");
        return Ok(Config::default());
    };

    tracing::info!("Loading configuration from: {}", path.display());
    let (config, hash) = load_config_with_hash(path)
        .with_context(|| format!("Failed to load configuration from {}", path.display()))?;
    tracing::info!("Configuration loaded successfully (hash: {})", hash);
    Ok(config)
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("flowmap=info,warn"),
            1 => EnvFilter::new("flowmap=debug,info"),
            2 => EnvFilter::new("flowmap=trace,debug"),
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

/// Handles `check`: prints the effective configuration
fn handle_check(config: &Config) {
    println!("=== Flowmap Configuration ===\n");

    println!("Crawler:");
    println!("  Backend: {:?}", config.crawler.backend);
    println!("  Page budget: {}", config.crawler.page_budget);
    println!(
        "  Navigation timeout: {}ms",
        config.crawler.navigation_timeout_ms
    );
    println!("  Settle delay: {}s", config.crawler.settle_delay_secs);
    println!("  Headless: {}", config.crawler.headless);

    println!("\nFlows:");
    println!("  Max depth: {}", config.flows.max_depth);
    println!("  Max count: {}", config.flows.max_count);

    println!("\nOutput:");
    println!("  Exports: {}", config.output.export_dir.display());
    println!("  Screenshots: {}", config.output.screenshot_dir.display());
    println!(
        "  Public screenshots: {}",
        config.output.public_screenshot_dir.display()
    );

    println!("\nServer:");
    println!("  Listen address: {}", config.server.listen_addr);

    println!("\n✓ Configuration is valid");
}

/// Handles `crawl`: runs the pipeline and prints the statistics
async fn handle_crawl(config: Config, url: &str) -> anyhow::Result<()> {
    let launcher = launcher_for(&config.crawler);
    let status = StatusPublisher::new();

    let progress = {
        let mut reader = status.subscribe();
        tokio::spawn(async move {
            while reader.changed().await {
                let snapshot = reader.snapshot();
                if let Some(url) = snapshot.current_url {
                    tracing::debug!(
                        "[{}/{}] {}",
                        snapshot.pages_crawled,
                        snapshot.total.unwrap_or_default(),
                        url
                    );
                }
                if snapshot.completed {
                    break;
                }
            }
        })
    };

    let (output, report) =
        run_pipeline_with_output(&config, url, launcher.as_ref(), &status).await;
    progress.abort();

    let stats = CrawlStatistics::collect(&ExportData {
        crawl: &output.crawl,
        flows: &output.flows,
    });
    println!();
    print_statistics(&stats);

    println!("\nArtifacts:");
    for artifact in &report.artifacts {
        println!("  {}", artifact.path.display());
    }

    match report.error {
        Some(error) => Err(anyhow::anyhow!("Crawl ended early: {}", error)),
        None => Ok(()),
    }
}
