//! Shop-Ripple main entry point
//!
//! This is the command-line interface for the Shop-Ripple catalog crawler.

use anyhow::Context;
use clap::Parser;
use shop_ripple::cache::open_cache;
use shop_ripple::config::{load_config_with_hash, Settings};
use shop_ripple::crawler::Coordinator;
use shop_ripple::notify::ConsoleNotifier;
use shop_ripple::storage::{JsonStorage, Storage};
use shop_ripple::ScrapeConfig;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

/// Shop-Ripple: a paginated product catalog crawler
///
/// Shop-Ripple walks a product listing page by page, extracts titles,
/// prices and images, and reports which prices changed since the last run.
#[derive(Parser, Debug)]
#[command(name = "shop-ripple")]
#[command(version = "1.0.0")]
#[command(about = "A paginated product catalog crawler", long_about = None)]
struct Cli {
    /// Path to TOML configuration file (defaults are used when omitted)
    #[arg(value_name = "CONFIG")]
    config: Option<PathBuf>,

    /// Stop after this many listing pages
    #[arg(long, value_name = "N")]
    page_limit: Option<u32>,

    /// Route every request through this proxy URL
    #[arg(long, value_name = "URL")]
    proxy: Option<String>,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Validate config and show what would be crawled without actually crawling
    #[arg(long, conflicts_with = "show_products")]
    dry_run: bool,

    /// Print the stored products and exit
    #[arg(long, conflicts_with = "dry_run")]
    show_products: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.quiet);

    let settings = load_settings(cli.config.as_deref())?;
    let request = ScrapeConfig {
        page_limit: cli.page_limit,
        proxy: cli.proxy.clone(),
    };

    if cli.dry_run {
        handle_dry_run(&settings, &request)?;
    } else if cli.show_products {
        handle_show_products(&settings).await?;
    } else {
        handle_crawl(settings, &request).await?;
    }

    Ok(())
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("shop_ripple=info,warn"),
            1 => EnvFilter::new("shop_ripple=debug,info"),
            2 => EnvFilter::new("shop_ripple=trace,debug"),
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

fn load_settings(path: Option<&Path>) -> anyhow::Result<Settings> {
    let Some(path) = path else {
        tracing::info!("No configuration file given, using defaults");
        return Ok(Settings::default());
    };

    tracing::info!("Loading configuration from: {}", path.display());
    let (settings, hash) = load_config_with_hash(path)
        .with_context(|| format!("Failed to load configuration from {}", path.display()))?;
    tracing::info!("Configuration loaded successfully (hash: {})", hash);
    Ok(settings)
}

/// Handles the --dry-run mode: validates the request and shows the effective settings
fn handle_dry_run(settings: &Settings, request: &ScrapeConfig) -> anyhow::Result<()> {
    request.validate()?;

    println!("=== Shop-Ripple Dry Run ===\n");

    println!("Listing:");
    println!("  Base URL: {}", settings.listing.base_url);
    match request.page_limit {
        Some(limit) => println!("  Page limit: {}", limit),
        None => println!("  Page limit: none"),
    }
    println!("  Proxy: {}", request.proxy.as_deref().unwrap_or("none"));

    println!("\nRetry:");
    println!("  Attempts: {}", settings.retry.attempts);
    println!("  Delay: {}s", settings.retry.delay_secs);

    println!("\nCrawler:");
    println!("  Page delay: {}ms", settings.crawler.page_delay_ms);
    println!("  Request timeout: {}s", settings.crawler.request_timeout_secs);
    println!("  User agent: {}", settings.crawler.user_agent);

    println!("\nOutput:");
    println!("  Products: {}", settings.output.products_path);
    println!("  Images: {}", settings.output.images_dir);
    println!("  Price cache: {}", settings.cache.database_path);

    println!("\n✓ Configuration is valid");

    Ok(())
}

/// Handles the --show-products mode: prints the stored products
async fn handle_show_products(settings: &Settings) -> anyhow::Result<()> {
    let storage = JsonStorage::new(&settings.output.products_path);
    let products = storage.load().await?;

    println!("Products: {} ({})\n", products.len(), storage.path().display());
    for product in &products {
        let image = if product.image_path.is_empty() {
            "-"
        } else {
            product.image_path.as_str()
        };
        println!("  {:>10.2}  {}  [{}]", product.price, product.title, image);
    }

    Ok(())
}

/// Handles the main crawl operation
async fn handle_crawl(settings: Settings, request: &ScrapeConfig) -> anyhow::Result<()> {
    let cache = open_cache(Path::new(&settings.cache.database_path))
        .context("Failed to open price cache")?;
    let storage = JsonStorage::new(&settings.output.products_path);

    tracing::info!("Starting crawl of {}", settings.listing.base_url);

    let coordinator = Coordinator::new(
        settings,
        Arc::new(storage),
        Arc::new(cache),
        Arc::new(ConsoleNotifier),
    );

    match coordinator.crawl(request).await {
        Ok(result) => {
            tracing::info!("Crawl completed successfully");
            println!(
                "products_scraped: {}, updated: {}",
                result.total, result.updated
            );
            Ok(())
        }
        Err(e) => {
            tracing::error!("Crawl failed: {}", e);
            Err(e.into())
        }
    }
}
