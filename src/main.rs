//! Daily Saints main entry point
//!
//! Serves the saint-of-the-day API and runs the daily cache refresh.

use clap::Parser;
use daily_saints::api::router;
use daily_saints::config::{load_config_with_hash, parse_time_of_day, Config};
use daily_saints::{RefreshScheduler, SaintService};
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

/// Daily Saints: a cached saint-of-the-day API
///
/// Scrapes the origin's saint-of-the-day pages on demand, caches the
/// results per calendar day, and refreshes the cache every night.
#[derive(Parser, Debug)]
#[command(name = "daily-saints")]
#[command(version = "1.0.0")]
#[command(about = "A cached saint-of-the-day API", long_about = None)]
struct Cli {
    /// Path to TOML configuration file (defaults are used when omitted)
    #[arg(short, long, value_name = "CONFIG")]
    config: Option<PathBuf>,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Validate config and show the effective settings without serving
    #[arg(long)]
    dry_run: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.quiet);

    let config = match &cli.config {
        Some(path) => {
            tracing::info!("Loading configuration from: {}", path.display());
            match load_config_with_hash(path) {
                Ok((cfg, hash)) => {
                    tracing::info!("Configuration loaded successfully (hash: {})", hash);
                    cfg
                }
                Err(e) => {
                    tracing::error!("Failed to load configuration: {}", e);
                    return Err(e.into());
                }
            }
        }
        None => {
            tracing::info!("No configuration file given, using defaults");
            Config::default()
        }
    };

    if cli.dry_run {
        handle_dry_run(&config);
        return Ok(());
    }

    match serve(config).await {
        Ok(()) => {
            tracing::info!("Server shut down cleanly");
            Ok(())
        }
        Err(e) => {
            tracing::error!("Server failed: {}", e);
            Err(e.into())
        }
    }
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("daily_saints=info,warn"),
            1 => EnvFilter::new("daily_saints=debug,info"),
            2 => EnvFilter::new("daily_saints=trace,debug"),
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

/// Handles the --dry-run mode: prints the effective configuration
fn handle_dry_run(config: &Config) {
    println!("=== Daily Saints Dry Run ===\n");

    println!("Server:");
    println!("  Bind address: {}", config.server.bind_address);

    println!("\nOrigin:");
    println!("  Base URL: {}", config.origin.base_url);
    println!("  Saint page: {}", config.origin.saint_path);
    println!("  User agent: {}", config.origin.user_agent);
    println!("  Request timeout: {}s", config.origin.request_timeout_secs);

    println!("\nCache:");
    println!("  TTL: {}s", config.cache.ttl_secs);
    println!("  Fetch memo capacity: {}", config.cache.memo_capacity);

    println!("\nPipeline:");
    println!(
        "  Max concurrent fetches: {}",
        config.pipeline.max_concurrent_fetches
    );

    println!("\nRefresh:");
    if config.refresh.enabled {
        println!("  Daily at: {}", config.refresh.daily_at);
    } else {
        println!("  Disabled");
    }

    println!("\n✓ Configuration is valid");
}

/// Runs the API until Ctrl-C, with the refresh scheduler alongside
async fn serve(config: Config) -> daily_saints::Result<()> {
    let service = Arc::new(SaintService::new(&config)?);

    let refresh = if config.refresh.enabled {
        let daily_at = parse_time_of_day(&config.refresh.daily_at)?;
        Some(RefreshScheduler::new(Arc::clone(&service), daily_at).start())
    } else {
        tracing::info!("Daily cache refresh disabled");
        None
    };

    let listener = tokio::net::TcpListener::bind(&config.server.bind_address).await?;
    tracing::info!("Listening on {}", listener.local_addr()?);

    let served = axum::serve(listener, router(service))
        .with_graceful_shutdown(shutdown_signal())
        .await;

    if let Some(handle) = refresh {
        handle.stop().await;
    }

    served?;
    Ok(())
}

async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => tracing::info!("Shutdown signal received"),
        Err(e) => tracing::error!("Failed to listen for shutdown signal: {}", e),
    }
}
