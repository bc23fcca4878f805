//! Driftnet main entry point
//!
//! Command-line interface for the driftnet crawl engine. The binary wires a
//! basic title extractor into the engine; real deployments embed the library
//! and supply their own [`ContentExtractor`] for the target site.

use clap::Parser;
use driftnet::config::load_config_with_hash;
use driftnet::crawler::{ContentExtractor, Engine, Page, RunOutcome};
use driftnet::task::Task;
use serde_json::json;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Driftnet: a resumable breadth-first crawl engine
///
/// Crawls pages under an allowed domain, streams extracted records to a
/// newline-delimited JSON file, and checkpoints its queue on interruption
/// so a re-run resumes exactly where it left off.
#[derive(Parser, Debug)]
#[command(name = "driftnet")]
#[command(version)]
#[command(about = "A resumable breadth-first crawl engine", long_about = None)]
struct Cli {
    /// Path to TOML configuration file
    #[arg(value_name = "CONFIG")]
    config: PathBuf,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Validate config and show what would be crawled without fetching anything
    #[arg(long)]
    dry_run: bool,
}

/// Default extractor for the CLI: records the page title when one exists
struct TitleExtractor;

impl ContentExtractor for TitleExtractor {
    fn extract(&self, page: &Page, task: &Task) -> anyhow::Result<Option<serde_json::Value>> {
        Ok(page.title().map(|title| {
            json!({
                "url": task.url(),
                "depth": task.depth(),
                "anchor_text": task.anchor_text(),
                "title": title,
            })
        }))
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.quiet);

    tracing::info!("Loading configuration from: {}", cli.config.display());
    let (config, config_hash) = match load_config_with_hash(&cli.config) {
        Ok((cfg, hash)) => {
            tracing::info!("Configuration loaded successfully (hash: {})", hash);
            (cfg, hash)
        }
        Err(e) => {
            tracing::error!("Failed to load configuration: {}", e);
            return Err(e.into());
        }
    };

    if cli.dry_run {
        handle_dry_run(&config, &config_hash);
        return Ok(());
    }

    let mut engine = Engine::new(config, Box::new(TitleExtractor))?;

    // Ctrl-C requests cooperative cancellation; the engine observes it
    // between iterations and checkpoints before exiting.
    let cancel = engine.cancel_flag();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::info!("Interrupt received, finishing current task");
            cancel.cancel();
        }
    });

    match engine.run().await {
        Ok(RunOutcome::Completed) => {
            tracing::info!("Crawl completed successfully");
            Ok(())
        }
        Ok(RunOutcome::Interrupted) => {
            tracing::info!("Crawl interrupted; state saved");
            Ok(())
        }
        Err(e) => {
            tracing::error!("Crawl failed: {}", e);
            Err(e.into())
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
            0 => EnvFilter::new("driftnet=info,warn"),
            1 => EnvFilter::new("driftnet=debug,info"),
            2 => EnvFilter::new("driftnet=trace,debug"),
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

/// Handles the --dry-run mode: validates config and shows what would be crawled
fn handle_dry_run(config: &driftnet::config::Config, config_hash: &str) {
    println!("=== Driftnet Dry Run ===\n");

    println!("Crawler Configuration:");
    println!("  Start URL: {}", config.crawler.start_url);
    println!("  Allowed domain: {}", config.crawler.allowed_domain);
    if config.crawler.throttle {
        println!(
            "  Throttle: {}ms - {}ms",
            config.crawler.throttle_low_ms, config.crawler.throttle_high_ms
        );
    } else {
        println!("  Throttle: disabled");
    }

    println!("\nHTTP:");
    println!("  User agent: {}", config.http.user_agent);

    println!("\nOutput:");
    println!("  Directory: {}", config.output.directory);
    println!("  Records: {}", config.output.output_path().display());

    println!("\nConfig hash: {}", config_hash);

    let checkpoint = driftnet::checkpoint::CheckpointStore::new(std::path::Path::new(
        &config.output.directory,
    ));
    if checkpoint.exists() {
        println!("\n! A checkpoint exists; the next run will resume it");
    }

    println!("\n✓ Configuration is valid");
}
