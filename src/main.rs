//! scholarstats - Google Scholar profile stats updater.
//!
//! Resolves one author profile, expands the most recent publications, and
//! writes aggregate citation metrics plus publication details to a JSON
//! file consumed by the website.
//!
//! ## Usage
//!
//! ```bash
//! SCHOLAR_ID=AbCdEfGhIjK scholarstats --max 50 --out assets/data/scholar_stats.json
//! ```

use anyhow::Result;
use clap::Parser;
use scholarstats::gscholar::GoogleScholarClient;
use scholarstats::pipeline::{collect_stats, UpdateOptions};
use scholarstats::stats::write_stats;
use std::path::PathBuf;
use tracing::Level;
use tracing_subscriber::{fmt, EnvFilter};

/// Update the website's Google Scholar statistics file
#[derive(Parser)]
#[command(name = "scholarstats")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Maximum number of publications to process (zero or negative: all)
    #[arg(long, default_value_t = 120)]
    max: i64,

    /// JSON output path
    #[arg(long, default_value = "assets/data/scholar_stats.json")]
    out: PathBuf,

    /// Suppress per-publication progress lines
    #[arg(long)]
    quiet: bool,

    /// Enable debug logging
    #[arg(short, long)]
    debug: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let log_level = if cli.debug { Level::DEBUG } else { Level::INFO };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(log_level.to_string()));

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_ids(false)
        .init();

    // The identifier must be present before any network activity starts.
    let scholar_id = match std::env::var("SCHOLAR_ID") {
        Ok(id) if !id.trim().is_empty() => id,
        _ => {
            eprintln!("ERROR: SCHOLAR_ID environment variable is not set.");
            std::process::exit(1);
        }
    };

    // Never echo the identifier itself.
    println!("Scholar ID loaded (redacted).");

    let client = match GoogleScholarClient::new() {
        Ok(client) => client,
        Err(e) => {
            eprintln!("Error updating scholar stats: {}", e);
            std::process::exit(1);
        }
    };

    let options = UpdateOptions {
        max: cli.max,
        quiet: cli.quiet,
    };

    let stats = match collect_stats(&client, &scholar_id, &options).await {
        Ok(stats) => stats,
        Err(e) => {
            eprintln!(
                "Error updating scholar stats: cannot fetch author profile ({})",
                e
            );
            std::process::exit(1);
        }
    };

    write_stats(&stats, &cli.out)?;

    println!("\nSuccessfully updated scholar stats → {}", cli.out.display());
    Ok(())
}
