//! # Prospect Runner
//!
//! A batch driver that walks a curated list of target localities, shells
//! out to an external Google Maps scraper for every locality/niche
//! combination, normalizes the scraper's JSON output into a canonical
//! enriched shape, and ships each batch to a prospecting CRM's ingestion
//! API.
//!
//! ## Features
//!
//! - Resume-after-restart via a persisted cursor (atomic checkpoint file)
//! - Tolerant normalization of heterogeneous scraper output (JSON array,
//!   single object, or newline-delimited JSON)
//! - Locality provenance and a derived "best time to call" suggestion on
//!   every shipped item
//! - Randomized pauses plus a periodic long cooldown between jobs
//!
//! ## Usage
//!
//! ```sh
//! PROSPECT_API_KEY=... prospect_runner -c prospect_runner.yaml
//! ```
//!
//! ## Architecture
//!
//! A strictly sequential control loop:
//! 1. **Load**: read the locality dataset once at startup
//! 2. **Resume**: read the checkpoint cursor
//! 3. **Scrape**: per locality, invoke the scraper once per niche
//! 4. **Ship**: normalize, enrich, and POST each usable output artifact
//! 5. **Advance**: persist the cursor and pause before the next locality

use clap::Parser;
use std::error::Error;
use std::path::Path;
use std::sync::Mutex;
use tracing::{error, info};
use tracing_subscriber::prelude::*;
use tracing_subscriber::{EnvFilter, fmt as tfmt};
use url::Url;

mod checkpoint;
mod cli;
mod config;
mod driver;
mod localities;
mod models;
mod normalize;
mod runner;
mod upload;
mod utils;

use checkpoint::CheckpointStore;
use cli::Cli;
use config::Config;
use runner::ScrapeJob;
use upload::Uploader;
use utils::ensure_writable_dir;

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    let args = Cli::parse();

    init_tracing(&args.log_file)?;

    let start_time = std::time::Instant::now();
    info!("prospect_runner starting up");

    let mut config = Config::load(&args.config)?;
    args.apply_overrides(&mut config);
    config.validate()?;

    // --- Fatal startup checks ---
    if !Path::new(&config.scraper_binary).exists() {
        error!(
            path = %config.scraper_binary,
            "Scraper binary not found; run the setup script first"
        );
        return Err(format!("scraper binary not found at {}", config.scraper_binary).into());
    }

    if let Err(e) = ensure_writable_dir(&config.results_dir).await {
        error!(
            path = %config.results_dir,
            error = %e,
            "Results directory is not writable (fix perms or choose a different path)"
        );
        return Err(e);
    }

    let localities =
        localities::load(&config.dataset_file, &config.name_column, &config.zip_column)?;

    // --- Wire the pipeline ---
    let store = CheckpointStore::new(&config.checkpoint_file);
    let api_url = Url::parse(&config.api_url)?;
    let uploader = Uploader::new(api_url, config.api_key.clone());
    let job = ScrapeJob::new(config.clone(), uploader);

    driver::run(&config, &localities, &store, &job).await?;

    let elapsed = start_time.elapsed();
    info!(
        ?elapsed,
        secs = elapsed.as_secs(),
        "Execution complete"
    );
    Ok(())
}

/// Initialize leveled, timestamped logging to both console and log file.
///
/// The log file gets the same events as the console, minus ANSI styling;
/// its parent directory is created on demand. `RUST_LOG` overrides the
/// default `info` filter.
fn init_tracing(log_file: &str) -> Result<(), Box<dyn Error>> {
    if let Some(parent) = Path::new(log_file).parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    let file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(log_file)?;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(
            tfmt::layer()
                .with_target(true)
                .with_timer(tfmt::time::UtcTime::rfc_3339()),
        )
        .with(
            tfmt::layer()
                .with_ansi(false)
                .with_timer(tfmt::time::UtcTime::rfc_3339())
                .with_writer(Mutex::new(file)),
        )
        .init();
    Ok(())
}
