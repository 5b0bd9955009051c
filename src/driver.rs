//! The sequential batch loop.
//!
//! Walks the locality list from the persisted checkpoint to the end, one
//! locality at a time: run the job, advance the cursor, pause. The job
//! itself is behind the [`LocalityJob`] trait so the loop's resumability
//! contract can be exercised with a stub in tests.
//!
//! Two invariants carried over from years of unattended runs:
//! - The checkpoint advances after every locality, whether or not the job
//!   reported internal failures. "Fetched" and "delivered" are equivalent
//!   for resumability; raw artifacts on disk cover redelivery.
//! - Pauses are randomized between jobs, with a long fixed cooldown every
//!   N-th index to stay under the radar of rate limiting.

use crate::checkpoint::CheckpointStore;
use crate::config::Config;
use crate::models::Locality;
use rand::Rng;
use std::error::Error;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{info, instrument};

/// One unit of batch work: everything that happens for a single locality.
///
/// Implementations must be infallible from the loop's point of view —
/// internal failures are theirs to log, the locality counts as attempted
/// either way.
pub trait LocalityJob {
    async fn run(&self, locality: &Locality, job_id: usize);
}

/// Run the batch from the persisted checkpoint to the end of the list.
///
/// # Errors
///
/// The only fatal error is a checkpoint write failure: a driver that can
/// no longer persist its cursor would silently re-scrape everything on
/// the next start, which costs days on a large campaign.
#[instrument(level = "info", skip_all, fields(total = localities.len()))]
pub async fn run<J: LocalityJob>(
    config: &Config,
    localities: &[Locality],
    store: &CheckpointStore,
    job: &J,
) -> Result<(), Box<dyn Error>> {
    let start = store.read();
    info!(start, total = localities.len(), "Resuming from checkpoint");

    if start >= localities.len() {
        info!("All localities already processed");
        return Ok(());
    }

    for (i, locality) in localities.iter().enumerate().skip(start) {
        info!(
            index = i,
            city = %locality.name,
            zip = %locality.postal_code,
            "Starting locality job"
        );

        job.run(locality, i).await;

        // Commit immediately; internal niche or upload failures never
        // block the advance.
        store.write(i + 1)?;

        let pause = rand::rng().random_range(config.pause_min_secs..=config.pause_max_secs);
        info!(secs = pause, "Sleeping between jobs");
        sleep(Duration::from_secs(pause)).await;

        if needs_cooldown(i, config.cooldown_every) {
            info!(secs = config.cooldown_secs, "Periodic cooldown break");
            sleep(Duration::from_secs(config.cooldown_secs)).await;
        }
    }

    info!("Batch complete");
    Ok(())
}

/// The long cooldown fires on every `every`-th index, but not on index 0.
fn needs_cooldown(index: usize, every: usize) -> bool {
    index > 0 && index % every == 0
}
