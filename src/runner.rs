//! Per-locality scrape job execution.
//!
//! For one locality the runner walks the configured niche list and, per
//! niche, drives one invocation of the external scraper binary:
//!
//! 1. Build the query string from niche, postal code, and name
//! 2. Write it to a transient input artifact
//! 3. Invoke the scraper with a bounded wall-clock timeout
//! 4. Normalize and upload the output artifact when it is usable
//! 5. Remove the transient input artifact regardless of outcome
//!
//! Nothing in here fails the locality: a broken niche is logged and the
//! remaining niches still run, so the driver can always advance the
//! checkpoint afterwards. Output artifacts are retained under the results
//! directory as the backup of record.

use crate::config::Config;
use crate::driver::LocalityJob;
use crate::models::Locality;
use crate::normalize;
use crate::upload::Uploader;
use crate::utils::{file_slug, truncate_for_log};
use std::error::Error;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::process::Command;
use tokio::time::timeout;
use tracing::{debug, error, info, instrument, warn};

/// Executes the full niche sweep for one locality.
pub struct ScrapeJob {
    config: Config,
    uploader: Uploader,
}

impl ScrapeJob {
    pub fn new(config: Config, uploader: Uploader) -> Self {
        ScrapeJob { config, uploader }
    }

    /// Run one niche: scrape, then normalize and upload if the output
    /// artifact is worth reading.
    #[instrument(level = "info", skip_all, fields(job_id = job_id, niche = %niche, city = %locality.name))]
    async fn run_niche(&self, locality: &Locality, job_id: usize, niche: &str) {
        let query = build_query(niche, locality);
        let input_path = input_artifact(&self.config.results_dir, job_id, niche);
        let output_path = output_artifact(&self.config.results_dir, locality, niche);

        // Overwrites any stale leftover from a crashed run.
        if let Err(e) = std::fs::write(&input_path, &query) {
            error!(path = %input_path.display(), error = %e, "Failed to write scraper input artifact");
            return;
        }

        info!(job_id, %query, "Scraping");

        let mut scraper_stderr = String::new();
        match self.invoke_scraper(&input_path, &output_path).await {
            Ok(output) => {
                scraper_stderr = String::from_utf8_lossy(&output.stderr).to_string();
                if !output.status.success() {
                    error!(
                        code = output.status.code().unwrap_or(-1),
                        stderr = %truncate_for_log(&scraper_stderr, 500),
                        "Scraper command failed"
                    );
                }
            }
            Err(e) => {
                error!(job_id, %niche, error = %e, "Scraper invocation failed");
            }
        }

        if output_usable(&output_path, self.config.min_result_bytes) {
            self.process_output(&output_path, locality).await;
        } else {
            warn!(
                %niche,
                city = %locality.name,
                "No results (output file empty or missing)"
            );
            if !scraper_stderr.is_empty() {
                warn!(stderr = %truncate_for_log(&scraper_stderr, 500), "Scraper stderr");
            }
        }

        if let Err(e) = std::fs::remove_file(&input_path) {
            debug!(path = %input_path.display(), error = %e, "Input artifact already gone");
        }
    }

    /// Spawn the scraper with the fixed argument contract, bounded by the
    /// configured timeout. The child is reaped on timeout via
    /// `kill_on_drop`.
    async fn invoke_scraper(
        &self,
        input: &Path,
        output: &Path,
    ) -> Result<std::process::Output, Box<dyn Error>> {
        let mut cmd = Command::new(&self.config.scraper_binary);
        cmd.arg("-input")
            .arg(input)
            .arg("-results")
            .arg(output)
            .arg("-depth")
            .arg(self.config.depth.to_string())
            .arg("-json")
            .arg("-c")
            .arg(self.config.workers.to_string())
            .kill_on_drop(true);

        let bound = Duration::from_secs(self.config.scrape_timeout_secs);
        match timeout(bound, cmd.output()).await {
            Ok(Ok(output)) => Ok(output),
            Ok(Err(e)) => Err(e.into()),
            Err(_) => Err(format!("timed out after {}s", bound.as_secs()).into()),
        }
    }

    /// Parse, enrich, and upload one output artifact.
    async fn process_output(&self, path: &Path, locality: &Locality) {
        let content = match tokio::fs::read_to_string(path).await {
            Ok(content) => content,
            Err(e) => {
                error!(path = %path.display(), error = %e, "Failed to read output artifact");
                return;
            }
        };

        let mut items = normalize::parse_items(&content);
        if items.is_empty() {
            warn!(path = %path.display(), "No valid data found in output artifact");
            return;
        }

        normalize::enrich(&mut items, locality);
        self.uploader.upload(&items).await;
    }
}

impl LocalityJob for ScrapeJob {
    async fn run(&self, locality: &Locality, job_id: usize) {
        for niche in &self.config.niches {
            self.run_niche(locality, job_id, niche).await;
        }
        // Even when individual niches failed, the locality counts as
        // attempted; the driver advances the checkpoint on return.
        info!(job_id, city = %locality.name, "All niches attempted");
    }
}

/// Build the scraper query string for a niche/locality pair.
fn build_query(niche: &str, locality: &Locality) -> String {
    format!("{} {} {}", niche, locality.postal_code, locality.name)
}

/// Path of the transient per-niche input artifact.
fn input_artifact(results_dir: &str, job_id: usize, niche: &str) -> PathBuf {
    Path::new(results_dir).join(format!("temp_{}_{}.txt", job_id, file_slug(niche)))
}

/// Path of the per-niche output artifact, retained as backup.
fn output_artifact(results_dir: &str, locality: &Locality, niche: &str) -> PathBuf {
    Path::new(results_dir).join(format!(
        "{}_{}_{}.json",
        locality.postal_code,
        locality.name,
        file_slug(niche)
    ))
}

/// An output artifact is worth parsing only if it exists and is strictly
/// larger than the configured minimum (tiny files are the scraper's way
/// of saying "nothing found").
fn output_usable(path: &Path, min_bytes: u64) -> bool {
    std::fs::metadata(path)
        .map(|meta| meta.len() > min_bytes)
        .unwrap_or(false)
}
