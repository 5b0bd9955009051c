//! Command-line interface definitions for the prospect runner.
//!
//! This module defines the CLI arguments and options using the `clap` crate.
//! Most tuning lives in the YAML config file; the flags here cover the
//! config path itself, the log destination, and per-run overrides of the
//! few values that commonly differ between campaigns.

use crate::config::Config;
use clap::Parser;

/// Command-line arguments for the prospect runner.
///
/// Overrides given here win over the values in the config file. The API
/// key can also come from the environment so it stays out of shell
/// history.
///
/// # Examples
///
/// ```sh
/// # Run with the defaults and a config file
/// prospect_runner -c prospect_runner.yaml
///
/// # Point at a different campaign dataset, key from the environment
/// PROSPECT_API_KEY=... prospect_runner --dataset data/bretagne.csv
/// ```
#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Cli {
    /// Path to the YAML config file
    #[arg(short, long, default_value = "prospect_runner.yaml")]
    pub config: String,

    /// Log file path (leveled output also goes to the console)
    #[arg(short, long, default_value = "logs/automation.log")]
    pub log_file: String,

    /// Override the locality dataset CSV from the config file
    #[arg(long)]
    pub dataset: Option<String>,

    /// Override the checkpoint file from the config file
    #[arg(long)]
    pub checkpoint: Option<String>,

    /// Override the ingestion API URL from the config file
    #[arg(long)]
    pub api_url: Option<String>,

    /// Ingestion API shared secret
    #[arg(long, env = "PROSPECT_API_KEY")]
    pub api_key: Option<String>,
}

impl Cli {
    /// Fold the CLI overrides into a loaded [`Config`].
    pub fn apply_overrides(&self, config: &mut Config) {
        if let Some(ref dataset) = self.dataset {
            config.dataset_file = dataset.clone();
        }
        if let Some(ref checkpoint) = self.checkpoint {
            config.checkpoint_file = checkpoint.clone();
        }
        if let Some(ref api_url) = self.api_url {
            config.api_url = api_url.clone();
        }
        if let Some(ref api_key) = self.api_key {
            config.api_key = api_key.clone();
        }
    }
}
