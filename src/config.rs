//! Runtime configuration for the batch driver.
//!
//! All knobs the original deployment kept as ambient globals live in an
//! explicit [`Config`] struct that is loaded once at startup and passed by
//! reference into each component. The struct deserializes from a YAML file
//! where every field is optional; anything absent falls back to the same
//! defaults the production runs used, so an empty (or missing) file is a
//! valid configuration.
//!
//! # Example
//!
//! ```yaml
//! scraper_binary: ./scraper-app
//! dataset_file: data/target_cities.csv
//! api_url: http://localhost:3000/api/import
//! api_key: super_secret_prospecting_key_2026
//! niches:
//!   - Restaurant
//!   - Pizzeria
//! pause_min_secs: 10
//! pause_max_secs: 30
//! ```

use serde::Deserialize;
use std::error::Error;
use std::path::Path;
use tracing::{info, warn};
use url::Url;

/// Explicit configuration passed into every component.
///
/// Loaded from YAML via [`Config::load`]; a handful of fields can be
/// overridden afterwards from CLI flags (see `cli.rs`).
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Path to the external scraper executable.
    pub scraper_binary: String,
    /// Path to the curated locality dataset (CSV with a header row).
    pub dataset_file: String,
    /// CSV column holding the locality name.
    pub name_column: String,
    /// CSV column holding the postal code.
    pub zip_column: String,
    /// Path of the persisted resume cursor.
    pub checkpoint_file: String,
    /// Directory where raw scraper output artifacts are kept as backup.
    pub results_dir: String,
    /// Ordered niche keywords; each is combined with a locality to form
    /// one scraper query.
    pub niches: Vec<String>,
    /// Traversal depth passed to the scraper's `-depth` flag.
    pub depth: u32,
    /// Worker count passed to the scraper's `-c` flag. Opaque to this
    /// driver; the driver itself stays fully sequential.
    pub workers: u32,
    /// Wall-clock bound on a single scraper invocation, in seconds.
    pub scrape_timeout_secs: u64,
    /// An output artifact at or below this many bytes is treated as "no
    /// results" and skipped.
    pub min_result_bytes: u64,
    /// Ingestion API endpoint.
    pub api_url: String,
    /// Shared secret sent in the `x-secret-key` header.
    pub api_key: String,
    /// Lower bound of the randomized pause between localities, seconds.
    pub pause_min_secs: u64,
    /// Upper bound (inclusive) of the randomized pause, seconds.
    pub pause_max_secs: u64,
    /// A long cooldown is taken every this-many locality indexes.
    pub cooldown_every: usize,
    /// Duration of the periodic cooldown, seconds.
    pub cooldown_secs: u64,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            scraper_binary: "./scraper-app".to_string(),
            dataset_file: "data/target_cities.csv".to_string(),
            name_column: "nom_commune_postal".to_string(),
            zip_column: "code_postal".to_string(),
            checkpoint_file: "last_city_index.txt".to_string(),
            results_dir: "data/results".to_string(),
            niches: vec![
                "Restaurant".to_string(),
                "Pizzeria".to_string(),
                "Sushi".to_string(),
                "Restaurant Italien".to_string(),
                "Restaurant Indien".to_string(),
                "Burger".to_string(),
                "Kebab".to_string(),
            ],
            depth: 5,
            workers: 1,
            scrape_timeout_secs: 180,
            min_result_bytes: 50,
            api_url: "http://localhost:3000/api/import".to_string(),
            api_key: String::new(),
            pause_min_secs: 10,
            pause_max_secs: 30,
            cooldown_every: 500,
            cooldown_secs: 300,
        }
    }
}

impl Config {
    /// Load configuration from a YAML file.
    ///
    /// A missing file is not an error: the defaults above are the
    /// documented production settings, so the driver runs without any
    /// config file at all (a warning notes the fallback). A file that
    /// exists but fails to deserialize *is* an error, since silently
    /// ignoring a broken config would run the wrong campaign.
    pub fn load(path: &str) -> Result<Config, Box<dyn Error>> {
        if !Path::new(path).exists() {
            warn!(%path, "Config file not found; using built-in defaults");
            return Ok(Config::default());
        }
        let raw = std::fs::read_to_string(path)?;
        let config: Config = serde_yaml::from_str(&raw)?;
        info!(%path, "Loaded configuration");
        Ok(config)
    }

    /// Validate the cross-field invariants that serde cannot express.
    ///
    /// # Errors
    ///
    /// Returns an error if the API URL does not parse, the pause range is
    /// inverted, the cooldown interval is zero, or the niche list is
    /// empty.
    pub fn validate(&self) -> Result<(), Box<dyn Error>> {
        Url::parse(&self.api_url)
            .map_err(|e| format!("invalid api_url `{}`: {e}", self.api_url))?;
        if self.pause_min_secs > self.pause_max_secs {
            return Err(format!(
                "pause_min_secs ({}) exceeds pause_max_secs ({})",
                self.pause_min_secs, self.pause_max_secs
            )
            .into());
        }
        if self.cooldown_every == 0 {
            return Err("cooldown_every must be at least 1".into());
        }
        if self.niches.is_empty() {
            return Err("niche list is empty; nothing to scrape".into());
        }
        Ok(())
    }
}
