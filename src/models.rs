//! Data models for localities and upload payloads.
//!
//! This module defines the core data structures moved through the pipeline:
//! - [`Locality`]: one row of the curated dataset, the unit of iteration
//! - [`UploadBatch`]: the single-key wrapper the ingestion API expects
//!
//! Scrape result items themselves stay as `serde_json::Value` objects from
//! the moment they are parsed until they are POSTed: the scraper's output
//! schema is open-ended and the API accepts arbitrary extra fields, so a
//! typed struct would only lose data.

use serde::Serialize;
use serde_json::Value;

/// A named place with its postal code, loaded from the curated dataset.
///
/// Localities are immutable once loaded and are identified by their
/// position in the loaded sequence; that position is what the checkpoint
/// cursor indexes into.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Locality {
    /// Human-readable locality name as it appears in the dataset.
    pub name: String,
    /// Postal code, kept as a string to preserve leading zeroes.
    pub postal_code: String,
}

/// The batch object submitted to the ingestion API.
///
/// The API contract is a single POST body of the shape
/// `{"items": [ ... ]}`; borrowing the slice avoids cloning what can be a
/// few hundred result objects per niche.
#[derive(Debug, Serialize)]
pub struct UploadBatch<'a> {
    /// Ordered list of normalized result items.
    pub items: &'a [Value],
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_upload_batch_shape() {
        let items = vec![json!({"name": "Chez Louise"}), json!({"name": "Le Relais"})];
        let batch = UploadBatch { items: &items };
        let encoded = serde_json::to_value(&batch).unwrap();

        assert_eq!(encoded["items"].as_array().unwrap().len(), 2);
        assert_eq!(encoded["items"][0]["name"], "Chez Louise");
    }
}
