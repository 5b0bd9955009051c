//! Ingestion API client.
//!
//! Normalized items are shipped to the CRM's import endpoint as a single
//! `{"items": [...]}` POST authenticated by a shared secret header. The
//! uploader is deliberately fire-and-forget: a failed upload is an
//! operational event to read in the logs, never a reason to stop the
//! batch — the raw artifact stays on disk for out-of-band redelivery.

use crate::models::UploadBatch;
use crate::utils::truncate_for_log;
use reqwest::Client;
use serde_json::Value;
use tracing::{error, info, instrument};
use url::Url;

/// Header carrying the shared ingestion secret.
const SECRET_HEADER: &str = "x-secret-key";

/// Client for the downstream ingestion API.
#[derive(Debug, Clone)]
pub struct Uploader {
    client: Client,
    url: Url,
    api_key: String,
}

impl Uploader {
    pub fn new(url: Url, api_key: String) -> Self {
        Uploader {
            client: Client::new(),
            url,
            api_key,
        }
    }

    /// Submit one batch of normalized items.
    ///
    /// Success is HTTP 200 or 201 and logs the submitted count. Non-2xx
    /// responses log status and (truncated) body; connection failures log
    /// the error detail. Nothing propagates past this boundary.
    #[instrument(level = "info", skip_all, fields(count = items.len()))]
    pub async fn upload(&self, items: &[Value]) {
        let batch = UploadBatch { items };
        let result = self
            .client
            .post(self.url.clone())
            .header(SECRET_HEADER, &self.api_key)
            .json(&batch)
            .send()
            .await;

        match result {
            Ok(response) if response.status() == 200 || response.status() == 201 => {
                info!(count = items.len(), "API upload succeeded");
            }
            Ok(response) => {
                let status = response.status();
                let body = response.text().await.unwrap_or_default();
                error!(
                    %status,
                    body = %truncate_for_log(&body, 300),
                    "API upload failed"
                );
            }
            Err(e) => {
                error!(url = %self.url, error = %e, "API connection error");
            }
        }
    }
}
