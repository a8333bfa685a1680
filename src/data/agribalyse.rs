//! ADEME data-fair API integration for the Agribalyse 3.1 synthesis table.

use std::time::Duration;

use reqwest::blocking::Client;
use tracing::info;

use super::{Dataset, SourceKind};
use crate::error::AppError;

pub const DEFAULT_URL: &str =
    "https://data.ademe.fr/data-fair/api/v1/datasets/agribalyse-31-synthese/lines?format=csv";

pub struct AgribalyseClient {
    client: Client,
    url: String,
}

impl AgribalyseClient {
    pub fn new(url: impl Into<String>, timeout: Duration) -> Result<Self, AppError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| AppError::usage(format!("Failed to build HTTP client: {e}")))?;
        Ok(Self {
            client,
            url: url.into(),
        })
    }

    /// Download the full CSV export. Any non-2xx status is an error.
    pub fn fetch_dataset(&self) -> Result<Dataset, AppError> {
        let resp = self
            .client
            .get(&self.url)
            .send()
            .map_err(|e| AppError::remote(format!("Agribalyse request failed: {e}")))?;

        if !resp.status().is_success() {
            return Err(AppError::remote(format!(
                "Agribalyse request failed with status {}.",
                resp.status()
            )));
        }

        let body = resp
            .bytes()
            .map_err(|e| AppError::remote(format!("Failed to read Agribalyse response: {e}")))?;
        let text = String::from_utf8(body.to_vec())
            .map_err(|e| AppError::remote(format!("Agribalyse response is not valid UTF-8: {e}")))?;

        info!(bytes = text.len(), "downloaded dataset");
        Ok(Dataset::new(SourceKind::Remote, text))
    }
}
