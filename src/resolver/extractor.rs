//! HTTP client for the stream extraction service.
//!
//! The service is queried with `GET {base_url}/videos/{key}` and answers with
//! `{"formats": [{"bitrate": .., "url": ..}]}`. A `404` or `410` means the
//! video is unknown or withdrawn and resolves to nothing.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::StatusCode;
use serde::Deserialize;
use tracing::{debug, error};
use trailerforge_common::{Error, Result};

use super::{Encoding, StreamResolver};

const SERVICE: &str = "extractor";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Deserialize)]
struct FormatsResponse {
    #[serde(default)]
    formats: Vec<Encoding>,
}

pub struct ExtractorClient {
    http: reqwest::Client,
    base_url: String,
}

impl ExtractorClient {
    pub fn new(base_url: &str) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| Error::Internal(format!("failed to build extractor client: {e}")))?;

        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    async fn formats(&self, key: &str) -> Result<Option<Vec<Encoding>>> {
        let url = format!("{}/videos/{key}", self.base_url);
        debug!(url = %url, "Extractor request");

        let resp = self
            .http
            .get(&url)
            .send()
            .await
            .map_err(|e| Error::remote(SERVICE, format!("request for {key} failed: {e}")))?;

        let status = resp.status();
        if status == StatusCode::NOT_FOUND || status == StatusCode::GONE {
            debug!(key, %status, "Video unavailable");
            return Ok(None);
        }
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(Error::remote(SERVICE, format!("{key} returned {status}: {body}")));
        }

        let parsed: FormatsResponse = resp
            .json()
            .await
            .map_err(|e| Error::malformed(SERVICE, format!("{key}: {e}")))?;
        Ok(Some(parsed.formats))
    }
}

#[async_trait]
impl StreamResolver for ExtractorClient {
    async fn resolve(&self, site: &str, key: &str) -> Result<Option<Vec<Encoding>>> {
        self.formats(key)
            .await
            .inspect_err(|e| error!(site, key, error = %e, "Stream resolution failed"))
    }
}
