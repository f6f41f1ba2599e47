//! Media download
//!
//! Fetches a submission's media by its locator, rewriting known
//! redirect-style locators to their direct-download form first. The fetched
//! payload keeps the uploader's original filename (from the
//! Content-Disposition header, falling back to the URL path) because its
//! extension names the raw cache entry.

use async_trait::async_trait;
use std::time::Duration;
use thiserror::Error;

const USER_AGENT: &str = concat!("cmm-mi/", env!("CARGO_PKG_VERSION"));
const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Media fetch errors
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("HTTP status {0} fetching {1}")]
    Status(u16, String),

    #[error("Cannot determine a filename for {0}")]
    NoFilename(String),
}

/// A fetched media payload with its original filename
#[derive(Debug, Clone)]
pub struct FetchedMedia {
    pub bytes: Vec<u8>,
    pub file_name: String,
}

/// Download seam; the pipeline never talks HTTP directly
#[async_trait]
pub trait Fetcher: Send + Sync {
    async fn fetch(&self, locator: &str) -> Result<FetchedMedia, FetchError>;
}

/// Rewrite known share-link locators to their direct-download form.
///
/// Google Drive share links carrying an `id` query parameter become the
/// `uc?export=download` form; everything else passes through.
pub fn rewrite_locator(locator: &str) -> String {
    if let Ok(parsed) = reqwest::Url::parse(locator) {
        if parsed.host_str() == Some("drive.google.com") {
            if let Some((_, id)) = parsed.query_pairs().find(|(key, _)| key == "id") {
                return format!("https://drive.google.com/uc?export=download&id={}", id);
            }
        }
    }
    locator.to_string()
}

/// Extract a filename from a Content-Disposition header value
fn filename_from_disposition(value: &str) -> Option<String> {
    for part in value.split(';') {
        let mut halves = part.splitn(2, '=');
        if halves.next().map(str::trim) == Some("filename") {
            let name = halves.next()?.trim().trim_matches('"');
            if !name.is_empty() {
                return Some(name.to_string());
            }
        }
    }
    None
}

/// HTTP fetcher backed by reqwest
pub struct HttpFetcher {
    client: reqwest::Client,
}

impl HttpFetcher {
    pub fn new(timeout_secs: Option<u64>) -> Result<Self, FetchError> {
        let client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_secs(
                timeout_secs.unwrap_or(DEFAULT_TIMEOUT_SECS),
            ))
            .build()
            .map_err(|e| FetchError::Network(e.to_string()))?;
        Ok(Self { client })
    }
}

#[async_trait]
impl Fetcher for HttpFetcher {
    async fn fetch(&self, locator: &str) -> Result<FetchedMedia, FetchError> {
        let url = rewrite_locator(locator);
        tracing::info!(url = %url, "Downloading submission media");

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| FetchError::Network(e.to_string()))?;

        if !response.status().is_success() {
            return Err(FetchError::Status(response.status().as_u16(), url));
        }

        // Prefer the uploader's filename; fall back to the final URL path
        let file_name = response
            .headers()
            .get("content-disposition")
            .and_then(|v| v.to_str().ok())
            .and_then(filename_from_disposition)
            .or_else(|| {
                response
                    .url()
                    .path_segments()
                    .and_then(|segments| segments.last())
                    .filter(|segment| !segment.is_empty())
                    .map(str::to_string)
            })
            .ok_or_else(|| FetchError::NoFilename(url.clone()))?;

        let bytes = response
            .bytes()
            .await
            .map_err(|e| FetchError::Network(e.to_string()))?;

        tracing::debug!(
            file_name = %file_name,
            size = bytes.len(),
            "Download complete"
        );

        Ok(FetchedMedia {
            bytes: bytes.to_vec(),
            file_name,
        })
    }
}
