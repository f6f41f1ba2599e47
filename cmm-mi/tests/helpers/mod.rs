//! Shared test fixtures
//!
//! In-memory fakes for the media pipeline's collaborator seams. The fake
//! tagger embeds its marker in the file contents (first line `TAG|version|
//! title|album`) so renames carry tags exactly like real containers do.

// Each test crate uses a subset of these fixtures
#![allow(dead_code)]

use async_trait::async_trait;
use cmm_mi::services::media_converter::{ConvertError, Converter};
use cmm_mi::services::media_fetcher::{FetchError, FetchedMedia, Fetcher};
use cmm_mi::services::media_tagger::{MediaTagger, TagError};
use std::collections::HashMap;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

/// Fetcher serving canned payloads by locator
pub struct FakeFetcher {
    responses: HashMap<String, FetchedMedia>,
    calls: Arc<AtomicUsize>,
}

impl FakeFetcher {
    pub fn new() -> Self {
        Self {
            responses: HashMap::new(),
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn insert(&mut self, locator: &str, file_name: &str, bytes: &[u8]) {
        self.responses.insert(
            locator.to_string(),
            FetchedMedia {
                bytes: bytes.to_vec(),
                file_name: file_name.to_string(),
            },
        );
    }

    pub fn calls(&self) -> Arc<AtomicUsize> {
        self.calls.clone()
    }
}

#[async_trait]
impl Fetcher for FakeFetcher {
    async fn fetch(&self, locator: &str) -> Result<FetchedMedia, FetchError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.responses
            .get(locator)
            .cloned()
            .ok_or_else(|| FetchError::Network(format!("no fixture for {}", locator)))
    }
}

/// Converter that copies bytes through, optionally failing
pub struct FakeConverter {
    calls: Arc<AtomicUsize>,
    fail: bool,
}

impl FakeConverter {
    pub fn new() -> Self {
        Self {
            calls: Arc::new(AtomicUsize::new(0)),
            fail: false,
        }
    }

    pub fn failing() -> Self {
        Self {
            calls: Arc::new(AtomicUsize::new(0)),
            fail: true,
        }
    }

    pub fn calls(&self) -> Arc<AtomicUsize> {
        self.calls.clone()
    }
}

#[async_trait]
impl Converter for FakeConverter {
    async fn convert(&self, input: &Path, output: &Path) -> Result<(), ConvertError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            return Err(ConvertError::Failed("forced failure".to_string()));
        }
        let bytes = std::fs::read(input).map_err(|e| ConvertError::Failed(e.to_string()))?;
        std::fs::write(output, bytes).map_err(|e| ConvertError::Failed(e.to_string()))?;
        Ok(())
    }
}

/// Tagger storing its marker as a text header inside the file
pub struct FakeTagger {
    fail_writes: bool,
}

impl FakeTagger {
    pub fn new() -> Self {
        Self { fail_writes: false }
    }

    pub fn failing() -> Self {
        Self { fail_writes: true }
    }

    fn parse_header(path: &Path) -> Option<(u32, String, String)> {
        let content = std::fs::read(path).ok()?;
        let content = String::from_utf8_lossy(&content);
        let first_line = content.lines().next()?;
        let mut fields = first_line.splitn(4, '|');
        if fields.next()? != "TAG" {
            return None;
        }
        let version = fields.next()?.parse().ok()?;
        let title = fields.next()?.to_string();
        let album = fields.next()?.to_string();
        Some((version, title, album))
    }

    /// Read back the (version, title, album) triple for assertions
    pub fn header_of(path: &Path) -> Option<(u32, String, String)> {
        Self::parse_header(path)
    }
}

impl MediaTagger for FakeTagger {
    fn read_version(&self, path: &Path) -> u32 {
        Self::parse_header(path).map(|(version, _, _)| version).unwrap_or(0)
    }

    fn write_tags(
        &self,
        path: &Path,
        title: &str,
        album: &str,
        version: u32,
    ) -> Result<(), TagError> {
        if self.fail_writes {
            return Err(TagError::Write(
                path.to_path_buf(),
                "forced failure".to_string(),
            ));
        }
        let body = std::fs::read(path)
            .map_err(|e| TagError::Read(path.to_path_buf(), e.to_string()))?;
        let mut tagged = format!("TAG|{}|{}|{}\n", version, title, album).into_bytes();
        tagged.extend_from_slice(&body);
        std::fs::write(path, tagged)
            .map_err(|e| TagError::Write(path.to_path_buf(), e.to_string()))?;
        Ok(())
    }

    fn read_duration(&self, path: &Path) -> u64 {
        if Self::parse_header(path).is_some() {
            150
        } else {
            0
        }
    }
}
