//! Media versioning pipeline
//!
//! Per-registration state machine: NoSubmission → RawCached → Converted →
//! Tagged. The attributed submission's source index doubles as the asset
//! version; an asset is only regenerated when the attributed index strictly
//! exceeds the version already embedded in the converted file, which makes
//! whole-batch re-runs no-ops for unchanged registrations.
//!
//! Every stage failure is isolated to its registration: the raw cache entry
//! and any previously tagged asset stay intact, and the registration retries
//! on the next run.

use crate::services::media_cache::MediaCache;
use crate::services::media_converter::{Converter, ConvertError};
use crate::services::media_fetcher::{FetchError, Fetcher};
use crate::services::media_tagger::{MediaTagger, TagError};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Raw file extensions the converter accepts (lowercase, without dot)
pub const SUPPORTED_EXTENSIONS: &[&str] =
    &["mp3", "wav", "m4a", "aif", "aiff", "wma", "mp2", "m4v"];

/// Pipeline errors; all recoverable per registration
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error("Unsupported music format: {0}")]
    UnsupportedFormat(String),

    #[error(transparent)]
    Convert(#[from] ConvertError),

    #[error(transparent)]
    Tag(#[from] TagError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// What the pipeline did for one registration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineOutcome {
    /// Embedded version already covers the attributed submission
    UpToDate,
    /// A new asset version was materialized
    Refreshed { version: u32 },
}

/// One registration's work item, detached from the ledger so the pipeline
/// can run against plain data
#[derive(Debug, Clone)]
pub struct PipelineItem {
    pub asset_key: String,
    pub competitor_name: String,
    pub slot_name: String,
    pub locator: String,
    pub source_index: u32,
}

/// The pipeline with its collaborator seams
pub struct MediaPipeline {
    cache: MediaCache,
    fetcher: Box<dyn Fetcher>,
    converter: Box<dyn Converter>,
    tagger: Box<dyn MediaTagger>,
}

impl MediaPipeline {
    pub fn new(
        cache: MediaCache,
        fetcher: Box<dyn Fetcher>,
        converter: Box<dyn Converter>,
        tagger: Box<dyn MediaTagger>,
    ) -> Self {
        Self {
            cache,
            fetcher,
            converter,
            tagger,
        }
    }

    pub fn cache(&self) -> &MediaCache {
        &self.cache
    }

    /// Run the full state machine for one registration's current submission.
    ///
    /// Ensures the raw file is cached, then converts and tags a new asset
    /// version when (and only when) the submission's index exceeds the
    /// embedded version.
    pub async fn process(&self, item: &PipelineItem) -> Result<PipelineOutcome, PipelineError> {
        let raw_path = self.ensure_raw(item).await?;
        self.convert_and_tag(item, &raw_path).await
    }

    /// Duration of the registration's tagged asset in seconds; 0 when no
    /// asset exists yet. Pure query, never mutates cache state.
    pub fn duration(&self, asset_key: &str) -> u64 {
        self.tagger
            .read_duration(&self.cache.converted_path(asset_key))
    }

    /// NoSubmission → RawCached
    async fn ensure_raw(&self, item: &PipelineItem) -> Result<PathBuf, PipelineError> {
        if let Some(path) = self.cache.locate_raw(&item.asset_key, item.source_index)? {
            return Ok(path);
        }

        let fetched = self.fetcher.fetch(&item.locator).await?;
        let ext = extension_of(&fetched.file_name)
            .ok_or_else(|| FetchError::NoFilename(fetched.file_name.clone()))?;

        let path = self.cache.raw_path(&item.asset_key, item.source_index, &ext);
        std::fs::write(&path, &fetched.bytes)?;
        tracing::info!(file = %path.display(), "Cached raw submission");
        Ok(path)
    }

    /// RawCached → Converted → Tagged, gated on the embedded version
    async fn convert_and_tag(
        &self,
        item: &PipelineItem,
        raw_path: &Path,
    ) -> Result<PipelineOutcome, PipelineError> {
        let converted_path = self.cache.converted_path(&item.asset_key);
        let embedded = self.tagger.read_version(&converted_path);
        if item.source_index <= embedded {
            tracing::debug!(
                asset = %item.asset_key,
                embedded,
                "Converted asset is current"
            );
            return Ok(PipelineOutcome::UpToDate);
        }
        if embedded > 0 {
            tracing::info!(
                asset = %item.asset_key,
                from = embedded,
                to = item.source_index,
                "Superseding submission"
            );
        }

        let ext = extension_of(raw_path.to_string_lossy().as_ref()).unwrap_or_default();
        if !SUPPORTED_EXTENSIONS.contains(&ext.as_str()) {
            return Err(PipelineError::UnsupportedFormat(
                raw_path.to_string_lossy().into_owned(),
            ));
        }

        // Convert and tag a staging file; only a fully tagged file replaces
        // the canonical asset, so a failure here leaves the prior version
        // untouched.
        let staging_path = self.cache.staging_path(&item.asset_key);
        if let Err(e) = self.converter.convert(raw_path, &staging_path).await {
            let _ = std::fs::remove_file(&staging_path);
            return Err(e.into());
        }

        let title = if item.source_index > 1 {
            format!("{} v{}", item.competitor_name, item.source_index)
        } else {
            item.competitor_name.clone()
        };
        if let Err(e) =
            self.tagger
                .write_tags(&staging_path, &title, &item.slot_name, item.source_index)
        {
            let _ = std::fs::remove_file(&staging_path);
            return Err(e.into());
        }

        std::fs::rename(&staging_path, &converted_path)?;
        tracing::info!(
            file = %converted_path.display(),
            version = item.source_index,
            "Materialized converted asset"
        );
        Ok(PipelineOutcome::Refreshed {
            version: item.source_index,
        })
    }
}

/// Lowercased extension of a filename, when it has one
fn extension_of(file_name: &str) -> Option<String> {
    Path::new(file_name)
        .extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_lowercase)
        .filter(|ext| !ext.is_empty())
}
