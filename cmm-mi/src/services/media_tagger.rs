//! Media tagging
//!
//! The pipeline touches embedded metadata only through the narrow contract
//! here: read the version marker, write title + album + version marker, read
//! the duration. The version marker lives in the track-number field, an
//! integer-typed tag field that survives re-tagging; the title additionally
//! carries a cosmetic ` v{n}` suffix for versions past the first (written by
//! the pipeline, not here).

use lofty::config::WriteOptions;
use lofty::file::TaggedFileExt;
use lofty::prelude::*;
use lofty::probe::Probe;
use lofty::tag::Tag;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Tagging errors
#[derive(Debug, Error)]
pub enum TagError {
    #[error("Failed to read {0}: {1}")]
    Read(PathBuf, String),

    #[error("Failed to write tags to {0}: {1}")]
    Write(PathBuf, String),
}

/// Narrow contract over the tag/container library
pub trait MediaTagger: Send + Sync {
    /// Read the embedded version marker; 0 when the file is missing or
    /// carries no marker
    fn read_version(&self, path: &Path) -> u32;

    /// Replace the file's tags with title, album and version marker; the
    /// whole write succeeds or the file's tags are untouched
    fn write_tags(
        &self,
        path: &Path,
        title: &str,
        album: &str,
        version: u32,
    ) -> Result<(), TagError>;

    /// Duration in whole seconds; 0 when the file is missing or unreadable
    fn read_duration(&self, path: &Path) -> u64;
}

/// lofty-backed tagger
pub struct LoftyTagger;

impl LoftyTagger {
    pub fn new() -> Self {
        Self
    }
}

impl Default for LoftyTagger {
    fn default() -> Self {
        Self::new()
    }
}

impl MediaTagger for LoftyTagger {
    fn read_version(&self, path: &Path) -> u32 {
        if !path.exists() {
            return 0;
        }
        let tagged_file = match Probe::open(path).and_then(|probe| probe.read()) {
            Ok(file) => file,
            Err(e) => {
                tracing::warn!(file = %path.display(), error = %e, "Unreadable cached asset");
                return 0;
            }
        };
        tagged_file
            .primary_tag()
            .or_else(|| tagged_file.first_tag())
            .and_then(|tag| tag.track())
            .unwrap_or(0)
    }

    fn write_tags(
        &self,
        path: &Path,
        title: &str,
        album: &str,
        version: u32,
    ) -> Result<(), TagError> {
        let mut tagged_file = Probe::open(path)
            .and_then(|probe| probe.read())
            .map_err(|e| TagError::Read(path.to_path_buf(), e.to_string()))?;

        if tagged_file.primary_tag_mut().is_none() {
            let tag_type = tagged_file.primary_tag_type();
            tagged_file.insert_tag(Tag::new(tag_type));
        }
        let Some(tag) = tagged_file.primary_tag_mut() else {
            return Err(TagError::Write(
                path.to_path_buf(),
                "No writable tag".to_string(),
            ));
        };

        tag.clear();
        tag.set_title(title.to_string());
        tag.set_album(album.to_string());
        tag.set_track(version);

        tag.save_to_path(path, WriteOptions::default())
            .map_err(|e| TagError::Write(path.to_path_buf(), e.to_string()))?;

        tracing::debug!(
            file = %path.display(),
            title = %title,
            album = %album,
            version,
            "Wrote asset tags"
        );
        Ok(())
    }

    fn read_duration(&self, path: &Path) -> u64 {
        if !path.exists() {
            return 0;
        }
        match Probe::open(path).and_then(|probe| probe.read()) {
            Ok(tagged_file) => tagged_file.properties().duration().as_secs(),
            Err(e) => {
                tracing::warn!(file = %path.display(), error = %e, "Unreadable cached asset");
                0
            }
        }
    }
}
