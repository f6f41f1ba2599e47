//! Media cache namespaces
//!
//! Two flat directories under the data folder: "music_raw" holds fetched
//! originals named `{source_index}_{asset_key}.{ext}`, "music" holds the
//! canonical encoded form named `{asset_key}.mp3`. Lookups go through the
//! explicit locate contract here, never ad hoc directory scans elsewhere.

use std::path::{Path, PathBuf};

/// Extension of the canonical encoded form
pub const ENCODED_EXT: &str = "mp3";

const RAW_SUBDIR: &str = "music_raw";
const CONVERTED_SUBDIR: &str = "music";

/// Raw and converted cache namespaces for one data folder
#[derive(Debug, Clone)]
pub struct MediaCache {
    raw_dir: PathBuf,
    converted_dir: PathBuf,
}

impl MediaCache {
    pub fn new(data_folder: &Path) -> Self {
        Self {
            raw_dir: data_folder.join(RAW_SUBDIR),
            converted_dir: data_folder.join(CONVERTED_SUBDIR),
        }
    }

    /// Create both namespace directories if missing
    pub fn ensure_dirs(&self) -> std::io::Result<()> {
        std::fs::create_dir_all(&self.raw_dir)?;
        std::fs::create_dir_all(&self.converted_dir)?;
        Ok(())
    }

    pub fn raw_dir(&self) -> &Path {
        &self.raw_dir
    }

    pub fn converted_dir(&self) -> &Path {
        &self.converted_dir
    }

    /// Locate the cached raw file for an asset key at a version, whatever
    /// its extension
    pub fn locate_raw(&self, asset_key: &str, version: u32) -> std::io::Result<Option<PathBuf>> {
        let prefix = format!("{}_{}", version, asset_key);
        for entry in std::fs::read_dir(&self.raw_dir)? {
            let entry = entry?;
            let path = entry.path();
            if path
                .file_stem()
                .and_then(|stem| stem.to_str())
                .is_some_and(|stem| stem == prefix)
            {
                return Ok(Some(path));
            }
        }
        Ok(None)
    }

    /// Raw cache path for an asset key, version and original extension
    pub fn raw_path(&self, asset_key: &str, version: u32, ext: &str) -> PathBuf {
        self.raw_dir
            .join(format!("{}_{}.{}", version, asset_key, ext))
    }

    /// Canonical converted path for an asset key
    pub fn converted_path(&self, asset_key: &str) -> PathBuf {
        self.converted_dir
            .join(format!("{}.{}", asset_key, ENCODED_EXT))
    }

    /// Staging path used while a conversion is in flight; renamed over the
    /// converted path only after tagging succeeds
    pub fn staging_path(&self, asset_key: &str) -> PathBuf {
        self.converted_dir
            .join(format!("{}.tmp.{}", asset_key, ENCODED_EXT))
    }
}
