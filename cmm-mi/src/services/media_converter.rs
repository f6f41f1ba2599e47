//! Media conversion
//!
//! Transcodes cached raw files to the canonical fixed-bitrate MP3 form via
//! the system ffmpeg.

use async_trait::async_trait;
use std::path::Path;
use thiserror::Error;
use tokio::process::Command;

const DEFAULT_BITRATE: &str = "256k";

/// Conversion errors
#[derive(Debug, Error)]
pub enum ConvertError {
    /// Encoder binary could not be launched
    #[error("Failed to launch encoder: {0}")]
    Spawn(String),

    /// Encoder ran but reported failure
    #[error("Encoder failed: {0}")]
    Failed(String),
}

/// Conversion seam; the pipeline never builds encoder command lines
#[async_trait]
pub trait Converter: Send + Sync {
    async fn convert(&self, input: &Path, output: &Path) -> Result<(), ConvertError>;
}

/// ffmpeg-backed converter producing fixed-bitrate MP3
pub struct FfmpegConverter {
    bitrate: String,
}

impl FfmpegConverter {
    pub fn new(bitrate: Option<String>) -> Self {
        Self {
            bitrate: bitrate.unwrap_or_else(|| DEFAULT_BITRATE.to_string()),
        }
    }
}

#[async_trait]
impl Converter for FfmpegConverter {
    async fn convert(&self, input: &Path, output: &Path) -> Result<(), ConvertError> {
        tracing::info!(input = %input.display(), "Converting");

        let result = Command::new("ffmpeg")
            .arg("-y")
            .arg("-i")
            .arg(input)
            .args(["-acodec", "mp3", "-ab", &self.bitrate])
            .arg(output)
            .output()
            .await
            .map_err(|e| ConvertError::Spawn(e.to_string()))?;

        if !result.status.success() {
            let stderr = String::from_utf8_lossy(&result.stderr);
            // ffmpeg is chatty; keep the tail where the actual error lands
            let tail: String = stderr
                .lines()
                .rev()
                .take(3)
                .collect::<Vec<_>>()
                .into_iter()
                .rev()
                .collect::<Vec<_>>()
                .join(" | ");
            return Err(ConvertError::Failed(tail));
        }

        Ok(())
    }
}
