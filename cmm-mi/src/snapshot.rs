//! Input snapshot loading
//!
//! One batch run consumes a fixed snapshot of the four input tables,
//! exported to JSON by whatever produced them (spreadsheet export, CSV
//! conversion). The engine never talks to the live sources.

use crate::models::rows::{ConfirmationRow, EntryRow, EventRow, SubmissionRow};
use cmm_common::{Error, Result};
use serde::Deserialize;
use std::path::Path;

/// The four input tables of one batch run
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Snapshot {
    pub events: Vec<EventRow>,
    pub entries: Vec<EntryRow>,
    #[serde(default)]
    pub confirmations: Vec<ConfirmationRow>,
    #[serde(default)]
    pub submissions: Vec<SubmissionRow>,
}

impl Snapshot {
    /// Load a snapshot from a JSON file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        serde_json::from_str(&content)
            .map_err(|e| Error::InvalidInput(format!("Snapshot parse failed: {}", e)))
    }
}
