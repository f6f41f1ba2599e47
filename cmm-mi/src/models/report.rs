//! Report projection data
//!
//! Output consumed by the external report renderer. The engine decides what
//! appears in the report; rendering it is someone else's job.

use chrono::{DateTime, Utc};
use serde::Serialize;

/// Full report projection for one batch run
#[derive(Debug, Clone, Serialize)]
pub struct ReportData {
    pub generated_at: DateTime<Utc>,
    pub events: Vec<EventReport>,
}

/// One slot section: confirmed registrations with their media state
#[derive(Debug, Clone, Serialize)]
pub struct EventReport {
    /// Canonical slot name
    pub name: String,
    /// Formatted minimum music length, when bounded
    pub min_length: Option<String>,
    /// Formatted maximum music length, when bounded
    pub max_length: Option<String>,
    /// Rows sorted by competitor full name
    pub starts: Vec<StartReport>,
}

/// One confirmed registration row
#[derive(Debug, Clone, Serialize)]
pub struct StartReport {
    pub competitor: String,
    pub affiliation: String,
    /// Formatted duration of the converted asset, empty when none exists
    pub music_length: String,
    pub submission_count: usize,
    /// Converted asset filename, when a tagged asset exists
    pub asset_file: Option<String>,
}
