//! Typed input rows
//!
//! Schema-only view of the four input tables. How the rows are produced
//! (spreadsheet export, CSV conversion) is the caller's concern; the engine
//! only sees these structs.

use serde::Deserialize;

/// One row of the events table
#[derive(Debug, Clone, Deserialize)]
pub struct EventRow {
    pub level: String,
    #[serde(default)]
    pub gender: String,
    pub category: String,
    /// Minimum music length in seconds; 0 when unbounded
    #[serde(default)]
    pub min_music_length: u32,
    /// Maximum music length in seconds; 0 when the event takes no music
    #[serde(default)]
    pub max_music_length: u32,
}

/// One row of the authoritative entries table
#[derive(Debug, Clone, Deserialize)]
pub struct EntryRow {
    /// Free-text event label, normalized before catalog lookup
    pub event: String,
    #[serde(default)]
    pub gender: String,
    /// Federation number; "0"/"none" are sentinel values for unknown
    #[serde(default)]
    pub number: String,
    pub first_name: String,
    pub last_name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub affiliation: String,
}

/// One row of the music submissions table
///
/// A single row may carry submissions for up to three program categories.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SubmissionRow {
    #[serde(default)]
    pub number: String,
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub free_dance_event: String,
    #[serde(default)]
    pub free_dance_music: String,
    #[serde(default)]
    pub free_skate_event: String,
    #[serde(default)]
    pub free_skate_music: String,
    #[serde(default)]
    pub short_program_event: String,
    #[serde(default)]
    pub short_program_music: String,
}

impl SubmissionRow {
    /// The (event label, media locator) pairs present on this row
    pub fn categories(&self) -> impl Iterator<Item = (&str, &str)> {
        [
            (self.free_dance_event.as_str(), self.free_dance_music.as_str()),
            (self.free_skate_event.as_str(), self.free_skate_music.as_str()),
            (
                self.short_program_event.as_str(),
                self.short_program_music.as_str(),
            ),
        ]
        .into_iter()
        .filter(|(event, locator)| !event.is_empty() && !locator.is_empty())
    }
}

/// One row of the optional confirmation table
///
/// A row with a name and no affiliation is an event header; rows with both
/// confirm one competitor under the current header; blank-name rows are
/// spacing and are ignored.
#[derive(Debug, Clone, Deserialize)]
pub struct ConfirmationRow {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub affiliation: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_categories_skips_incomplete_pairs() {
        let row = SubmissionRow {
            name: "Mai Nguyen".to_string(),
            free_dance_event: "Juvenile Free Dance".to_string(),
            free_dance_music: String::new(), // label without locator
            free_skate_event: "Juvenile Freeskate".to_string(),
            free_skate_music: "https://example.com/a.mp3".to_string(),
            ..Default::default()
        };

        let pairs: Vec<_> = row.categories().collect();
        assert_eq!(
            pairs,
            vec![("Juvenile Freeskate", "https://example.com/a.mp3")]
        );
    }

    #[test]
    fn test_categories_empty_row() {
        let row = SubmissionRow {
            name: "Mai Nguyen".to_string(),
            ..Default::default()
        };
        assert_eq!(row.categories().count(), 0);
    }
}
