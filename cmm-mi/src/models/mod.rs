//! Domain entities for the reconciliation engine
//!
//! Entities live in arenas owned by their home service: competitors in the
//! `IdentityResolver`, slots in the `EventCatalog`, registrations and
//! submissions in the `RegistrationLedger`. Cross-references are typed arena
//! indices rather than object references.

pub mod report;
pub mod rows;

use serde::Serialize;

/// Arena index of a [`Competitor`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct CompetitorId(pub u32);

/// Arena index of a [`Slot`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct SlotId(pub u32);

/// Arena index of a [`Registration`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct RegistrationId(pub u32);

/// Arena index of a [`Submission`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct SubmissionId(pub u32);

/// Gender qualifier attached to a slot or stated on an entry record
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Gender {
    Female,
    Male,
}

impl Gender {
    /// Parse a source-record gender label; empty or unrecognized → None
    pub fn parse(label: &str) -> Option<Gender> {
        match label.trim() {
            "Female" => Some(Gender::Female),
            "Male" => Some(Gender::Male),
            _ => None,
        }
    }

    /// Qualifier word used in canonical slot names
    pub fn qualifier(&self) -> &'static str {
        match self {
            Gender::Female => "Ladies",
            Gender::Male => "Mens",
        }
    }
}

/// A resolved, de-duplicated person entity, distinct from any single data row
/// referencing them.
#[derive(Debug, Clone)]
pub struct Competitor {
    /// Federation number; empty when unknown
    pub number: String,
    pub given_name: String,
    pub family_name: String,
    pub email: String,
    /// University or club affiliation; last entry row wins
    pub affiliation: String,
}

impl Competitor {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.given_name, self.family_name)
    }
}

/// A canonical competition slot (level × gender × category)
#[derive(Debug, Clone)]
pub struct Slot {
    pub level: String,
    pub gender: Option<Gender>,
    pub category: String,
    /// Minimum music length in seconds; 0 when unbounded
    pub min_length: u32,
    /// Maximum music length in seconds; 0 when the slot takes no music
    pub max_length: u32,
    /// Canonical key, e.g. "Juvenile Ladies Short Program"
    pub canonical_name: String,
    /// Key without the gender and "Solo" qualifiers, used for submission
    /// matching, e.g. "Juvenile Pattern Dance"
    pub short_key: String,
}

impl Slot {
    pub fn new(
        level: String,
        gender: Option<Gender>,
        category: String,
        min_length: u32,
        max_length: u32,
    ) -> Self {
        let mut canonical_name = level.clone();
        match gender {
            Some(g) => {
                canonical_name.push(' ');
                canonical_name.push_str(g.qualifier());
                canonical_name.push(' ');
            }
            None => canonical_name.push(' '),
        }
        canonical_name.push_str(&category);

        let short_key = format!("{} {}", level, category.replace("Solo ", ""));

        Self {
            level,
            gender,
            category,
            min_length,
            max_length,
            canonical_name,
            short_key,
        }
    }

    /// Whether this slot takes music submissions at all
    pub fn accepts_music(&self) -> bool {
        self.max_length > 0
    }
}

/// Link between exactly one competitor and exactly one slot
#[derive(Debug, Clone)]
pub struct Registration {
    pub competitor: CompetitorId,
    pub slot: SlotId,
    pub confirmed: bool,
    /// Attributed submissions in attribution order; the last one is current
    pub submissions: Vec<SubmissionId>,
    /// Cache key naming this registration's files in both cache namespaces
    pub asset_key: String,
}

impl Registration {
    pub fn current_submission(&self) -> Option<SubmissionId> {
        self.submissions.last().copied()
    }
}

/// One incoming media reference; immutable once created
#[derive(Debug, Clone)]
pub struct Submission {
    /// Media locator as submitted (URL)
    pub locator: String,
    /// 1-based ingestion order; doubles as the version number
    pub source_index: u32,
    pub registration: RegistrationId,
}

/// Derive the cache key for a (slot, competitor) pairing.
///
/// Non-alphanumeric runs collapse to a single underscore, so the key is safe
/// as a filename stem on every platform.
pub fn asset_key(slot_name: &str, full_name: &str) -> String {
    let combined = format!("{}  {}", slot_name, full_name);
    let mut key = String::with_capacity(combined.len());
    let mut last_was_sep = false;
    for c in combined.chars() {
        if c.is_alphanumeric() || c == '_' {
            key.push(c);
            last_was_sep = false;
        } else if !last_was_sep {
            key.push('_');
            last_was_sep = true;
        }
    }
    key
}
