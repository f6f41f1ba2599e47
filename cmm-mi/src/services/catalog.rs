//! Event catalog
//!
//! The canonical set of competition slots, indexed by canonical name and by
//! short key. Immutable after load.

use crate::models::rows::EventRow;
use crate::models::{Gender, Slot, SlotId};
use crate::services::event_normalizer;
use std::collections::HashMap;
use thiserror::Error;

/// Catalog lookup errors
#[derive(Debug, Error)]
pub enum CatalogError {
    /// Label normalized to a key outside the catalog
    #[error("Unrecognized event label: {0}")]
    UnrecognizedEvent(String),
}

/// Canonical slot set with name indexes
pub struct EventCatalog {
    slots: Vec<Slot>,
    by_name: HashMap<String, SlotId>,
    /// Short keys are shared by the gendered variants of one event
    by_short_key: HashMap<String, Vec<SlotId>>,
}

impl EventCatalog {
    /// Build the catalog from the events table
    pub fn from_rows(rows: &[EventRow]) -> Self {
        let mut slots = Vec::with_capacity(rows.len());
        let mut by_name = HashMap::new();
        let mut by_short_key: HashMap<String, Vec<SlotId>> = HashMap::new();

        for row in rows {
            let gender = Gender::parse(&row.gender);
            if gender.is_none() && !row.gender.trim().is_empty() {
                tracing::warn!(
                    level = %row.level,
                    category = %row.category,
                    gender = %row.gender,
                    "Unrecognized gender on event row, treating as ungendered"
                );
            }
            let slot = Slot::new(
                row.level.trim().to_string(),
                gender,
                row.category.trim().to_string(),
                row.min_music_length,
                row.max_music_length,
            );
            let id = SlotId(slots.len() as u32);
            by_name.insert(slot.canonical_name.clone(), id);
            by_short_key.entry(slot.short_key.clone()).or_default().push(id);
            slots.push(slot);
        }

        tracing::info!(slots = slots.len(), "Event catalog loaded");

        Self {
            slots,
            by_name,
            by_short_key,
        }
    }

    pub fn get(&self, id: SlotId) -> &Slot {
        &self.slots[id.0 as usize]
    }

    /// Slot ids in load order
    pub fn ids(&self) -> impl Iterator<Item = SlotId> {
        (0..self.slots.len() as u32).map(SlotId)
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Exact canonical-name lookup
    pub fn resolve(&self, canonical_name: &str) -> Option<SlotId> {
        self.by_name.get(canonical_name).copied()
    }

    /// Normalize a free-text label and resolve it to a slot
    pub fn resolve_label(&self, raw_label: &str) -> Result<SlotId, CatalogError> {
        let normalized = event_normalizer::normalize(raw_label);
        self.resolve(&normalized)
            .ok_or(CatalogError::UnrecognizedEvent(normalized))
    }

    /// All slots sharing a short key (the gendered variants of one event)
    pub fn resolve_short_key(&self, short_key: &str) -> &[SlotId] {
        self.by_short_key
            .get(short_key)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }
}
