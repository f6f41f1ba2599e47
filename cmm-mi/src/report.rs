//! Report projection
//!
//! Builds the per-slot view of confirmed registrations and their media state
//! for the external renderer. Slots that take no music and slots with no
//! confirmed registrations are omitted.

use crate::models::report::{EventReport, ReportData, StartReport};
use crate::services::catalog::EventCatalog;
use crate::services::identity_resolver::IdentityResolver;
use crate::services::ledger::RegistrationLedger;
use crate::services::media_cache::ENCODED_EXT;
use crate::services::media_pipeline::MediaPipeline;
use cmm_common::time::{format_track_time, now};

/// Project the final batch state into report data
pub fn build_report(
    catalog: &EventCatalog,
    ledger: &RegistrationLedger,
    resolver: &IdentityResolver,
    pipeline: &MediaPipeline,
) -> ReportData {
    let mut events = Vec::new();

    for slot_id in catalog.ids() {
        let slot = catalog.get(slot_id);
        if !slot.accepts_music() {
            continue;
        }

        let mut starts: Vec<StartReport> = ledger
            .registrations_for_slot(slot_id)
            .iter()
            .filter(|&&id| ledger.registration(id).confirmed)
            .map(|&id| {
                let registration = ledger.registration(id);
                let competitor = resolver.get(registration.competitor);
                let duration = pipeline.duration(&registration.asset_key);
                StartReport {
                    competitor: competitor.full_name(),
                    affiliation: competitor.affiliation.clone(),
                    music_length: if duration > 0 {
                        format_track_time(duration)
                    } else {
                        String::new()
                    },
                    submission_count: registration.submissions.len(),
                    asset_file: (duration > 0)
                        .then(|| format!("{}.{}", registration.asset_key, ENCODED_EXT)),
                }
            })
            .collect();

        if starts.is_empty() {
            continue;
        }
        starts.sort_by(|a, b| a.competitor.cmp(&b.competitor));

        events.push(EventReport {
            name: slot.canonical_name.clone(),
            min_length: (slot.min_length > 0).then(|| format_track_time(slot.min_length as u64)),
            max_length: (slot.max_length > 0).then(|| format_track_time(slot.max_length as u64)),
            starts,
        });
    }

    ReportData {
        generated_at: now(),
        events,
    }
}
