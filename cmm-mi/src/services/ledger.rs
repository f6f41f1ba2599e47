//! Registration ledger
//!
//! Owns the registration and submission arenas. Registrations are created
//! from the authoritative entries table, optionally extended by the
//! confirmation pass. At most one registration exists per (competitor, slot)
//! pair.

use crate::diagnostics::{DiagnosticKind, Diagnostics};
use crate::models::rows::{ConfirmationRow, EntryRow};
use crate::models::{
    asset_key, CompetitorId, Gender, Registration, RegistrationId, SlotId, Submission,
    SubmissionId,
};
use crate::services::catalog::EventCatalog;
use crate::services::event_normalizer::{tidy_whitespace, title_case};
use crate::services::identity_resolver::IdentityResolver;
use std::collections::HashMap;

/// Slot category whose confirmations apply to crews, not individuals
const TEAM_CATEGORY: &str = "Team Maneuvers";

/// Registration and submission arenas with pair/slot/competitor indexes
#[derive(Debug, Default)]
pub struct RegistrationLedger {
    registrations: Vec<Registration>,
    submissions: Vec<Submission>,
    by_pair: HashMap<(CompetitorId, SlotId), RegistrationId>,
    by_slot: HashMap<SlotId, Vec<RegistrationId>>,
    by_competitor: HashMap<CompetitorId, Vec<RegistrationId>>,
}

impl RegistrationLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn registration(&self, id: RegistrationId) -> &Registration {
        &self.registrations[id.0 as usize]
    }

    pub fn submission(&self, id: SubmissionId) -> &Submission {
        &self.submissions[id.0 as usize]
    }

    pub fn len(&self) -> usize {
        self.registrations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.registrations.is_empty()
    }

    /// Registration ids in creation order
    pub fn ids(&self) -> impl Iterator<Item = RegistrationId> {
        (0..self.registrations.len() as u32).map(RegistrationId)
    }

    pub fn registrations_for_slot(&self, slot: SlotId) -> &[RegistrationId] {
        self.by_slot.get(&slot).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn registrations_for_competitor(&self, competitor: CompetitorId) -> &[RegistrationId] {
        self.by_competitor
            .get(&competitor)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// The current submission of a registration, when one is attributed
    pub fn current_submission(&self, id: RegistrationId) -> Option<&Submission> {
        self.registration(id)
            .current_submission()
            .map(|sid| self.submission(sid))
    }

    /// Create a registration for a (competitor, slot) pair, or return the
    /// existing one
    pub fn register(
        &mut self,
        competitor: CompetitorId,
        slot: SlotId,
        catalog: &EventCatalog,
        resolver: &IdentityResolver,
    ) -> RegistrationId {
        if let Some(&existing) = self.by_pair.get(&(competitor, slot)) {
            return existing;
        }

        let key = asset_key(
            &catalog.get(slot).canonical_name,
            &resolver.get(competitor).full_name(),
        );
        let id = RegistrationId(self.registrations.len() as u32);
        self.registrations.push(Registration {
            competitor,
            slot,
            confirmed: false,
            submissions: Vec::new(),
            asset_key: key,
        });
        self.by_pair.insert((competitor, slot), id);
        self.by_slot.entry(slot).or_default().push(id);
        self.by_competitor.entry(competitor).or_default().push(id);
        id
    }

    pub fn confirm(&mut self, id: RegistrationId) {
        self.registrations[id.0 as usize].confirmed = true;
    }

    /// Ingest the authoritative entries table.
    ///
    /// Every row resolves its event label, passes the gender integrity
    /// check, resolves or creates its competitor and files one registration.
    /// Bad rows are skipped and reported; they never abort the pass.
    pub fn ingest_entries(
        &mut self,
        rows: &[EntryRow],
        catalog: &EventCatalog,
        resolver: &mut IdentityResolver,
        diagnostics: &mut Diagnostics,
    ) {
        for (index, row) in rows.iter().enumerate() {
            let subject = format!("entry row {}", index + 1);

            let slot_id = match catalog.resolve_label(&row.event) {
                Ok(id) => id,
                Err(e) => {
                    diagnostics.error(DiagnosticKind::UnrecognizedEvent, subject, e.to_string());
                    continue;
                }
            };

            let slot = catalog.get(slot_id);
            let stated = Gender::parse(&row.gender);
            if slot.gender.is_some() && stated != slot.gender {
                diagnostics.error(
                    DiagnosticKind::DataIntegrity,
                    subject,
                    format!(
                        "Event {} implies gender {:?} but the entry states {:?}",
                        slot.canonical_name, slot.gender, row.gender
                    ),
                );
                continue;
            }

            let given_name = title_case(row.first_name.trim());
            let family_name = title_case(row.last_name.trim());
            let competitor = resolver.resolve_or_create(
                &row.number,
                &given_name,
                &family_name,
                row.email.trim(),
                diagnostics,
            );
            resolver.set_affiliation(competitor, &title_case(row.affiliation.trim()));

            self.register(competitor, slot_id, catalog, resolver);
        }

        tracing::info!(
            entries = rows.len(),
            registrations = self.registrations.len(),
            competitors = resolver.len(),
            "Entries ingested"
        );
    }

    /// Apply the manual-confirmation pass.
    ///
    /// The table is a flat list: a row with a name and no affiliation is an
    /// event header, rows with both confirm one competitor under the current
    /// header, blank-name rows are ignored. Team-maneuvers headers suspend
    /// confirmation until the next header (crews confirm as a unit).
    pub fn apply_confirmations(
        &mut self,
        rows: &[ConfirmationRow],
        catalog: &EventCatalog,
        resolver: &IdentityResolver,
        diagnostics: &mut Diagnostics,
    ) {
        let mut current: Option<SlotId> = None;

        for (index, row) in rows.iter().enumerate() {
            let subject = format!("confirmation row {}", index + 1);
            let name = title_case(&tidy_whitespace(&row.name));
            if name.is_empty() {
                continue;
            }
            let affiliation = title_case(row.affiliation.trim());

            if affiliation.is_empty() {
                // Event header row
                current = match catalog.resolve_label(&name) {
                    Ok(id) => Some(id),
                    Err(e) => {
                        diagnostics.error(
                            DiagnosticKind::UnrecognizedEvent,
                            subject,
                            e.to_string(),
                        );
                        None
                    }
                };
                continue;
            }

            let Some(slot_id) = current else {
                diagnostics.error(
                    DiagnosticKind::DataIntegrity,
                    subject,
                    "Confirmation row precedes any event header",
                );
                continue;
            };

            if catalog.get(slot_id).category == TEAM_CATEGORY {
                continue;
            }

            match resolver.find_by_name_and_affiliation(&name, &affiliation) {
                Some(competitor) => {
                    if let Some(&existing) = self.by_pair.get(&(competitor, slot_id)) {
                        self.confirm(existing);
                    } else {
                        let id = self.register(competitor, slot_id, catalog, resolver);
                        self.confirm(id);
                        tracing::info!(
                            competitor = %name,
                            slot = %catalog.get(slot_id).canonical_name,
                            "Created registration from confirmation"
                        );
                    }
                }
                None => {
                    diagnostics.error(
                        DiagnosticKind::UnresolvedIdentity,
                        subject,
                        format!("Unknown competitor {} ({})", name, affiliation),
                    );
                }
            }
        }
    }

    /// Attribute a submission to a registration.
    ///
    /// Submissions arrive in non-decreasing source order; an out-of-order
    /// index would downgrade the registration's current submission and is
    /// refused.
    pub fn attach_submission(
        &mut self,
        registration: RegistrationId,
        locator: &str,
        source_index: u32,
    ) -> Option<SubmissionId> {
        if let Some(current) = self.current_submission(registration) {
            if source_index < current.source_index {
                tracing::warn!(
                    registration = registration.0,
                    current = current.source_index,
                    offered = source_index,
                    "Refusing submission older than the current one"
                );
                return None;
            }
        }

        let id = SubmissionId(self.submissions.len() as u32);
        self.submissions.push(Submission {
            locator: locator.to_string(),
            source_index,
            registration,
        });
        self.registrations[registration.0 as usize].submissions.push(id);
        Some(id)
    }
}
