//! Batch workflow
//!
//! Runs the full reconciliation pass over one input snapshot:
//!
//! 1. CATALOG   - load the canonical slot set
//! 2. ENTRIES   - build competitors and registrations from authoritative
//!                entry data
//! 3. CONFIRM   - apply the manual-confirmation pass
//! 4. ATTRIBUTE - attach submissions to registrations, in source order
//! 5. MATERIALIZE - run the media pipeline per registration
//! 6. REPORT    - project the final state for the external renderer
//!
//! Identity indexes are fully populated before attribution starts, and the
//! ledger is not mutated during materialization. A failure in any one
//! record or registration never aborts the others.

use crate::diagnostics::{DiagnosticKind, Diagnostics, Severity};
use crate::models::report::ReportData;
use crate::models::rows::SubmissionRow;
use crate::models::RegistrationId;
use crate::report::build_report;
use crate::services::catalog::EventCatalog;
use crate::services::event_normalizer::{tidy_whitespace, title_case};
use crate::services::identity_resolver::IdentityResolver;
use crate::services::ledger::RegistrationLedger;
use crate::services::media_pipeline::{MediaPipeline, PipelineError, PipelineItem};
use crate::services::submission_matcher::SubmissionMatcher;
use crate::snapshot::Snapshot;
use cmm_common::Result;

/// Final state of one batch run
pub struct BatchOutcome {
    pub catalog: EventCatalog,
    pub resolver: IdentityResolver,
    pub ledger: RegistrationLedger,
    pub report: ReportData,
    pub diagnostics: Diagnostics,
}

/// Batch runner owning the matcher and pipeline
pub struct BatchRunner {
    matcher: SubmissionMatcher,
    pipeline: MediaPipeline,
}

impl BatchRunner {
    pub fn new(matcher: SubmissionMatcher, pipeline: MediaPipeline) -> Self {
        Self { matcher, pipeline }
    }

    /// Run the full batch over one snapshot
    pub async fn run(&self, snapshot: &Snapshot) -> Result<BatchOutcome> {
        let mut diagnostics = Diagnostics::new();

        tracing::info!(phase = "CATALOG", events = snapshot.events.len(), "Loading slot catalog");
        let catalog = EventCatalog::from_rows(&snapshot.events);

        tracing::info!(phase = "ENTRIES", rows = snapshot.entries.len(), "Ingesting entries");
        let mut resolver = IdentityResolver::new();
        let mut ledger = RegistrationLedger::new();
        ledger.ingest_entries(&snapshot.entries, &catalog, &mut resolver, &mut diagnostics);

        tracing::info!(
            phase = "CONFIRM",
            rows = snapshot.confirmations.len(),
            "Applying confirmations"
        );
        ledger.apply_confirmations(&snapshot.confirmations, &catalog, &resolver, &mut diagnostics);

        tracing::info!(
            phase = "ATTRIBUTE",
            rows = snapshot.submissions.len(),
            "Attributing submissions"
        );
        for (index, row) in snapshot.submissions.iter().enumerate() {
            // Row order is the version order; index 0 is version 1
            self.attribute_row(
                row,
                index as u32 + 1,
                &catalog,
                &resolver,
                &mut ledger,
                &mut diagnostics,
            );
        }

        tracing::info!(
            phase = "MATERIALIZE",
            registrations = ledger.len(),
            "Running media pipeline"
        );
        self.pipeline.cache().ensure_dirs()?;
        for registration in ledger.ids() {
            self.materialize(registration, &catalog, &resolver, &ledger, &mut diagnostics)
                .await;
        }

        tracing::info!(phase = "REPORT", "Projecting report data");
        let report = build_report(&catalog, &ledger, &resolver, &self.pipeline);

        tracing::info!(
            warnings = diagnostics.count_of(Severity::Warning),
            errors = diagnostics.count_of(Severity::Error),
            "Batch complete"
        );

        Ok(BatchOutcome {
            catalog,
            resolver,
            ledger,
            report,
            diagnostics,
        })
    }

    /// Attribute every category submission of one row.
    ///
    /// Identity precedence runs first; when it yields nothing the scored
    /// matcher runs over the registrations filed under the declared slot.
    fn attribute_row(
        &self,
        row: &SubmissionRow,
        source_index: u32,
        catalog: &EventCatalog,
        resolver: &IdentityResolver,
        ledger: &mut RegistrationLedger,
        diagnostics: &mut Diagnostics,
    ) {
        let subject = format!("submission row {}", source_index);
        let submitted_name = title_case(&tidy_whitespace(&row.name));
        let email = row.email.trim();

        let competitor = resolver.find(&row.number, &submitted_name, email, diagnostics);

        if competitor.is_none() && row.categories().next().is_none() {
            diagnostics.warn(
                DiagnosticKind::UnresolvedIdentity,
                subject,
                format!("Unknown submitter {} ({})", submitted_name, email),
            );
            return;
        }

        for (event_label, locator) in row.categories() {
            let declared = title_case(&tidy_whitespace(event_label));

            let registration = match competitor {
                Some(competitor) => {
                    // The declared label is the slot's short key; the
                    // competitor's own registrations disambiguate gender.
                    ledger
                        .registrations_for_competitor(competitor)
                        .iter()
                        .copied()
                        .find(|&id| {
                            catalog.get(ledger.registration(id).slot).short_key == declared
                        })
                }
                None => self.match_by_name(
                    &declared,
                    &submitted_name,
                    catalog,
                    resolver,
                    ledger,
                    diagnostics,
                ),
            };

            match registration {
                Some(id) => {
                    ledger.attach_submission(id, locator.trim(), source_index);
                }
                None => {
                    diagnostics.warn(
                        DiagnosticKind::UnmatchedSubmission,
                        subject.clone(),
                        format!(
                            "No registration for {} under {}",
                            submitted_name, declared
                        ),
                    );
                }
            }
        }
    }

    /// Scored fallback over the candidates registered under the declared slot
    fn match_by_name(
        &self,
        declared: &str,
        submitted_name: &str,
        catalog: &EventCatalog,
        resolver: &IdentityResolver,
        ledger: &RegistrationLedger,
        diagnostics: &mut Diagnostics,
    ) -> Option<RegistrationId> {
        let slots = catalog.resolve_short_key(declared);
        if slots.is_empty() {
            diagnostics.error(
                DiagnosticKind::UnrecognizedEvent,
                submitted_name,
                format!("Declared event {} names no slot", declared),
            );
            return None;
        }

        let candidates: Vec<RegistrationId> = slots
            .iter()
            .flat_map(|&slot| ledger.registrations_for_slot(slot))
            .copied()
            .collect();

        let (registration, score) =
            self.matcher
                .best_candidate(&candidates, submitted_name, ledger, resolver)?;

        diagnostics.warn(
            DiagnosticKind::IdentityAmbiguous,
            submitted_name,
            format!(
                "Matched to {} by name score {}",
                resolver.get(ledger.registration(registration).competitor).full_name(),
                score
            ),
        );
        Some(registration)
    }

    /// Run the media pipeline for one registration, isolating failures
    async fn materialize(
        &self,
        registration: RegistrationId,
        catalog: &EventCatalog,
        resolver: &IdentityResolver,
        ledger: &RegistrationLedger,
        diagnostics: &mut Diagnostics,
    ) {
        let Some(submission) = ledger.current_submission(registration) else {
            return;
        };
        let record = ledger.registration(registration);

        let item = PipelineItem {
            asset_key: record.asset_key.clone(),
            competitor_name: resolver.get(record.competitor).full_name(),
            slot_name: catalog.get(record.slot).canonical_name.clone(),
            locator: submission.locator.clone(),
            source_index: submission.source_index,
        };

        if let Err(e) = self.pipeline.process(&item).await {
            let kind = match &e {
                PipelineError::Fetch(_) => DiagnosticKind::Fetch,
                PipelineError::UnsupportedFormat(_) => DiagnosticKind::UnsupportedFormat,
                PipelineError::Convert(_) => DiagnosticKind::Convert,
                PipelineError::Tag(_) => DiagnosticKind::TagWrite,
                PipelineError::Io(_) => DiagnosticKind::Io,
            };
            diagnostics.warn(kind, item.asset_key, e.to_string());
        }
    }
}
