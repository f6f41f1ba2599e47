//! Competitor identity resolution
//!
//! Owns the competitor arena and its three lookup indexes (federation
//! number, full name, email). Resolution precedence, first match wins:
//!
//! 1. Number present in the index AND the indexed competitor's family name
//!    appears in the supplied full name. The guard defends against number
//!    reuse and typos; on guard failure resolution falls through.
//! 2. Exact full-name match, with an ambiguity warning — names collide.
//! 3. Exact email match, with an ambiguity warning.
//! 4. `resolve_or_create` only: create and index a new competitor.
//!
//! The lookup-only `find` is for passes that must not silently register an
//! unknown person (submission attribution, confirmations).

use crate::diagnostics::{DiagnosticKind, Diagnostics};
use crate::models::{Competitor, CompetitorId};
use std::collections::HashMap;

/// Federation-number values that mean "unknown"
const NUMBER_SENTINELS: &[&str] = &["0", "none"];

/// Owned competitor index
#[derive(Debug, Default)]
pub struct IdentityResolver {
    competitors: Vec<Competitor>,
    by_number: HashMap<String, CompetitorId>,
    by_name: HashMap<String, CompetitorId>,
    by_email: HashMap<String, CompetitorId>,
}

impl IdentityResolver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, id: CompetitorId) -> &Competitor {
        &self.competitors[id.0 as usize]
    }

    pub fn len(&self) -> usize {
        self.competitors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.competitors.is_empty()
    }

    /// Update a competitor's affiliation; last write wins
    pub fn set_affiliation(&mut self, id: CompetitorId, affiliation: &str) {
        if !affiliation.is_empty() {
            self.competitors[id.0 as usize].affiliation = affiliation.to_string();
        }
    }

    /// Resolve an identity tuple to an existing competitor or create one
    pub fn resolve_or_create(
        &mut self,
        number: &str,
        given_name: &str,
        family_name: &str,
        email: &str,
        diagnostics: &mut Diagnostics,
    ) -> CompetitorId {
        let number = normalize_number(number);
        let full_name = format!("{} {}", given_name, family_name);

        if let Some(id) = self.find(number, &full_name, email, diagnostics) {
            return id;
        }

        let id = CompetitorId(self.competitors.len() as u32);
        self.competitors.push(Competitor {
            number: number.to_string(),
            given_name: given_name.to_string(),
            family_name: family_name.to_string(),
            email: email.to_string(),
            affiliation: String::new(),
        });

        // Index under whichever keys are present
        if !number.is_empty() {
            self.by_number.insert(number.to_string(), id);
        }
        if !full_name.trim().is_empty() {
            self.by_name.insert(full_name, id);
        }
        if !email.is_empty() {
            self.by_email.insert(email.to_string(), id);
        }

        id
    }

    /// Lookup-only resolution; same precedence, no fallback creation.
    ///
    /// "Not found" is the caller's problem to surface.
    pub fn find(
        &self,
        number: &str,
        full_name: &str,
        email: &str,
        diagnostics: &mut Diagnostics,
    ) -> Option<CompetitorId> {
        let number = normalize_number(number);

        if !number.is_empty() {
            if let Some(&id) = self.by_number.get(number) {
                if full_name.contains(&self.get(id).family_name) {
                    return Some(id);
                }
                // Indexed family name absent from the supplied name: the
                // number is suspect, fall through to the weaker keys.
                tracing::debug!(
                    number = %number,
                    supplied = %full_name,
                    indexed = %self.get(id).full_name(),
                    "Number hit failed family-name guard"
                );
            }
        }

        if !full_name.is_empty() {
            if let Some(&id) = self.by_name.get(full_name) {
                diagnostics.warn(
                    DiagnosticKind::IdentityAmbiguous,
                    full_name,
                    format!("Matched by name only ({})", self.get(id).full_name()),
                );
                return Some(id);
            }
        }

        if !email.is_empty() {
            if let Some(&id) = self.by_email.get(email) {
                diagnostics.warn(
                    DiagnosticKind::IdentityAmbiguous,
                    full_name,
                    format!("Matched by email only ({})", email),
                );
                return Some(id);
            }
        }

        None
    }

    /// Exact full-name lookup gated on matching affiliation, for the
    /// confirmation pass
    pub fn find_by_name_and_affiliation(
        &self,
        full_name: &str,
        affiliation: &str,
    ) -> Option<CompetitorId> {
        let id = self.by_name.get(full_name).copied()?;
        if self.get(id).affiliation == affiliation {
            Some(id)
        } else {
            tracing::debug!(
                name = %full_name,
                indexed = %self.get(id).affiliation,
                stated = %affiliation,
                "Name hit with mismatched affiliation"
            );
            None
        }
    }
}

/// Map sentinel number values to empty
fn normalize_number(number: &str) -> &str {
    let number = number.trim();
    if NUMBER_SENTINELS.contains(&number) {
        ""
    } else {
        number
    }
}
