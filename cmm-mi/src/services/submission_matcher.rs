//! Free-text submission matching
//!
//! Submission rows without a usable identity are attributed by scoring the
//! submitted name against the competitors already registered under the
//! declared slot. Source identity data is inconsistently formatted (token
//! order, casing, middle names), so no single exact rule suffices; the score
//! rewards multiple weak signals converging.
//!
//! The weights and threshold are heuristic tuning, not derived constants;
//! the threshold is exposed through configuration.

use crate::models::{CompetitorId, RegistrationId};
use crate::services::identity_resolver::IdentityResolver;
use crate::services::ledger::RegistrationLedger;

/// Default acceptance threshold
pub const DEFAULT_THRESHOLD: u32 = 4;

/// Scoring weights for name-signal matching
#[derive(Debug, Clone)]
pub struct MatchWeights {
    /// Last submitted token equals the registered family name
    pub family_token: u32,
    /// First submitted token equals the registered given name
    pub given_token: u32,
    /// Registered family name appears anywhere in the submitted name
    pub family_substring: u32,
    /// Registered family initial equals the last submitted token's initial
    pub family_initial: u32,
    /// Registered given name appears anywhere in the submitted name
    pub given_substring: u32,
    /// Registered given initial equals the submitted name's initial
    pub given_initial: u32,
}

impl Default for MatchWeights {
    fn default() -> Self {
        Self {
            family_token: 2,
            given_token: 2,
            family_substring: 4,
            family_initial: 1,
            given_substring: 2,
            given_initial: 1,
        }
    }
}

/// Score a submitted free-text name against a registered (given, family)
/// name pair.
///
/// Pure function; all weights additive.
pub fn score_name(
    weights: &MatchWeights,
    given_name: &str,
    family_name: &str,
    submitted: &str,
) -> u32 {
    let tokens: Vec<&str> = submitted.split_whitespace().collect();
    let first_token = tokens.first().copied().unwrap_or("");
    let last_token = tokens.last().copied().unwrap_or("");

    let mut score = 0;

    if !family_name.is_empty() {
        if last_token == family_name {
            score += weights.family_token;
        }
        if submitted.contains(family_name) {
            score += weights.family_substring;
        }
        if initial(family_name) == initial(last_token) && initial(last_token).is_some() {
            score += weights.family_initial;
        }
    }

    if !given_name.is_empty() {
        if first_token == given_name {
            score += weights.given_token;
        }
        if submitted.contains(given_name) {
            score += weights.given_substring;
        }
        if initial(given_name) == initial(submitted) && initial(submitted).is_some() {
            score += weights.given_initial;
        }
    }

    score
}

fn initial(s: &str) -> Option<char> {
    s.chars().next()
}

/// Candidate scorer with an acceptance threshold
#[derive(Debug, Clone)]
pub struct SubmissionMatcher {
    weights: MatchWeights,
    threshold: u32,
}

impl SubmissionMatcher {
    pub fn new() -> Self {
        Self {
            weights: MatchWeights::default(),
            threshold: DEFAULT_THRESHOLD,
        }
    }

    pub fn with_threshold(threshold: u32) -> Self {
        Self {
            weights: MatchWeights::default(),
            threshold,
        }
    }

    /// Pick the best-scoring candidate registration for a submitted name.
    ///
    /// Returns the winning registration and its score when the score reaches
    /// the threshold. Ties keep the first candidate evaluated; callers must
    /// not rely on tie order.
    pub fn best_candidate(
        &self,
        candidates: &[RegistrationId],
        submitted_name: &str,
        ledger: &RegistrationLedger,
        resolver: &IdentityResolver,
    ) -> Option<(RegistrationId, u32)> {
        let mut best: Option<(RegistrationId, u32)> = None;

        for &candidate in candidates {
            let competitor = self.competitor_of(candidate, ledger, resolver);
            let score = score_name(
                &self.weights,
                &competitor.0,
                &competitor.1,
                submitted_name,
            );
            tracing::debug!(
                candidate = candidate.0,
                score,
                submitted = %submitted_name,
                "Scored submission candidate"
            );
            if best.map_or(true, |(_, best_score)| score > best_score) {
                best = Some((candidate, score));
            }
        }

        best.filter(|&(_, score)| score >= self.threshold)
    }

    fn competitor_of(
        &self,
        registration: RegistrationId,
        ledger: &RegistrationLedger,
        resolver: &IdentityResolver,
    ) -> (String, String) {
        let competitor: CompetitorId = ledger.registration(registration).competitor;
        let competitor = resolver.get(competitor);
        (competitor.given_name.clone(), competitor.family_name.clone())
    }
}

impl Default for SubmissionMatcher {
    fn default() -> Self {
        Self::new()
    }
}
