//! Structured run diagnostics
//!
//! Every per-record failure or ambiguity lands here instead of aborting the
//! batch. The collector is returned alongside the materialized state so
//! operators can correct source data and re-run.

use serde::Serialize;

/// Diagnostic severity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Severity {
    /// Recoverable; a best-guess result was used or the item will retry
    Warning,
    /// The record was skipped for this run
    Error,
}

/// What went wrong with a record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum DiagnosticKind {
    /// Identity matched by a non-authoritative key (name or email) or by
    /// score; the match was used
    IdentityAmbiguous,
    /// Identity could not be resolved to a known competitor
    UnresolvedIdentity,
    /// Free-text event label did not normalize to a known slot
    UnrecognizedEvent,
    /// Submission could not be attributed to any registration
    UnmatchedSubmission,
    /// Source record contradicts derived state (e.g. stated gender vs the
    /// gender implied by the event label)
    DataIntegrity,
    /// Media download failed; the registration will retry next run
    Fetch,
    /// Cached raw file has an extension outside the allow-list
    UnsupportedFormat,
    /// Transcode subprocess failed
    Convert,
    /// Tag write failed; the conversion was rolled back
    TagWrite,
    /// Filesystem error in a cache namespace
    Io,
}

impl DiagnosticKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            DiagnosticKind::IdentityAmbiguous => "identity-ambiguous",
            DiagnosticKind::UnresolvedIdentity => "unresolved-identity",
            DiagnosticKind::UnrecognizedEvent => "unrecognized-event",
            DiagnosticKind::UnmatchedSubmission => "unmatched-submission",
            DiagnosticKind::DataIntegrity => "data-integrity",
            DiagnosticKind::Fetch => "fetch",
            DiagnosticKind::UnsupportedFormat => "unsupported-format",
            DiagnosticKind::Convert => "convert",
            DiagnosticKind::TagWrite => "tag-write",
            DiagnosticKind::Io => "io",
        }
    }
}

/// One diagnostic entry
#[derive(Debug, Clone, Serialize)]
pub struct Diagnostic {
    pub severity: Severity,
    pub kind: DiagnosticKind,
    /// What the diagnostic is about (a row, a competitor, a registration key)
    pub subject: String,
    pub message: String,
}

/// Collector for a batch run's diagnostics
#[derive(Debug, Default)]
pub struct Diagnostics {
    entries: Vec<Diagnostic>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a recoverable condition
    pub fn warn(
        &mut self,
        kind: DiagnosticKind,
        subject: impl Into<String>,
        message: impl Into<String>,
    ) {
        let subject = subject.into();
        let message = message.into();
        tracing::warn!(kind = kind.as_str(), subject = %subject, "{}", message);
        self.entries.push(Diagnostic {
            severity: Severity::Warning,
            kind,
            subject,
            message,
        });
    }

    /// Record a skipped record
    pub fn error(
        &mut self,
        kind: DiagnosticKind,
        subject: impl Into<String>,
        message: impl Into<String>,
    ) {
        let subject = subject.into();
        let message = message.into();
        tracing::error!(kind = kind.as_str(), subject = %subject, "{}", message);
        self.entries.push(Diagnostic {
            severity: Severity::Error,
            kind,
            subject,
            message,
        });
    }

    pub fn entries(&self) -> &[Diagnostic] {
        &self.entries
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn count_of(&self, severity: Severity) -> usize {
        self.entries.iter().filter(|d| d.severity == severity).count()
    }

    /// Entries of one kind, for assertions and summaries
    pub fn of_kind(&self, kind: DiagnosticKind) -> impl Iterator<Item = &Diagnostic> {
        self.entries.iter().filter(move |d| d.kind == kind)
    }
}
