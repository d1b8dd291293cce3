//! Harvest summary and reporting
//!
//! This module defines structures for tracking and reporting harvest results.

use crate::domain::{AnnuaireError, PractitionerRecord};
use std::collections::BTreeMap;
use std::fmt;
use std::time::Duration;

/// Why a practitioner role produced no record
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum SkipReason {
    /// The role carries no usable practitioner reference
    MissingPractitionerReference,
    /// The referenced organization is not in the current page
    MissingOrganization,
    /// The practitioner lookup body could not be decoded
    UndecodableLookup,
    /// The practitioner does not have the requested qualification
    NoQualification,
    /// The practitioner has no registry identifier
    MissingIdentifier,
}

impl SkipReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            SkipReason::MissingPractitionerReference => "missing_practitioner_reference",
            SkipReason::MissingOrganization => "missing_organization",
            SkipReason::UndecodableLookup => "undecodable_lookup",
            SkipReason::NoQualification => "no_qualification",
            SkipReason::MissingIdentifier => "missing_identifier",
        }
    }
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Summary of a harvest run
#[derive(Debug, Clone, Default)]
pub struct HarvestSummary {
    /// Pages processed
    pub pages: usize,

    /// Organizations seen across all pages
    pub organizations: usize,

    /// Practitioner roles seen across all pages
    pub roles: usize,

    /// Records emitted
    pub records: usize,

    /// Roles skipped, per reason
    pub skipped: BTreeMap<SkipReason, usize>,

    /// The page cap stopped the run before the results were exhausted
    pub truncated: bool,

    /// A shutdown signal stopped the run
    pub interrupted: bool,

    /// A transport or pagination failure stopped the run
    pub failed: bool,

    /// Duration of the harvest
    pub duration: Duration,
}

impl HarvestSummary {
    /// Create a new empty harvest summary
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the duration
    pub fn with_duration(mut self, duration: Duration) -> Self {
        self.duration = duration;
        self
    }

    /// Count one skipped role
    pub fn record_skip(&mut self, reason: SkipReason) {
        *self.skipped.entry(reason).or_insert(0) += 1;
    }

    /// Roles skipped for `reason`
    pub fn skipped_for(&self, reason: SkipReason) -> usize {
        self.skipped.get(&reason).copied().unwrap_or(0)
    }

    /// Total roles skipped
    pub fn total_skipped(&self) -> usize {
        self.skipped.values().sum()
    }

    /// Whether the whole result set was walked
    pub fn is_complete(&self) -> bool {
        !self.truncated && !self.interrupted && !self.failed
    }

    /// Log the summary
    pub fn log_summary(&self) {
        tracing::info!(
            pages = self.pages,
            organizations = self.organizations,
            roles = self.roles,
            records = self.records,
            skipped = self.total_skipped(),
            truncated = self.truncated,
            interrupted = self.interrupted,
            failed = self.failed,
            duration_secs = self.duration.as_secs(),
            "Harvest completed"
        );

        for (reason, count) in &self.skipped {
            tracing::debug!(reason = %reason, count = count, "Roles skipped");
        }
    }
}

/// Records produced by a harvest together with its summary
///
/// A run stopped by a failure after its first page still carries the
/// records built so far; `failure` holds the error that stopped it.
#[derive(Debug, Default)]
pub struct HarvestReport {
    pub records: Vec<PractitionerRecord>,
    pub summary: HarvestSummary,
    pub failure: Option<AnnuaireError>,
}

impl HarvestReport {
    /// Stop the run on `error`, keeping what was harvested
    pub fn halt(&mut self, error: AnnuaireError) {
        tracing::error!(
            error = %error,
            pages = self.summary.pages,
            records = self.records.len(),
            "Harvest stopped, keeping partial results"
        );
        self.summary.failed = true;
        self.failure = Some(error);
    }
}
