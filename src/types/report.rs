//! Infection report records.
//!
//! ## SSZ Serialization
//!
//! Reports are append-only facts and are serialized using SSZ so that the
//! store's state root is identical for identical report sets.

use ssz_rs::prelude::*;

use crate::types::SurvivorId;

/// One survivor's claim that another survivor is infected.
///
/// At most one report exists per ordered (reporter, reported) pair, and the
/// two ids always differ.
///
/// ## Example
///
/// ```
/// use survivor_registry::types::{InfectionReport, SurvivorId};
///
/// let report = InfectionReport::new(
///     SurvivorId::new(1),     // reporter
///     SurvivorId::new(2),     // reported
///     1703577600000,          // created_at (ms)
/// );
/// assert_eq!(report.reported(), SurvivorId::new(2));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Default, SimpleSerialize)]
pub struct InfectionReport {
    /// Survivor filing the report (raw id)
    pub reporter_id: u64,

    /// Survivor being reported (raw id)
    pub reported_id: u64,

    /// Unix timestamp in milliseconds when the report was recorded
    pub created_at: u64,
}

impl InfectionReport {
    pub fn new(reporter: SurvivorId, reported: SurvivorId, created_at: u64) -> Self {
        Self {
            reporter_id: reporter.get(),
            reported_id: reported.get(),
            created_at,
        }
    }

    #[inline]
    pub fn reporter(&self) -> SurvivorId {
        SurvivorId::new(self.reporter_id)
    }

    #[inline]
    pub fn reported(&self) -> SurvivorId {
        SurvivorId::new(self.reported_id)
    }
}

// ============================================================================
// Unit Tests
// ============================================================================
