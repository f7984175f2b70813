//! Report deduplication and the threshold transition.

use std::sync::Arc;

use chrono::Utc;
use serde::Serialize;
use tracing::{debug, info};

use crate::error::RegistryError;
use crate::ledger::inventory::require_survivor;
use crate::locks::LockTable;
use crate::store::{self, RecordStore};
use crate::types::{InfectionReport, InfectionStatus, Survivor, SurvivorId};

/// Distinct reporters needed to mark a survivor infected.
pub const INFECTION_THRESHOLD: u32 = 3;

/// Result of a [`InfectionConsensus::report`] call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ReportOutcome {
    pub reported: SurvivorId,
    /// Distinct reporters against `reported` after this call
    pub distinct_reports: u32,
    pub status: InfectionStatus,
    /// `false` when the pair had already been reported
    pub newly_recorded: bool,
    /// `true` only for the call that fired the transition
    pub transitioned: bool,
}

pub struct InfectionConsensus<S: RecordStore> {
    store: Arc<S>,
    locks: Arc<LockTable>,
}

impl<S: RecordStore> Clone for InfectionConsensus<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            locks: Arc::clone(&self.locks),
        }
    }
}

impl<S: RecordStore> InfectionConsensus<S> {
    pub fn new(store: Arc<S>, locks: Arc<LockTable>) -> Self {
        Self { store, locks }
    }

    /// File a report of `reporter` against `reported`.
    pub fn report(
        &self,
        reporter: SurvivorId,
        reported: SurvivorId,
    ) -> Result<ReportOutcome, RegistryError> {
        if reporter == reported {
            return Err(RegistryError::SelfReport(reporter));
        }
        let _guard = self.locks.lock(reported);

        let mut txn = self.store.begin()?;
        require_survivor(txn.as_mut(), reporter)?;
        let mut target = require_survivor(txn.as_mut(), reported)?;

        if txn.has_report(reporter, reported)? {
            let distinct_reports = txn.count_reporters(reported)?;
            debug!(reporter = %reporter, reported = %reported, distinct_reports, "duplicate report ignored");
            return Ok(ReportOutcome {
                reported,
                distinct_reports,
                status: target.status(),
                newly_recorded: false,
                transitioned: false,
            });
        }

        txn.put_report(InfectionReport::new(reporter, reported, now_millis()))?;
        let distinct_reports = txn.count_reporters(reported)?;

        let transitioned = distinct_reports >= INFECTION_THRESHOLD && target.mark_infected();
        if transitioned {
            txn.put_survivor(target.clone())?;
        }
        store::commit(txn, "report")?;

        if transitioned {
            info!(survivor = %reported, distinct_reports, "survivor marked infected");
        } else {
            debug!(reporter = %reporter, reported = %reported, distinct_reports, "report recorded");
        }

        Ok(ReportOutcome {
            reported,
            distinct_reports,
            status: target.status(),
            newly_recorded: true,
            transitioned,
        })
    }

    pub fn status(&self, id: SurvivorId) -> Result<InfectionStatus, RegistryError> {
        let mut txn = self.store.begin()?;
        Ok(require_survivor(txn.as_mut(), id)?.status())
    }

    /// Distinct reporters against `id`.
    pub fn reporter_count(&self, id: SurvivorId) -> Result<u32, RegistryError> {
        let mut txn = self.store.begin()?;
        require_survivor(txn.as_mut(), id)?;
        Ok(txn.count_reporters(id)?)
    }
}

/// Fails with `InfectedParticipant` for an infected survivor.
pub(crate) fn require_healthy(survivor: &Survivor) -> Result<(), RegistryError> {
    if survivor.is_infected() {
        return Err(RegistryError::InfectedParticipant(survivor.id));
    }
    Ok(())
}

fn now_millis() -> u64 {
    u64::try_from(Utc::now().timestamp_millis()).unwrap_or_default()
}

// ============================================================================
// Unit Tests
// ============================================================================
