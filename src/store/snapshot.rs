//! Point-in-time copy of the registry tables.
//!
//! A [`Snapshot`] is what the report aggregator reads. It also provides a
//! 32-byte **state root**, a SHA-256 hash over every table in canonical order:
//!
//! ```text
//! survivors  (id ascending):          id | infected | lat (i64) | lon (i64)
//! inventory  ((survivor, item) asc):  SSZ(InventoryEntry)
//! reports    ((reported, reporter)):  SSZ(InfectionReport, created_at = 0)
//! ```
//!
//! Timestamps are left out, so two runs of the same operation sequence agree
//! on the root. Comparing roots before and after a rejected operation proves
//! nothing was written.

use std::collections::BTreeMap;

use sha2::{Digest, Sha256};

use crate::error::StoreError;
use crate::types::{InfectionReport, Inventory, InventoryEntry, ItemType, Survivor, SurvivorId};

/// Consistent copy of all committed records.
#[derive(Debug, Clone, Default)]
pub struct Snapshot {
    survivors: Vec<Survivor>,
    inventory: BTreeMap<(SurvivorId, ItemType), u32>,
    reports: Vec<InfectionReport>,
}

impl Snapshot {
    /// `survivors` must be sorted by id; `reports` by (reported, reporter).
    pub fn new(
        survivors: Vec<Survivor>,
        inventory: BTreeMap<(SurvivorId, ItemType), u32>,
        reports: Vec<InfectionReport>,
    ) -> Self {
        Self {
            survivors,
            inventory,
            reports,
        }
    }

    /// Survivors in id order.
    pub fn survivors(&self) -> &[Survivor] {
        &self.survivors
    }

    pub fn survivor(&self, id: SurvivorId) -> Option<&Survivor> {
        self.survivors
            .binary_search_by_key(&id, |s| s.id)
            .ok()
            .map(|idx| &self.survivors[idx])
    }

    /// Every non-zero inventory row, ordered by (survivor, item).
    pub fn entries(&self) -> impl Iterator<Item = InventoryEntry> + '_ {
        self.inventory
            .iter()
            .map(|(&(id, item), &qty)| InventoryEntry::new(id, item, qty))
    }

    pub fn inventory_of(&self, id: SurvivorId) -> Inventory {
        self.inventory
            .range((id, ItemType::Water)..=(id, ItemType::Ammunition))
            .map(|(&(_, item), &qty)| (item, qty))
            .collect()
    }

    pub fn reports(&self) -> &[InfectionReport] {
        &self.reports
    }

    /// Distinct reporters against `id`.
    pub fn reporter_count(&self, id: SurvivorId) -> usize {
        self.reports.iter().filter(|r| r.reported() == id).count()
    }

    /// Compute the SHA-256 state root over all tables.
    pub fn state_root(&self) -> Result<[u8; 32], StoreError> {
        let mut hasher = Sha256::new();

        hasher.update((self.survivors.len() as u64).to_le_bytes());
        for survivor in &self.survivors {
            let lat = survivor.location.latitude_fixed().unwrap_or(i64::MIN);
            let lon = survivor.location.longitude_fixed().unwrap_or(i64::MIN);
            hasher.update(survivor.id.get().to_le_bytes());
            hasher.update([u8::from(survivor.is_infected())]);
            hasher.update(lat.to_le_bytes());
            hasher.update(lon.to_le_bytes());
        }

        hasher.update((self.inventory.len() as u64).to_le_bytes());
        for entry in self.entries() {
            hasher.update(encode(&entry)?);
        }

        hasher.update((self.reports.len() as u64).to_le_bytes());
        for report in &self.reports {
            let keyed = InfectionReport::new(report.reporter(), report.reported(), 0);
            hasher.update(encode(&keyed)?);
        }

        let mut root = [0u8; 32];
        root.copy_from_slice(&hasher.finalize());
        Ok(root)
    }

    /// Get the state root as a hex string
    pub fn state_root_hex(&self) -> Result<String, StoreError> {
        self.state_root().map(hex::encode)
    }
}

fn encode<T: ssz_rs::SimpleSerialize>(record: &T) -> Result<Vec<u8>, StoreError> {
    ssz_rs::serialize(record).map_err(|e| StoreError::Encoding(format!("{e:?}")))
}

// ============================================================================
// Unit Tests
// ============================================================================
