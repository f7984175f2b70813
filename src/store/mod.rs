//! Persistence boundary.
//!
//! ## Contract
//!
//! The core needs only get/put primitives inside a transaction:
//!
//! - [`RecordStore::begin`] opens a [`StoreTxn`]
//! - reads observe committed state overlaid with the transaction's own writes
//! - [`StoreTxn::commit`] applies every buffered write atomically
//! - dropping a transaction without committing discards it
//!
//! Callers serialize conflicting transactions themselves (see
//! [`crate::locks::LockTable`]); a store is not required to detect write skew.
//!
//! ## Persisted Layout
//!
//! | Table              | Key                        |
//! |--------------------|----------------------------|
//! | survivors          | id                         |
//! | inventory entries  | (survivor id, item type)   |
//! | infection reports  | (reporter id, reported id) |

pub mod memory;
pub mod snapshot;

pub use memory::MemoryStore;
pub use snapshot::Snapshot;

use tracing::warn;

use crate::error::{RegistryError, StoreError};
use crate::types::{InfectionReport, Inventory, ItemType, Survivor, SurvivorId};

/// A durable record store.
pub trait RecordStore: Send + Sync {
    /// Open a transaction.
    fn begin(&self) -> Result<Box<dyn StoreTxn + '_>, StoreError>;

    /// Copy of the committed state, consistent across all tables.
    fn snapshot(&self) -> Result<Snapshot, StoreError>;
}

/// An open transaction. Dropping it without [`StoreTxn::commit`] rolls back.
pub trait StoreTxn {
    /// Reserve a fresh survivor id. Ids are never reused, even on rollback.
    fn allocate_survivor_id(&mut self) -> Result<SurvivorId, StoreError>;

    fn get_survivor(&mut self, id: SurvivorId) -> Result<Option<Survivor>, StoreError>;

    fn put_survivor(&mut self, survivor: Survivor) -> Result<(), StoreError>;

    /// Missing entries read as 0.
    fn get_quantity(&mut self, id: SurvivorId, item: ItemType) -> Result<u32, StoreError>;

    /// Writing 0 deletes the entry.
    fn put_quantity(&mut self, id: SurvivorId, item: ItemType, quantity: u32)
        -> Result<(), StoreError>;

    fn get_inventory(&mut self, id: SurvivorId) -> Result<Inventory, StoreError>;

    fn has_report(&mut self, reporter: SurvivorId, reported: SurvivorId)
        -> Result<bool, StoreError>;

    fn put_report(&mut self, report: InfectionReport) -> Result<(), StoreError>;

    /// Number of distinct reporters against `reported`.
    fn count_reporters(&mut self, reported: SurvivorId) -> Result<u32, StoreError>;

    fn commit(self: Box<Self>) -> Result<(), StoreError>;
}

/// Commit `txn`, logging a failed commit before converting the error.
pub(crate) fn commit(txn: Box<dyn StoreTxn + '_>, operation: &'static str) -> Result<(), RegistryError> {
    txn.commit().map_err(|error| {
        warn!(operation, %error, "commit failed, operation rolled back");
        RegistryError::from(error)
    })
}
