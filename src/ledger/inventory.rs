//! Per-survivor item quantities.

use std::sync::Arc;

use tracing::debug;

use crate::error::RegistryError;
use crate::infection::consensus::require_healthy;
use crate::locks::LockTable;
use crate::store::{self, RecordStore, StoreTxn};
use crate::types::{Inventory, InventoryEntry, ItemType, Survivor, SurvivorId};

/// Atomic credit/debit/transfer over the inventory table.
pub struct InventoryLedger<S: RecordStore> {
    store: Arc<S>,
    locks: Arc<LockTable>,
}

impl<S: RecordStore> Clone for InventoryLedger<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            locks: Arc::clone(&self.locks),
        }
    }
}

impl<S: RecordStore> InventoryLedger<S> {
    pub fn new(store: Arc<S>, locks: Arc<LockTable>) -> Self {
        Self { store, locks }
    }

    // ========================================================================
    // Queries
    // ========================================================================

    /// Held quantity; 0 when the survivor has no entry for `item`.
    pub fn quantity(&self, survivor: SurvivorId, item: ItemType) -> Result<u32, RegistryError> {
        let mut txn = self.store.begin()?;
        require_survivor(txn.as_mut(), survivor)?;
        Ok(txn.get_quantity(survivor, item)?)
    }

    /// All non-zero holdings of one survivor, ordered by item type.
    pub fn inventory(&self, survivor: SurvivorId) -> Result<Inventory, RegistryError> {
        let mut txn = self.store.begin()?;
        require_survivor(txn.as_mut(), survivor)?;
        Ok(txn.get_inventory(survivor)?)
    }

    // ========================================================================
    // Mutations
    // ========================================================================

    /// Add `amount` units to a healthy survivor. Returns the resulting entry.
    pub fn credit(
        &self,
        survivor: SurvivorId,
        item: ItemType,
        amount: u32,
    ) -> Result<InventoryEntry, RegistryError> {
        require_positive(amount)?;
        let _guard = self.locks.lock(survivor);

        let mut txn = self.store.begin()?;
        require_healthy(&require_survivor(txn.as_mut(), survivor)?)?;
        let quantity = credit_in(txn.as_mut(), survivor, item, amount)?;
        store::commit(txn, "credit")?;

        Ok(InventoryEntry::new(survivor, item, quantity))
    }

    /// Remove `amount` units from a healthy survivor. Fails with
    /// `InsufficientQuantity` when fewer are held. Returns the resulting entry (quantity 0 once deleted).
    pub fn debit(
        &self,
        survivor: SurvivorId,
        item: ItemType,
        amount: u32,
    ) -> Result<InventoryEntry, RegistryError> {
        require_positive(amount)?;
        let _guard = self.locks.lock(survivor);

        let mut txn = self.store.begin()?;
        require_healthy(&require_survivor(txn.as_mut(), survivor)?)?;
        let quantity = debit_in(txn.as_mut(), survivor, item, amount)?;
        store::commit(txn, "debit")?;

        Ok(InventoryEntry::new(survivor, item, quantity))
    }

    /// Move `amount` units from one survivor to another. Both must be healthy.
    ///
    /// Returns the resulting (from, to) entries. If the debit fails the credit
    /// never runs and nothing is written.
    pub fn transfer(
        &self,
        from: SurvivorId,
        to: SurvivorId,
        item: ItemType,
        amount: u32,
    ) -> Result<(InventoryEntry, InventoryEntry), RegistryError> {
        if from == to {
            return Err(RegistryError::SelfTrade(from));
        }
        require_positive(amount)?;
        let _guard = self.locks.lock_pair(from, to);

        let mut txn = self.store.begin()?;
        let sender = require_survivor(txn.as_mut(), from)?;
        let receiver = require_survivor(txn.as_mut(), to)?;
        require_healthy(&sender)?;
        require_healthy(&receiver)?;
        let left = debit_in(txn.as_mut(), from, item, amount)?;
        let right = credit_in(txn.as_mut(), to, item, amount)?;
        store::commit(txn, "transfer")?;

        Ok((
            InventoryEntry::new(from, item, left),
            InventoryEntry::new(to, item, right),
        ))
    }
}

// ============================================================================
// In-transaction primitives
// ============================================================================
//
// Callers hold the survivor's lock and own the transaction.

pub(crate) fn require_survivor(
    txn: &mut dyn StoreTxn,
    id: SurvivorId,
) -> Result<Survivor, RegistryError> {
    txn.get_survivor(id)?.ok_or(RegistryError::NotFound(id))
}

fn require_positive(amount: u32) -> Result<(), RegistryError> {
    if amount == 0 {
        return Err(RegistryError::validation("quantity", "must be positive"));
    }
    Ok(())
}

/// Buffer a credit and return the new quantity.
pub(crate) fn credit_in(
    txn: &mut dyn StoreTxn,
    survivor: SurvivorId,
    item: ItemType,
    amount: u32,
) -> Result<u32, RegistryError> {
    let held = txn.get_quantity(survivor, item)?;
    let quantity = held.checked_add(amount).ok_or_else(|| {
        RegistryError::validation("quantity", format!("{held} + {amount} overflows"))
    })?;
    txn.put_quantity(survivor, item, quantity)?;
    debug!(survivor = %survivor, item = ?item, amount, quantity, "credit");
    Ok(quantity)
}

/// Buffer a debit and return the new quantity.
pub(crate) fn debit_in(
    txn: &mut dyn StoreTxn,
    survivor: SurvivorId,
    item: ItemType,
    amount: u32,
) -> Result<u32, RegistryError> {
    let held = txn.get_quantity(survivor, item)?;
    if held < amount {
        return Err(RegistryError::InsufficientQuantity {
            survivor,
            item,
            requested: amount,
            available: held,
        });
    }
    let quantity = held - amount;
    txn.put_quantity(survivor, item, quantity)?;
    debug!(survivor = %survivor, item = ?item, amount, quantity, "debit");
    Ok(quantity)
}

// ============================================================================
// Unit Tests
// ============================================================================
