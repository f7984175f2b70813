//! Inventory records.
//!
//! ## SSZ Serialization
//!
//! [`InventoryEntry`] derives `SimpleSerialize` for deterministic encoding.
//! It is a fixed-size container: 8 (survivor) + 1 (item) + 4 (quantity) = 13 bytes.
//!
//! [`Inventory`] is the in-memory view of one survivor's holdings, ordered by
//! item type.

use std::collections::BTreeMap;

use ssz_rs::prelude::*;

use crate::catalog::ItemCatalog;
use crate::types::{ItemType, SurvivorId};

// ============================================================================
// InventoryEntry
// ============================================================================

/// One (survivor, item type) → quantity row.
///
/// A quantity of zero is equivalent to absence.
#[derive(Debug, Clone, PartialEq, Eq, Default, SimpleSerialize)]
pub struct InventoryEntry {
    /// Owning survivor (raw id)
    survivor_id: u64,

    /// Item type as u8 (see [`ItemType::to_u8`])
    item_raw: u8,

    quantity: u32,
}

impl InventoryEntry {
    pub fn new(survivor: SurvivorId, item: ItemType, quantity: u32) -> Self {
        Self {
            survivor_id: survivor.get(),
            item_raw: item.to_u8(),
            quantity,
        }
    }

    pub fn survivor(&self) -> SurvivorId {
        SurvivorId::new(self.survivor_id)
    }

    /// Item type; `None` for a decoded row carrying an unknown code.
    pub fn item(&self) -> Option<ItemType> {
        ItemType::from_u8(self.item_raw)
    }

    #[inline]
    pub fn quantity(&self) -> u32 {
        self.quantity
    }

    /// Point value of the whole row. An unknown item is worth nothing.
    pub fn points(&self) -> u64 {
        self.item()
            .map_or(0, |item| ItemCatalog::point_value(item) * u64::from(self.quantity))
    }
}

// ============================================================================
// Inventory
// ============================================================================

/// A survivor's holdings. Zero quantities are never stored.
#[derive(Debug, Clone, PartialEq, Eq, Default, serde::Serialize)]
#[serde(transparent)]
pub struct Inventory {
    items: BTreeMap<ItemType, u32>,
}

impl Inventory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Missing items read as 0.
    #[inline]
    pub fn quantity(&self, item: ItemType) -> u32 {
        self.items.get(&item).copied().unwrap_or(0)
    }

    /// Set a quantity; zero removes the item.
    pub fn set(&mut self, item: ItemType, quantity: u32) {
        if quantity == 0 {
            self.items.remove(&item);
        } else {
            self.items.insert(item, quantity);
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (ItemType, u32)> + '_ {
        self.items.iter().map(|(item, qty)| (*item, *qty))
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Number of distinct item types held
    #[inline]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Total point value of everything held.
    pub fn points(&self) -> u64 {
        self.iter()
            .map(|(item, qty)| ItemCatalog::point_value(item) * u64::from(qty))
            .sum()
    }

    /// Rows for a given owner.
    pub fn entries(&self, owner: SurvivorId) -> Vec<InventoryEntry> {
        self.iter()
            .map(|(item, qty)| InventoryEntry::new(owner, item, qty))
            .collect()
    }
}

impl FromIterator<(ItemType, u32)> for Inventory {
    /// Quantities for repeated items are summed.
    fn from_iter<I: IntoIterator<Item = (ItemType, u32)>>(iter: I) -> Self {
        let mut inventory = Inventory::new();
        for (item, qty) in iter {
            let total = inventory.quantity(item).saturating_add(qty);
            inventory.set(item, total);
        }
        inventory
    }
}

// ============================================================================
// Unit Tests
// ============================================================================
