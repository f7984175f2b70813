//! Inventory ledger for Survivor Registry.
//!
//! ## Rules
//!
//! - A missing entry reads as quantity 0
//! - Credits create the entry; debits that reach zero delete it
//! - A debit larger than the held quantity fails and changes nothing
//! - A transfer is debit-then-credit inside one store transaction
//! - Infected survivors can neither gain nor lose items
//!
//! Every mutation holds the affected survivor's stripe in the
//! [`LockTable`](crate::locks::LockTable), so movements on one survivor are
//! totally ordered while different survivors proceed in parallel.
//!
//! ## Example
//!
//! ```
//! use survivor_registry::{ItemType, Location, NewSurvivor, Registry, Sex};
//!
//! let registry = Registry::in_memory();
//! let ana = registry
//!     .create_survivor(NewSurvivor::new(
//!         "Ana Costa",
//!         31,
//!         Sex::Female,
//!         Location::parse("-25.4284", "-49.2733").unwrap(),
//!     ))
//!     .unwrap();
//!
//! let ledger = registry.ledger();
//! ledger.credit(ana.id, ItemType::Food, 4).unwrap();
//! ledger.debit(ana.id, ItemType::Food, 1).unwrap();
//! assert_eq!(ledger.quantity(ana.id, ItemType::Food).unwrap(), 3);
//! ```

pub mod inventory;

pub use inventory::InventoryLedger;
