//! # Survivor Registry
//!
//! Core of a post-crisis survivor registry: inventories, fair trades,
//! peer-reported infection and population statistics.
//!
//! ## Architecture
//!
//! The core consists of:
//! - **Types**: Core records (Survivor, InventoryEntry, InfectionReport)
//! - **Catalog**: Constant item point values
//! - **Ledger**: Atomic per-survivor credit/debit/transfer
//! - **Trade**: Equal-points, all-or-nothing two-party exchange
//! - **Infection**: Report dedup and the 3-reporter transition
//! - **Report**: Population statistics from a snapshot
//! - **Store**: Persistence boundary with an in-memory implementation
//!
//! ## Design Principles
//!
//! 1. **No partial writes**: Every operation is one store transaction
//! 2. **No Floating Point**: Coordinates and statistics use `Decimal`
//! 3. **Per-survivor ordering**: Striped locks serialize work on a survivor
//! 4. **Explicit ownership**: Components share one store handle, no globals
//!
//! ## Example
//!
//! ```
//! use survivor_registry::{InfectionStatus, Location, NewSurvivor, Registry, Sex};
//!
//! let registry = Registry::in_memory();
//! let loc = Location::parse("-19.9167", "-43.9345").unwrap();
//! let ids: Vec<_> = ["Ana", "Bia", "Caio", "Davi"]
//!     .iter()
//!     .map(|name| {
//!         registry
//!             .create_survivor(NewSurvivor::new(*name, 30, Sex::Female, loc))
//!             .unwrap()
//!             .id
//!     })
//!     .collect();
//!
//! for reporter in &ids[1..] {
//!     registry.report(*reporter, ids[0]).unwrap();
//! }
//! assert_eq!(registry.survivor(ids[0]).unwrap().status(), InfectionStatus::Infected);
//! assert_eq!(registry.generate_report().unwrap().infected_percentage(), "25.00%");
//! ```

// ============================================================================
// Module declarations
// ============================================================================

/// Core data types: Survivor, ItemType, InventoryEntry, InfectionReport
pub mod types;

/// Item point values
pub mod catalog;

/// Error taxonomy
pub mod error;

/// Registry configuration
pub mod config;

/// Striped per-survivor locks
pub mod locks;

/// Persistence boundary and in-memory store
pub mod store;

/// Inventory ledger
pub mod ledger;

/// Trade engine
pub mod trade;

/// Infection consensus
pub mod infection;

/// Population report
pub mod report;

/// Facade over all components
pub mod registry;

// ============================================================================
// Re-exports for convenience
// ============================================================================

pub use catalog::ItemCatalog;
pub use config::{ConfigError, RegistryConfig};
pub use error::{ErrorKind, RegistryError, StoreError};
pub use infection::{InfectionConsensus, ReportOutcome, INFECTION_THRESHOLD};
pub use ledger::InventoryLedger;
pub use registry::Registry;
pub use report::{PopulationReport, ReportAggregator};
pub use store::{MemoryStore, RecordStore, Snapshot, StoreTxn};
pub use trade::{TradeEngine, TradeOutcome};
pub use types::{
    InfectionReport, InfectionStatus, Inventory, InventoryEntry, ItemType, Location, NewSurvivor,
    Sex, Survivor, SurvivorId,
};
