//! Core data types for the survivor registry
//!
//! Record types stored by the persistence layer implement SSZ serialization
//! for deterministic encoding. Coordinates use fixed-precision decimals.
//!
//! ## Types
//!
//! - [`Survivor`]: A registered survivor and their infection flag
//! - [`ItemType`]: Water, Food, Medication or Ammunition
//! - [`InventoryEntry`]: One (survivor, item) → quantity row
//! - [`Inventory`]: A survivor's holdings
//! - [`InfectionReport`]: A (reporter, reported) pair
//! - [`Location`]: Latitude/longitude, 7 decimal places

mod inventory;
mod item;
mod report;
mod survivor;
pub mod location;

pub use inventory::{Inventory, InventoryEntry};
pub use item::ItemType;
pub use location::Location;
pub use report::InfectionReport;
pub use survivor::{InfectionStatus, NewSurvivor, Sex, Survivor, SurvivorId, MAX_AGE};
