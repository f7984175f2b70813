//! Trade engine for Survivor Registry.
//!
//! ## Design Principles
//!
//! 1. **Equal points**: Both sides must offer exactly the same point total
//! 2. **Plan, then apply**: Every check runs before the first write
//! 3. **All-or-nothing**: Both directions commit in one store transaction
//!
//! ## Validation Order
//!
//! Checks short-circuit on the first failure:
//!
//! | Step | Check                              | Error                 |
//! |------|------------------------------------|-----------------------|
//! | 0    | offer lines well-formed            | `Validation`          |
//! | 1    | distinct participants              | `SelfTrade`           |
//! | 2    | both participants exist            | `NotFound`            |
//! | 3    | neither participant infected       | `InfectedParticipant` |
//! | 4    | equal point totals                 | `UnfairTrade`         |
//! | 5    | each side holds what it offers     | `InsufficientQuantity`|
//!
//! ## Example
//!
//! ```
//! use survivor_registry::{ItemType, Location, NewSurvivor, Registry, Sex};
//!
//! let registry = Registry::in_memory();
//! let loc = Location::parse("-23.5505", "-46.6333").unwrap();
//! let a = registry
//!     .create_survivor_with_inventory(
//!         NewSurvivor::new("A", 30, Sex::Male, loc),
//!         &[(ItemType::Water, 5), (ItemType::Food, 3)],
//!     )
//!     .unwrap();
//! let b = registry
//!     .create_survivor_with_inventory(
//!         NewSurvivor::new("B", 30, Sex::Female, loc),
//!         &[(ItemType::Medication, 4)],
//!     )
//!     .unwrap();
//!
//! // 2 water (8 pts) for 4 medication (8 pts)
//! let outcome = registry
//!     .execute_trade(a.id, b.id, &[(ItemType::Water, 2)], &[(ItemType::Medication, 4)])
//!     .unwrap();
//!
//! assert_eq!(outcome.points, 8);
//! assert_eq!(outcome.inventory_a.quantity(ItemType::Medication), 4);
//! assert_eq!(outcome.inventory_b.quantity(ItemType::Water), 2);
//! ```

pub mod engine;

pub use engine::{TradeEngine, TradeOutcome};
