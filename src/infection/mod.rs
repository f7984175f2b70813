//! Infection consensus.
//!
//! ## State Machine
//!
//! ```text
//!            3rd distinct reporter
//! Healthy ───────────────────────────► Infected (terminal)
//! ```
//!
//! ## Rules
//!
//! - A survivor cannot report itself
//! - One report per (reporter, reported) pair; resubmission is a no-op
//! - Reports are append-only
//! - The transition fires exactly once, when the distinct-reporter count
//!   first reaches [`INFECTION_THRESHOLD`]
//!
//! Record, recount and transition run in one transaction while the reported
//! survivor's stripe is held, so concurrent threshold-crossing reports cannot
//! both fire the transition.

pub mod consensus;

pub use consensus::{InfectionConsensus, ReportOutcome, INFECTION_THRESHOLD};
