//! Population statistics.
//!
//! [`PopulationReport::from_snapshot`] is a pure function of a
//! [`Snapshot`](crate::store::Snapshot); [`ReportAggregator`] only adds the
//! snapshot read. Nothing here writes to the store.
//!
//! All ratios and averages are `Decimal`, never floating point.

pub mod aggregator;

pub use aggregator::{PopulationReport, ReportAggregator};
