//! Infected/healthy ratios, per-item averages and points lost to infection.

use std::collections::{BTreeMap, HashSet};
use std::sync::Arc;

use rust_decimal::Decimal;
use serde::Serialize;
use tracing::info;

use crate::error::RegistryError;
use crate::store::{RecordStore, Snapshot};
use crate::types::{ItemType, SurvivorId};

/// Decimal places shown in percentage strings.
const PERCENT_DP: u32 = 2;

/// Statistics derived from one consistent snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PopulationReport {
    pub total: u64,
    pub infected: u64,
    pub healthy: u64,

    /// infected / total, 0 for an empty registry
    pub infected_ratio: Decimal,

    /// 1 - infected_ratio
    pub healthy_ratio: Decimal,

    /// Mean quantity per healthy survivor, every item type present
    pub average_per_healthy: BTreeMap<ItemType, Decimal>,

    /// Point value held by infected survivors
    pub points_lost_to_infection: u64,

    /// Hex state root of the snapshot the report was computed from
    pub state_root: String,
}

impl PopulationReport {
    pub fn from_snapshot(snapshot: &Snapshot) -> Result<Self, RegistryError> {
        let infected_ids: HashSet<SurvivorId> = snapshot
            .survivors()
            .iter()
            .filter(|s| s.is_infected())
            .map(|s| s.id)
            .collect();

        let total = snapshot.survivors().len() as u64;
        let infected = infected_ids.len() as u64;
        let healthy = total - infected;

        let mut healthy_totals: BTreeMap<ItemType, u64> =
            ItemType::ALL.iter().map(|&item| (item, 0)).collect();
        let mut points_lost_to_infection = 0u64;

        for entry in snapshot.entries() {
            if infected_ids.contains(&entry.survivor()) {
                points_lost_to_infection = points_lost_to_infection.saturating_add(entry.points());
            } else if let Some(sum) = entry.item().and_then(|item| healthy_totals.get_mut(&item)) {
                *sum = sum.saturating_add(u64::from(entry.quantity()));
            }
        }

        let infected_ratio = ratio(infected, total);
        let average_per_healthy = healthy_totals
            .into_iter()
            .map(|(item, sum)| (item, ratio(sum, healthy)))
            .collect();

        Ok(Self {
            total,
            infected,
            healthy,
            infected_ratio,
            healthy_ratio: Decimal::ONE - infected_ratio,
            average_per_healthy,
            points_lost_to_infection,
            state_root: snapshot.state_root_hex()?,
        })
    }

    /// Average of `item` per healthy survivor.
    pub fn average(&self, item: ItemType) -> Decimal {
        self.average_per_healthy
            .get(&item)
            .copied()
            .unwrap_or(Decimal::ZERO)
    }

    /// e.g. `"33.33%"`
    pub fn infected_percentage(&self) -> String {
        percentage(self.infected_ratio)
    }

    pub fn healthy_percentage(&self) -> String {
        percentage(self.healthy_ratio)
    }
}

/// `num / den`, or 0 when `den` is 0.
fn ratio(num: u64, den: u64) -> Decimal {
    Decimal::from(num)
        .checked_div(Decimal::from(den))
        .unwrap_or(Decimal::ZERO)
}

fn percentage(ratio: Decimal) -> String {
    let pct = (ratio * Decimal::ONE_HUNDRED).round_dp(PERCENT_DP);
    format!("{pct:.2}%")
}

/// Computes [`PopulationReport`]s on demand.
pub struct ReportAggregator<S: RecordStore> {
    store: Arc<S>,
}

impl<S: RecordStore> Clone for ReportAggregator<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
        }
    }
}

impl<S: RecordStore> ReportAggregator<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    pub fn generate(&self) -> Result<PopulationReport, RegistryError> {
        let snapshot = self.store.snapshot()?;
        let report = PopulationReport::from_snapshot(&snapshot)?;
        info!(
            total = report.total,
            infected = report.infected,
            points_lost = report.points_lost_to_infection,
            "population report generated"
        );
        Ok(report)
    }
}

// ============================================================================
// Unit Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{InfectionReport, Location, Sex, Survivor};
    use chrono::Utc;
    use std::str::FromStr;

    fn survivor(id: u64, infected: bool) -> Survivor {
        let mut s = Survivor::register(
            SurvivorId::new(id),
            format!("s{id}"),
            20,
            Sex::Male,
            Location::parse("0", "0").unwrap(),
            Utc::now(),
        );
        if infected {
            s.mark_infected();
        }
        s
    }

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    #[test]
    fn test_empty_registry() {
        let report = PopulationReport::from_snapshot(&Snapshot::default()).unwrap();
        assert_eq!(report.total, 0);
        assert_eq!(report.infected_ratio, Decimal::ZERO);
        assert_eq!(report.healthy_ratio, Decimal::ONE);
        assert_eq!(report.points_lost_to_infection, 0);
        assert_eq!(report.average_per_healthy.len(), 4);
        for item in ItemType::ALL {
            assert_eq!(report.average(item), Decimal::ZERO);
        }
        assert_eq!(report.infected_percentage(), "0.00%");
        assert_eq!(report.healthy_percentage(), "100.00%");
    }

    #[test]
    fn test_ratios_averages_and_points_lost() {
        let mut inventory = BTreeMap::new();
        inventory.insert((SurvivorId::new(1), ItemType::Water), 4);
        inventory.insert((SurvivorId::new(2), ItemType::Water), 1);
        inventory.insert((SurvivorId::new(2), ItemType::Food), 3);
        // infected: 2 water + 1 medication = 10 points
        inventory.insert((SurvivorId::new(3), ItemType::Water), 2);
        inventory.insert((SurvivorId::new(3), ItemType::Medication), 1);

        let snapshot = Snapshot::new(
            vec![survivor(1, false), survivor(2, false), survivor(3, true)],
            inventory,
            vec![InfectionReport::new(SurvivorId::new(1), SurvivorId::new(3), 0)],
        );
        let report = PopulationReport::from_snapshot(&snapshot).unwrap();

        assert_eq!((report.total, report.infected, report.healthy), (3, 1, 2));
        assert_eq!(report.infected_percentage(), "33.33%");
        assert_eq!(report.healthy_percentage(), "66.67%");
        assert_eq!(report.infected_ratio + report.healthy_ratio, Decimal::ONE);

        assert_eq!(report.average(ItemType::Water), dec("2.5"));
        assert_eq!(report.average(ItemType::Food), dec("1.5"));
        assert_eq!(report.average(ItemType::Medication), Decimal::ZERO);
        assert_eq!(report.points_lost_to_infection, 10);
        assert_eq!(report.state_root, snapshot.state_root_hex().unwrap());
    }

    #[test]
    fn test_everyone_infected() {
        let snapshot = Snapshot::new(vec![survivor(1, true)], BTreeMap::new(), Vec::new());
        let report = PopulationReport::from_snapshot(&snapshot).unwrap();
        assert_eq!(report.infected_ratio, Decimal::ONE);
        assert_eq!(report.healthy_ratio, Decimal::ZERO);
        assert_eq!(report.average(ItemType::Water), Decimal::ZERO);
    }

    #[test]
    fn test_report_is_pure() {
        let snapshot = Snapshot::new(vec![survivor(1, false)], BTreeMap::new(), Vec::new());
        assert_eq!(
            PopulationReport::from_snapshot(&snapshot).unwrap(),
            PopulationReport::from_snapshot(&snapshot).unwrap()
        );
    }
}
