//! Two-party, equal-points item exchange.

use std::collections::BTreeMap;
use std::sync::Arc;

use serde::Serialize;
use tracing::{info, warn};

use crate::catalog::ItemCatalog;
use crate::error::RegistryError;
use crate::infection::consensus::require_healthy;
use crate::ledger::inventory::{credit_in, debit_in, require_survivor};
use crate::locks::LockTable;
use crate::store::{self, RecordStore, StoreTxn};
use crate::types::{Inventory, ItemType, SurvivorId};

/// Result of an accepted trade.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TradeOutcome {
    pub survivor_a: SurvivorId,
    pub survivor_b: SurvivorId,
    /// Holdings of `survivor_a` after the exchange
    pub inventory_a: Inventory,
    /// Holdings of `survivor_b` after the exchange
    pub inventory_b: Inventory,
    /// Points each side gave up (equal by construction)
    pub points: u64,
}

/// Validated trade, ready to apply.
#[derive(Debug)]
struct TradePlan {
    a: SurvivorId,
    b: SurvivorId,
    /// Per-item totals offered by `a`
    from_a: Vec<(ItemType, u32)>,
    /// Per-item totals offered by `b`
    from_b: Vec<(ItemType, u32)>,
    points: u64,
}

/// Executes trades through the inventory ledger primitives.
pub struct TradeEngine<S: RecordStore> {
    store: Arc<S>,
    locks: Arc<LockTable>,
}

impl<S: RecordStore> Clone for TradeEngine<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            locks: Arc::clone(&self.locks),
        }
    }
}

impl<S: RecordStore> TradeEngine<S> {
    pub fn new(store: Arc<S>, locks: Arc<LockTable>) -> Self {
        Self { store, locks }
    }

    /// Exchange `offered_by_a` for `offered_by_b`.
    ///
    /// Either both inventories reflect the full exchange or neither changes.
    /// A rejected trade has no side effects.
    pub fn execute_trade(
        &self,
        a: SurvivorId,
        b: SurvivorId,
        offered_by_a: &[(ItemType, u32)],
        offered_by_b: &[(ItemType, u32)],
    ) -> Result<TradeOutcome, RegistryError> {
        let result = self.try_execute(a, b, offered_by_a, offered_by_b);
        match &result {
            Ok(outcome) => info!(
                survivor_a = %a,
                survivor_b = %b,
                points = outcome.points,
                "trade executed"
            ),
            Err(error) => warn!(survivor_a = %a, survivor_b = %b, %error, "trade rejected"),
        }
        result
    }

    fn try_execute(
        &self,
        a: SurvivorId,
        b: SurvivorId,
        offered_by_a: &[(ItemType, u32)],
        offered_by_b: &[(ItemType, u32)],
    ) -> Result<TradeOutcome, RegistryError> {
        let from_a = normalize(offered_by_a)?;
        let from_b = normalize(offered_by_b)?;
        if from_a.is_empty() && from_b.is_empty() {
            return Err(RegistryError::validation("offer", "both sides are empty"));
        }
        if a == b {
            return Err(RegistryError::SelfTrade(a));
        }

        let _guard = self.locks.lock_pair(a, b);
        let mut txn = self.store.begin()?;

        let plan = plan(txn.as_mut(), a, b, from_a, from_b)?;
        apply(txn.as_mut(), &plan)?;

        let inventory_a = txn.get_inventory(a)?;
        let inventory_b = txn.get_inventory(b)?;
        store::commit(txn, "trade")?;

        Ok(TradeOutcome {
            survivor_a: a,
            survivor_b: b,
            inventory_a,
            inventory_b,
            points: plan.points,
        })
    }
}

/// Fold offer lines into per-item totals.
fn normalize(lines: &[(ItemType, u32)]) -> Result<Vec<(ItemType, u32)>, RegistryError> {
    let mut totals: BTreeMap<ItemType, u32> = BTreeMap::new();
    for &(item, qty) in lines {
        if qty == 0 {
            return Err(RegistryError::validation(
                "quantity",
                format!("offer line for {item} must be positive"),
            ));
        }
        let total = totals.entry(item).or_insert(0);
        *total = total.checked_add(qty).ok_or_else(|| {
            RegistryError::validation("quantity", format!("offered {item} overflows"))
        })?;
    }
    Ok(totals.into_iter().collect())
}

/// Read-only planning pass.
fn plan(
    txn: &mut dyn StoreTxn,
    a: SurvivorId,
    b: SurvivorId,
    from_a: Vec<(ItemType, u32)>,
    from_b: Vec<(ItemType, u32)>,
) -> Result<TradePlan, RegistryError> {
    let survivor_a = require_survivor(txn, a)?;
    let survivor_b = require_survivor(txn, b)?;
    require_healthy(&survivor_a)?;
    require_healthy(&survivor_b)?;

    let offered_by_a = ItemCatalog::total_points(&from_a)?;
    let offered_by_b = ItemCatalog::total_points(&from_b)?;
    if offered_by_a != offered_by_b {
        return Err(RegistryError::UnfairTrade {
            offered_by_a,
            offered_by_b,
        });
    }

    for (owner, lines) in [(a, &from_a), (b, &from_b)] {
        for &(item, requested) in lines {
            let available = txn.get_quantity(owner, item)?;
            if available < requested {
                return Err(RegistryError::InsufficientQuantity {
                    survivor: owner,
                    item,
                    requested,
                    available,
                });
            }
        }
    }

    Ok(TradePlan {
        a,
        b,
        from_a,
        from_b,
        points: offered_by_a,
    })
}

/// Buffer every movement of a validated plan.
fn apply(txn: &mut dyn StoreTxn, plan: &TradePlan) -> Result<(), RegistryError> {
    for &(item, qty) in &plan.from_a {
        debit_in(txn, plan.a, item, qty)?;
        credit_in(txn, plan.b, item, qty)?;
    }
    for &(item, qty) in &plan.from_b {
        debit_in(txn, plan.b, item, qty)?;
        credit_in(txn, plan.a, item, qty)?;
    }
    Ok(())
}

// ============================================================================
// Unit Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::store::MemoryStore;
    use crate::types::{Location, Sex, Survivor};
    use chrono::Utc;

    fn id(raw: u64) -> SurvivorId {
        SurvivorId::new(raw)
    }

    /// Survivor 1: {Water:5, Food:3}, survivor 2: {Medication:4}, survivor 3
    /// infected with {Water:2}.
    fn setup() -> (Arc<MemoryStore>, TradeEngine<MemoryStore>) {
        let store = Arc::new(MemoryStore::new());
        let mut txn = store.begin().unwrap();
        for raw in 1..=3 {
            let mut survivor = Survivor::register(
                id(raw),
                format!("s{raw}"),
                30,
                Sex::Male,
                Location::parse("1", "1").unwrap(),
                Utc::now(),
            );
            if raw == 3 {
                survivor.mark_infected();
            }
            txn.put_survivor(survivor).unwrap();
        }
        txn.put_quantity(id(1), ItemType::Water, 5).unwrap();
        txn.put_quantity(id(1), ItemType::Food, 3).unwrap();
        txn.put_quantity(id(2), ItemType::Medication, 4).unwrap();
        txn.put_quantity(id(3), ItemType::Water, 2).unwrap();
        txn.commit().unwrap();

        let engine = TradeEngine::new(Arc::clone(&store), Arc::new(LockTable::new(8)));
        (store, engine)
    }

    fn root(store: &MemoryStore) -> [u8; 32] {
        store.snapshot().unwrap().state_root().unwrap()
    }

    #[test]
    fn test_equal_points_trade() {
        let (_, engine) = setup();
        let outcome = engine
            .execute_trade(id(1), id(2), &[(ItemType::Water, 2)], &[(ItemType::Medication, 4)])
            .unwrap();

        assert_eq!(outcome.points, 8);
        assert_eq!(outcome.inventory_a.quantity(ItemType::Water), 3);
        assert_eq!(outcome.inventory_a.quantity(ItemType::Food), 3);
        assert_eq!(outcome.inventory_a.quantity(ItemType::Medication), 4);
        assert_eq!(outcome.inventory_b.quantity(ItemType::Water), 2);
        assert_eq!(outcome.inventory_b.quantity(ItemType::Medication), 0);
        assert_eq!(outcome.inventory_b.len(), 1);
    }

    #[test]
    fn test_unfair_trade_rejected() {
        let (store, engine) = setup();
        let before = root(&store);
        let err = engine
            .execute_trade(id(1), id(2), &[(ItemType::Water, 1)], &[(ItemType::Medication, 1)])
            .unwrap_err();
        assert_eq!(
            err,
            RegistryError::UnfairTrade {
                offered_by_a: 4,
                offered_by_b: 2
            }
        );
        assert_eq!(root(&store), before);
    }

    #[test]
    fn test_one_sided_offer_is_unfair() {
        let (_, engine) = setup();
        let err = engine
            .execute_trade(id(1), id(2), &[(ItemType::Food, 1)], &[])
            .unwrap_err();
        assert!(matches!(err, RegistryError::UnfairTrade { .. }));
    }

    #[test]
    fn test_self_trade_checked_first() {
        let (_, engine) = setup();
        let err = engine
            .execute_trade(id(9), id(9), &[(ItemType::Water, 1)], &[(ItemType::Water, 1)])
            .unwrap_err();
        assert_eq!(err, RegistryError::SelfTrade(id(9)));
    }

    #[test]
    fn test_unknown_participant() {
        let (_, engine) = setup();
        let err = engine
            .execute_trade(id(1), id(9), &[(ItemType::Water, 1)], &[(ItemType::Water, 1)])
            .unwrap_err();
        assert_eq!(err, RegistryError::NotFound(id(9)));
    }

    #[test]
    fn test_infected_participant_on_either_side() {
        let (_, engine) = setup();
        let err = engine
            .execute_trade(id(3), id(1), &[(ItemType::Water, 1)], &[(ItemType::Water, 1)])
            .unwrap_err();
        assert_eq!(err, RegistryError::InfectedParticipant(id(3)));

        let err = engine
            .execute_trade(id(1), id(3), &[(ItemType::Water, 1)], &[(ItemType::Water, 1)])
            .unwrap_err();
        assert_eq!(err, RegistryError::InfectedParticipant(id(3)));
    }

    #[test]
    fn test_infection_checked_before_fairness() {
        let (_, engine) = setup();
        let err = engine
            .execute_trade(id(1), id(3), &[(ItemType::Water, 1)], &[(ItemType::Food, 1)])
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Conflict);
        assert_eq!(err, RegistryError::InfectedParticipant(id(3)));
    }

    #[test]
    fn test_insufficient_quantity_on_second_side() {
        let (store, engine) = setup();
        let before = root(&store);
        // 5 water (20 pts) against 10 medication (20 pts), B holds only 4
        let err = engine
            .execute_trade(id(1), id(2), &[(ItemType::Water, 5)], &[(ItemType::Medication, 10)])
            .unwrap_err();
        assert_eq!(
            err,
            RegistryError::InsufficientQuantity {
                survivor: id(2),
                item: ItemType::Medication,
                requested: 10,
                available: 4,
            }
        );
        assert_eq!(root(&store), before);
    }

    #[test]
    fn test_duplicate_lines_are_summed_for_stock_check() {
        let (_, engine) = setup();
        // 3 + 3 food = 18 pts, but only 3 food held
        let err = engine
            .execute_trade(
                id(1),
                id(2),
                &[(ItemType::Food, 3), (ItemType::Food, 3)],
                &[(ItemType::Water, 4), (ItemType::Medication, 1)],
            )
            .unwrap_err();
        assert!(matches!(
            err,
            RegistryError::InsufficientQuantity { requested: 6, available: 3, .. }
        ));
    }

    #[test]
    fn test_zero_line_and_empty_trade_are_validation() {
        let (_, engine) = setup();
        let err = engine
            .execute_trade(id(1), id(2), &[(ItemType::Water, 0)], &[])
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);

        let err = engine.execute_trade(id(1), id(2), &[], &[]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);
    }

    #[test]
    fn test_failure_mid_apply_leaves_store_unchanged() {
        let (store, engine) = setup();
        let before = root(&store);
        // debit A, credit B, then fail the debit of B
        store.fail_nth_write(3);
        let err = engine
            .execute_trade(id(1), id(2), &[(ItemType::Water, 2)], &[(ItemType::Medication, 4)])
            .unwrap_err();
        assert!(err.is_retryable());
        assert_eq!(root(&store), before);
    }

    #[test]
    fn test_failed_commit_leaves_store_unchanged() {
        let (store, engine) = setup();
        let before = root(&store);
        store.fail_next_commit();
        assert!(engine
            .execute_trade(id(1), id(2), &[(ItemType::Water, 2)], &[(ItemType::Medication, 4)])
            .is_err());
        assert_eq!(root(&store), before);
    }

    #[test]
    fn test_normalize_sorts_and_sums() {
        let lines = [
            (ItemType::Ammunition, 2),
            (ItemType::Water, 1),
            (ItemType::Ammunition, 3),
        ];
        assert_eq!(
            normalize(&lines).unwrap(),
            vec![(ItemType::Water, 1), (ItemType::Ammunition, 5)]
        );
    }
}
