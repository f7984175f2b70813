//! End-to-end scenarios for the survivor registry.
//!
//! These tests verify:
//! 1. The reference trade and infection walkthroughs
//! 2. Rejected or failed operations leave the store byte-for-byte unchanged
//! 3. Per-survivor serialization under concurrent load

use std::sync::atomic::{AtomicUsize, Ordering};
use std::thread;

use survivor_registry::{
    ErrorKind, InfectionStatus, ItemType, Location, NewSurvivor, RecordStore, Registry,
    RegistryConfig, RegistryError, Sex, SurvivorId, INFECTION_THRESHOLD,
};

// ============================================================================
// HELPER FUNCTIONS
// ============================================================================

fn location() -> Location {
    Location::parse("-23.5505", "-46.6333").unwrap()
}

fn register(registry: &Registry, name: &str, items: &[(ItemType, u32)]) -> SurvivorId {
    registry
        .create_survivor_with_inventory(NewSurvivor::new(name, 33, Sex::Male, location()), items)
        .unwrap()
        .id
}

fn state_root(registry: &Registry) -> [u8; 32] {
    registry.store().snapshot().unwrap().state_root().unwrap()
}

/// Total points held by everyone.
fn population_points(registry: &Registry) -> u64 {
    registry
        .store()
        .snapshot()
        .unwrap()
        .entries()
        .map(|entry| entry.points())
        .sum()
}

// ============================================================================
// REFERENCE SCENARIOS
// ============================================================================

#[test]
fn trade_scenario_then_insufficient_retry() {
    let registry = Registry::in_memory();
    let a = register(&registry, "A", &[(ItemType::Water, 5), (ItemType::Food, 3)]);
    let b = register(&registry, "B", &[(ItemType::Medication, 4)]);

    let outcome = registry
        .execute_trade(a, b, &[(ItemType::Water, 2)], &[(ItemType::Medication, 4)])
        .unwrap();

    let inv_a = registry.inventory(a).unwrap();
    let inv_b = registry.inventory(b).unwrap();
    assert_eq!(outcome.inventory_a, inv_a);
    assert_eq!(outcome.inventory_b, inv_b);
    assert_eq!(
        inv_a.iter().collect::<Vec<_>>(),
        vec![(ItemType::Water, 3), (ItemType::Food, 3), (ItemType::Medication, 4)]
    );
    assert_eq!(inv_b.iter().collect::<Vec<_>>(), vec![(ItemType::Water, 2)]);

    // Drain A down to a single water, then retry the same trade
    registry.adjust_inventory(a, ItemType::Water, -2).unwrap();
    registry.adjust_inventory(b, ItemType::Medication, 4).unwrap();
    let before = state_root(&registry);

    let err = registry
        .execute_trade(a, b, &[(ItemType::Water, 2)], &[(ItemType::Medication, 4)])
        .unwrap_err();
    assert_eq!(
        err,
        RegistryError::InsufficientQuantity {
            survivor: a,
            item: ItemType::Water,
            requested: 2,
            available: 1,
        }
    );
    assert_eq!(state_root(&registry), before);
}

#[test]
fn infection_scenario_moves_points_to_lost() {
    let registry = Registry::in_memory();
    // 2 water + 1 medication = 10 points
    let s = register(&registry, "S", &[(ItemType::Water, 2), (ItemType::Medication, 1)]);
    let reporters: Vec<_> = ["R1", "R2", "R3"]
        .iter()
        .map(|name| register(&registry, name, &[]))
        .collect();

    let before = registry.generate_report().unwrap();
    assert_eq!(before.points_lost_to_infection, 0);

    for (n, &reporter) in reporters.iter().enumerate() {
        let outcome = registry.report(reporter, s).unwrap();
        assert_eq!(outcome.distinct_reports, n as u32 + 1);
        assert_eq!(outcome.transitioned, n == 2);
    }

    assert!(registry.survivor(s).unwrap().is_infected());
    let report = registry.generate_report().unwrap();
    assert_eq!(report.infected, 1);
    assert_eq!(report.points_lost_to_infection, 10);
    assert_eq!(report.infected_percentage(), "25.00%");
}

#[test]
fn empty_registry_report() {
    let report = Registry::in_memory().generate_report().unwrap();
    assert_eq!(report.total, 0);
    assert!(report.infected_ratio.is_zero());
    assert!(report.average_per_healthy.values().all(|avg| avg.is_zero()));
}

// ============================================================================
// PROPERTIES
// ============================================================================

#[test]
fn duplicate_report_counts_once() {
    let registry = Registry::in_memory();
    let reporter = register(&registry, "R", &[]);
    let target = register(&registry, "T", &[]);

    let once = registry.report(reporter, target).unwrap().distinct_reports;
    let twice = registry.report(reporter, target).unwrap().distinct_reports;
    assert_eq!(once, twice);
    assert_eq!(registry.consensus().reporter_count(target).unwrap(), 1);
}

#[test]
fn infected_never_reverts() {
    let registry = Registry::in_memory();
    let target = register(&registry, "T", &[]);
    for i in 0..INFECTION_THRESHOLD + 2 {
        let reporter = register(&registry, &format!("R{i}"), &[]);
        registry.report(reporter, target).unwrap();
    }
    assert_eq!(
        registry.consensus().status(target).unwrap(),
        InfectionStatus::Infected
    );
    assert_eq!(registry.consensus().reporter_count(target).unwrap(), 5);
}

#[test]
fn rejected_operations_have_no_side_effects() {
    let registry = Registry::in_memory();
    let a = register(&registry, "A", &[(ItemType::Water, 1), (ItemType::Food, 1)]);
    let b = register(&registry, "B", &[(ItemType::Ammunition, 4)]);
    let before = state_root(&registry);

    let attempts: Vec<RegistryError> = vec![
        registry
            .execute_trade(a, b, &[(ItemType::Food, 1)], &[(ItemType::Ammunition, 4)])
            .unwrap_err(),
        registry
            .execute_trade(a, a, &[(ItemType::Water, 1)], &[(ItemType::Water, 1)])
            .unwrap_err(),
        registry.adjust_inventory(b, ItemType::Ammunition, -5).unwrap_err(),
        registry.report(a, a).unwrap_err(),
        registry.report(a, SurvivorId::new(404)).unwrap_err(),
    ];
    assert!(attempts.iter().all(|err| err.kind() != ErrorKind::Persistence));
    assert_eq!(state_root(&registry), before);
}

#[test]
fn injected_failures_roll_back_every_operation() {
    let registry = Registry::in_memory();
    let a = register(&registry, "A", &[(ItemType::Water, 5)]);
    let b = register(&registry, "B", &[(ItemType::Medication, 10)]);
    let c = register(&registry, "C", &[]);
    let before = state_root(&registry);

    // fail each write position of a two-line trade in turn
    for n in 1..=4 {
        registry.store().fail_nth_write(n);
        let err = registry
            .execute_trade(a, b, &[(ItemType::Water, 2)], &[(ItemType::Medication, 4)])
            .unwrap_err();
        assert!(err.is_retryable(), "write {n}: {err}");
        assert_eq!(state_root(&registry), before, "write {n} left partial state");
    }

    registry.store().fail_next_commit();
    assert!(registry.report(c, a).unwrap_err().is_retryable());
    registry.store().fail_next_commit();
    assert!(registry.adjust_inventory(c, ItemType::Food, 1).unwrap_err().is_retryable());
    assert_eq!(state_root(&registry), before);

    registry.store().set_unavailable(true);
    assert_eq!(
        registry.generate_report().unwrap_err().kind(),
        ErrorKind::Persistence
    );
    registry.store().set_unavailable(false);

    // the same trade succeeds once the store is healthy
    registry
        .execute_trade(a, b, &[(ItemType::Water, 2)], &[(ItemType::Medication, 4)])
        .unwrap();
    assert_ne!(state_root(&registry), before);
}

// ============================================================================
// CONCURRENCY
// ============================================================================

#[test]
fn concurrent_reports_fire_one_transition() {
    let registry = Registry::in_memory();
    let target = register(&registry, "T", &[(ItemType::Food, 2)]);
    let reporters: Vec<_> = (0..32)
        .map(|i| register(&registry, &format!("R{i}"), &[]))
        .collect();
    let transitions = AtomicUsize::new(0);

    thread::scope(|scope| {
        for &reporter in &reporters {
            let registry = &registry;
            let transitions = &transitions;
            scope.spawn(move || {
                let outcome = registry.report(reporter, target).unwrap();
                if outcome.transitioned {
                    transitions.fetch_add(1, Ordering::Relaxed);
                }
            });
        }
    });

    assert_eq!(transitions.load(Ordering::Relaxed), 1);
    assert_eq!(registry.consensus().reporter_count(target).unwrap(), 32);
    assert_eq!(registry.generate_report().unwrap().points_lost_to_infection, 6);
}

#[test]
fn concurrent_opposite_order_trades_conserve_points() {
    let registry = Registry::with_config(RegistryConfig {
        lock_stripes: 4,
        ..Default::default()
    })
    .unwrap();
    let stock = [(ItemType::Water, 300), (ItemType::Food, 400)];
    let ids: Vec<_> = (0..4)
        .map(|i| register(&registry, &format!("S{i}"), &stock))
        .collect();
    let total_before = population_points(&registry);
    let executed = AtomicUsize::new(0);

    thread::scope(|scope| {
        for t in 0..8 {
            let registry = &registry;
            let executed = &executed;
            let ids = &ids;
            scope.spawn(move || {
                for round in 0..200 {
                    let i = (t + round) % ids.len();
                    let j = (i + 1 + t % 3) % ids.len();
                    let (a, b) = if t % 2 == 0 { (ids[i], ids[j]) } else { (ids[j], ids[i]) };
                    // 3 water (12 pts) for 4 food (12 pts)
                    match registry.execute_trade(
                        a,
                        b,
                        &[(ItemType::Water, 3)],
                        &[(ItemType::Food, 4)],
                    ) {
                        Ok(_) => {
                            executed.fetch_add(1, Ordering::Relaxed);
                        }
                        Err(RegistryError::InsufficientQuantity { .. }) => {}
                        Err(other) => panic!("unexpected error: {other}"),
                    }
                }
            });
        }
    });

    assert!(executed.load(Ordering::Relaxed) > 0);
    assert_eq!(population_points(&registry), total_before);

    let snapshot = registry.store().snapshot().unwrap();
    for item in [ItemType::Water, ItemType::Food] {
        let held: u64 = ids
            .iter()
            .map(|&id| u64::from(snapshot.inventory_of(id).quantity(item)))
            .sum();
        let seeded = stock.iter().find(|(i, _)| *i == item).map(|(_, q)| *q).unwrap();
        assert_eq!(held, u64::from(seeded) * 4, "{item} not conserved");
    }
}
