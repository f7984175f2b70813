//! Survivor Registry - demo binary
//!
//! Seeds the sample population, runs one trade and one report round, then
//! prints the population report.
//!
//! ```bash
//! RUST_LOG=debug cargo run -- registry.json
//! ```
//!
//! The optional argument is a JSON [`RegistryConfig`] file.

use std::error::Error;

use survivor_registry::{
    ItemType, Location, NewSurvivor, Registry, RegistryConfig, Sex, SurvivorId,
};

type Seed = (&'static str, i64, Sex, &'static str, &'static str, &'static [(ItemType, u32)]);

const SAMPLE_SURVIVORS: [Seed; 5] = [
    (
        "João Silva",
        35,
        Sex::Male,
        "-23.5505",
        "-46.6333",
        &[(ItemType::Water, 5), (ItemType::Food, 3), (ItemType::Ammunition, 10)],
    ),
    (
        "Maria Santos",
        28,
        Sex::Female,
        "-22.9068",
        "-43.1729",
        &[(ItemType::Medication, 4), (ItemType::Water, 2), (ItemType::Food, 6)],
    ),
    (
        "Pedro Oliveira",
        42,
        Sex::Male,
        "-30.0346",
        "-51.2177",
        &[(ItemType::Ammunition, 15), (ItemType::Water, 3)],
    ),
    (
        "Ana Costa",
        31,
        Sex::Female,
        "-25.4284",
        "-49.2733",
        &[(ItemType::Medication, 2), (ItemType::Food, 4), (ItemType::Water, 1)],
    ),
    (
        "Carlos Ferreira",
        45,
        Sex::Male,
        "-19.9167",
        "-43.9345",
        &[(ItemType::Water, 8), (ItemType::Ammunition, 20)],
    ),
];

fn load_config() -> Result<RegistryConfig, Box<dyn Error>> {
    match std::env::args().nth(1) {
        Some(path) => Ok(RegistryConfig::from_json_str(&std::fs::read_to_string(path)?)?),
        None => Ok(RegistryConfig::default()),
    }
}

fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()),
        )
        .init();

    println!("===========================================");
    println!("  Survivor Registry");
    println!("===========================================");
    println!();

    let registry = Registry::with_config(load_config()?)?;

    println!("Registering sample survivors...");
    let mut ids: Vec<SurvivorId> = Vec::with_capacity(SAMPLE_SURVIVORS.len());
    for (name, age, sex, lat, lon, items) in SAMPLE_SURVIVORS {
        let location = Location::parse(lat, lon)?;
        let survivor =
            registry.create_survivor_with_inventory(NewSurvivor::new(name, age, sex, location), items)?;
        println!(
            "  {} {} ({}, {}) at {}",
            survivor.id,
            survivor.name,
            survivor.age,
            survivor.sex.code(),
            survivor.location
        );
        ids.push(survivor.id);
    }
    println!();

    println!("Trading 2 water from {} for 4 medication from {}...", ids[0], ids[1]);
    let outcome = registry.execute_trade(
        ids[0],
        ids[1],
        &[(ItemType::Water, 2)],
        &[(ItemType::Medication, 4)],
    )?;
    println!("  {} points each way", outcome.points);
    for (id, inventory) in [(ids[0], &outcome.inventory_a), (ids[1], &outcome.inventory_b)] {
        let items: Vec<String> = inventory.iter().map(|(item, qty)| format!("{qty}x {item}")).collect();
        println!("  {id}: {}", items.join(", "));
    }
    println!();

    let suspect = ids[4];
    println!("Reporting {suspect} as infected...");
    for &reporter in &ids[..3] {
        let outcome = registry.report(reporter, suspect)?;
        println!(
            "  {reporter} -> {suspect}: {} distinct reports, {:?}",
            outcome.distinct_reports, outcome.status
        );
    }
    println!();

    let report = registry.generate_report()?;
    println!("Population report:");
    println!("  Survivors:        {}", report.total);
    println!("  Infected:         {} ({})", report.infected, report.infected_percentage());
    println!("  Healthy:          {} ({})", report.healthy, report.healthy_percentage());
    for (item, average) in &report.average_per_healthy {
        println!("  Avg {:<12}  {}", item.name(), average.round_dp(2));
    }
    println!("  Points lost:      {}", report.points_lost_to_infection);
    println!("  State root:       {}", report.state_root);

    Ok(())
}
