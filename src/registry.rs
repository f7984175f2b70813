//! The registry facade: the operation surface an API layer calls.
//!
//! A [`Registry`] owns the store handle and the lock table, and hands shared
//! references to the four components. Components never reference each other
//! through the registry; they share only the store and the locks.
//!
//! ```text
//!                     ┌──────────────────────┐
//!                     │       Registry       │
//!                     └──────────┬───────────┘
//!        ┌───────────────┬───────┴───────┬─────────────────┐
//!        ▼               ▼               ▼                 ▼
//! InventoryLedger   TradeEngine   InfectionConsensus  ReportAggregator
//!        └───────────────┴───────┬───────┴─────────────────┘
//!                    Arc<RecordStore> + Arc<LockTable>
//! ```

use std::sync::Arc;

use chrono::Utc;
use tracing::info;

use crate::config::{ConfigError, RegistryConfig};
use crate::error::RegistryError;
use crate::infection::consensus::require_healthy;
use crate::infection::{InfectionConsensus, ReportOutcome};
use crate::ledger::inventory::{credit_in, debit_in, require_survivor};
use crate::ledger::InventoryLedger;
use crate::locks::LockTable;
use crate::report::{PopulationReport, ReportAggregator};
use crate::store::{self, MemoryStore, RecordStore};
use crate::trade::{TradeEngine, TradeOutcome};
use crate::types::{Inventory, InventoryEntry, ItemType, Location, NewSurvivor, Survivor, SurvivorId};

pub struct Registry<S: RecordStore = MemoryStore> {
    config: RegistryConfig,
    store: Arc<S>,
    ledger: InventoryLedger<S>,
    consensus: InfectionConsensus<S>,
    trades: TradeEngine<S>,
    aggregator: ReportAggregator<S>,
    locks: Arc<LockTable>,
}

impl Registry<MemoryStore> {
    /// In-memory registry with default config.
    pub fn in_memory() -> Self {
        let config = RegistryConfig::default();
        Self::assemble(MemoryStore::with_capacity(config.initial_capacity), config)
    }

    /// In-memory registry sized by `config`. Fails if `config` does not validate.
    pub fn with_config(config: RegistryConfig) -> Result<Self, ConfigError> {
        let store = MemoryStore::with_capacity(config.initial_capacity);
        Self::new(store, config)
    }
}

impl<S: RecordStore> Registry<S> {
    /// Registry over `store`. Fails if `config` does not validate.
    pub fn new(store: S, config: RegistryConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self::assemble(store, config))
    }

    fn assemble(store: S, config: RegistryConfig) -> Self {
        let store = Arc::new(store);
        let locks = Arc::new(LockTable::new(config.lock_stripes));
        Self {
            ledger: InventoryLedger::new(Arc::clone(&store), Arc::clone(&locks)),
            consensus: InfectionConsensus::new(Arc::clone(&store), Arc::clone(&locks)),
            trades: TradeEngine::new(Arc::clone(&store), Arc::clone(&locks)),
            aggregator: ReportAggregator::new(Arc::clone(&store)),
            config,
            store,
            locks,
        }
    }

    // ========================================================================
    // Survivors
    // ========================================================================

    /// Register a survivor with an empty inventory.
    pub fn create_survivor(&self, new: NewSurvivor) -> Result<Survivor, RegistryError> {
        self.create_survivor_with_inventory(new, &[])
    }

    /// Register a survivor and seed its inventory in one transaction.
    ///
    /// Zero-quantity lines are skipped; repeated items are summed.
    pub fn create_survivor_with_inventory(
        &self,
        new: NewSurvivor,
        items: &[(ItemType, u32)],
    ) -> Result<Survivor, RegistryError> {
        let (name, age) = new.validate(self.config.max_name_len)?;

        let mut txn = self.store.begin()?;
        let id = txn.allocate_survivor_id()?;
        let survivor = Survivor::register(id, name, age, new.sex, new.location, Utc::now());
        txn.put_survivor(survivor.clone())?;
        for &(item, qty) in items.iter().filter(|(_, qty)| *qty > 0) {
            credit_in(txn.as_mut(), id, item, qty)?;
        }
        store::commit(txn, "create_survivor")?;

        info!(survivor = %id, name = %survivor.name, "survivor registered");
        Ok(survivor)
    }

    /// Fetch one survivor.
    pub fn survivor(&self, id: SurvivorId) -> Result<Survivor, RegistryError> {
        let mut txn = self.store.begin()?;
        require_survivor(txn.as_mut(), id)
    }

    /// Non-zero holdings of one survivor, ordered by item type.
    pub fn inventory(&self, id: SurvivorId) -> Result<Inventory, RegistryError> {
        self.ledger.inventory(id)
    }

    /// Move a healthy survivor.
    pub fn update_location(
        &self,
        id: SurvivorId,
        location: Location,
    ) -> Result<Survivor, RegistryError> {
        let _guard = self.locks.lock(id);

        let mut txn = self.store.begin()?;
        let mut survivor = require_survivor(txn.as_mut(), id)?;
        require_healthy(&survivor)?;
        survivor.location = location;
        txn.put_survivor(survivor.clone())?;
        store::commit(txn, "update_location")?;

        info!(survivor = %id, location = %location, "location updated");
        Ok(survivor)
    }

    // ========================================================================
    // Inventory
    // ========================================================================

    /// Credit (`delta > 0`) or debit (`delta < 0`) a healthy survivor.
    pub fn adjust_inventory(
        &self,
        id: SurvivorId,
        item: ItemType,
        delta: i64,
    ) -> Result<InventoryEntry, RegistryError> {
        if delta == 0 {
            return Err(RegistryError::validation("delta", "must not be zero"));
        }
        let amount = u32::try_from(delta.unsigned_abs()).map_err(|_| {
            RegistryError::validation("delta", format!("{delta} exceeds the quantity range"))
        })?;
        let _guard = self.locks.lock(id);

        let mut txn = self.store.begin()?;
        let survivor = require_survivor(txn.as_mut(), id)?;
        require_healthy(&survivor)?;
        let quantity = if delta > 0 {
            credit_in(txn.as_mut(), id, item, amount)?
        } else {
            debit_in(txn.as_mut(), id, item, amount)?
        };
        store::commit(txn, "adjust_inventory")?;

        Ok(InventoryEntry::new(id, item, quantity))
    }

    // ========================================================================
    // Delegates
    // ========================================================================

    /// File an infection report. See [`InfectionConsensus::report`].
    pub fn report(
        &self,
        reporter: SurvivorId,
        reported: SurvivorId,
    ) -> Result<ReportOutcome, RegistryError> {
        self.consensus.report(reporter, reported)
    }

    /// Swap equal-point bundles between two healthy survivors.
    pub fn execute_trade(
        &self,
        a: SurvivorId,
        b: SurvivorId,
        offered_by_a: &[(ItemType, u32)],
        offered_by_b: &[(ItemType, u32)],
    ) -> Result<TradeOutcome, RegistryError> {
        self.trades.execute_trade(a, b, offered_by_a, offered_by_b)
    }

    /// Population statistics over one consistent snapshot.
    pub fn generate_report(&self) -> Result<PopulationReport, RegistryError> {
        self.aggregator.generate()
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    /// Validated configuration.
    pub fn config(&self) -> &RegistryConfig {
        &self.config
    }

    /// Underlying record store.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Inventory ledger sharing this registry's store and locks.
    pub fn ledger(&self) -> &InventoryLedger<S> {
        &self.ledger
    }

    /// Infection consensus sharing this registry's store and locks.
    pub fn consensus(&self) -> &InfectionConsensus<S> {
        &self.consensus
    }

    /// Trade engine sharing this registry's store and locks.
    pub fn trades(&self) -> &TradeEngine<S> {
        &self.trades
    }

    /// Report aggregator over this registry's store.
    pub fn aggregator(&self) -> &ReportAggregator<S> {
        &self.aggregator
    }
}

// ============================================================================
// Unit Tests
// ============================================================================
