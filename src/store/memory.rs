//! In-process record store.
//!
//! ## Architecture
//!
//! - **Slab**: Pre-allocated storage for survivor rows, O(1) insert and lookup
//! - **HashMap**: Survivor id to slab key mapping
//! - **BTreeMap**: Inventory entries keyed by (survivor, item), and reports
//!   keyed by (reported, reporter) so per-survivor scans are range queries
//!
//! Committed tables sit behind one `RwLock`. A transaction buffers its writes
//! and applies them under the write lock at commit, so readers never observe
//! half of a transaction.
//!
//! ## Fault Injection
//!
//! Tests can make the store unavailable, abort the n-th buffered write, or
//! fail the next commit. All three leave committed state untouched.
//!
//! ## Example
//!
//! ```
//! use survivor_registry::store::{MemoryStore, RecordStore, StoreTxn};
//! use survivor_registry::types::{ItemType, SurvivorId};
//!
//! let store = MemoryStore::with_capacity(16);
//! let mut txn = store.begin().unwrap();
//! txn.put_quantity(SurvivorId::new(1), ItemType::Water, 3).unwrap();
//! drop(txn); // rolled back
//!
//! assert!(store.snapshot().unwrap().inventory_of(SurvivorId::new(1)).is_empty());
//! ```

use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::{Mutex, RwLock};
use slab::Slab;

use crate::error::StoreError;
use crate::store::{RecordStore, Snapshot, StoreTxn};
use crate::types::{InfectionReport, Inventory, ItemType, Survivor, SurvivorId};

type EntryKey = (SurvivorId, ItemType);
/// (reported, reporter)
type ReportKey = (SurvivorId, SurvivorId);

/// Committed tables.
#[derive(Debug, Default)]
struct Tables {
    /// Survivor rows
    survivors: Slab<Survivor>,

    /// Survivor id to slab key
    index: HashMap<SurvivorId, usize>,

    inventory: BTreeMap<EntryKey, u32>,

    reports: BTreeMap<ReportKey, InfectionReport>,
}

impl Tables {
    fn survivor(&self, id: SurvivorId) -> Option<&Survivor> {
        self.index.get(&id).and_then(|&key| self.survivors.get(key))
    }

    fn upsert_survivor(&mut self, survivor: Survivor) {
        match self.index.get(&survivor.id) {
            Some(&key) => self.survivors[key] = survivor,
            None => {
                let id = survivor.id;
                let key = self.survivors.insert(survivor);
                self.index.insert(id, key);
            }
        }
    }
}

#[derive(Debug, Default)]
struct FaultPlan {
    unavailable: bool,
    /// Writes left before the injected one fails (1 = next write fails)
    fail_on_write: Option<usize>,
    fail_next_commit: bool,
}

/// Thread-safe in-memory [`RecordStore`].
#[derive(Debug)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
    next_id: AtomicU64,
    faults: Mutex<FaultPlan>,
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryStore {
    /// Create a new empty store
    pub fn new() -> Self {
        Self::with_capacity(0)
    }

    /// Create a store with survivor rows pre-allocated
    pub fn with_capacity(survivor_capacity: usize) -> Self {
        Self {
            tables: RwLock::new(Tables {
                survivors: Slab::with_capacity(survivor_capacity),
                index: HashMap::with_capacity(survivor_capacity),
                inventory: BTreeMap::new(),
                reports: BTreeMap::new(),
            }),
            next_id: AtomicU64::new(1),
            faults: Mutex::new(FaultPlan::default()),
        }
    }

    /// Pre-allocated survivor slots
    pub fn capacity(&self) -> usize {
        self.tables.read().survivors.capacity()
    }

    pub fn survivor_count(&self) -> usize {
        self.tables.read().survivors.len()
    }

    // ========================================================================
    // Fault Injection
    // ========================================================================

    /// While set, `begin` and `snapshot` fail with `Unavailable`.
    pub fn set_unavailable(&self, unavailable: bool) {
        self.faults.lock().unavailable = unavailable;
    }

    /// Abort the `n`-th buffered write from now on (1 = the next write).
    /// Fires once.
    pub fn fail_nth_write(&self, n: usize) {
        self.faults.lock().fail_on_write = Some(n.max(1));
    }

    /// Fail the next commit. Fires once.
    pub fn fail_next_commit(&self) {
        self.faults.lock().fail_next_commit = true;
    }

    fn check_available(&self) -> Result<(), StoreError> {
        if self.faults.lock().unavailable {
            return Err(StoreError::Unavailable("memory store offline".into()));
        }
        Ok(())
    }

    fn on_write(&self) -> Result<(), StoreError> {
        let mut faults = self.faults.lock();
        match faults.fail_on_write {
            Some(n) if n <= 1 => {
                faults.fail_on_write = None;
                Err(StoreError::Aborted("injected write failure".into()))
            }
            Some(n) => {
                faults.fail_on_write = Some(n - 1);
                Ok(())
            }
            None => Ok(()),
        }
    }

    fn on_commit(&self) -> Result<(), StoreError> {
        let mut faults = self.faults.lock();
        if faults.unavailable {
            return Err(StoreError::Unavailable("memory store offline".into()));
        }
        if std::mem::take(&mut faults.fail_next_commit) {
            return Err(StoreError::Aborted("injected commit failure".into()));
        }
        Ok(())
    }
}

impl RecordStore for MemoryStore {
    fn begin(&self) -> Result<Box<dyn StoreTxn + '_>, StoreError> {
        self.check_available()?;
        Ok(Box::new(MemoryTxn {
            store: self,
            survivors: BTreeMap::new(),
            inventory: BTreeMap::new(),
            reports: BTreeMap::new(),
        }))
    }

    fn snapshot(&self) -> Result<Snapshot, StoreError> {
        self.check_available()?;
        let tables = self.tables.read();

        let mut survivors: Vec<Survivor> = tables.survivors.iter().map(|(_, s)| s.clone()).collect();
        survivors.sort_by_key(|s| s.id);

        Ok(Snapshot::new(
            survivors,
            tables.inventory.clone(),
            tables.reports.values().cloned().collect(),
        ))
    }
}

// ============================================================================
// Transaction
// ============================================================================

/// Write-buffering transaction over a [`MemoryStore`].
struct MemoryTxn<'a> {
    store: &'a MemoryStore,
    survivors: BTreeMap<SurvivorId, Survivor>,
    inventory: BTreeMap<EntryKey, u32>,
    reports: BTreeMap<ReportKey, InfectionReport>,
}

fn entry_range(id: SurvivorId) -> std::ops::RangeInclusive<EntryKey> {
    (id, ItemType::Water)..=(id, ItemType::Ammunition)
}

fn report_range(reported: SurvivorId) -> std::ops::RangeInclusive<ReportKey> {
    (reported, SurvivorId::new(0))..=(reported, SurvivorId::new(u64::MAX))
}

impl StoreTxn for MemoryTxn<'_> {
    fn allocate_survivor_id(&mut self) -> Result<SurvivorId, StoreError> {
        Ok(SurvivorId::new(self.store.next_id.fetch_add(1, Ordering::Relaxed)))
    }

    fn get_survivor(&mut self, id: SurvivorId) -> Result<Option<Survivor>, StoreError> {
        if let Some(pending) = self.survivors.get(&id) {
            return Ok(Some(pending.clone()));
        }
        Ok(self.store.tables.read().survivor(id).cloned())
    }

    fn put_survivor(&mut self, survivor: Survivor) -> Result<(), StoreError> {
        self.store.on_write()?;
        self.survivors.insert(survivor.id, survivor);
        Ok(())
    }

    fn get_quantity(&mut self, id: SurvivorId, item: ItemType) -> Result<u32, StoreError> {
        if let Some(&pending) = self.inventory.get(&(id, item)) {
            return Ok(pending);
        }
        Ok(self
            .store
            .tables
            .read()
            .inventory
            .get(&(id, item))
            .copied()
            .unwrap_or(0))
    }

    fn put_quantity(
        &mut self,
        id: SurvivorId,
        item: ItemType,
        quantity: u32,
    ) -> Result<(), StoreError> {
        self.store.on_write()?;
        self.inventory.insert((id, item), quantity);
        Ok(())
    }

    fn get_inventory(&mut self, id: SurvivorId) -> Result<Inventory, StoreError> {
        let mut inventory = Inventory::new();
        {
            let tables = self.store.tables.read();
            for (&(_, item), &qty) in tables.inventory.range(entry_range(id)) {
                inventory.set(item, qty);
            }
        }
        for (&(_, item), &qty) in self.inventory.range(entry_range(id)) {
            inventory.set(item, qty);
        }
        Ok(inventory)
    }

    fn has_report(
        &mut self,
        reporter: SurvivorId,
        reported: SurvivorId,
    ) -> Result<bool, StoreError> {
        let key = (reported, reporter);
        if self.reports.contains_key(&key) {
            return Ok(true);
        }
        Ok(self.store.tables.read().reports.contains_key(&key))
    }

    fn put_report(&mut self, report: InfectionReport) -> Result<(), StoreError> {
        self.store.on_write()?;
        self.reports
            .insert((report.reported(), report.reporter()), report);
        Ok(())
    }

    fn count_reporters(&mut self, reported: SurvivorId) -> Result<u32, StoreError> {
        let tables = self.store.tables.read();
        let committed = tables.reports.range(report_range(reported)).count();
        let pending = self
            .reports
            .range(report_range(reported))
            .filter(|(key, _)| !tables.reports.contains_key(key))
            .count();
        u32::try_from(committed + pending)
            .map_err(|_| StoreError::Encoding("reporter count exceeds u32".into()))
    }

    fn commit(self: Box<Self>) -> Result<(), StoreError> {
        self.store.on_commit()?;

        let MemoryTxn {
            store,
            survivors,
            inventory,
            reports,
        } = *self;

        let mut tables = store.tables.write();
        for survivor in survivors.into_values() {
            tables.upsert_survivor(survivor);
        }
        for (key, quantity) in inventory {
            if quantity == 0 {
                tables.inventory.remove(&key);
            } else {
                tables.inventory.insert(key, quantity);
            }
        }
        for (key, report) in reports {
            // Append-only: an existing report is never replaced.
            tables.reports.entry(key).or_insert(report);
        }
        Ok(())
    }
}

// ============================================================================
// Unit Tests
// ============================================================================
