//! Per-survivor serialization.
//!
//! ## Design
//!
//! A fixed array of mutex stripes. A survivor id maps to exactly one stripe, so
//! two operations on the same survivor always contend on the same mutex.
//! Different survivors may share a stripe; that only adds contention.
//!
//! ## Lock Ordering
//!
//! Pair acquisition always locks the lower stripe index first. Two trades
//! naming the same pair in opposite order therefore cannot deadlock.
//!
//! ```text
//! trade(A, B) ─┐
//!              ├─► lock min(stripe(A), stripe(B)) ─► lock max(...)
//! trade(B, A) ─┘
//! ```

use parking_lot::{Mutex, MutexGuard};

use crate::types::SurvivorId;

/// Striped mutex table.
#[derive(Debug)]
pub struct LockTable {
    stripes: Box<[Mutex<()>]>,
}

/// Guard held for the duration of a two-survivor operation.
#[must_use = "the pair is unlocked as soon as the guard is dropped"]
pub struct PairGuard<'a> {
    _first: MutexGuard<'a, ()>,
    _second: Option<MutexGuard<'a, ()>>,
}

impl LockTable {
    /// Create a table with `stripes` mutexes (at least one).
    pub fn new(stripes: usize) -> Self {
        let stripes = (0..stripes.max(1)).map(|_| Mutex::new(())).collect();
        Self { stripes }
    }

    #[inline]
    pub fn stripe_count(&self) -> usize {
        self.stripes.len()
    }

    #[inline]
    fn stripe_of(&self, id: SurvivorId) -> usize {
        (id.get() % self.stripes.len() as u64) as usize
    }

    /// Serialize against every other operation touching `id`.
    pub fn lock(&self, id: SurvivorId) -> MutexGuard<'_, ()> {
        self.stripes[self.stripe_of(id)].lock()
    }

    /// Lock both survivors, lower stripe first.
    pub fn lock_pair(&self, a: SurvivorId, b: SurvivorId) -> PairGuard<'_> {
        let (sa, sb) = (self.stripe_of(a), self.stripe_of(b));
        if sa == sb {
            return PairGuard {
                _first: self.stripes[sa].lock(),
                _second: None,
            };
        }
        let (lo, hi) = if sa < sb { (sa, sb) } else { (sb, sa) };
        let first = self.stripes[lo].lock();
        let second = self.stripes[hi].lock();
        PairGuard {
            _first: first,
            _second: Some(second),
        }
    }
}

impl Default for LockTable {
    fn default() -> Self {
        Self::new(64)
    }
}

// ============================================================================
// Unit Tests
// ============================================================================
