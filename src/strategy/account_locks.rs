use std::sync::{Mutex, MutexGuard};

use super::{lock, reject_slots};
use crate::balance::{Balance, TransferOutcome, move_funds};
use crate::core_types::{Amount, Slot};

/// One mutex per account, allocated eagerly at setup.
///
/// The slice is never resized, so there is no concurrent insertion to guard
/// against. Slot order is account ID order.
pub struct AccountLocks {
    cells: Box<[Mutex<Balance>]>,
}

impl AccountLocks {
    pub fn new(initial: &[Balance]) -> Self {
        Self {
            cells: initial.iter().copied().map(Mutex::new).collect(),
        }
    }

    #[inline]
    pub(crate) fn len(&self) -> usize {
        self.cells.len()
    }

    /// Lock both accounts of a transfer, lower slot first.
    ///
    /// Callers must have passed the pair through `reject_slots`: equal slots
    /// would lock one mutex twice.
    ///
    /// Returns the guards as `(from, to)` regardless of acquisition order.
    /// Every mutation path goes through here; nothing else may hold two
    /// account locks at once except [`AccountLocks::snapshot`], which follows
    /// the same ascending order.
    pub(crate) fn lock_pair(
        &self,
        from: Slot,
        to: Slot,
    ) -> (MutexGuard<'_, Balance>, MutexGuard<'_, Balance>) {
        debug_assert!(reject_slots(from, to, self.len()).is_none());
        if from < to {
            let from_guard = lock(&self.cells[from]);
            let to_guard = lock(&self.cells[to]);
            (from_guard, to_guard)
        } else {
            let to_guard = lock(&self.cells[to]);
            let from_guard = lock(&self.cells[from]);
            (from_guard, to_guard)
        }
    }

    #[inline]
    pub fn transfer(&self, from: Slot, to: Slot, amount: Amount) -> TransferOutcome {
        if let Some(rejected) = reject_slots(from, to, self.len()) {
            return rejected;
        }
        let (mut from_guard, mut to_guard) = self.lock_pair(from, to);
        move_funds(&mut from_guard, &mut to_guard, amount)
    }

    /// Sum balances holding one lock at a time.
    ///
    /// Not a snapshot: a transfer may complete between two reads and be
    /// counted on one side only.
    pub fn sum_each(&self) -> Amount {
        super::sum(self.cells.iter().map(|cell| *lock(cell)))
    }

    /// Lock every account in ascending order, then copy.
    ///
    /// All locks are held until the copy is complete, so no in-flight
    /// transfer is half visible.
    pub fn snapshot(&self) -> Vec<Balance> {
        let guards: Vec<MutexGuard<'_, Balance>> = self.cells.iter().map(lock).collect();
        guards.iter().map(|guard| **guard).collect()
    }
}
