//! Lock Strategies
//!
//! Every strategy implements the same contract over a fixed set of account
//! slots and differs only in how access is serialized.
//!
//! | Strategy          | `transfer` holds                   | `total_balance`            |
//! |-------------------|------------------------------------|----------------------------|
//! | [`Coarse`]        | one global mutex                   | global mutex, consistent   |
//! | [`FineGrained`]   | gate (shared) + two account locks  | gate (exclusive), consistent |
//! | [`Loose`]         | two account locks                  | one lock at a time, may tear |
//! | [`AtomicAggregate`] | two account locks                | lock-free counters, may tear |
//! | [`Unsynchronized`] | nothing (`!Sync`)                 | plain sum                  |
//!
//! # Lock Ordering
//!
//! Account locks are always taken in ascending slot order, which is ascending
//! account ID order (see [`crate::ledger::AccountSet`]). The fine-grained gate
//! is always taken before any account lock. This total order rules out
//! circular wait. The rule lives in exactly one place:
//! [`AccountLocks::lock_pair`].
//!
//! # Poisoning
//!
//! Lock acquisition never fails. Critical sections only run `move_funds`,
//! which cannot leave a balance half-updated, so a poisoned lock is recovered
//! instead of propagated.

mod account_locks;
mod atomic;
mod coarse;
mod fine_grained;
mod unsync;

pub use account_locks::AccountLocks;
pub use atomic::AtomicAggregate;
pub use coarse::Coarse;
pub use fine_grained::{FineGrained, Loose};
pub use unsync::Unsynchronized;

use std::sync::{Mutex, MutexGuard, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::balance::{Balance, TransferOutcome};
use crate::core_types::{Amount, Slot};

/// Synchronization policy over a fixed set of account slots.
///
/// `transfer` with `from == to` returns `SameAccount` and a slot out of range
/// returns `UnknownAccount`, both without taking any lock.
pub trait LockStrategy {
    /// Name used in reports and logs
    const NAME: &'static str;

    /// True if `total_balance` never observes a partially applied transfer.
    const CONSISTENT_READS: bool;

    /// Allocate state for every account. Index = slot.
    fn with_balances(initial: &[Balance]) -> Self;

    /// Move `amount` from `from` to `to` if `from` strictly covers it.
    fn transfer(&self, from: Slot, to: Slot, amount: Amount) -> TransferOutcome;

    /// Sum of all balances, with the consistency given by `CONSISTENT_READS`.
    fn total_balance(&self) -> Amount;

    /// Consistent copy of every balance, index = slot.
    fn snapshot(&self) -> Vec<Balance>;
}

/// Strategies selectable for the multi-threaded run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum StrategyKind {
    /// Single global lock
    Coarse,
    /// Per-account locks, snapshot-consistent totals
    #[default]
    FineGrained,
    /// Per-account locks, unsynchronized totals
    Loose,
    /// Per-account locks, lock-free running total
    Atomic,
}

impl StrategyKind {
    pub const ALL: [StrategyKind; 4] = [
        StrategyKind::Coarse,
        StrategyKind::FineGrained,
        StrategyKind::Loose,
        StrategyKind::Atomic,
    ];

    pub const fn name(self) -> &'static str {
        match self {
            StrategyKind::Coarse => Coarse::NAME,
            StrategyKind::FineGrained => FineGrained::NAME,
            StrategyKind::Loose => Loose::NAME,
            StrategyKind::Atomic => AtomicAggregate::NAME,
        }
    }
}

impl std::fmt::Display for StrategyKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

#[inline]
pub(crate) fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

#[inline]
pub(crate) fn read<T>(rw: &RwLock<T>) -> RwLockReadGuard<'_, T> {
    rw.read().unwrap_or_else(PoisonError::into_inner)
}

#[inline]
pub(crate) fn write<T>(rw: &RwLock<T>) -> RwLockWriteGuard<'_, T> {
    rw.write().unwrap_or_else(PoisonError::into_inner)
}

/// Outcome for a slot pair no strategy may lock, if any.
///
/// `from == to` would take the same account lock twice.
#[inline]
pub(crate) fn reject_slots(from: Slot, to: Slot, len: usize) -> Option<TransferOutcome> {
    if from >= len || to >= len {
        Some(TransferOutcome::UnknownAccount)
    } else if from == to {
        Some(TransferOutcome::SameAccount)
    } else {
        None
    }
}

/// Two distinct mutable balances out of one slice, as `(from, to)`.
pub(crate) fn pair_mut(
    balances: &mut [Balance],
    from: Slot,
    to: Slot,
) -> (&mut Balance, &mut Balance) {
    debug_assert!(reject_slots(from, to, balances.len()).is_none());
    if from < to {
        let (low, high) = balances.split_at_mut(to);
        (&mut low[from], &mut high[0])
    } else {
        let (low, high) = balances.split_at_mut(from);
        (&mut high[0], &mut low[to])
    }
}

pub(crate) fn sum(balances: impl IntoIterator<Item = Balance>) -> Amount {
    balances
        .into_iter()
        .fold(0 as Amount, |acc, b| acc.saturating_add(b.amount()))
}
