use std::sync::atomic::{AtomicI64, Ordering};

use super::{AccountLocks, LockStrategy, reject_slots, sum};
use crate::balance::{Balance, TransferOutcome, move_funds};
use crate::core_types::{Amount, Slot};

/// Per-account locks plus a lock-free running total.
///
/// The running total is two independent counters: value that left senders
/// (`debited`) and value that reached receivers (`credited`). Each applied
/// transfer adds its real delta to both, while still holding the two account
/// locks. `total_balance` never takes a lock:
///
/// ```text
/// total = initial_total - debited + credited
/// ```
///
/// A reader can load `credited` before a transfer bumps it and `debited`
/// after, so the total may be off by in-flight transfers. Once no transfer is
/// running the counters agree.
///
/// This total is derived from the counters alone, never from the balances:
/// at quiescence it always equals `initial_total`, even if the balances
/// themselves had drifted. Conservation of the balances is checked on
/// [`LockStrategy::snapshot`] instead.
///
/// The counters carry no other data, so relaxed ordering is enough.
pub struct AtomicAggregate {
    accounts: AccountLocks,
    initial_total: Amount,
    debited: AtomicI64,
    credited: AtomicI64,
}

impl AtomicAggregate {
    /// Total value moved by applied transfers so far.
    pub fn volume(&self) -> Amount {
        self.credited.load(Ordering::Relaxed)
    }
}

impl LockStrategy for AtomicAggregate {
    const NAME: &'static str = "atomic";
    const CONSISTENT_READS: bool = false;

    fn with_balances(initial: &[Balance]) -> Self {
        Self {
            accounts: AccountLocks::new(initial),
            initial_total: sum(initial.iter().copied()),
            debited: AtomicI64::new(0),
            credited: AtomicI64::new(0),
        }
    }

    fn transfer(&self, from: Slot, to: Slot, amount: Amount) -> TransferOutcome {
        if let Some(rejected) = reject_slots(from, to, self.accounts.len()) {
            return rejected;
        }
        let (mut from_guard, mut to_guard) = self.accounts.lock_pair(from, to);
        let outcome = move_funds(&mut from_guard, &mut to_guard, amount);
        if outcome.is_applied() {
            self.debited.fetch_add(amount, Ordering::Relaxed);
            self.credited.fetch_add(amount, Ordering::Relaxed);
        }
        outcome
    }

    fn total_balance(&self) -> Amount {
        let credited = self.credited.load(Ordering::Relaxed);
        let debited = self.debited.load(Ordering::Relaxed);
        self.initial_total
            .saturating_sub(debited)
            .saturating_add(credited)
    }

    fn snapshot(&self) -> Vec<Balance> {
        self.accounts.snapshot()
    }
}
