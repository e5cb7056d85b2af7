use std::cell::RefCell;

use super::{LockStrategy, pair_mut, reject_slots, sum};
use crate::balance::{Balance, TransferOutcome, move_funds};
use crate::core_types::{Amount, Slot};

/// No-op passthrough for the single-threaded baseline.
///
/// Same transfer rule as every other strategy, no locks. `RefCell` makes the
/// type `!Sync`, so it cannot be shared with another thread by mistake.
pub struct Unsynchronized {
    balances: RefCell<Vec<Balance>>,
}

impl LockStrategy for Unsynchronized {
    const NAME: &'static str = "unsynchronized";
    const CONSISTENT_READS: bool = true;

    fn with_balances(initial: &[Balance]) -> Self {
        Self {
            balances: RefCell::new(initial.to_vec()),
        }
    }

    #[inline]
    fn transfer(&self, from: Slot, to: Slot, amount: Amount) -> TransferOutcome {
        let mut balances = self.balances.borrow_mut();
        if let Some(rejected) = reject_slots(from, to, balances.len()) {
            return rejected;
        }
        let (from, to) = pair_mut(&mut balances, from, to);
        move_funds(from, to, amount)
    }

    fn total_balance(&self) -> Amount {
        sum(self.balances.borrow().iter().copied())
    }

    fn snapshot(&self) -> Vec<Balance> {
        self.balances.borrow().clone()
    }
}
