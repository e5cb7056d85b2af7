use std::sync::Mutex;

use super::{LockStrategy, lock, pair_mut, reject_slots, sum};
use crate::balance::{Balance, TransferOutcome, move_funds};
use crate::core_types::{Amount, Slot};

/// One exclusive lock over the whole ledger.
///
/// Every transfer and every read holds it for its full duration. Always
/// consistent, fully serialized.
pub struct Coarse {
    balances: Mutex<Vec<Balance>>,
}

impl LockStrategy for Coarse {
    const NAME: &'static str = "coarse";
    const CONSISTENT_READS: bool = true;

    fn with_balances(initial: &[Balance]) -> Self {
        Self {
            balances: Mutex::new(initial.to_vec()),
        }
    }

    fn transfer(&self, from: Slot, to: Slot, amount: Amount) -> TransferOutcome {
        let mut balances = lock(&self.balances);
        if let Some(rejected) = reject_slots(from, to, balances.len()) {
            return rejected;
        }
        let (from, to) = pair_mut(&mut balances, from, to);
        move_funds(from, to, amount)
    }

    fn total_balance(&self) -> Amount {
        sum(lock(&self.balances).iter().copied())
    }

    fn snapshot(&self) -> Vec<Balance> {
        lock(&self.balances).clone()
    }
}
