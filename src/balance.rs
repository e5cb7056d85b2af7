/// ENFORCED BALANCE TYPE - Used by every lock strategy
///
/// This is the SINGLE place where the transfer rule lives.
/// ALL balance mutations MUST go through these methods.
///
/// # Enforcement Strategy:
/// 1. Field is PRIVATE - no direct access
/// 2. Debit/credit return Result - errors are explicit
/// 3. checked_add/sub - overflow protection
/// 4. `move_funds` is the only debit path used by strategies
use serde::{Deserialize, Serialize};

use crate::core_types::Amount;

/// Outcome of a transfer attempt.
///
/// Only `Applied` changes the ledger. Every other variant is a silent no-op,
/// never an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TransferOutcome {
    /// Funds moved from sender to receiver
    Applied,
    /// Sender balance did not strictly exceed the amount
    InsufficientFunds,
    /// `from == to`
    SameAccount,
    /// One of the IDs is not in the ledger
    UnknownAccount,
    /// Receiver balance would overflow
    Overflow,
}

impl TransferOutcome {
    #[inline(always)]
    pub const fn is_applied(self) -> bool {
        matches!(self, TransferOutcome::Applied)
    }
}

/// Balance of a single account
///
/// # Invariants (ENFORCED by private field):
/// - Never negative when mutated through `move_funds`
/// - No overflow/underflow (checked arithmetic)
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Balance {
    amount: Amount, // PRIVATE - ONLY modified through credit/debit
}

impl Balance {
    #[inline(always)]
    pub const fn new(amount: Amount) -> Self {
        Self { amount }
    }

    /// Current amount (read-only)
    #[inline(always)]
    pub const fn amount(&self) -> Amount {
        self.amount
    }

    /// True if this balance can fund a transfer of `amount`.
    ///
    /// The guard is strict: a balance equal to the amount is NOT enough.
    #[inline(always)]
    pub const fn covers(&self, amount: Amount) -> bool {
        self.amount > amount
    }

    /// Add funds.
    ///
    /// # Errors
    /// - "Credit overflow" on arithmetic overflow
    pub fn credit(&mut self, amount: Amount) -> Result<(), &'static str> {
        self.amount = self.amount.checked_add(amount).ok_or("Credit overflow")?;
        Ok(())
    }

    /// Remove funds.
    ///
    /// # Errors
    /// - "Insufficient funds" if the guard in `covers` fails
    /// - "Debit underflow" on arithmetic underflow
    pub fn debit(&mut self, amount: Amount) -> Result<(), &'static str> {
        if !self.covers(amount) {
            return Err("Insufficient funds");
        }
        self.amount = self.amount.checked_sub(amount).ok_or("Debit underflow")?;
        Ok(())
    }
}

/// Move `amount` from `from` to `to`.
///
/// Atomic with respect to the two balances: either both change or neither
/// does. Callers must already hold whatever locks guard the two balances.
pub fn move_funds(from: &mut Balance, to: &mut Balance, amount: Amount) -> TransferOutcome {
    if !from.covers(amount) {
        return TransferOutcome::InsufficientFunds;
    }
    // A failed credit leaves `to` untouched
    if to.credit(amount).is_err() {
        return TransferOutcome::Overflow;
    }
    if from.debit(amount).is_err() {
        // Undo the credit; it just succeeded so this cannot overflow
        to.amount -= amount;
        return TransferOutcome::InsufficientFunds;
    }
    TransferOutcome::Applied
}
