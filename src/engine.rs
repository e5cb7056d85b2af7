//! Transaction Engine
//!
//! The two ledger operations, `transfer` and `total_balance`, expressed
//! against a [`Ledger`] through its lock strategy. The single-threaded
//! baseline and the multi-threaded run use this same type; only the strategy
//! parameter changes, so both runs pay for identical operation semantics and
//! differ only in synchronization cost.

use std::sync::Arc;

use serde::Serialize;

use crate::balance::TransferOutcome;
use crate::core_types::{AccountId, Amount};
use crate::ledger::{AccountSet, Ledger, LedgerSnapshot};
use crate::strategy::LockStrategy;

/// One unit of work drawn by the workload generator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Operation {
    Transfer {
        from: AccountId,
        to: AccountId,
        amount: Amount,
    },
    ReadTotal,
}

/// Result of applying an [`Operation`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OpResult {
    Transfer(TransferOutcome),
    Total(Amount),
}

/// Cheap to clone: clones share the same ledger.
pub struct TransactionEngine<S> {
    ledger: Arc<Ledger<S>>,
}

impl<S> Clone for TransactionEngine<S> {
    fn clone(&self) -> Self {
        Self {
            ledger: Arc::clone(&self.ledger),
        }
    }
}

impl<S: LockStrategy> TransactionEngine<S> {
    pub fn new(accounts: AccountSet) -> Self {
        Self::from_ledger(Arc::new(Ledger::new(accounts)))
    }

    pub fn from_ledger(ledger: Arc<Ledger<S>>) -> Self {
        Self { ledger }
    }

    #[inline]
    pub fn ledger(&self) -> &Ledger<S> {
        &self.ledger
    }

    /// Move `amount` from `from` to `to`.
    ///
    /// Never fails. Returns what happened:
    /// - `SameAccount` if `from == to` (would self-deadlock on a per-account lock)
    /// - `UnknownAccount` if either ID is not in the ledger
    /// - `InsufficientFunds` unless `from`'s balance strictly exceeds `amount`
    /// - `Applied` otherwise
    ///
    /// Only `Applied` touches the ledger.
    #[inline]
    pub fn transfer(&self, from: AccountId, to: AccountId, amount: Amount) -> TransferOutcome {
        if from == to {
            return TransferOutcome::SameAccount;
        }
        let accounts = self.ledger.accounts();
        let (Some(from_slot), Some(to_slot)) = (accounts.slot(from), accounts.slot(to)) else {
            return TransferOutcome::UnknownAccount;
        };
        self.ledger.strategy().transfer(from_slot, to_slot, amount)
    }

    /// Sum of all balances, as consistent as the strategy guarantees.
    #[inline]
    pub fn total_balance(&self) -> Amount {
        self.ledger.strategy().total_balance()
    }

    #[inline]
    pub fn apply(&self, op: Operation) -> OpResult {
        match op {
            Operation::Transfer { from, to, amount } => {
                OpResult::Transfer(self.transfer(from, to, amount))
            }
            Operation::ReadTotal => OpResult::Total(self.total_balance()),
        }
    }

    pub fn snapshot(&self) -> LedgerSnapshot {
        self.ledger.snapshot()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::strategy::{AtomicAggregate, Coarse, FineGrained, Loose, Unsynchronized};

    fn engine<S: LockStrategy>() -> TransactionEngine<S> {
        TransactionEngine::new(AccountSet::from_preset(3).unwrap())
    }

    fn check_contract<S: LockStrategy>() {
        let engine = engine::<S>();

        assert_eq!(engine.transfer(1, 2, 5000), TransferOutcome::Applied);
        assert_eq!(engine.snapshot().get(1), Some(35000));
        assert_eq!(engine.snapshot().get(2), Some(35000));

        // Higher ID to lower ID
        assert_eq!(engine.transfer(3, 1, 5000), TransferOutcome::Applied);
        assert_eq!(engine.snapshot().get(3), Some(25000));
        assert_eq!(engine.snapshot().get(1), Some(40000));

        assert_eq!(engine.transfer(2, 2, 5000), TransferOutcome::SameAccount);
        assert_eq!(engine.transfer(2, 9, 5000), TransferOutcome::UnknownAccount);
        assert_eq!(engine.transfer(0, 1, 5000), TransferOutcome::UnknownAccount);

        assert_eq!(engine.apply(Operation::ReadTotal), OpResult::Total(100_000));
        assert_eq!(engine.total_balance(), 100_000);
    }

    #[test]
    fn test_contract_all_strategies() {
        check_contract::<Coarse>();
        check_contract::<FineGrained>();
        check_contract::<Loose>();
        check_contract::<AtomicAggregate>();
        check_contract::<Unsynchronized>();
    }

    fn check_insufficient_funds<S: LockStrategy>() {
        let engine: TransactionEngine<S> =
            TransactionEngine::new(AccountSet::from_balances([(1, 5000), (2, 4999)]).unwrap());

        // balance[from] == amount
        assert_eq!(
            engine.transfer(1, 2, 5000),
            TransferOutcome::InsufficientFunds
        );
        // balance[from] < amount
        assert_eq!(
            engine.transfer(2, 1, 5000),
            TransferOutcome::InsufficientFunds
        );

        let snap = engine.snapshot();
        assert_eq!(snap.get(1), Some(5000));
        assert_eq!(snap.get(2), Some(4999));
    }

    #[test]
    fn test_insufficient_funds_is_noop_all_strategies() {
        check_insufficient_funds::<Coarse>();
        check_insufficient_funds::<FineGrained>();
        check_insufficient_funds::<Loose>();
        check_insufficient_funds::<AtomicAggregate>();
        check_insufficient_funds::<Unsynchronized>();
    }

    #[test]
    fn test_clones_share_ledger() {
        let a = engine::<FineGrained>();
        let b = a.clone();
        assert!(a.transfer(1, 3, 5000).is_applied());
        assert_eq!(b.snapshot().get(3), Some(35000));
    }

    #[test]
    fn test_apply_transfer() {
        let engine = engine::<Coarse>();
        let result = engine.apply(Operation::Transfer {
            from: 2,
            to: 1,
            amount: 30000,
        });
        // 30000 does not strictly exceed 30000
        assert_eq!(
            result,
            OpResult::Transfer(TransferOutcome::InsufficientFunds)
        );
    }
}
