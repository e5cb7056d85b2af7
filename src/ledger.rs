//! Ledger - the shared account book
//!
//! A [`Ledger`] pairs a fixed [`AccountSet`] with the synchronization state of
//! one [`LockStrategy`]. The ledger owns its primitives as fields and is
//! shared between workers through `Arc`, so there is no process-wide lock
//! state.
//!
//! # Invariant
//!
//! The sum of all balances is conserved by every transfer. Transfers only move
//! value between two existing accounts; nothing creates or destroys it.

use std::collections::BTreeMap;

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use crate::balance::Balance;
use crate::core_types::{AccountId, Amount, Slot};
use crate::error::ConfigError;
use crate::preset;
use crate::strategy::LockStrategy;

/// Fixed set of accounts, ordered by ID.
///
/// # Data Structure:
/// Accounts live in slots `0..len`, sorted by ID, so slot order IS ID
/// order. Lock strategies index their per-account state by slot and get the
/// "lower ID first" lock ordering for free by comparing slots.
///
/// The set never changes after construction.
#[derive(Debug, Clone)]
pub struct AccountSet {
    ids: Vec<AccountId>,
    initial: Vec<Balance>,
    index: FxHashMap<AccountId, Slot>,
    initial_total: Amount,
}

impl AccountSet {
    /// Build from one of the presets. Account IDs are `1..=num_accounts`.
    pub fn from_preset(num_accounts: usize) -> Result<Self, ConfigError> {
        let balances = preset::initial_balances(num_accounts)?;
        Self::from_balances(
            balances
                .iter()
                .enumerate()
                .map(|(i, &amount)| (i as AccountId + 1, amount)),
        )
    }

    /// Build from explicit `(id, balance)` pairs, in any order.
    ///
    /// # Errors
    /// - fewer than two accounts (no transfer could ever be drawn)
    /// - zero or duplicate IDs
    /// - negative balances, or a total that overflows
    pub fn from_balances(
        accounts: impl IntoIterator<Item = (AccountId, Amount)>,
    ) -> Result<Self, ConfigError> {
        let mut accounts: Vec<(AccountId, Amount)> = accounts.into_iter().collect();
        if accounts.len() < 2 {
            return Err(ConfigError::TooFewAccounts(accounts.len()));
        }
        accounts.sort_unstable_by_key(|&(id, _)| id);

        let mut index =
            FxHashMap::with_capacity_and_hasher(accounts.len(), Default::default());
        let mut ids = Vec::with_capacity(accounts.len());
        let mut initial = Vec::with_capacity(accounts.len());
        let mut initial_total: Amount = 0;

        for (slot, &(id, amount)) in accounts.iter().enumerate() {
            if id == 0 {
                return Err(ConfigError::ZeroAccountId);
            }
            if amount < 0 {
                return Err(ConfigError::NegativeBalance { id, amount });
            }
            if index.insert(id, slot).is_some() {
                return Err(ConfigError::DuplicateAccount(id));
            }
            initial_total = initial_total
                .checked_add(amount)
                .ok_or(ConfigError::BalanceOverflow)?;
            ids.push(id);
            initial.push(Balance::new(amount));
        }

        Ok(Self {
            ids,
            initial,
            index,
            initial_total,
        })
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// Slot of an account, `None` if the ID is not in the set.
    #[inline]
    pub fn slot(&self, id: AccountId) -> Option<Slot> {
        self.index.get(&id).copied()
    }

    /// Account IDs in ascending order (index = slot).
    #[inline]
    pub fn ids(&self) -> &[AccountId] {
        &self.ids
    }

    /// Initial balances, index = slot.
    #[inline]
    pub fn initial_balances(&self) -> &[Balance] {
        &self.initial
    }

    /// Sum of the initial balances - the conserved total.
    #[inline]
    pub fn initial_total(&self) -> Amount {
        self.initial_total
    }
}

/// Accounts plus the synchronization state of the active strategy.
pub struct Ledger<S> {
    accounts: AccountSet,
    strategy: S,
}

impl<S: LockStrategy> Ledger<S> {
    /// Allocate the strategy state for every account up front.
    pub fn new(accounts: AccountSet) -> Self {
        let strategy = S::with_balances(accounts.initial_balances());
        Self { accounts, strategy }
    }

    #[inline]
    pub fn accounts(&self) -> &AccountSet {
        &self.accounts
    }

    #[inline]
    pub fn strategy(&self) -> &S {
        &self.strategy
    }

    /// Consistent per-account view.
    ///
    /// Intended for audits once workers are done; under load it still
    /// returns a consistent state but contends with transfers.
    pub fn snapshot(&self) -> LedgerSnapshot {
        let balances = self
            .accounts
            .ids()
            .iter()
            .copied()
            .zip(self.strategy.snapshot().iter().map(Balance::amount))
            .collect();
        LedgerSnapshot { balances }
    }
}

/// Point-in-time copy of every balance, ordered by account ID.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerSnapshot {
    balances: BTreeMap<AccountId, Amount>,
}

impl LedgerSnapshot {
    pub fn get(&self, id: AccountId) -> Option<Amount> {
        self.balances.get(&id).copied()
    }

    pub fn balances(&self) -> &BTreeMap<AccountId, Amount> {
        &self.balances
    }

    /// Sum of every balance. Saturates instead of wrapping so a corrupted
    /// ledger still produces a reportable value.
    pub fn total(&self) -> Amount {
        self.balances
            .values()
            .fold(0 as Amount, |acc, &b| acc.saturating_add(b))
    }

    /// Accounts whose balance went below zero.
    pub fn negative_accounts(&self) -> Vec<AccountId> {
        self.balances
            .iter()
            .filter(|&(_, &b)| b < 0)
            .map(|(&id, _)| id)
            .collect()
    }
}
