//! Workload Generator
//!
//! Produces the biased operation stream each worker executes:
//! `transfer_pct`% transfers between two distinct random accounts, the rest
//! total-balance reads.
//!
//! Every worker owns its generator and its RNG, so there is no contention on
//! the random source and no shared mutable seed.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use crate::core_types::{AccountId, Amount};
use crate::engine::Operation;
use crate::error::ConfigError;
use crate::ledger::AccountSet;

/// Default share of transfers, in percent
pub const DEFAULT_TRANSFER_PCT: u32 = 95;

/// Default amount moved by every transfer
pub const DEFAULT_TRANSFER_AMOUNT: Amount = 5000;

/// Operation mix
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkloadConfig {
    /// Draws in `[0, transfer_pct)` out of `[0, 100)` become transfers
    pub transfer_pct: u32,
    pub transfer_amount: Amount,
}

impl Default for WorkloadConfig {
    fn default() -> Self {
        Self {
            transfer_pct: DEFAULT_TRANSFER_PCT,
            transfer_amount: DEFAULT_TRANSFER_AMOUNT,
        }
    }
}

impl WorkloadConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.transfer_pct > 100 {
            return Err(ConfigError::InvalidTransferPct(self.transfer_pct));
        }
        if self.transfer_amount <= 0 {
            return Err(ConfigError::InvalidAmount(self.transfer_amount));
        }
        Ok(())
    }
}

/// Seed for worker `worker` given a run-wide base seed.
///
/// Distinct workers get distinct, well-spread seeds; the same `(base, worker)`
/// always gives the same seed.
pub fn derive_worker_seed(base: u64, worker: usize) -> u64 {
    // splitmix64 finalizer over base + golden-ratio stride
    let stride = (worker as u64)
        .wrapping_add(1)
        .wrapping_mul(0x9E37_79B9_7F4A_7C15);
    let mut z = base.wrapping_add(stride);
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
    z ^ (z >> 31)
}

/// Per-worker operation stream.
pub struct WorkloadGenerator {
    rng: StdRng,
    ids: Vec<AccountId>,
    config: WorkloadConfig,
}

impl WorkloadGenerator {
    /// Generator for worker `worker`.
    ///
    /// With `seed = None` the RNG is seeded from OS entropy; otherwise from
    /// [`derive_worker_seed`].
    pub fn new(
        accounts: &AccountSet,
        config: WorkloadConfig,
        seed: Option<u64>,
        worker: usize,
    ) -> Self {
        let rng = match seed {
            Some(base) => StdRng::seed_from_u64(derive_worker_seed(base, worker)),
            None => StdRng::from_entropy(),
        };
        Self {
            rng,
            // AccountSet guarantees at least two accounts
            ids: accounts.ids().to_vec(),
            config,
        }
    }

    /// Draw the next operation.
    pub fn next_op(&mut self) -> Operation {
        if self.rng.gen_range(0..100u32) < self.config.transfer_pct {
            let (from, to) = self.pick_pair();
            Operation::Transfer {
                from,
                to,
                amount: self.config.transfer_amount,
            }
        } else {
            Operation::ReadTotal
        }
    }

    /// Two distinct accounts, uniform over the set.
    ///
    /// Re-draws the second index until it differs from the first. With at
    /// least two accounts this terminates with probability 1.
    fn pick_pair(&mut self) -> (AccountId, AccountId) {
        let n = self.ids.len();
        let first = self.rng.gen_range(0..n);
        let mut second = self.rng.gen_range(0..n);
        while second == first {
            second = self.rng.gen_range(0..n);
        }
        (self.ids[first], self.ids[second])
    }
}

impl Iterator for WorkloadGenerator {
    type Item = Operation;

    #[inline]
    fn next(&mut self) -> Option<Operation> {
        Some(self.next_op())
    }
}
