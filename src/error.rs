//! Error Types
//!
//! Configuration errors abort before any worker is spawned. Harness errors
//! abort a run in progress. Neither covers integrity violations, which are
//! reported values (see [`crate::bench::report::IntegrityReport`]), nor
//! skipped transfers, which are [`crate::balance::TransferOutcome`] values.

use thiserror::Error;

use crate::core_types::AccountId;

/// Invalid setup input. The process exits non-zero, no partial run.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Unsupported number of accounts: {0} (choose 3, 10, 20, or 60)")]
    UnsupportedPreset(usize),

    #[error("Ledger needs at least two accounts, got {0}")]
    TooFewAccounts(usize),

    #[error("Account ID must be positive")]
    ZeroAccountId,

    #[error("Duplicate account ID: {0}")]
    DuplicateAccount(AccountId),

    #[error("Initial balance of account {id} is negative: {amount}")]
    NegativeBalance { id: AccountId, amount: i64 },

    #[error("Initial balances overflow")]
    BalanceOverflow,

    #[error("Thread count must be at least 1")]
    ZeroThreads,

    #[error("Iteration count must be at least 1")]
    ZeroIterations,

    #[error("Transfer amount must be positive, got {0}")]
    InvalidAmount(i64),

    #[error("Transfer percentage must be within 0..=100, got {0}")]
    InvalidTransferPct(u32),

    #[error("Failed to read config file {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config file {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_yaml::Error,
    },
}

/// Failure while a benchmark run is in progress.
#[derive(Error, Debug)]
pub enum BenchError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("Failed to spawn worker {worker}: {source}")]
    Spawn {
        worker: usize,
        #[source]
        source: std::io::Error,
    },

    #[error("Worker {0} panicked")]
    WorkerPanicked(usize),

    #[error("Worker {0} finished without reporting")]
    MissingReport(usize),
}
