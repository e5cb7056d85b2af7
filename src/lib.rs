//! ledger_bench - Lock Contention Benchmark
//!
//! Measures what synchronization costs a shared in-memory account ledger.
//! Worker threads hammer one ledger with transfers and total-balance reads;
//! the same workload then runs once on a single thread, and the two timings
//! are compared.
//!
//! # Modules
//!
//! - [`core_types`] - AccountId, Amount, Slot
//! - [`balance`] - Enforced balance type and transfer outcome
//! - [`preset`] - Built-in initial balance tables
//! - [`ledger`] - Account set, ledger and snapshots
//! - [`strategy`] - Coarse, fine-grained, loose and atomic locking
//! - [`engine`] - Transfer / total-balance operations
//! - [`bench`] - Workload generator, harness, report
//! - [`perf`] - Per-worker timings
//! - [`config`] - YAML configuration
//! - [`logging`] - tracing subscriber setup
//! - [`error`] - Error enums

// Core types - must be first!
pub mod core_types;

pub mod balance;
pub mod error;
pub mod ledger;
pub mod preset;
pub mod strategy;

pub mod bench;
pub mod engine;
pub mod perf;

pub mod config;
pub mod logging;

// Convenient re-exports at crate root
pub use balance::{Balance, TransferOutcome};
pub use bench::{BaselineMode, BenchConfig, BenchReport};
pub use core_types::{AccountId, Amount, Slot};
pub use engine::{OpResult, Operation, TransactionEngine};
pub use error::{BenchError, ConfigError};
pub use ledger::{AccountSet, Ledger, LedgerSnapshot};
pub use strategy::{LockStrategy, StrategyKind};
