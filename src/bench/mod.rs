//! Benchmark Harness Module
//!
//! # Components
//!
//! - [`workload`] - Per-worker seeded operation stream
//! - [`harness`] - Spawns workers, times them, runs the baseline
//! - [`report`] - Speedup/slowdown and integrity reporting

pub mod harness;
pub mod report;
pub mod workload;

pub use harness::{BaselineMode, BenchConfig, Phase, run, run_with_accounts};
pub use report::{BenchReport, Comparison, IntegrityReport};
pub use workload::{WorkloadConfig, WorkloadGenerator};
