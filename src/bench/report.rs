//! Benchmark report: timings, speedup/slowdown, integrity checks.

use std::fmt;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::core_types::{AccountId, Amount};
use crate::ledger::LedgerSnapshot;
use crate::perf::{RunTimings, WorkerReport, as_ms, serialize_ms};

/// Multi-threaded vs single-threaded outcome.
///
/// Always carries a factor >= 1 so it reads naturally either way.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "kind", content = "factor", rename_all = "snake_case")]
pub enum Comparison {
    Speedup(f64),
    Slowdown(f64),
}

impl Comparison {
    /// `ratio = single / multi`; above 1 is a speedup, otherwise the inverse
    /// is reported as a slowdown.
    pub fn from_times(single: Duration, multi: Duration) -> Self {
        // Guard the division for runs too short to measure
        let single = single.max(Duration::from_nanos(1)).as_secs_f64();
        let multi = multi.max(Duration::from_nanos(1)).as_secs_f64();
        let ratio = single / multi;
        if ratio > 1.0 {
            Comparison::Speedup(ratio)
        } else {
            Comparison::Slowdown(1.0 / ratio)
        }
    }

    pub fn factor(&self) -> f64 {
        match *self {
            Comparison::Speedup(f) | Comparison::Slowdown(f) => f,
        }
    }
}

impl fmt::Display for Comparison {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (factor, direction) = match *self {
            Comparison::Speedup(x) => (x, "faster"),
            Comparison::Slowdown(x) => (x, "slower"),
        };
        write!(
            f,
            "The multi-threaded performance is {:.3} times {} than the \
             single-threaded performance.",
            factor, direction
        )
    }
}

/// Conservation check for one ledger state.
///
/// A failure is a diagnostic, never a reason to abort the run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IntegrityReport {
    pub label: String,
    pub expected: Amount,
    pub observed: Amount,
    pub negative_accounts: Vec<AccountId>,
}

impl IntegrityReport {
    pub fn check(label: impl Into<String>, expected: Amount, snapshot: &LedgerSnapshot) -> Self {
        Self {
            label: label.into(),
            expected,
            observed: snapshot.total(),
            negative_accounts: snapshot.negative_accounts(),
        }
    }

    /// Compare a bare total (no per-account view available).
    pub fn check_total(label: impl Into<String>, expected: Amount, observed: Amount) -> Self {
        Self {
            label: label.into(),
            expected,
            observed,
            negative_accounts: Vec::new(),
        }
    }

    pub fn is_ok(&self) -> bool {
        self.expected == self.observed && self.negative_accounts.is_empty()
    }
}

impl fmt::Display for IntegrityReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.expected != self.observed {
            write!(
                f,
                "Error: {} balance is inconsistent! expected {}, observed {}",
                self.label, self.expected, self.observed
            )?;
        } else {
            write!(f, "{} balance OK: {}", self.label, self.observed)?;
        }
        if !self.negative_accounts.is_empty() {
            write!(
                f,
                " (negative balances on accounts {:?})",
                self.negative_accounts
            )?;
        }
        Ok(())
    }
}

/// Run parameters echoed in the report
#[derive(Debug, Clone, Serialize)]
pub struct RunParams {
    pub strategy: &'static str,
    pub consistent_reads: bool,
    pub baseline: &'static str,
    pub num_accounts: usize,
    pub threads: usize,
    pub iterations: usize,
    pub iterations_per_worker: usize,
    pub dropped_iterations: usize,
    pub transfer_amount: Amount,
    pub transfer_pct: u32,
    pub seed: Option<u64>,
}

#[derive(Debug, Clone, Serialize)]
pub struct MultiSummary {
    #[serde(rename = "max_ms", serialize_with = "serialize_ms")]
    pub max: Duration,
    #[serde(rename = "sum_ms", serialize_with = "serialize_ms")]
    pub sum: Duration,
    #[serde(rename = "mean_ms", serialize_with = "serialize_ms")]
    pub mean: Duration,
    /// Fastest worker
    #[serde(rename = "min_ms", serialize_with = "serialize_ms")]
    pub min: Duration,
    #[serde(rename = "median_ms", serialize_with = "serialize_ms")]
    pub median: Duration,
    pub operations: u64,
    pub transfers_applied: u64,
    pub transfers_skipped: u64,
    pub reads: u64,
}

impl From<&RunTimings> for MultiSummary {
    fn from(timings: &RunTimings) -> Self {
        Self {
            max: timings.max_elapsed(),
            sum: timings.sum_elapsed(),
            mean: timings.mean_elapsed(),
            min: timings.min_elapsed(),
            median: timings.percentile(50.0).unwrap_or_default(),
            operations: timings.total_operations(),
            transfers_applied: timings.total_transfers_applied(),
            transfers_skipped: timings.total_transfers_skipped(),
            reads: timings.total_reads(),
        }
    }
}

/// Everything a run produces
#[derive(Debug, Clone, Serialize)]
pub struct BenchReport {
    pub generated_at: DateTime<Utc>,
    pub params: RunParams,
    pub workers: Vec<WorkerReport>,
    pub multi: MultiSummary,
    pub single: WorkerReport,
    pub comparison: Comparison,
    pub integrity: Vec<IntegrityReport>,
    pub final_balances: LedgerSnapshot,
}

impl BenchReport {
    pub fn integrity_ok(&self) -> bool {
        self.integrity.iter().all(IntegrityReport::is_ok)
    }

    pub fn integrity_failures(&self) -> impl Iterator<Item = &IntegrityReport> {
        self.integrity.iter().filter(|r| !r.is_ok())
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

impl fmt::Display for BenchReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let p = &self.params;
        writeln!(
            f,
            "Running with NUM_ACCOUNTS = {}, NUM_THREADS = {}, NUM_ITERATIONS = {}",
            p.num_accounts, p.threads, p.iterations
        )?;
        writeln!(
            f,
            "Strategy: {} (reads {}), baseline: {}",
            p.strategy,
            if p.consistent_reads {
                "consistent"
            } else {
                "may tear"
            },
            p.baseline
        )?;
        if p.dropped_iterations > 0 {
            writeln!(
                f,
                "Note: {} iterations dropped ({} per thread)",
                p.dropped_iterations, p.iterations_per_worker
            )?;
        }
        writeln!(f)?;

        for w in &self.workers {
            write!(
                f,
                "Thread {:>3} execution time: {:>10.3} milliseconds",
                w.worker,
                as_ms(w.elapsed)
            )?;
            match w.throughput() {
                Some(ops) => writeln!(f, " ({:.0} ops/s)", ops)?,
                None => writeln!(f)?,
            }
        }
        writeln!(
            f,
            "Fastest / median thread: {:.3} / {:.3} milliseconds",
            as_ms(self.multi.min),
            as_ms(self.multi.median)
        )?;

        writeln!(f)?;
        writeln!(
            f,
            "Max multi-threaded execution time: {:.3} milliseconds",
            as_ms(self.multi.max)
        )?;
        writeln!(
            f,
            "Single-threaded execution time:    {:.3} milliseconds",
            as_ms(self.single.elapsed)
        )?;
        writeln!(f)?;
        writeln!(f, "{}", self.comparison)?;
        writeln!(f)?;

        for check in &self.integrity {
            writeln!(f, "{}", check)?;
        }
        Ok(())
    }
}
