//! Performance Metrics - per-worker execution records and aggregation
//!
//! Each worker produces one [`WorkerReport`]. [`RunTimings`] aggregates them
//! into the multi-threaded critical path (max), the total work time (sum)
//! and the spread between workers.

use std::time::Duration;

use serde::{Serialize, Serializer};

use crate::balance::TransferOutcome;
use crate::engine::OpResult;

/// Serialize a duration as fractional milliseconds.
pub fn serialize_ms<S: Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
    s.serialize_f64(as_ms(*d))
}

#[inline]
pub fn as_ms(d: Duration) -> f64 {
    d.as_secs_f64() * 1_000.0
}

/// Execution record of one worker
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct WorkerReport {
    pub worker: usize,
    #[serde(rename = "elapsed_ms", serialize_with = "serialize_ms")]
    pub elapsed: Duration,
    pub operations: u64,
    pub transfers_applied: u64,
    /// Insufficient funds (or any other no-op outcome)
    pub transfers_skipped: u64,
    pub reads: u64,
}

impl WorkerReport {
    pub fn new(worker: usize) -> Self {
        Self {
            worker,
            ..Default::default()
        }
    }

    #[inline]
    pub fn record(&mut self, result: OpResult) {
        self.operations += 1;
        match result {
            OpResult::Transfer(TransferOutcome::Applied) => self.transfers_applied += 1,
            OpResult::Transfer(_) => self.transfers_skipped += 1,
            OpResult::Total(total) => {
                let _ = std::hint::black_box(total);
                self.reads += 1;
            }
        }
    }

    /// Operations per second over the measured interval
    pub fn throughput(&self) -> Option<f64> {
        let secs = self.elapsed.as_secs_f64();
        (secs > 0.0).then(|| self.operations as f64 / secs)
    }
}

/// Aggregated timings of one multi-threaded run
#[derive(Debug, Clone, Default)]
pub struct RunTimings {
    reports: Vec<WorkerReport>,
}

impl RunTimings {
    /// Reports are kept in worker order.
    pub fn new(mut reports: Vec<WorkerReport>) -> Self {
        reports.sort_by_key(|r| r.worker);
        Self { reports }
    }

    pub fn reports(&self) -> &[WorkerReport] {
        &self.reports
    }

    /// Critical path: the slowest worker
    pub fn max_elapsed(&self) -> Duration {
        self.reports
            .iter()
            .map(|r| r.elapsed)
            .max()
            .unwrap_or_default()
    }

    pub fn min_elapsed(&self) -> Duration {
        self.reports
            .iter()
            .map(|r| r.elapsed)
            .min()
            .unwrap_or_default()
    }

    pub fn sum_elapsed(&self) -> Duration {
        self.reports.iter().map(|r| r.elapsed).sum()
    }

    pub fn mean_elapsed(&self) -> Duration {
        match u32::try_from(self.reports.len()) {
            Ok(0) | Err(_) => Duration::ZERO,
            Ok(n) => self.sum_elapsed() / n,
        }
    }

    /// Elapsed time percentile across workers
    ///
    /// # Arguments
    /// * `p` - Percentile (0-100), e.g., 50.0 for median
    pub fn percentile(&self, p: f64) -> Option<Duration> {
        if self.reports.is_empty() {
            return None;
        }
        let mut sorted: Vec<Duration> = self.reports.iter().map(|r| r.elapsed).collect();
        sorted.sort_unstable();
        let idx = ((p / 100.0) * (sorted.len() - 1) as f64).round() as usize;
        Some(sorted[idx.min(sorted.len() - 1)])
    }

    pub fn total_operations(&self) -> u64 {
        self.reports.iter().map(|r| r.operations).sum()
    }

    pub fn total_transfers_applied(&self) -> u64 {
        self.reports.iter().map(|r| r.transfers_applied).sum()
    }

    pub fn total_transfers_skipped(&self) -> u64 {
        self.reports.iter().map(|r| r.transfers_skipped).sum()
    }

    pub fn total_reads(&self) -> u64 {
        self.reports.iter().map(|r| r.reads).sum()
    }
}
