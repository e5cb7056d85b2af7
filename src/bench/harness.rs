//! Benchmark Harness
//!
//! One run walks through:
//!
//! ```text
//! Setup ──▶ SpawnWorkers ──▶ AwaitCompletion ──▶ Aggregate ──▶ Report
//! ```
//!
//! - **Setup**: validate config, build the ledger from a preset or explicit
//!   accounts.
//! - **SpawnWorkers**: `threads` OS threads, each with its own workload
//!   generator and `iterations / threads` operations. Workers hold at a start
//!   gate so they begin together.
//! - **AwaitCompletion**: join every worker. Reports come back through a
//!   bounded lock-free queue; a missing or panicked worker fails the run.
//! - **Aggregate**: critical path (max), sum and mean over workers, then a
//!   single-threaded baseline over the full iteration count on a fresh
//!   ledger.
//! - **Report**: speedup/slowdown plus conservation checks.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::{self, JoinHandle};
use std::time::Instant;

use chrono::Utc;
use clap::ValueEnum;
use crossbeam_queue::ArrayQueue;
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, warn};

use crate::bench::report::{BenchReport, Comparison, IntegrityReport, MultiSummary, RunParams};
use crate::bench::workload::{WorkloadConfig, WorkloadGenerator};
use crate::engine::TransactionEngine;
use crate::error::{BenchError, ConfigError};
use crate::ledger::{AccountSet, LedgerSnapshot};
use crate::perf::{RunTimings, WorkerReport};
use crate::preset::PRESET_TOTAL;
use crate::strategy::{
    AtomicAggregate, Coarse, FineGrained, LockStrategy, Loose, StrategyKind, Unsynchronized,
};

/// Harness phase, logged on every transition
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Setup,
    SpawnWorkers,
    AwaitCompletion,
    Aggregate,
    Report,
}

/// Strategy used for the single-threaded baseline
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum BaselineMode {
    /// No synchronization at all
    #[default]
    Passthrough,
    /// The multi-threaded strategy, uncontended
    SameStrategy,
}

impl BaselineMode {
    pub const fn name(self) -> &'static str {
        match self {
            BaselineMode::Passthrough => "passthrough",
            BaselineMode::SameStrategy => "same-strategy",
        }
    }
}

/// Parameters of one benchmark run
#[derive(Debug, Clone)]
pub struct BenchConfig {
    /// Preset selector; informational when accounts are given explicitly
    pub num_accounts: usize,
    pub threads: usize,
    /// Total operations; split evenly across threads
    pub iterations: usize,
    pub strategy: StrategyKind,
    pub baseline: BaselineMode,
    pub workload: WorkloadConfig,
    /// Base seed; `None` seeds every worker from OS entropy
    pub seed: Option<u64>,
}

impl BenchConfig {
    pub fn new(num_accounts: usize, threads: usize, iterations: usize) -> Self {
        Self {
            num_accounts,
            threads,
            iterations,
            strategy: StrategyKind::default(),
            baseline: BaselineMode::default(),
            workload: WorkloadConfig::default(),
            seed: None,
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.threads == 0 {
            return Err(ConfigError::ZeroThreads);
        }
        if self.iterations == 0 {
            return Err(ConfigError::ZeroIterations);
        }
        self.workload.validate()
    }

    /// Operations each worker runs (integer division)
    pub fn iterations_per_worker(&self) -> usize {
        self.iterations / self.threads.max(1)
    }

    /// Operations lost to the integer division
    pub fn dropped_iterations(&self) -> usize {
        self.iterations % self.threads.max(1)
    }
}

/// Workers spin here until every thread is spawned.
///
/// Unlike a barrier it can be released early, which the harness does if a
/// spawn fails so already-started workers can finish and be joined.
struct StartGate {
    open: AtomicBool,
}

impl StartGate {
    fn new() -> Self {
        Self {
            open: AtomicBool::new(false),
        }
    }

    fn release(&self) {
        self.open.store(true, Ordering::Release);
    }

    fn wait(&self) {
        while !self.open.load(Ordering::Acquire) {
            thread::yield_now();
        }
    }
}

fn enter(phase: Phase) {
    info!(?phase, "harness phase");
}

/// Build the preset ledger and run.
///
/// Also checks that the preset sums to [`PRESET_TOTAL`].
pub fn run(config: &BenchConfig) -> Result<BenchReport, BenchError> {
    enter(Phase::Setup);
    config.validate()?;
    let accounts = AccountSet::from_preset(config.num_accounts)?;
    let preset_check =
        IntegrityReport::check_total("Initial", PRESET_TOTAL, accounts.initial_total());
    if !preset_check.is_ok() {
        error!(%preset_check, "preset does not sum to the documented total");
    }
    let mut report = dispatch(config, accounts)?;
    report.integrity.insert(0, preset_check);
    Ok(report)
}

/// Run against explicit accounts instead of a preset.
pub fn run_with_accounts(
    config: &BenchConfig,
    accounts: AccountSet,
) -> Result<BenchReport, BenchError> {
    enter(Phase::Setup);
    config.validate()?;
    dispatch(config, accounts)
}

fn dispatch(config: &BenchConfig, accounts: AccountSet) -> Result<BenchReport, BenchError> {
    match config.strategy {
        StrategyKind::Coarse => run_strategy::<Coarse>(config, accounts),
        StrategyKind::FineGrained => run_strategy::<FineGrained>(config, accounts),
        StrategyKind::Loose => run_strategy::<Loose>(config, accounts),
        StrategyKind::Atomic => run_strategy::<AtomicAggregate>(config, accounts),
    }
}

fn run_strategy<S>(config: &BenchConfig, accounts: AccountSet) -> Result<BenchReport, BenchError>
where
    S: LockStrategy + Send + Sync + 'static,
{
    info!(
        strategy = S::NAME,
        accounts = accounts.len(),
        threads = config.threads,
        iterations = config.iterations,
        "ledger ready"
    );
    let expected = accounts.initial_total();
    let engine: TransactionEngine<S> = TransactionEngine::new(accounts.clone());

    let timings = run_multi_threaded(&engine, config)?;
    let multi_snapshot = engine.snapshot();

    enter(Phase::Aggregate);
    let (single, single_snapshot) = match config.baseline {
        BaselineMode::Passthrough => run_single_threaded::<Unsynchronized>(&accounts, config),
        BaselineMode::SameStrategy => run_single_threaded::<S>(&accounts, config),
    };
    let multi = MultiSummary::from(&timings);
    let comparison = Comparison::from_times(single.elapsed, multi.max);
    info!(
        max_ms = crate::perf::as_ms(multi.max),
        single_ms = crate::perf::as_ms(single.elapsed),
        factor = comparison.factor(),
        "aggregated"
    );

    enter(Phase::Report);
    let integrity = vec![
        IntegrityReport::check("Multi-threaded final", expected, &multi_snapshot),
        IntegrityReport::check("Single-threaded final", expected, &single_snapshot),
    ];
    for failure in integrity.iter().filter(|r| !r.is_ok()) {
        error!(%failure, "integrity violation");
    }

    Ok(BenchReport {
        generated_at: Utc::now(),
        params: RunParams {
            strategy: S::NAME,
            consistent_reads: S::CONSISTENT_READS,
            baseline: config.baseline.name(),
            num_accounts: accounts.len(),
            threads: config.threads,
            iterations: config.iterations,
            iterations_per_worker: config.iterations_per_worker(),
            dropped_iterations: config.dropped_iterations(),
            transfer_amount: config.workload.transfer_amount,
            transfer_pct: config.workload.transfer_pct,
            seed: config.seed,
        },
        workers: timings.reports().to_vec(),
        multi,
        single,
        comparison,
        integrity,
        final_balances: multi_snapshot,
    })
}

/// Run `iterations` operations from `generator` against `engine`, timed.
pub fn execute<S: LockStrategy>(
    engine: &TransactionEngine<S>,
    generator: &mut WorkloadGenerator,
    iterations: usize,
    worker: usize,
) -> WorkerReport {
    let mut report = WorkerReport::new(worker);
    let start = Instant::now();
    for _ in 0..iterations {
        let op = generator.next_op();
        report.record(engine.apply(op));
    }
    report.elapsed = start.elapsed();
    report
}

/// Spawn `config.threads` workers against one shared engine and wait for all
/// of them.
pub fn run_multi_threaded<S>(
    engine: &TransactionEngine<S>,
    config: &BenchConfig,
) -> Result<RunTimings, BenchError>
where
    S: LockStrategy + Send + Sync + 'static,
{
    config.validate()?;
    enter(Phase::SpawnWorkers);

    let threads = config.threads;
    let per_worker = config.iterations_per_worker();
    if config.dropped_iterations() > 0 {
        warn!(
            dropped = config.dropped_iterations(),
            per_worker, "iterations not divisible by threads; remainder dropped"
        );
    }

    // One slot per worker, so a push never fails
    let results: Arc<ArrayQueue<WorkerReport>> = Arc::new(ArrayQueue::new(threads));
    let gate = Arc::new(StartGate::new());
    let mut handles: Vec<JoinHandle<()>> = Vec::with_capacity(threads);
    let mut spawn_error = None;

    for worker in 0..threads {
        let engine = engine.clone();
        let results = results.clone();
        let gate = gate.clone();
        let mut generator = WorkloadGenerator::new(
            engine.ledger().accounts(),
            config.workload,
            config.seed,
            worker,
        );

        let spawned = thread::Builder::new()
            .name(format!("worker-{}", worker))
            .spawn(move || {
                gate.wait();
                let report = execute(&engine, &mut generator, per_worker, worker);
                debug!(
                    worker,
                    elapsed_ms = crate::perf::as_ms(report.elapsed),
                    applied = report.transfers_applied,
                    skipped = report.transfers_skipped,
                    reads = report.reads,
                    "worker done"
                );
                let _ = results.push(report);
            });

        match spawned {
            Ok(handle) => handles.push(handle),
            Err(source) => {
                spawn_error = Some(BenchError::Spawn { worker, source });
                break;
            }
        }
    }

    gate.release();
    enter(Phase::AwaitCompletion);

    let mut panicked = None;
    for (worker, handle) in handles.into_iter().enumerate() {
        if handle.join().is_err() {
            error!(worker, "worker panicked");
            panicked.get_or_insert(worker);
        }
    }
    if let Some(err) = spawn_error {
        return Err(err);
    }
    if let Some(worker) = panicked {
        return Err(BenchError::WorkerPanicked(worker));
    }

    let mut reports = Vec::with_capacity(threads);
    while let Some(report) = results.pop() {
        reports.push(report);
    }
    let timings = RunTimings::new(reports);
    let missing = (0..threads).find(|&w| timings.reports().get(w).map(|r| r.worker) != Some(w));
    if let Some(worker) = missing {
        return Err(BenchError::MissingReport(worker));
    }
    Ok(timings)
}

/// One worker, full iteration count, on a fresh ledger over `accounts`.
///
/// Uses worker index 0, so with a seed it replays the exact stream worker 0
/// of a multi-threaded run draws.
pub fn run_single_threaded<S: LockStrategy>(
    accounts: &AccountSet,
    config: &BenchConfig,
) -> (WorkerReport, LedgerSnapshot) {
    let engine: TransactionEngine<S> = TransactionEngine::new(accounts.clone());
    let mut generator = WorkloadGenerator::new(accounts, config.workload, config.seed, 0);
    let report = execute(&engine, &mut generator, config.iterations, 0);
    debug!(
        strategy = S::NAME,
        elapsed_ms = crate::perf::as_ms(report.elapsed),
        "single-threaded baseline done"
    );
    (report, engine.snapshot())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(threads: usize, iterations: usize) -> BenchConfig {
        BenchConfig {
            seed: Some(2024),
            ..BenchConfig::new(3, threads, iterations)
        }
    }

    #[test]
    fn test_iteration_split_drops_remainder() {
        let cfg = config(4, 1003);
        assert_eq!(cfg.iterations_per_worker(), 250);
        assert_eq!(cfg.dropped_iterations(), 3);

        let engine: TransactionEngine<FineGrained> =
            TransactionEngine::new(AccountSet::from_preset(3).unwrap());
        let timings = run_multi_threaded(&engine, &cfg).unwrap();
        assert_eq!(timings.reports().len(), 4);
        assert!(timings.reports().iter().all(|r| r.operations == 250));
        assert_eq!(timings.total_operations(), 1000);
    }

    #[test]
    fn test_more_threads_than_iterations() {
        // 3 / 5 == 0: every worker runs nothing, all iterations dropped
        let cfg = config(5, 3);
        let engine: TransactionEngine<Coarse> =
            TransactionEngine::new(AccountSet::from_preset(3).unwrap());
        let timings = run_multi_threaded(&engine, &cfg).unwrap();
        assert_eq!(timings.reports().len(), 5);
        assert_eq!(timings.total_operations(), 0);
        assert_eq!(engine.snapshot().total(), PRESET_TOTAL);
    }

    #[test]
    fn test_validate() {
        assert!(matches!(
            config(0, 10).validate(),
            Err(ConfigError::ZeroThreads)
        ));
        assert!(matches!(
            config(1, 0).validate(),
            Err(ConfigError::ZeroIterations)
        ));
        assert!(config(1, 1).validate().is_ok());
    }

    #[test]
    fn test_single_thread_paths_agree() {
        // Same seed, one thread: worker 0 of the multi-threaded run and the
        // baseline draw the same stream and must end in the same state.
        let cfg = config(1, 5_000);
        let accounts = AccountSet::from_preset(10).unwrap();

        for kind in StrategyKind::ALL {
            let cfg = BenchConfig {
                strategy: kind,
                ..cfg.clone()
            };
            let multi_snapshot = match kind {
                StrategyKind::Coarse => multi_snapshot::<Coarse>(&accounts, &cfg),
                StrategyKind::FineGrained => multi_snapshot::<FineGrained>(&accounts, &cfg),
                StrategyKind::Loose => multi_snapshot::<Loose>(&accounts, &cfg),
                StrategyKind::Atomic => multi_snapshot::<AtomicAggregate>(&accounts, &cfg),
            };
            let (_, single_snapshot) = run_single_threaded::<Unsynchronized>(&accounts, &cfg);
            assert_eq!(multi_snapshot, single_snapshot, "strategy {}", kind);
        }
    }

    fn multi_snapshot<S: LockStrategy + Send + Sync + 'static>(
        accounts: &AccountSet,
        cfg: &BenchConfig,
    ) -> LedgerSnapshot {
        let engine: TransactionEngine<S> = TransactionEngine::new(accounts.clone());
        run_multi_threaded(&engine, cfg).unwrap();
        engine.snapshot()
    }

    #[test]
    fn test_run_reports_conserved_total() {
        for kind in StrategyKind::ALL {
            let cfg = BenchConfig {
                strategy: kind,
                ..config(4, 4_000)
            };
            let report = run(&cfg).unwrap();
            assert!(report.integrity_ok(), "strategy {}: {:?}", kind, report.integrity);
            assert_eq!(report.final_balances.total(), PRESET_TOTAL);
            assert_eq!(report.workers.len(), 4);
            assert_eq!(report.single.operations, 4_000);
            assert_eq!(report.params.strategy, kind.name());
        }
    }

    #[test]
    fn test_same_strategy_baseline() {
        let cfg = BenchConfig {
            baseline: BaselineMode::SameStrategy,
            ..config(2, 2_000)
        };
        let report = run(&cfg).unwrap();
        assert_eq!(report.params.baseline, "same-strategy");
        assert!(report.integrity_ok());
    }

    /// Mints money on every transfer: credits the receiver, never debits.
    struct Leaky {
        balances: std::sync::Mutex<Vec<crate::balance::Balance>>,
    }

    impl LockStrategy for Leaky {
        const NAME: &'static str = "leaky";
        const CONSISTENT_READS: bool = true;

        fn with_balances(initial: &[crate::balance::Balance]) -> Self {
            Self {
                balances: std::sync::Mutex::new(initial.to_vec()),
            }
        }

        fn transfer(
            &self,
            _from: crate::core_types::Slot,
            to: crate::core_types::Slot,
            amount: crate::core_types::Amount,
        ) -> crate::balance::TransferOutcome {
            let mut balances = crate::strategy::lock(&self.balances);
            let _ = balances[to].credit(amount);
            crate::balance::TransferOutcome::Applied
        }

        fn total_balance(&self) -> crate::core_types::Amount {
            crate::strategy::lock(&self.balances).iter().map(|b| b.amount()).sum()
        }

        fn snapshot(&self) -> Vec<crate::balance::Balance> {
            crate::strategy::lock(&self.balances).clone()
        }
    }

    #[test]
    fn test_integrity_violation_is_reported_not_fatal() {
        let cfg = BenchConfig {
            workload: WorkloadConfig {
                transfer_pct: 100,
                ..WorkloadConfig::default()
            },
            ..config(2, 10)
        };
        let accounts = AccountSet::from_preset(3).unwrap();

        // Passthrough baseline stays correct; only the multi-threaded run leaks
        let report = run_strategy::<Leaky>(&cfg, accounts).unwrap();

        assert!(!report.integrity_ok());
        let failures: Vec<&IntegrityReport> = report.integrity_failures().collect();
        assert_eq!(failures.len(), 1);
        assert_eq!(failures[0].label, "Multi-threaded final");
        assert_eq!(failures[0].expected, PRESET_TOTAL);
        assert_eq!(failures[0].observed, PRESET_TOTAL + 10 * 5000);

        let text = report.to_string();
        assert!(text.contains(
            "Error: Multi-threaded final balance is inconsistent! expected 100000, observed 150000"
        ));
        assert!(text.contains("Single-threaded final balance OK: 100000"));
    }

    #[test]
    fn test_unsupported_preset_fails_before_spawning() {
        let cfg = BenchConfig::new(4, 2, 100);
        assert!(matches!(
            run(&cfg),
            Err(BenchError::Config(ConfigError::UnsupportedPreset(4)))
        ));
    }
}
