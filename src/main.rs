//! ledger_bench - Lock Contention Benchmark
//!
//! ```text
//! ┌──────────┐    ┌──────────┐    ┌──────────┐    ┌──────────┐
//! │ CLI/YAML │───▶│  Ledger  │───▶│ Workers  │───▶│  Report  │
//! │  Config  │    │ (preset) │    │ (N thr.) │    │ (stdout) │
//! └──────────┘    └──────────┘    └──────────┘    └──────────┘
//!                                       │
//!                                       ▼
//!                                 ┌──────────┐
//!                                 │ Baseline │
//!                                 │ (1 thr.) │
//!                                 └──────────┘
//! ```
//!
//! Usage: `ledger_bench <ACCOUNTS> <THREADS> <ITERATIONS> [OPTIONS]`

use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use tracing::{info, warn};

use ledger_bench::bench::{self, BaselineMode, BenchConfig, WorkloadConfig};
use ledger_bench::config::AppConfig;
use ledger_bench::core_types::Amount;
use ledger_bench::logging::init_logging;
use ledger_bench::strategy::StrategyKind;

fn parse_positive(s: &str) -> Result<usize, String> {
    match s.parse::<usize>() {
        Ok(0) => Err("must be a positive integer".to_string()),
        Ok(n) => Ok(n),
        Err(e) => Err(e.to_string()),
    }
}

#[derive(Parser, Debug)]
#[command(
    name = "ledger_bench",
    version,
    about = "Lock contention benchmark over a shared account ledger"
)]
struct Cli {
    /// Number of accounts (3, 10, 20 or 60)
    #[arg(value_parser = parse_positive)]
    accounts: usize,

    /// Worker thread count
    #[arg(value_parser = parse_positive)]
    threads: usize,

    /// Total operations, split evenly across threads
    #[arg(value_parser = parse_positive)]
    iterations: usize,

    /// Locking strategy for the multi-threaded run
    #[arg(long, value_enum)]
    strategy: Option<StrategyKind>,

    /// Amount moved per transfer
    #[arg(long)]
    amount: Option<Amount>,

    /// Share of transfers in the operation mix, percent
    #[arg(long)]
    transfer_pct: Option<u32>,

    /// Base RNG seed; omit for OS entropy
    #[arg(long)]
    seed: Option<u64>,

    /// Strategy for the single-threaded baseline
    #[arg(long, value_enum)]
    baseline: Option<BaselineMode>,

    /// Print the report as JSON
    #[arg(long)]
    json: bool,

    /// Loads config/<ENV>.yaml if present
    #[arg(long, default_value = "dev")]
    env: String,

    /// Explicit config file; must exist
    #[arg(long, conflicts_with = "env")]
    config: Option<PathBuf>,
}

impl Cli {
    /// CLI flags win over the config file.
    fn bench_config(&self, app: &AppConfig) -> BenchConfig {
        let file = &app.bench;
        BenchConfig {
            num_accounts: self.accounts,
            threads: self.threads,
            iterations: self.iterations,
            strategy: self.strategy.unwrap_or(file.strategy),
            baseline: self.baseline.unwrap_or(file.baseline),
            workload: WorkloadConfig {
                transfer_pct: self.transfer_pct.unwrap_or(file.transfer_pct),
                transfer_amount: self.amount.unwrap_or(file.transfer_amount),
            },
            seed: self.seed.or(file.seed),
        }
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let app = match &cli.config {
        Some(path) => AppConfig::load(path)?,
        None => AppConfig::load_env(&cli.env)?,
    };
    let _guard = init_logging(&app);

    let config = cli.bench_config(&app);
    info!(?config, "starting benchmark");

    let report = bench::run(&config)?;

    if cli.json {
        println!("{}", report.to_json().context("serialize report")?);
    } else {
        print!("{}", report);
    }

    // Races are what this tool exists to expose; they do not fail the process
    for failure in report.integrity_failures() {
        warn!(%failure, "run completed with integrity failure");
    }
    Ok(())
}
