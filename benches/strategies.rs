use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use ledger_bench::bench::workload::{WorkloadConfig, WorkloadGenerator};
use ledger_bench::ledger::AccountSet;
use ledger_bench::strategy::{
    AtomicAggregate, Coarse, FineGrained, LockStrategy, Loose, Unsynchronized,
};
use ledger_bench::{Operation, TransactionEngine};
use std::hint::black_box;
use std::thread;

const OPS_PER_THREAD: usize = 10_000;

fn ops(accounts: &AccountSet, worker: usize) -> Vec<Operation> {
    WorkloadGenerator::new(accounts, WorkloadConfig::default(), Some(1), worker)
        .take(OPS_PER_THREAD)
        .collect()
}

// Uncontended cost of one operation
fn bench_single<S: LockStrategy>(c: &mut Criterion, group: &str) {
    let accounts = AccountSet::from_preset(10).unwrap();
    let ops = ops(&accounts, 0);
    c.bench_function(&format!("{}/{}", group, S::NAME), |b| {
        b.iter(|| {
            let engine: TransactionEngine<S> = TransactionEngine::new(accounts.clone());
            for op in &ops {
                black_box(engine.apply(*op));
            }
        })
    });
}

fn single_thread(c: &mut Criterion) {
    bench_single::<Unsynchronized>(c, "single");
    bench_single::<Coarse>(c, "single");
    bench_single::<FineGrained>(c, "single");
    bench_single::<Loose>(c, "single");
    bench_single::<AtomicAggregate>(c, "single");
}

fn contended<S: LockStrategy + Send + Sync + 'static>(c: &mut Criterion) {
    let mut group = c.benchmark_group(format!("contended/{}", S::NAME));
    group.sample_size(20);
    for n in [3, 60] {
        let accounts = AccountSet::from_preset(n).unwrap();
        let streams: Vec<Vec<Operation>> = (0..4).map(|w| ops(&accounts, w)).collect();
        group.bench_with_input(BenchmarkId::new("accounts", n), &n, |b, _| {
            b.iter(|| {
                let engine: TransactionEngine<S> = TransactionEngine::new(accounts.clone());
                thread::scope(|s| {
                    for stream in &streams {
                        let engine = engine.clone();
                        s.spawn(move || {
                            for op in stream {
                                black_box(engine.apply(*op));
                            }
                        });
                    }
                });
            })
        });
    }
    group.finish();
}

fn multi_thread(c: &mut Criterion) {
    contended::<Coarse>(c);
    contended::<FineGrained>(c);
    contended::<Loose>(c);
    contended::<AtomicAggregate>(c);
}

criterion_group!(benches, single_thread, multi_thread);
criterion_main!(benches);
