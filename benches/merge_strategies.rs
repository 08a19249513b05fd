use criterion::{black_box, criterion_group, criterion_main, BatchSize, Criterion};
use fj_sort::MergeStrategy;
use rand::{rngs::StdRng, Rng, SeedableRng};
use sysinfo::{get_current_pid, ProcessRefreshKind, System};

/// Two sorted halves of random keys.
fn two_runs(len: usize) -> Vec<u32> {
    let mut rng = StdRng::seed_from_u64(42);
    let mut v: Vec<u32> = (0..len).map(|_| rng.gen()).collect();
    let mid = len / 2;
    v[..mid].sort_unstable();
    v[mid..].sort_unstable();
    v
}

fn rss_kib() -> u64 {
    let mut sys = System::new();
    sys.refresh_processes_specifics(ProcessRefreshKind::new());
    match get_current_pid().ok().and_then(|pid| sys.process(pid)) {
        Some(p) => p.memory() / 1024,
        None => 0,
    }
}

fn bench_merge(c: &mut Criterion) {
    let mut group = c.benchmark_group("merge_two_runs");
    for &len in &[1_000usize, 100_000, 1_000_000] {
        for strategy in [MergeStrategy::Buffered, MergeStrategy::Rotation] {
            group.bench_function(format!("{strategy:?}_{len}"), |b| {
                b.iter_batched(
                    || two_runs(len),
                    |mut v| {
                        let before = rss_kib();
                        strategy.merge(&mut v, len / 2, &|a: &u32, b: &u32| a < b);
                        let after = rss_kib();
                        // keep allocation deltas out of criterion's output
                        eprintln!(
                            "RSS KiB delta ({strategy:?} {len}): {}",
                            after.saturating_sub(before)
                        );
                        black_box(v)
                    },
                    BatchSize::PerIteration,
                )
            });
        }
    }
    group.finish();
}

criterion_group!(benches, bench_merge);
criterion_main!(benches);
