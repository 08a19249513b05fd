#![cfg(feature = "heavy")]
use fj_sort::{executor::ThreadExecutor, ForkJoinSorter, ForkJoinSorterBuilder, MergeStrategy};
use rand::{rngs::StdRng, Rng, SeedableRng};

fn random_keys(rng: &mut StdRng, len: usize) -> Vec<u64> {
    (0..len).map(|_| rng.gen()).collect()
}

#[test]
fn heavy_stress_many_threads() {
    let mut rng = StdRng::seed_from_u64(123);
    let v = random_keys(&mut rng, 2_000_000);
    let mut expected = v.clone();
    expected.sort_unstable();
    let mut got = v;
    ForkJoinSorter::with_parallelism(ThreadExecutor::new(), 64)
        .sort(&mut got)
        .unwrap();
    assert_eq!(got, expected);
}

#[test]
fn heavy_stress_rotation_merge() {
    let mut rng = StdRng::seed_from_u64(456);
    let v: Vec<u32> = (0..500_000).map(|_| rng.gen_range(0..1_000)).collect();
    let mut expected = v.clone();
    expected.sort();
    let mut got = v;
    ForkJoinSorterBuilder::new(ThreadExecutor::new())
        .with_parallelism(33)
        .with_merge_strategy(MergeStrategy::Rotation)
        .build()
        .sort(&mut got)
        .unwrap();
    assert_eq!(got, expected);
}

#[test]
fn heavy_stress_repeated_small_sorts() {
    let mut rng = StdRng::seed_from_u64(789);
    let sorter = ForkJoinSorter::with_parallelism(ThreadExecutor::new(), 8);
    for _ in 0..2_000 {
        let len = rng.gen_range(0..64);
        let v = random_keys(&mut rng, len);
        let mut expected = v.clone();
        expected.sort_unstable();
        let mut got = v;
        sorter.sort(&mut got).unwrap();
        assert_eq!(got, expected);
    }
}
