//! Example: sorting a million integers on a thread-per-segment executor.
//!
//! Run with:
//! `cargo run --release --example sort`

use std::time::Instant;

use fj_sort::{executor::ThreadExecutor, utils::is_sorted_by, ForkJoinSorterBuilder};

fn main() {
    let len = 1_000_000u64;
    // Cheap deterministic scramble: multiplication by an odd constant is a
    // bijection modulo 2^64.
    let mut data: Vec<u64> = (0..len)
        .map(|i| i.wrapping_mul(0x9E37_79B9_7F4A_7C15))
        .collect();

    let sorter = ForkJoinSorterBuilder::new(ThreadExecutor::new().with_name("demo-worker"))
        .stable()
        .build();

    let started = Instant::now();
    if let Err(err) = sorter.sort(&mut data) {
        eprintln!("sort failed: {err}");
        std::process::exit(1);
    }
    let elapsed = started.elapsed();

    println!(
        "sorted {len} keys on {} segments in {elapsed:?}",
        sorter.parallelism()
    );
    println!(
        "sorted: {}",
        is_sorted_by(&data, |a: &u64, b: &u64| a < b)
    );
    println!("first: {:?}", &data[..3]);
}
