use fj_sort::partition::partition_range;
use proptest::prelude::*;

proptest! {
    #[test]
    fn spans_tile_the_range(len in 0usize..5_000, parallelism in 1usize..64) {
        let spans = partition_range(len, parallelism);

        if len == 0 {
            prop_assert!(spans.is_empty());
            return Ok(());
        }

        prop_assert_eq!(spans.len(), len.min(parallelism));
        prop_assert_eq!(spans.first().unwrap().start, 0);
        prop_assert_eq!(spans.last().unwrap().end, len);
        for pair in spans.windows(2) {
            prop_assert!(pair[0].is_adjacent_to(&pair[1]));
        }
        prop_assert!(spans.iter().all(|s| !s.is_empty()));
        prop_assert_eq!(spans.iter().map(|s| s.len()).sum::<usize>(), len);
    }

    #[test]
    fn only_the_last_span_differs(len in 1usize..5_000, parallelism in 1usize..64) {
        let spans = partition_range(len, parallelism);
        let chunk = spans[0].len();
        for s in &spans[..spans.len() - 1] {
            prop_assert_eq!(s.len(), chunk);
        }
        prop_assert!(spans.last().unwrap().len() >= chunk);
    }
}

#[test]
fn example_from_five_elements() {
    let sizes: Vec<_> = partition_range(5, 2).iter().map(|s| s.len()).collect();
    assert_eq!(sizes, vec![2, 3]);
}
