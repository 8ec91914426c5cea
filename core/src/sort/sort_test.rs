#[cfg(test)]
mod tests {
    use crate::sort::{
        FarmSchedule, SortOptions, Sorter, SorterRegistry, is_sorted, phase_offset, transpose_phase,
    };
    use crate::workload::{checksum, generate};

    fn run(name: &str, data: &mut [i32], opts: SortOptions) {
        let registry = SorterRegistry::new();
        let sorter = registry.get(name).expect("variant registered");
        sorter.sort(data, &opts).expect("sort should succeed");
    }

    fn assert_sorts(name: &str, input: Vec<i32>, opts: SortOptions) {
        let mut data = input.clone();
        run(name, &mut data, opts);
        let mut expected = input;
        expected.sort();
        assert_eq!(data, expected, "variant {} with {:?}", name, opts);
    }

    const VARIANTS: &[&str] = &["seq", "barrier", "async", "parfor", "farm"];

    #[test]
    fn every_variant_sorts_random_input() {
        for &name in VARIANTS {
            for workers in [1, 2, 3, 4] {
                assert_sorts(name, generate(257, 3), SortOptions::new(workers));
            }
        }
    }

    #[test]
    fn every_variant_handles_ordered_and_reversed_input() {
        let ascending: Vec<i32> = (0..100).collect();
        let descending: Vec<i32> = (0..100).rev().collect();
        for &name in VARIANTS {
            assert_sorts(name, ascending.clone(), SortOptions::new(4));
            assert_sorts(name, descending.clone(), SortOptions::new(4));
        }
    }

    #[test]
    fn every_variant_handles_duplicates() {
        let input: Vec<i32> = (0..90).map(|i| (i * 7) % 5).collect();
        for &name in VARIANTS {
            assert_sorts(name, input.clone(), SortOptions::new(3));
        }
    }

    #[test]
    fn tiny_inputs_and_oversubscribed_workers() {
        for &name in VARIANTS {
            assert_sorts(name, vec![], SortOptions::new(8));
            assert_sorts(name, vec![5], SortOptions::new(8));
            assert_sorts(name, vec![2, 1], SortOptions::new(8));
            assert_sorts(name, vec![3, 1, 2], SortOptions::new(8));
            assert_sorts(name, vec![9, 8, 7, 6, 5, 4, 3], SortOptions::new(64));
        }
    }

    #[test]
    fn async_with_many_small_blocks_terminates() {
        // 16 workers on 64 elements leave most blocks idle and already sorted
        // while a few neighbours are still exchanging border elements.
        for seed in 1..=5 {
            assert_sorts("async", generate(64, seed), SortOptions::new(16));
        }
        let mut nearly_sorted: Vec<i32> = (0..64).collect();
        nearly_sorted.swap(0, 63);
        assert_sorts("async", nearly_sorted, SortOptions::new(16));
    }

    #[test]
    fn farm_respects_explicit_block_count() {
        for blocks in [1, 2, 5, 13] {
            assert_sorts("farm", generate(120, 11), SortOptions::new(3).with_blocks(blocks));
        }
    }

    #[test]
    fn sorting_preserves_checksum() {
        let input = generate(500, 42);
        let before = checksum(&input);
        for &name in VARIANTS {
            let mut data = input.clone();
            run(name, &mut data, SortOptions::new(4));
            assert!(is_sorted(&data));
            assert_eq!(checksum(&data), before, "variant {}", name);
        }
    }

    #[test]
    fn phases_start_with_odd_pairs() {
        assert_eq!(phase_offset(0), 1);
        assert_eq!(phase_offset(1), 0);
        let mut data = vec![1, 3, 2, 0];
        assert!(transpose_phase(&mut data, 1));
        assert_eq!(data, vec![1, 2, 3, 0]);
        assert!(!transpose_phase(&mut [1, 2, 3], 0));
    }

    #[test]
    fn farm_schedule_keeps_neighbours_within_one_pass() {
        let mut schedule = FarmSchedule::new(3, 4);
        let first = schedule.start_ready();
        assert_eq!(first, vec![(0, 0), (1, 0), (2, 0)]);
        assert!(schedule.start_ready().is_empty());

        schedule.complete(0);
        // block 1 has not finished pass 0 yet
        assert!(!schedule.can_start(0));
        schedule.complete(1);
        // block 2 is still on pass 0, so block 1 has to wait
        assert_eq!(schedule.start_ready(), vec![(0, 1)]);
        schedule.complete(2);
        assert_eq!(schedule.start_ready(), vec![(1, 1), (2, 1)]);

        // block 0 cannot reach pass 2 before block 1 finishes pass 1
        schedule.complete(0);
        assert!(!schedule.can_start(0));
        schedule.complete(1);
        assert_eq!(schedule.start_ready(), vec![(0, 2)]);
    }

    #[test]
    fn farm_schedule_finishes_after_all_passes() {
        let mut schedule = FarmSchedule::new(2, 3);
        let mut dispatched = 0;
        while !schedule.is_finished() {
            let ready = schedule.start_ready();
            assert!(!ready.is_empty(), "schedule stalled");
            for (block, _) in ready {
                dispatched += 1;
                schedule.complete(block);
            }
        }
        assert_eq!(dispatched, 6);
        assert_eq!(schedule.completed(0), 3);
        assert_eq!(schedule.completed(1), 3);
    }

    #[test]
    fn sequential_flag_only_on_baseline() {
        let registry = SorterRegistry::new();
        let flags: Vec<bool> = VARIANTS
            .iter()
            .map(|name| registry.get(name).map(|s| s.is_sequential()).unwrap())
            .collect();
        assert_eq!(flags, vec![true, false, false, false, false]);
    }
}
