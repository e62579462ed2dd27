use proptest::prelude::*;
use psieve::{
    BasePrimes, NoProgress, ProgressObserver, SegmentPlan, SieveConfig, SieveError, base_primes,
    compute_primes, compute_primes_with, verify,
};
use std::cell::RefCell;

#[test]
fn test_boundary_limits() {
    assert_eq!(compute_primes(0, 10, 4).unwrap(), Vec::<u64>::new());
    assert_eq!(compute_primes(1, 10, 4).unwrap(), Vec::<u64>::new());
    assert_eq!(compute_primes(2, 10, 4).unwrap(), vec![2]);
    assert_eq!(compute_primes(3, 10, 4).unwrap(), vec![2, 3]);
    assert_eq!(compute_primes(4, 10, 4).unwrap(), vec![2, 3]);
}

#[test]
fn test_thirty_in_segments_of_ten() {
    assert_eq!(
        compute_primes(30, 10, 4).unwrap(),
        vec![2, 3, 5, 7, 11, 13, 17, 19, 23, 29]
    );
}

#[test]
fn test_hundred_in_segments_of_twenty_five() {
    assert_eq!(
        compute_primes(100, 25, 4).unwrap(),
        vec![
            2, 3, 5, 7, 11, 13, 17, 19, 23, 29, 31, 37, 41, 43, 47, 53, 59, 61, 67, 71, 73, 79,
            83, 89, 97
        ]
    );
}

#[test]
fn test_square_on_segment_boundary() {
    // Segments [0, 2], [3, 5], [6, 7]
    assert_eq!(compute_primes(7, 3, 2).unwrap(), vec![2, 3, 5, 7]);
    // Width 5 puts 25 = 5*5 at the start of a segment
    assert_eq!(compute_primes(29, 5, 3).unwrap(), base_primes(29));
    // Width 1: every value is its own segment
    assert_eq!(compute_primes(50, 1, 4).unwrap(), base_primes(50));
}

#[test]
fn test_zero_width_plan_is_rejected() {
    assert!(matches!(
        SegmentPlan::new(3, 0),
        Err(SieveError::InvalidConfiguration(_))
    ));
}

#[test]
fn test_invalid_configuration_fails_fast() {
    assert!(matches!(
        compute_primes(100, 0, 4),
        Err(SieveError::InvalidConfiguration(_))
    ));
    assert!(matches!(
        compute_primes(100, 10, 0),
        Err(SieveError::InvalidConfiguration(_))
    ));
    // Rejected even when there is nothing to sieve
    assert!(matches!(
        compute_primes(1, 0, 4),
        Err(SieveError::InvalidConfiguration(_))
    ));
}

#[test]
fn test_known_counts() {
    assert_eq!(compute_primes(1_000, 64, 4).unwrap().len(), 168);
    assert_eq!(compute_primes(10_000, 1_000, 3).unwrap().len(), 1_229);
    assert_eq!(compute_primes(1_000_000, 32_768, 4).unwrap().len(), 78_498);
}

#[test]
fn test_default_width_matches_base_sieve() {
    let config = SieveConfig::new(2_000_000).with_workers(4);
    let primes = compute_primes_with(&config, &NoProgress).unwrap();
    assert_eq!(primes, base_primes(2_000_000));
    assert_eq!(primes.len(), 148_933);
}

#[test]
fn test_strictly_ascending() {
    let primes = compute_primes(200_000, 4_099, 6).unwrap();
    assert!(primes.windows(2).all(|w| w[0] < w[1]));
}

#[test]
fn test_idempotent() {
    let first = compute_primes(123_457, 1_000, 4).unwrap();
    let second = compute_primes(123_457, 1_000, 4).unwrap();
    assert_eq!(first, second);
}

#[test]
fn test_matches_oracle() {
    let limit = 20_000;
    let primes = compute_primes(limit, 777, 4).unwrap();
    let report = verify::audit(&primes, limit, 10);
    assert!(report.is_ok(), "{:?}", report.mismatches);
    assert_eq!(report.checked, limit + 1);
}

#[test]
fn test_top_of_u64_range() {
    // Only the last few segments: sieve them directly instead of building sqrt(2^64) base primes
    let limit = u64::MAX;
    let base = BasePrimes::from(base_primes(70_000));
    let low = u64::MAX - 1_000;
    let segment = psieve::Segment { index: 0, low, high: limit };
    let result = psieve::sieve_segment(segment, &base);
    for &p in &result.primes {
        // Base primes only reach 70,000, so every survivor has no small factor
        assert!(base.iter().all(|&q| p % q != 0));
    }
    assert!(result.primes.contains(&18_446_744_073_709_551_557));
    assert_eq!(SegmentPlan::new(limit, 1 << 40).unwrap().len(), 1 << 24);
}

#[test]
fn test_observer_receives_phases() {
    #[derive(Default)]
    struct Recorder {
        events: RefCell<Vec<String>>,
    }

    impl ProgressObserver for Recorder {
        fn base_sieve_done(&self, base_primes: usize) {
            self.events.borrow_mut().push(format!("base {base_primes}"));
        }

        fn segments_dispatched(&self, segments: usize) {
            self.events.borrow_mut().push(format!("dispatched {segments}"));
        }

        fn segments_collected(&self, segments: usize) {
            self.events.borrow_mut().push(format!("collected {segments}"));
        }
    }

    let recorder = Recorder::default();
    let config = SieveConfig::new(100).with_segment_width(25).with_workers(2);
    compute_primes_with(&config, &recorder).unwrap();

    assert_eq!(
        *recorder.events.borrow(),
        vec!["base 4", "dispatched 5", "collected 5"]
    );
}

#[test]
fn test_no_events_below_two() {
    #[derive(Default)]
    struct Silent {
        called: RefCell<bool>,
    }

    impl ProgressObserver for Silent {
        fn base_sieve_done(&self, _base_primes: usize) {
            *self.called.borrow_mut() = true;
        }
    }

    let silent = Silent::default();
    let primes = compute_primes_with(&SieveConfig::new(1), &silent).unwrap();
    assert!(primes.is_empty());
    assert!(!*silent.called.borrow());
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(48))]

    #[test]
    fn prop_invariant_under_width_and_workers(
        limit in 0_u64..20_000,
        width_a in 1_u64..5_000,
        width_b in 1_u64..5_000,
        workers_a in 1_usize..8,
        workers_b in 1_usize..8,
    ) {
        let a = compute_primes(limit, width_a, workers_a).unwrap();
        let b = compute_primes(limit, width_b, workers_b).unwrap();
        prop_assert_eq!(&a, &b);
        prop_assert_eq!(a, base_primes(limit));
    }

    #[test]
    fn prop_plan_tiles_range(limit in 0_u64..100_000, width in 1_u64..10_000) {
        let plan = SegmentPlan::new(limit, width).unwrap();
        let expected = ((limit + 1) as u128).div_ceil(width as u128) as usize;
        prop_assert_eq!(plan.len(), expected);

        let mut next_low = 0_u64;
        let mut count = 0;
        for (i, segment) in plan.enumerate() {
            prop_assert_eq!(segment.index, i);
            prop_assert_eq!(segment.low, next_low);
            prop_assert!(segment.low <= segment.high);
            prop_assert!(segment.width() <= width);
            if segment.high != limit {
                prop_assert_eq!(segment.width(), width);
            }
            next_low = segment.high + 1;
            count += 1;
        }
        prop_assert_eq!(next_low, limit + 1);
        prop_assert_eq!(count, expected);
    }
}
