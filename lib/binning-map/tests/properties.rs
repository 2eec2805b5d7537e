use binning_map::{resolve_nearest, BinningMap, Interval};
use proptest::prelude::*;

fn arb_intervals() -> impl Strategy<Value = Vec<f64>> {
    // Quarter steps keep every interval exactly representable, so distances between them are exact.
    proptest::collection::hash_set(-4_000i32..4_000, 1..32)
        .prop_map(|set| set.into_iter().map(|n| f64::from(n) / 4.0).collect())
}

fn arb_key() -> impl Strategy<Value = f64> {
    prop_oneof![
        -2_000.0f64..2_000.0,
        Just(f64::INFINITY),
        Just(f64::NEG_INFINITY),
        (-8_000i32..8_000).prop_map(|n| f64::from(n) / 8.0),
    ]
}

fn is_strictly_ascending(intervals: &[f64]) -> bool {
    intervals.windows(2).all(|pair| pair[0] < pair[1])
}

proptest! {
    #[test]
    fn property_test_construction_orders_intervals(intervals in arb_intervals()) {
        let map = BinningMap::<u64>::new(intervals.iter().copied()).unwrap();

        let mut expected = intervals.clone();
        expected.sort_by(f64::total_cmp);
        prop_assert_eq!(map.interval_values(), expected);
    }

    #[test]
    fn property_test_map_agrees_with_resolver(intervals in arb_intervals(), keys in proptest::collection::vec(arb_key(), 1..64)) {
        let map = BinningMap::<u64>::new(intervals.iter().copied()).unwrap();
        let sorted = map.intervals().map(|v| Interval::new(v).unwrap()).collect::<Vec<_>>();

        // Keys are resolved twice, so that the second pass is served from the resolution cache.
        for _ in 0..2 {
            for key in &keys {
                let expected = resolve_nearest(&sorted, *key).unwrap().value();
                prop_assert_eq!(map.resolve(*key).unwrap(), expected);
            }
        }
    }

    #[test]
    fn property_test_set_get_round_trip(intervals in arb_intervals(), key in arb_key(), value in any::<u32>()) {
        let mut map = BinningMap::<u32>::new(intervals.iter().copied()).unwrap();
        map.set(key, value).unwrap();

        prop_assert_eq!(map.get(key).unwrap(), &value);
        prop_assert_eq!(map.get(key).unwrap(), &value);
        prop_assert_eq!(map.get(map.resolve(key).unwrap()).unwrap(), &value);
    }

    #[test]
    fn property_test_order_invariant_under_mutation(
        intervals in arb_intervals(),
        deletes in proptest::collection::vec(arb_key(), 0..8),
        updates in proptest::collection::vec((arb_key(), any::<u32>()), 0..16),
    ) {
        let mut map = BinningMap::<u32>::new(intervals.iter().copied()).unwrap();

        for key in deletes {
            if map.len() > 1 {
                map.delete(key).unwrap();
                prop_assert!(is_strictly_ascending(&map.interval_values()));
            }
        }

        let before = map.len();
        map.update(updates.iter().copied()).unwrap();
        prop_assert!(is_strictly_ascending(&map.interval_values()));
        prop_assert!(map.len() >= before);

        // Every literal key given to the update is an interval afterwards.
        for (key, _) in &updates {
            prop_assert!(map.contains_interval(*key));
        }
    }
}
