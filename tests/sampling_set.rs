use std::collections::BTreeMap;

use proptest::prelude::*;
use rand::SeedableRng;
use tally_tree::SamplingSet;

fn key_strategy() -> impl Strategy<Value = i32> {
    -500i32..500i32
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(20))]

    /// Random insert/remove/re-weight workload against a weight-map model:
    /// totals stay exact and the audit holds throughout.
    #[test]
    fn weights_track_the_model(ops in proptest::collection::vec((key_strategy(), 0u64..50, 0u8..3), 1..600)) {
        let mut set: SamplingSet<i32, u64> = SamplingSet::new();
        let mut model: BTreeMap<i32, u64> = BTreeMap::new();

        for (k, w, op) in ops {
            match op {
                0 => {
                    let inserted = set.insert(k, w);
                    prop_assert_eq!(inserted, !model.contains_key(&k));
                    // An existing key keeps its weight.
                    model.entry(k).or_insert(w);
                }
                1 => {
                    prop_assert_eq!(set.remove(&k), model.remove(&k).is_some());
                }
                _ => {
                    let known = set.set_weight(&k, w);
                    prop_assert_eq!(known, model.contains_key(&k));
                    if known {
                        model.insert(k, w);
                    }
                }
            }

            prop_assert!(set.check_consistency());
            prop_assert_eq!(set.len(), model.len());
            prop_assert_eq!(set.total_weight(), model.values().sum::<u64>());
        }

        let keys: Vec<_> = set.iter().map(|(&k, _)| k).collect();
        let expected: Vec<_> = model.keys().copied().collect();
        prop_assert_eq!(keys, expected);
    }

    /// Every admissible position resolves to the key whose cumulative
    /// weight interval contains it.
    #[test]
    fn positions_resolve_by_cumulative_weight(
        entries in proptest::collection::btree_map(key_strategy(), 1u64..8, 1..24)
    ) {
        let set: SamplingSet<i32, u64> = entries.iter().map(|(&k, &w)| (k, w)).collect();

        let mut position = 0u64;
        for (&key, &weight) in &entries {
            for _ in 0..weight {
                prop_assert_eq!(set.sample_at(position), &key);
                position += 1;
            }
        }
    }
}

#[test]
fn insert_erase_contains() {
    let mut set: SamplingSet<String, u32> = SamplingSet::new();

    assert!(!set.remove("a"));
    assert!(set.insert("a".into(), 2));
    assert!(set.insert("b".into(), 3));
    assert!(!set.insert("a".into(), 9));

    assert!(set.contains("a"));
    assert!(!set.contains("c"));
    assert_eq!(set.len(), 2);
    // The duplicate insert of "a" kept its original weight.
    assert_eq!(set.total_weight(), 5);

    assert!(set.remove("a"));
    assert_eq!(set.total_weight(), 3);
    assert!(set.check_consistency());
}

#[test]
fn position_sampling_returns_keys() {
    let set: SamplingSet<i32, u32> = SamplingSet::from([(0, 1), (1, 2), (2, 1)]);
    assert_eq!(set.total_weight(), 4);

    assert_eq!(set.sample_at(0), &0);
    assert_eq!(set.sample_at(1), &1);
    assert_eq!(set.sample_at(2), &1);
    assert_eq!(set.sample_at(3), &2);
}

#[test]
fn float_boundary_returns_the_last_key() {
    let set: SamplingSet<&str, f32> = SamplingSet::from([("a", 1.5), ("b", 0.0), ("c", 2.0)]);
    assert_eq!(set.total_weight(), 3.5);

    assert_eq!(set.sample_at(1.5), &"c");
    assert_eq!(set.sample_at(3.5), &"c");
    assert_eq!(set.sample_scaled(1.0), &"c");
}

#[test]
fn rng_sampling_returns_weighted_keys() {
    let set: SamplingSet<&str, u32> = SamplingSet::from([("heads", 1), ("tails", 1)]);
    let mut rng = rand::rngs::StdRng::seed_from_u64(11);

    for _ in 0..20 {
        let key = set.sample(&mut rng);
        assert!(*key == "heads" || *key == "tails");
    }
}

#[test]
#[should_panic(expected = "nothing to sample")]
fn sampling_an_empty_set_panics() {
    let set: SamplingSet<i32, u32> = SamplingSet::new();
    let mut rng = rand::rngs::StdRng::seed_from_u64(0);
    let _ = set.sample(&mut rng);
}

#[test]
#[should_panic(expected = "position out of range")]
fn out_of_range_position_panics() {
    let set: SamplingSet<i32, u32> = SamplingSet::from([(1, 4)]);
    let _ = set.sample_at(4);
}

#[test]
fn linearize_preserves_weights() {
    let set: SamplingSet<i32, u32> = SamplingSet::from([(3, 30), (1, 10), (2, 20)]);
    assert_eq!(set.linearize(), [(1, 10), (2, 20), (3, 30)]);

    let rebuilt: SamplingSet<i32, u32> = set.linearize().into_iter().collect();
    assert_eq!(rebuilt.total_weight(), 60);
    assert!(rebuilt.check_consistency());
}
