use std::collections::BTreeMap;

use proptest::prelude::*;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use tally_tree::{Cursor, OrderStatMap, Rank};

/// The number of operations to perform in each proptest case.
const TEST_SIZE: usize = 2_000;

/// Keys drawn from a range small enough to force collisions.
fn key_strategy() -> impl Strategy<Value = i64> {
    -5_000i64..5_000i64
}

fn value_strategy() -> impl Strategy<Value = i64> {
    any::<i64>()
}

// ─── Operations enum for driving randomized tests ────────────────────────────

#[derive(Debug, Clone)]
enum MapOp {
    Insert(i64, i64),
    Remove(i64),
    Get(i64),
    ContainsKey(i64),
    GetKeyValue(i64),
    RankOf(i64),
    GetByRank(usize),
    FirstKeyValue,
    LastKeyValue,
}

fn map_op_strategy() -> impl Strategy<Value = MapOp> {
    prop_oneof![
        5 => (key_strategy(), value_strategy()).prop_map(|(k, v)| MapOp::Insert(k, v)),
        3 => key_strategy().prop_map(MapOp::Remove),
        2 => key_strategy().prop_map(MapOp::Get),
        1 => key_strategy().prop_map(MapOp::ContainsKey),
        1 => key_strategy().prop_map(MapOp::GetKeyValue),
        2 => key_strategy().prop_map(MapOp::RankOf),
        2 => any::<usize>().prop_map(MapOp::GetByRank),
        1 => Just(MapOp::FirstKeyValue),
        1 => Just(MapOp::LastKeyValue),
    ]
}

// ─── Core CRUD operations ────────────────────────────────────────────────────

proptest! {
    #![proptest_config(ProptestConfig::with_cases(20))]

    /// Replays a random sequence of operations on both OrderStatMap and
    /// BTreeMap and asserts identical results at every step.
    #[test]
    fn map_ops_match_btreemap(ops in proptest::collection::vec(map_op_strategy(), TEST_SIZE)) {
        let mut os_map: OrderStatMap<i64, i64> = OrderStatMap::new();
        let mut bt_map: BTreeMap<i64, i64> = BTreeMap::new();

        for op in &ops {
            match op {
                MapOp::Insert(k, v) => {
                    let (cursor, inserted) = os_map.insert(*k, *v);
                    let bt_result = bt_map.insert(*k, *v);
                    prop_assert_eq!(inserted, bt_result.is_none(), "insert({}, {})", k, v);
                    prop_assert_eq!(os_map.get_at(cursor), (k, v));
                }
                MapOp::Remove(k) => {
                    let os_result = os_map.remove(k);
                    let bt_result = bt_map.remove(k);
                    prop_assert_eq!(os_result, bt_result, "remove({})", k);
                }
                MapOp::Get(k) => {
                    prop_assert_eq!(os_map.get(k), bt_map.get(k), "get({})", k);
                }
                MapOp::ContainsKey(k) => {
                    prop_assert_eq!(os_map.contains_key(k), bt_map.contains_key(k), "contains_key({})", k);
                }
                MapOp::GetKeyValue(k) => {
                    prop_assert_eq!(os_map.get_key_value(k), bt_map.get_key_value(k), "get_key_value({})", k);
                }
                MapOp::RankOf(k) => {
                    let expected = if bt_map.contains_key(k) {
                        Some(bt_map.range(..*k).count())
                    } else {
                        None
                    };
                    prop_assert_eq!(os_map.rank_of(k), expected, "rank_of({})", k);
                }
                MapOp::GetByRank(r) => {
                    let rank = if bt_map.is_empty() { *r } else { r % (bt_map.len() + 1) };
                    let os_result = os_map.get_by_rank(rank);
                    let bt_result = bt_map.iter().nth(rank);
                    prop_assert_eq!(os_result, bt_result, "get_by_rank({})", rank);
                }
                MapOp::FirstKeyValue => {
                    prop_assert_eq!(os_map.first_key_value(), bt_map.first_key_value());
                }
                MapOp::LastKeyValue => {
                    prop_assert_eq!(os_map.last_key_value(), bt_map.last_key_value());
                }
            }
            prop_assert_eq!(os_map.len(), bt_map.len(), "len mismatch after {:?}", op);
            prop_assert_eq!(os_map.is_empty(), bt_map.is_empty());
        }

        prop_assert!(os_map.check_consistency());
    }

    /// Audits the full invariant set after every single mutation of a
    /// shorter random workload.
    #[test]
    fn every_mutation_preserves_invariants(ops in proptest::collection::vec((key_strategy(), any::<bool>()), 1..300)) {
        let mut os_map: OrderStatMap<i64, u32> = OrderStatMap::new();
        let mut stamp = 0u32;

        for (k, insert) in ops {
            if insert {
                os_map.insert(k, stamp);
                stamp += 1;
            } else {
                os_map.remove(&k);
            }
            prop_assert!(os_map.check_consistency(), "invariants broken after touching {}", k);
        }
    }

    /// Iteration order matches BTreeMap after random insertions.
    #[test]
    fn iter_matches_btreemap(entries in proptest::collection::vec((key_strategy(), value_strategy()), TEST_SIZE)) {
        let mut os_map: OrderStatMap<i64, i64> = OrderStatMap::new();
        let mut bt_map: BTreeMap<i64, i64> = BTreeMap::new();

        for (k, v) in &entries {
            os_map.insert(*k, *v);
            bt_map.insert(*k, *v);
        }

        // Forward iteration
        let os_items: Vec<_> = os_map.iter().map(|(&k, &v)| (k, v)).collect();
        let bt_items: Vec<_> = bt_map.iter().map(|(&k, &v)| (k, v)).collect();
        prop_assert_eq!(&os_items, &bt_items, "iter() mismatch");

        // Reverse iteration
        let os_rev: Vec<_> = os_map.iter().rev().map(|(&k, &v)| (k, v)).collect();
        let bt_rev: Vec<_> = bt_map.iter().rev().map(|(&k, &v)| (k, v)).collect();
        prop_assert_eq!(&os_rev, &bt_rev, "iter().rev() mismatch");

        // Keys and values
        let os_keys: Vec<_> = os_map.keys().copied().collect();
        let bt_keys: Vec<_> = bt_map.keys().copied().collect();
        prop_assert_eq!(&os_keys, &bt_keys, "keys() mismatch");

        let os_vals: Vec<_> = os_map.values().copied().collect();
        let bt_vals: Vec<_> = bt_map.values().copied().collect();
        prop_assert_eq!(&os_vals, &bt_vals, "values() mismatch");

        // Owning iteration
        let os_into: Vec<_> = os_map.clone().into_iter().collect();
        let bt_into: Vec<_> = bt_map.clone().into_iter().collect();
        prop_assert_eq!(&os_into, &bt_into, "into_iter() mismatch");
    }

    /// `get_by_rank(i).0` walks the sorted keys, and `rank_of` inverts it.
    #[test]
    fn ranks_are_a_bijection(entries in proptest::collection::btree_map(key_strategy(), value_strategy(), 1..256)) {
        let os_map: OrderStatMap<i64, i64> = entries.iter().map(|(&k, &v)| (k, v)).collect();

        for (rank, (&key, &value)) in entries.iter().enumerate() {
            prop_assert_eq!(os_map.get_by_rank(rank), Some((&key, &value)));
            prop_assert_eq!(os_map.rank_of(&key), Some(rank));
            let cursor = os_map.find_by_rank(rank);
            prop_assert_eq!(os_map.rank_at(cursor), rank);
        }
        prop_assert!(os_map.get_by_rank(entries.len()).is_none());
    }

    /// Linearize, rebuild, linearize again: contents and order round-trip
    /// (the internal tree shape is allowed to differ).
    #[test]
    fn linearize_round_trips(entries in proptest::collection::vec((key_strategy(), value_strategy()), 0..512)) {
        let original: OrderStatMap<i64, i64> = entries.iter().copied().collect();
        let linear = original.linearize();

        let rebuilt: OrderStatMap<i64, i64> = linear.iter().copied().collect();
        prop_assert!(rebuilt.check_consistency());
        prop_assert_eq!(rebuilt.linearize(), linear);
        prop_assert_eq!(&rebuilt, &original);
    }

    /// A cursor captured before a batch of unrelated mutations still
    /// dereferences to the same entry.
    #[test]
    fn cursors_survive_unrelated_mutations(
        pinned in key_strategy(),
        churn in proptest::collection::vec((key_strategy(), any::<bool>()), 1..500),
    ) {
        let mut map: OrderStatMap<i64, i64> = OrderStatMap::new();
        let (cursor, _) = map.insert(pinned, -1);

        for (k, insert) in churn {
            if k == pinned {
                continue;
            }
            if insert {
                map.insert(k, 0);
            } else {
                map.remove(&k);
            }
        }

        prop_assert_eq!(map.get_at(cursor), (&pinned, &-1));
        prop_assert_eq!(map.rank_at(cursor), map.rank_of(&pinned).unwrap());
    }
}

// ─── Concrete scenarios ──────────────────────────────────────────────────────

#[test]
fn empty_map_behavior() {
    let mut map: OrderStatMap<&str, i32> = OrderStatMap::new();

    assert!(map.is_empty());
    assert_eq!(map.remove(&"foo"), None);
    assert!(map.find(&"x").is_null());
    assert_eq!(map.get(&"x"), None);
    assert!(map.get_by_rank(0).is_none());
    assert!(map.first().is_null());
    assert!(map.last().is_null());
    assert_eq!(map.iter().count(), 0);
    assert!(map.check_consistency());
}

#[test]
fn insert_find_erase() {
    let mut map: OrderStatMap<String, i32> = OrderStatMap::new();
    assert_eq!(map.remove("foo"), None);

    map.insert("foo".into(), 2);
    map.insert("bar".into(), 1);
    assert_eq!(map.len(), 2);

    assert_eq!(map.get("foo"), Some(&2));
    assert_eq!(map.get("bar"), Some(&1));
    assert!(map.find("baz").is_null());

    // Ranks follow key order: "bar" < "foo".
    assert_eq!(map.rank_of("bar"), Some(0));
    assert_eq!(map.rank_of("foo"), Some(1));
    assert_eq!(map.get_by_rank(0).unwrap().0, "bar");

    // Mutate through a cursor, then erase through it.
    let it_bar = map.find("bar");
    assert!(!it_bar.is_null());
    *map.get_at_mut(it_bar).1 = -4;
    assert_eq!(map.get("bar"), Some(&-4));

    let (key, value) = map.remove_at(it_bar);
    assert_eq!((key.as_str(), value), ("bar", -4));
    assert!(map.check_consistency());

    assert_eq!(map.remove("foo"), Some(2));
    assert_eq!(map.len(), 0);
    assert!(map.check_consistency());

    // Insertion works again after the root has been deleted, and a
    // duplicate insert reports the existing entry.
    let (it_baz, inserted) = map.insert("baz".into(), 3);
    assert!(inserted);
    assert_eq!(map.len(), 1);

    let (it2, inserted2) = map.insert("baz".into(), 6);
    assert!(!inserted2);
    assert_eq!(it_baz, it2);
    assert_eq!(map.get("baz"), Some(&6));
}

#[test]
fn shuffled_insert_random_erase_stays_sorted() {
    let mut rng = rand::rngs::StdRng::seed_from_u64(20_200_613);

    let mut keys: Vec<u32> = (0..100).collect();
    keys.shuffle(&mut rng);

    let mut map: OrderStatMap<u32, u32> = OrderStatMap::new();
    for &k in &keys {
        map.insert(k, k * 10);
        assert!(map.check_consistency());
    }
    assert_eq!(map.len(), 100);

    let mut doomed = keys.clone();
    doomed.shuffle(&mut rng);
    doomed.truncate(75);
    for k in &doomed {
        assert_eq!(map.remove(k), Some(k * 10));
        assert!(map.check_consistency());
    }

    let mut survivors: Vec<u32> = (0..100).filter(|k| !doomed.contains(k)).collect();
    survivors.sort_unstable();
    let in_order: Vec<u32> = map.keys().copied().collect();
    assert_eq!(in_order, survivors);
}

#[test]
fn cursor_navigation_walks_in_order() {
    let map = OrderStatMap::from([(2, "b"), (1, "a"), (3, "c")]);

    let mut cursor = map.first();
    let mut seen = Vec::new();
    while !cursor.is_null() {
        seen.push(*map.get_at(cursor).0);
        cursor = map.next(cursor);
    }
    assert_eq!(seen, [1, 2, 3]);

    let mut cursor = map.last();
    let mut seen = Vec::new();
    while !cursor.is_null() {
        seen.push(*map.get_at(cursor).0);
        cursor = map.prev(cursor);
    }
    assert_eq!(seen, [3, 2, 1]);
}

#[test]
fn indexing_by_rank_and_key() {
    let mut map = OrderStatMap::from([("a", 1), ("c", 3), ("b", 2)]);
    assert_eq!(map[Rank(0)], 1);
    assert_eq!(map[Rank(2)], 3);
    assert_eq!(map[&"b"], 2);

    map[Rank(1)] = 20;
    assert_eq!(map.get(&"b"), Some(&20));
}

#[test]
#[should_panic(expected = "on the null cursor")]
fn advancing_the_null_cursor_panics() {
    let map: OrderStatMap<i32, i32> = OrderStatMap::new();
    let _ = map.next(Cursor::null());
}

#[test]
#[should_panic(expected = "on the null cursor")]
fn decrementing_the_null_cursor_panics() {
    let map: OrderStatMap<i32, i32> = OrderStatMap::new();
    let _ = map.prev(Cursor::null());
}

#[test]
#[should_panic(expected = "should be < len")]
fn find_by_rank_out_of_range_panics() {
    let map = OrderStatMap::from([(1, "a")]);
    let _ = map.find_by_rank(1);
}

#[test]
fn clone_is_deep() {
    let mut original = OrderStatMap::from([(1, "a"), (2, "b")]);
    let copy = original.clone();

    original.insert(3, "c");
    *original.get_at_mut(original.find(&1)).1 = "z";

    assert_eq!(copy.len(), 2);
    assert_eq!(copy.get(&1), Some(&"a"));
    assert!(copy.check_consistency());
}
