// RobinHashMap unit test suite (public API only).
//
// Each test documents what behavior is being verified. The core
// invariants exercised:
// - Uniqueness: the first insert of a key wins; duplicates change nothing.
// - Order: traversal is newest first among live keys, across growth.
// - Lookup: `find` misses compare equal to `end()`; `at` reports OutOfRange.
// - Copies: clones share no storage with the source.
// - Hasher: a custom BuildHasher is stored, exposed, and cloned.
use robin_hashmap::{OutOfRange, RobinHashMap, LOAD_FACTOR};
use std::collections::hash_map::RandomState;
use std::hash::BuildHasher;

fn pairs<K: Copy, V: Copy>(m: &RobinHashMap<K, V, impl BuildHasher>) -> Vec<(K, V)> {
    m.iter().map(|(k, v)| (*k, *v)).collect()
}

// Test: the walkthrough scenario with the default load factor.
// Verifies: growth during the first inserts does not disturb order or
// values; erase leaves the remaining pair order intact.
#[test]
fn insert_at_erase_scenario() {
    assert_eq!(LOAD_FACTOR, 3);
    let mut m = RobinHashMap::new();
    m.insert(1, "a").unwrap();
    m.insert(2, "b").unwrap();
    m.insert(3, "c").unwrap();

    assert_eq!(m.at(&2), Ok(&"b"));
    assert!(m.erase(&2));
    assert!(m.find(&2) == m.end());
    assert_eq!(m.len(), 2);
    assert_eq!(pairs(&m), vec![(3, "c"), (1, "a")]);
}

// Test: first writer wins.
// Verifies: no handle comes back, stored value and size unchanged.
#[test]
fn duplicate_insert_keeps_first_value() {
    let mut m = RobinHashMap::new();
    m.insert("k", 1).unwrap();
    assert_eq!(m.insert("k", 2), None);
    assert_eq!(m.find("k").pair(), Some((&"k", &1)));
    assert_eq!(m.len(), 1);
}

// Test: erase of an absent key.
// Verifies: no-op, size unchanged, remove reports None.
#[test]
fn erase_absent_is_noop() {
    let mut m: RobinHashMap<i32, i32> = RobinHashMap::from([(1, 1)]);
    assert!(!m.erase(&5));
    assert_eq!(m.remove(&5), None);
    assert_eq!(m.len(), 1);
}

// Test: checked vs defaulting access on an empty map.
// Verifies: `at` errors without inserting; `get_or_default` inserts.
#[test]
fn at_and_get_or_default_on_empty() {
    let mut m: RobinHashMap<String, Vec<u8>> = RobinHashMap::new();
    assert_eq!(m.at("x"), Err(OutOfRange));
    assert_eq!(m.at_mut("x"), Err(OutOfRange));
    assert!(m.is_empty());

    m.get_or_default("x".to_string()).push(7);
    assert_eq!(m.len(), 1);
    assert_eq!(m.at("x"), Ok(&vec![7]));

    // A present key is returned as is, never reset.
    m.get_or_default("x".to_string()).push(8);
    assert_eq!(m["x"], vec![7, 8]);
}

// Test: Index panics on a missing key.
#[test]
#[should_panic(expected = "key not found")]
fn index_missing_panics() {
    let m: RobinHashMap<i32, i32> = RobinHashMap::new();
    let _ = m[&1];
}

// Test: growth correctness.
// Verifies: many rebuilds keep every key reachable, newest first.
#[test]
fn growth_keeps_every_key() {
    let mut m = RobinHashMap::new();
    for i in 0..5_000u32 {
        m.insert(i, i.wrapping_mul(7)).unwrap();
    }
    assert_eq!(m.len(), 5_000);
    assert!(m.len() * LOAD_FACTOR <= m.capacity());
    for i in 0..5_000u32 {
        assert_eq!(m.get(&i), Some(&i.wrapping_mul(7)));
    }
    let keys: Vec<u32> = m.keys().copied().collect();
    let expected: Vec<u32> = (0..5_000u32).rev().collect();
    assert_eq!(keys, expected);
}

// Test: erase interleaved with inserts.
// Verifies: keys removed stay gone, survivors stay reachable, and the
// capacity is never reduced.
#[test]
fn erase_then_reinsert() {
    let mut m = RobinHashMap::new();
    for i in 0..300 {
        m.insert(i, i).unwrap();
    }
    let cap = m.capacity();
    for i in (0..300).filter(|i| i % 2 == 1) {
        assert_eq!(m.remove_entry(&i), Some((i, i)));
    }
    assert_eq!(m.capacity(), cap);
    for i in 0..300 {
        assert_eq!(m.contains_key(&i), i % 2 == 0);
    }
    for i in (0..300).filter(|i| i % 2 == 1) {
        m.insert(i, -i).unwrap();
    }
    assert_eq!(m.len(), 300);
    assert_eq!(m.get(&299), Some(&-299));
    assert_eq!(m.iter().next(), Some((&299, &-299)));
}

// Test: round trip through traversal, clear, and reinsertion.
// Verifies: same size and key -> value mapping.
#[test]
fn round_trip_through_clear() {
    let mut m: RobinHashMap<u64, String> = (0..64u64).map(|i| (i * 31, format!("v{}", i))).collect();
    let before = m.clone();
    let drained: Vec<(u64, String)> = m.iter().map(|(k, v)| (*k, v.clone())).collect();
    m.clear();
    assert!(m.is_empty());
    m.extend(drained);
    assert_eq!(m.len(), before.len());
    assert_eq!(m, before);
}

// Test: copy independence.
// Verifies: mutating a clone leaves the original's size, keys and values.
#[test]
fn clone_is_independent() {
    let mut orig = RobinHashMap::new();
    for i in 0..20 {
        orig.insert(i, i * 2).unwrap();
    }
    let snapshot = pairs(&orig);

    let mut copy = orig.clone();
    assert_eq!(pairs(&copy), snapshot);
    copy.erase(&3);
    copy.insert(100, 0).unwrap();
    *copy.get_mut(&4).unwrap() = -1;

    assert_eq!(pairs(&orig), snapshot);
    assert_eq!(orig.len(), 20);
    assert_ne!(orig, copy);
}

// Test: construction surfaces.
// Verifies: literal list and iterator construction drop later duplicates.
#[test]
fn construct_from_list_and_iter() {
    let m = RobinHashMap::from([(1, 'a'), (2, 'b'), (1, 'z')]);
    assert_eq!(m.len(), 2);
    assert_eq!(m[&1], 'a');
    assert_eq!(pairs(&m), vec![(2, 'b'), (1, 'a')]);

    let n: RobinHashMap<i32, char> = vec![(2, 'b'), (1, 'a')].into_iter().collect();
    assert_eq!(m, n);
}

// Test: custom hash builder.
// Verifies: stored at construction, exposed by `hasher()`, carried by clones
// (RandomState clones keep their keys, so hashes match).
#[test]
fn custom_hasher_is_kept_and_cloned() {
    let s = RandomState::new();
    let m = RobinHashMap::from_iter_with_hasher([(1, 1), (2, 2)], s.clone());
    assert_eq!(m.hasher().hash_one(5u8), s.hash_one(5u8));

    let c = m.clone();
    assert_eq!(c.hasher().hash_one(5u8), s.hash_one(5u8));
    assert_eq!(c.get(&2), Some(&2));
}

// Test: Debug prints in traversal order.
#[test]
fn debug_lists_newest_first() {
    let m = RobinHashMap::from([("a", 1), ("b", 2)]);
    assert_eq!(format!("{:?}", m), r#"{"b": 2, "a": 1}"#);
}

// Test: iter_mut and IntoIterator on references.
// Verifies: mutation through iteration is visible to lookups.
#[test]
fn iter_mut_updates_values() {
    let mut m: RobinHashMap<i32, i32> = (0..10).map(|i| (i, i)).collect();
    for (k, v) in &mut m {
        *v += *k;
    }
    let mut total = 0;
    for (_, v) in &m {
        total += *v;
    }
    assert_eq!(total, 90);
    assert_eq!(m.get(&9), Some(&18));

    let owned: Vec<(i32, i32)> = m.into_iter().collect();
    assert_eq!(owned.first(), Some(&(9, 18)));
    assert_eq!(owned.len(), 10);
}
