#![cfg(test)]

// Property tests for RobinHashMap kept inside the crate so every step can run
// the internal structural checks (`check_invariants`).

use crate::{OutOfRange, RobinHashMap};
use core::hash::{BuildHasherDefault, Hasher};
use proptest::prelude::*;
use std::cell::Cell;
use std::collections::HashMap;

/// Folds every key into four hash values so clusters, wrap-around and long
/// backward shifts are exercised constantly.
#[derive(Default)]
struct FewBuckets(u64);

impl Hasher for FewBuckets {
    fn finish(&self) -> u64 {
        self.0 % 4
    }
    fn write(&mut self, bytes: &[u8]) {
        for &b in bytes {
            self.0 = self.0.wrapping_mul(31).wrapping_add(b as u64);
        }
    }
}

type Crowded = RobinHashMap<u8, i32, BuildHasherDefault<FewBuckets>>;

#[derive(Clone, Debug)]
enum Op {
    Insert(u8, i32),
    InsertWith(u8, i32),
    Remove(u8),
    Erase(u8),
    GetOrDefault(u8),
    Mutate(u8, i32),
    At(u8),
    RemoveAtCursor(u8),
    Clear,
}

fn arb_op() -> impl Strategy<Value = Op> {
    // Small key space so inserts collide with live keys and removes hit.
    let key = 0u8..24;
    prop_oneof![
        4 => (key.clone(), any::<i32>()).prop_map(|(k, v)| Op::Insert(k, v)),
        2 => (key.clone(), any::<i32>()).prop_map(|(k, v)| Op::InsertWith(k, v)),
        2 => key.clone().prop_map(Op::Remove),
        1 => key.clone().prop_map(Op::Erase),
        1 => key.clone().prop_map(Op::GetOrDefault),
        1 => (key.clone(), any::<i32>()).prop_map(|(k, d)| Op::Mutate(k, d)),
        1 => key.clone().prop_map(Op::At),
        1 => key.prop_map(Op::RemoveAtCursor),
        1 => Just(Op::Clear),
    ]
}

/// Drop `k` from the newest-first order model.
fn unlink(order: &mut Vec<u8>, k: u8) {
    order.retain(|&x| x != k);
}

// Property: state-machine equivalence against std::collections::HashMap plus
// an explicit order model.
// - Duplicate inserts are rejected and leave the stored value untouched.
// - `insert_with` builds its value only for absent keys.
// - `remove`/`erase`/cursor removal return exactly what the model holds.
// - Traversal lists live keys newest first, after every operation.
// - Slot displacements, robin-hood ordering, list links and the load factor
//   all hold after every operation.
proptest! {
    #![proptest_config(ProptestConfig { cases: 128, .. ProptestConfig::default() })]
    #[test]
    fn prop_state_machine(ops in proptest::collection::vec(arb_op(), 1..120)) {
        let mut sut: Crowded = RobinHashMap::with_hasher(Default::default());
        let mut model: HashMap<u8, i32> = HashMap::new();
        let mut order: Vec<u8> = Vec::new();
        let mut max_cap = sut.capacity();
        let builds = Cell::new(0usize);

        for op in ops {
            match op {
                Op::Insert(k, v) => {
                    let res = sut.insert(k, v);
                    if model.contains_key(&k) {
                        prop_assert!(res.is_none());
                    } else {
                        let h = res.unwrap();
                        prop_assert_eq!(h.value_ref(&sut), Some(&v));
                        model.insert(k, v);
                        order.insert(0, k);
                    }
                }
                Op::InsertWith(k, v) => {
                    let before = builds.get();
                    let res = sut.insert_with(k, || { builds.set(builds.get() + 1); v });
                    if model.contains_key(&k) {
                        prop_assert!(res.is_none());
                        prop_assert_eq!(builds.get(), before);
                    } else {
                        prop_assert!(res.is_some());
                        prop_assert_eq!(builds.get(), before + 1);
                        model.insert(k, v);
                        order.insert(0, k);
                    }
                }
                Op::Remove(k) => {
                    prop_assert_eq!(sut.remove(&k), model.remove(&k));
                    unlink(&mut order, k);
                }
                Op::Erase(k) => {
                    prop_assert_eq!(sut.erase(&k), model.remove(&k).is_some());
                    unlink(&mut order, k);
                }
                Op::GetOrDefault(k) => {
                    let expected = *model.entry(k).or_insert_with(|| {
                        order.insert(0, k);
                        0
                    });
                    prop_assert_eq!(*sut.get_or_default(k), expected);
                }
                Op::Mutate(k, d) => {
                    if let Some(v) = sut.get_mut(&k) {
                        *v = v.wrapping_add(d);
                    }
                    if let Some(v) = model.get_mut(&k) {
                        *v = v.wrapping_add(d);
                    }
                }
                Op::At(k) => {
                    prop_assert_eq!(sut.at(&k).copied(), model.get(&k).copied().ok_or(OutOfRange));
                }
                Op::RemoveAtCursor(k) => {
                    let mut c = sut.find_mut(&k);
                    let removed = c.remove_current();
                    let next = c.key().copied();
                    let pos = order.iter().position(|&x| x == k);
                    prop_assert_eq!(removed, model.remove(&k).map(|v| (k, v)));
                    if let Some(p) = pos {
                        order.remove(p);
                        prop_assert_eq!(next, order.get(p).copied());
                    }
                }
                Op::Clear => {
                    sut.clear();
                    model.clear();
                    order.clear();
                }
            }

            sut.check_invariants();
            prop_assert!(sut.capacity() >= max_cap, "capacity shrank");
            max_cap = sut.capacity();
            prop_assert_eq!(sut.len(), model.len());
            prop_assert_eq!(sut.is_empty(), model.is_empty());
            let keys: Vec<u8> = sut.keys().copied().collect();
            prop_assert_eq!(&keys, &order);
            for (k, v) in &model {
                prop_assert_eq!(sut.get(k), Some(v));
            }
        }
    }
}

// Property: copies are independent and keep the source's traversal order.
proptest! {
    #![proptest_config(ProptestConfig { cases: 64, .. ProptestConfig::default() })]
    #[test]
    fn prop_clone_independent(
        keys in proptest::collection::vec(any::<u8>(), 0..60),
        extra in proptest::collection::vec(any::<u8>(), 1..20),
    ) {
        let src: Crowded = keys.iter().map(|&k| (k, k as i32)).collect();
        let snapshot: Vec<(u8, i32)> = src.iter().map(|(k, v)| (*k, *v)).collect();

        let mut copy = src.clone();
        copy.check_invariants();
        prop_assert_eq!(copy.iter().map(|(k, v)| (*k, *v)).collect::<Vec<_>>(), snapshot.clone());

        for k in extra {
            if copy.erase(&k) {
                continue;
            }
            copy.insert(k, -1);
        }
        copy.check_invariants();
        src.check_invariants();
        prop_assert_eq!(src.iter().map(|(k, v)| (*k, *v)).collect::<Vec<_>>(), snapshot);
    }
}
