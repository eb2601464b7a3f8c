//! RobinHashMap: public map over the slot table and the ordering list.

use crate::cursor::{Cursor, CursorMut, IntoIter, Iter, IterMut, Keys, Values, ValuesMut};
use crate::node_list::{Handle, NodeId, NodeList};
use crate::slot_table::SlotTable;
use core::borrow::Borrow;
use core::fmt;
use core::hash::{BuildHasher, Hash, Hasher};
use core::ops::Index;
use hashbrown::hash_map::DefaultHashBuilder;

/// Maximum ratio of elements to slots; growth keeps `len * LOAD_FACTOR <= capacity`.
/// Also the slot count of a freshly constructed map.
pub const LOAD_FACTOR: usize = 3;

/// Hash map with robin-hood open addressing and newest-first iteration.
pub struct RobinHashMap<K, V, S = DefaultHashBuilder> {
    pub(crate) hasher: S,
    pub(crate) table: SlotTable,
    pub(crate) nodes: NodeList<K, V>,
}

/// Checked access (`at`) on a key the map does not hold.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct OutOfRange;

impl fmt::Display for OutOfRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("key not found in map")
    }
}

impl std::error::Error for OutOfRange {}

/// Smallest slot count on the doubling schedule that holds `n` elements.
///
/// Panics with "capacity overflow" when no such count fits in `usize`.
fn capacity_for(n: usize) -> usize {
    let want = n.checked_mul(LOAD_FACTOR).expect("capacity overflow");
    let mut cap = LOAD_FACTOR;
    while want > cap {
        cap = cap.checked_mul(2).expect("capacity overflow");
    }
    cap
}

impl<K, V> RobinHashMap<K, V>
where
    K: Eq + Hash,
{
    pub fn new() -> Self {
        Self::with_hasher(Default::default())
    }

    pub fn with_capacity(n: usize) -> Self {
        Self::with_capacity_and_hasher(n, Default::default())
    }
}

impl<K, V, S> RobinHashMap<K, V, S>
where
    K: Eq + Hash,
    S: BuildHasher,
{
    pub fn with_hasher(hasher: S) -> Self {
        Self::with_capacity_and_hasher(0, hasher)
    }

    pub fn with_capacity_and_hasher(n: usize, hasher: S) -> Self {
        Self {
            hasher,
            table: SlotTable::with_capacity(capacity_for(n)),
            nodes: NodeList::with_capacity(n),
        }
    }

    /// Build from pairs with a caller-supplied hash builder. Later duplicates
    /// of a key are dropped.
    pub fn from_iter_with_hasher<I>(iter: I, hasher: S) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
    {
        let mut map = Self::with_hasher(hasher);
        map.extend(iter);
        map
    }

    fn make_hash<Q>(&self, q: &Q) -> u64
    where
        Q: ?Sized + Hash,
    {
        let mut h = self.hasher.build_hasher();
        q.hash(&mut h);
        h.finish()
    }

    fn find_pos<Q>(&self, q: &Q) -> Option<usize>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        let hash = self.make_hash(q);
        self.table.find(&self.nodes, hash, |k| k.borrow() == q)
    }

    fn find_id<Q>(&self, q: &Q) -> Option<NodeId>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        self.find_pos(q).and_then(|pos| self.table.get(pos))
    }

    /// Link a new node at the head, index it, and grow if the load factor is
    /// now exceeded. The caller has already checked the key is absent.
    fn insert_new(&mut self, key: K, value: V, hash: u64) -> NodeId {
        let id = self.nodes.push_front(key, value, hash);
        self.table.place(&mut self.nodes, id);
        if self.nodes.len() * LOAD_FACTOR > self.table.capacity() {
            let doubled = self.table.capacity().checked_mul(2).expect("capacity overflow");
            self.table.rebuild(&mut self.nodes, doubled);
        }
        id
    }

    /// Insert `key -> value` unless `key` is already present.
    ///
    /// A present key is not an error: the first value stays, `value` is
    /// dropped, and `None` is returned. Otherwise returns the new entry's handle.
    pub fn insert(&mut self, key: K, value: V) -> Option<Handle> {
        self.insert_with(key, || value)
    }

    /// Like `insert`, but only builds the value when the key is absent.
    pub fn insert_with<F>(&mut self, key: K, default: F) -> Option<Handle>
    where
        F: FnOnce() -> V,
    {
        let hash = self.make_hash(&key);
        if self.table.find(&self.nodes, hash, |k| *k == key).is_some() {
            return None;
        }
        let id = self.insert_new(key, default(), hash);
        Some(self.nodes.handle(id))
    }

    /// Value for `key`, inserting `default()` first when absent.
    pub fn get_or_insert_with<F>(&mut self, key: K, default: F) -> &mut V
    where
        F: FnOnce() -> V,
    {
        let hash = self.make_hash(&key);
        let id = match self.table.find(&self.nodes, hash, |k| *k == key) {
            Some(pos) => self.table.get(pos),
            None => None,
        };
        let id = match id {
            Some(id) => id,
            None => self.insert_new(key, default(), hash),
        };
        &mut self.nodes.node_mut(id).value
    }

    /// Bracket access: value for `key`, inserting `V::default()` when absent.
    pub fn get_or_default(&mut self, key: K) -> &mut V
    where
        V: Default,
    {
        self.get_or_insert_with(key, V::default)
    }

    pub fn contains_key<Q>(&self, q: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        self.find_pos(q).is_some()
    }

    pub fn get<Q>(&self, q: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        self.find_id(q).map(|id| &self.nodes.node(id).value)
    }

    pub fn get_mut<Q>(&mut self, q: &Q) -> Option<&mut V>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        let id = self.find_id(q)?;
        Some(&mut self.nodes.node_mut(id).value)
    }

    pub fn get_key_value<Q>(&self, q: &Q) -> Option<(&K, &V)>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        self.find_id(q).map(|id| {
            let node = self.nodes.node(id);
            (&node.key, &node.value)
        })
    }

    /// Checked access: `Err(OutOfRange)` when `key` is absent.
    pub fn at<Q>(&self, q: &Q) -> Result<&V, OutOfRange>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        self.get(q).ok_or(OutOfRange)
    }

    pub fn at_mut<Q>(&mut self, q: &Q) -> Result<&mut V, OutOfRange>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        self.get_mut(q).ok_or(OutOfRange)
    }

    /// Remove `key`, returning the owned pair. Absent keys are a no-op.
    pub fn remove_entry<Q>(&mut self, q: &Q) -> Option<(K, V)>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        let pos = self.find_pos(q)?;
        self.remove_at(pos)
    }

    pub fn remove<Q>(&mut self, q: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        self.remove_entry(q).map(|(_, v)| v)
    }

    /// Remove `key` and drop its pair. Returns whether anything was removed.
    pub fn erase<Q>(&mut self, q: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        self.remove_entry(q).is_some()
    }

    /// Remove the entry a handle refers to. Stale handles and handles issued
    /// by another map are a no-op.
    pub fn remove_handle(&mut self, handle: Handle) -> Option<(K, V)> {
        let id = handle.id_in(&self.nodes)?;
        self.remove_node(id)
    }

    pub fn find<Q>(&self, q: &Q) -> Cursor<'_, K, V, S>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        Cursor::new(self, self.find_id(q))
    }

    pub fn find_mut<Q>(&mut self, q: &Q) -> CursorMut<'_, K, V, S>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        let id = self.find_id(q);
        CursorMut::new(self, id)
    }

    /// Grow so that `additional` more elements fit without a rebuild.
    pub fn reserve(&mut self, additional: usize) {
        let n = self.len().checked_add(additional).expect("capacity overflow");
        let want = capacity_for(n);
        if want > self.table.capacity() {
            self.table.rebuild(&mut self.nodes, want);
        }
    }

    #[cfg(test)]
    pub(crate) fn check_invariants(&self) {
        self.nodes.check_links();
        self.table.check_against(&self.nodes);
        assert!(
            self.len() * LOAD_FACTOR <= self.capacity(),
            "load factor exceeded: {} elements in {} slots",
            self.len(),
            self.capacity()
        );
    }
}

// Operations that never hash a key.
impl<K, V, S> RobinHashMap<K, V, S> {
    pub fn len(&self) -> usize {
        self.nodes.len()
    }
    pub fn is_empty(&self) -> bool {
        self.nodes.len() == 0
    }
    /// Number of slots in the probing table.
    pub fn capacity(&self) -> usize {
        self.table.capacity()
    }
    /// The hash builder supplied at construction.
    pub fn hasher(&self) -> &S {
        &self.hasher
    }

    /// Drop every entry. Capacity is kept.
    pub fn clear(&mut self) {
        self.table.clear();
        self.nodes.clear();
    }

    pub(crate) fn remove_at(&mut self, pos: usize) -> Option<(K, V)> {
        let id = self.table.remove_at(&mut self.nodes, pos)?;
        self.nodes.unlink(id).map(|n| (n.key, n.value))
    }

    pub(crate) fn remove_node(&mut self, id: NodeId) -> Option<(K, V)> {
        let pos = self.table.position_of(&self.nodes, id)?;
        self.remove_at(pos)
    }

    /// Cursor at the most recently inserted entry.
    pub fn begin(&self) -> Cursor<'_, K, V, S> {
        Cursor::new(self, self.nodes.head())
    }

    /// Past-the-end cursor; every miss from `find` compares equal to it.
    pub fn end(&self) -> Cursor<'_, K, V, S> {
        Cursor::new(self, None)
    }

    pub fn begin_mut(&mut self) -> CursorMut<'_, K, V, S> {
        let head = self.nodes.head();
        CursorMut::new(self, head)
    }

    pub fn end_mut(&mut self) -> CursorMut<'_, K, V, S> {
        CursorMut::new(self, None)
    }

    pub fn iter(&self) -> Iter<'_, K, V> {
        Iter::new(&self.nodes)
    }

    pub fn iter_mut(&mut self) -> IterMut<'_, K, V> {
        IterMut::new(&mut self.nodes)
    }

    pub fn keys(&self) -> Keys<'_, K, V> {
        Keys::new(self.iter())
    }

    pub fn values(&self) -> Values<'_, K, V> {
        Values::new(self.iter())
    }

    pub fn values_mut(&mut self) -> ValuesMut<'_, K, V> {
        ValuesMut::new(self.iter_mut())
    }
}

impl<K, V> Default for RobinHashMap<K, V>
where
    K: Eq + Hash,
{
    fn default() -> Self {
        Self::new()
    }
}

/// Copies snapshot the pairs oldest-first into a fresh table: the copy has the
/// same traversal order and shares no storage with the source.
impl<K, V, S> Clone for RobinHashMap<K, V, S>
where
    K: Eq + Hash + Clone,
    V: Clone,
    S: BuildHasher + Clone,
{
    fn clone(&self) -> Self {
        let mut copy = Self::with_capacity_and_hasher(self.len(), self.hasher.clone());
        copy.extend(self.iter().rev().map(|(k, v)| (k.clone(), v.clone())));
        copy
    }

    fn clone_from(&mut self, source: &Self) {
        let pairs: Vec<(K, V)> = source
            .iter()
            .rev()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect();
        *self = Self::with_capacity_and_hasher(pairs.len(), source.hasher.clone());
        self.extend(pairs);
    }
}

impl<K, V, S> fmt::Debug for RobinHashMap<K, V, S>
where
    K: fmt::Debug,
    V: fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

/// Maps are equal when they hold the same key -> value mapping, in any order.
impl<K, V, S> PartialEq for RobinHashMap<K, V, S>
where
    K: Eq + Hash,
    V: PartialEq,
    S: BuildHasher,
{
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len() && self.iter().all(|(k, v)| other.get(k) == Some(v))
    }
}

impl<K, V, S> Eq for RobinHashMap<K, V, S>
where
    K: Eq + Hash,
    V: Eq,
    S: BuildHasher,
{
}

impl<K, Q, V, S> Index<&Q> for RobinHashMap<K, V, S>
where
    K: Eq + Hash + Borrow<Q>,
    Q: ?Sized + Eq + Hash,
    S: BuildHasher,
{
    type Output = V;

    /// Panics when `key` is absent; use `at` for the checked form.
    fn index(&self, key: &Q) -> &V {
        self.get(key).expect("key not found in RobinHashMap")
    }
}

impl<K, V, S> Extend<(K, V)> for RobinHashMap<K, V, S>
where
    K: Eq + Hash,
    S: BuildHasher,
{
    fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iter: I) {
        for (k, v) in iter {
            self.insert(k, v);
        }
    }
}

impl<K, V, S> FromIterator<(K, V)> for RobinHashMap<K, V, S>
where
    K: Eq + Hash,
    S: BuildHasher + Default,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self::from_iter_with_hasher(iter, S::default())
    }
}

impl<K, V, const N: usize> From<[(K, V); N]> for RobinHashMap<K, V>
where
    K: Eq + Hash,
{
    fn from(pairs: [(K, V); N]) -> Self {
        let mut map = Self::with_capacity(N);
        map.extend(pairs);
        map
    }
}

impl<K, V, S> IntoIterator for RobinHashMap<K, V, S> {
    type Item = (K, V);
    type IntoIter = IntoIter<K, V>;

    fn into_iter(self) -> IntoIter<K, V> {
        IntoIter::new(self.nodes)
    }
}

impl<'a, K, V, S> IntoIterator for &'a RobinHashMap<K, V, S> {
    type Item = (&'a K, &'a V);
    type IntoIter = Iter<'a, K, V>;

    fn into_iter(self) -> Iter<'a, K, V> {
        self.iter()
    }
}

impl<'a, K, V, S> IntoIterator for &'a mut RobinHashMap<K, V, S> {
    type Item = (&'a K, &'a mut V);
    type IntoIter = IterMut<'a, K, V>;

    fn into_iter(self) -> IterMut<'a, K, V> {
        self.iter_mut()
    }
}
