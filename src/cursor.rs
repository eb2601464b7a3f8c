//! Traversal over the ordering list: cursors and iterators.
//!
//! Everything here walks `next` links from the newest entry to the oldest and
//! never looks at slot positions.

use crate::node_list::{Handle, Node, NodeId, NodeList};
use crate::robin_hash_map::RobinHashMap;
use core::fmt;
use core::iter::FusedIterator;
use core::marker::PhantomData;
use core::ptr::NonNull;

/// Read-only position in a map's traversal order, or the end position.
///
/// Two cursors are equal when they point at the same entry of the same map.
/// A `find` miss yields the end cursor.
pub struct Cursor<'a, K, V, S> {
    map: &'a RobinHashMap<K, V, S>,
    node: Option<NodeId>,
}

impl<'a, K, V, S> Cursor<'a, K, V, S> {
    pub(crate) fn new(map: &'a RobinHashMap<K, V, S>, node: Option<NodeId>) -> Self {
        Self { map, node }
    }

    fn current(&self) -> Option<&'a Node<K, V>> {
        let map: &'a RobinHashMap<K, V, S> = self.map;
        self.node.and_then(|id| map.nodes.get(id))
    }

    pub fn is_end(&self) -> bool {
        self.node.is_none()
    }

    pub fn handle(&self) -> Option<Handle> {
        self.node.map(|id| self.map.nodes.handle(id))
    }

    pub fn key(&self) -> Option<&'a K> {
        self.current().map(|n| &n.key)
    }

    pub fn value(&self) -> Option<&'a V> {
        self.current().map(|n| &n.value)
    }

    pub fn pair(&self) -> Option<(&'a K, &'a V)> {
        self.current().map(|n| (&n.key, &n.value))
    }

    /// Step to the next older entry. The end cursor stays at the end.
    pub fn move_next(&mut self) {
        self.node = self.node.and_then(|id| self.map.nodes.next(id));
    }

    pub fn peek_next(&self) -> Cursor<'a, K, V, S> {
        let mut c = *self;
        c.move_next();
        c
    }
}

impl<K, V, S> Clone for Cursor<'_, K, V, S> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<K, V, S> Copy for Cursor<'_, K, V, S> {}

impl<K, V, S> PartialEq for Cursor<'_, K, V, S> {
    fn eq(&self, other: &Self) -> bool {
        core::ptr::eq(self.map, other.map) && self.node == other.node
    }
}

impl<K, V, S> Eq for Cursor<'_, K, V, S> {}

impl<K: fmt::Debug, V: fmt::Debug, S> fmt::Debug for Cursor<'_, K, V, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Cursor").field(&self.pair()).finish()
    }
}

/// Mutable cursor. Can edit the value it points at or erase its entry.
pub struct CursorMut<'a, K, V, S> {
    map: &'a mut RobinHashMap<K, V, S>,
    node: Option<NodeId>,
}

impl<'a, K, V, S> CursorMut<'a, K, V, S> {
    pub(crate) fn new(map: &'a mut RobinHashMap<K, V, S>, node: Option<NodeId>) -> Self {
        Self { map, node }
    }

    pub fn is_end(&self) -> bool {
        self.node.is_none()
    }

    pub fn handle(&self) -> Option<Handle> {
        self.node.map(|id| self.map.nodes.handle(id))
    }

    pub fn key(&self) -> Option<&K> {
        self.node.and_then(|id| self.map.nodes.get(id)).map(|n| &n.key)
    }

    pub fn value(&self) -> Option<&V> {
        self.node.and_then(|id| self.map.nodes.get(id)).map(|n| &n.value)
    }

    pub fn value_mut(&mut self) -> Option<&mut V> {
        let id = self.node?;
        self.map.nodes.get_mut(id).map(|n| &mut n.value)
    }

    /// Give up the cursor and keep the mutable borrow of its value.
    pub fn into_value_mut(self) -> Option<&'a mut V> {
        let id = self.node?;
        let map = self.map;
        map.nodes.get_mut(id).map(|n| &mut n.value)
    }

    pub fn move_next(&mut self) {
        self.node = self.node.and_then(|id| self.map.nodes.next(id));
    }

    /// Erase the current entry and move to the one after it.
    pub fn remove_current(&mut self) -> Option<(K, V)> {
        let id = self.node?;
        self.node = self.map.nodes.next(id);
        self.map.remove_node(id)
    }

    pub fn as_cursor(&self) -> Cursor<'_, K, V, S> {
        Cursor::new(self.map, self.node)
    }
}

impl<K: fmt::Debug, V: fmt::Debug, S> fmt::Debug for CursorMut<'_, K, V, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("CursorMut").field(&self.as_cursor().pair()).finish()
    }
}

/// Borrowing iterator, newest entry first.
pub struct Iter<'a, K, V> {
    nodes: &'a NodeList<K, V>,
    front: Option<NodeId>,
    back: Option<NodeId>,
    remaining: usize,
}

impl<'a, K, V> Iter<'a, K, V> {
    pub(crate) fn new(nodes: &'a NodeList<K, V>) -> Self {
        Self {
            nodes,
            front: nodes.head(),
            back: nodes.tail(),
            remaining: nodes.len(),
        }
    }
}

impl<'a, K, V> Iterator for Iter<'a, K, V> {
    type Item = (&'a K, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        let nodes: &'a NodeList<K, V> = self.nodes;
        let id = self.front?;
        self.front = nodes.next(id);
        self.remaining -= 1;
        let n = nodes.node(id);
        Some((&n.key, &n.value))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<'a, K, V> DoubleEndedIterator for Iter<'a, K, V> {
    fn next_back(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        let nodes: &'a NodeList<K, V> = self.nodes;
        let id = self.back?;
        self.back = nodes.prev(id);
        self.remaining -= 1;
        let n = nodes.node(id);
        Some((&n.key, &n.value))
    }
}

impl<K, V> ExactSizeIterator for Iter<'_, K, V> {}
impl<K, V> FusedIterator for Iter<'_, K, V> {}

impl<K, V> Clone for Iter<'_, K, V> {
    fn clone(&self) -> Self {
        Self { ..*self }
    }
}

/// Mutable iterator, newest entry first.
///
/// Walks the links lazily like `Iter`; each step costs one arena lookup.
pub struct IterMut<'a, K, V> {
    list: NonNull<NodeList<K, V>>,
    front: Option<NodeId>,
    back: Option<NodeId>,
    remaining: usize,
    _marker: PhantomData<&'a mut NodeList<K, V>>,
}

impl<'a, K, V> IterMut<'a, K, V> {
    pub(crate) fn new(list: &'a mut NodeList<K, V>) -> Self {
        Self {
            front: list.head(),
            back: list.tail(),
            remaining: list.len(),
            list: NonNull::from(list),
            _marker: PhantomData,
        }
    }

    fn node(&mut self, id: NodeId) -> Option<&'a mut Node<K, V>> {
        // SAFETY: the list is mutably borrowed for 'a through `_marker`, so
        // nothing else reaches it while this iterator lives. `remaining`
        // stops the two ends before they cross, so each node is handed out
        // at most once, and the lookup touches no other node's key or value.
        let list: &'a mut NodeList<K, V> = unsafe { &mut *self.list.as_ptr() };
        list.get_mut(id)
    }
}

impl<'a, K, V> Iterator for IterMut<'a, K, V> {
    type Item = (&'a K, &'a mut V);

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        let id = self.front?;
        let node = self.node(id)?;
        self.front = node.next_id();
        self.remaining -= 1;
        Some((&node.key, &mut node.value))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<K, V> DoubleEndedIterator for IterMut<'_, K, V> {
    fn next_back(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        let id = self.back?;
        let node = self.node(id)?;
        self.back = node.prev_id();
        self.remaining -= 1;
        Some((&node.key, &mut node.value))
    }
}

// SAFETY: IterMut behaves like `&'a mut NodeList<K, V>`.
unsafe impl<K: Send, V: Send> Send for IterMut<'_, K, V> {}
unsafe impl<K: Sync, V: Sync> Sync for IterMut<'_, K, V> {}

impl<K, V> ExactSizeIterator for IterMut<'_, K, V> {}
impl<K, V> FusedIterator for IterMut<'_, K, V> {}

/// Owning iterator; drains the ordering list from the newest entry.
pub struct IntoIter<K, V> {
    nodes: NodeList<K, V>,
}

impl<K, V> IntoIter<K, V> {
    pub(crate) fn new(nodes: NodeList<K, V>) -> Self {
        Self { nodes }
    }
}

impl<K, V> Iterator for IntoIter<K, V> {
    type Item = (K, V);

    fn next(&mut self) -> Option<(K, V)> {
        self.nodes.pop_front().map(|n| (n.key, n.value))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.nodes.len(), Some(self.nodes.len()))
    }
}

impl<K, V> DoubleEndedIterator for IntoIter<K, V> {
    fn next_back(&mut self) -> Option<(K, V)> {
        self.nodes.pop_back().map(|n| (n.key, n.value))
    }
}

impl<K, V> ExactSizeIterator for IntoIter<K, V> {}
impl<K, V> FusedIterator for IntoIter<K, V> {}

pub struct Keys<'a, K, V> {
    inner: Iter<'a, K, V>,
}

impl<'a, K, V> Keys<'a, K, V> {
    pub(crate) fn new(inner: Iter<'a, K, V>) -> Self {
        Self { inner }
    }
}

impl<'a, K, V> Iterator for Keys<'a, K, V> {
    type Item = &'a K;

    fn next(&mut self) -> Option<&'a K> {
        self.inner.next().map(|(k, _)| k)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<'a, K, V> DoubleEndedIterator for Keys<'a, K, V> {
    fn next_back(&mut self) -> Option<&'a K> {
        self.inner.next_back().map(|(k, _)| k)
    }
}

impl<K, V> ExactSizeIterator for Keys<'_, K, V> {}
impl<K, V> FusedIterator for Keys<'_, K, V> {}

pub struct Values<'a, K, V> {
    inner: Iter<'a, K, V>,
}

impl<'a, K, V> Values<'a, K, V> {
    pub(crate) fn new(inner: Iter<'a, K, V>) -> Self {
        Self { inner }
    }
}

impl<'a, K, V> Iterator for Values<'a, K, V> {
    type Item = &'a V;

    fn next(&mut self) -> Option<&'a V> {
        self.inner.next().map(|(_, v)| v)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<'a, K, V> DoubleEndedIterator for Values<'a, K, V> {
    fn next_back(&mut self) -> Option<&'a V> {
        self.inner.next_back().map(|(_, v)| v)
    }
}

impl<K, V> ExactSizeIterator for Values<'_, K, V> {}
impl<K, V> FusedIterator for Values<'_, K, V> {}

pub struct ValuesMut<'a, K, V> {
    inner: IterMut<'a, K, V>,
}

impl<'a, K, V> ValuesMut<'a, K, V> {
    pub(crate) fn new(inner: IterMut<'a, K, V>) -> Self {
        Self { inner }
    }
}

impl<'a, K, V> Iterator for ValuesMut<'a, K, V> {
    type Item = &'a mut V;

    fn next(&mut self) -> Option<&'a mut V> {
        self.inner.next().map(|(_, v)| v)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<'a, K, V> DoubleEndedIterator for ValuesMut<'a, K, V> {
    fn next_back(&mut self) -> Option<&'a mut V> {
        self.inner.next_back().map(|(_, v)| v)
    }
}

impl<K, V> ExactSizeIterator for ValuesMut<'_, K, V> {}
impl<K, V> FusedIterator for ValuesMut<'_, K, V> {}

#[cfg(test)]
mod tests {
    use crate::RobinHashMap;

    fn sample() -> RobinHashMap<i32, &'static str> {
        RobinHashMap::from([(1, "a"), (2, "b"), (3, "c")])
    }

    #[test]
    fn cursor_walks_newest_first_to_end() {
        let m = sample();
        let mut c = m.begin();
        let mut seen = Vec::new();
        while c != m.end() {
            seen.push(c.pair().unwrap());
            c.move_next();
        }
        assert_eq!(seen, vec![(&3, &"c"), (&2, &"b"), (&1, &"a")]);
        c.move_next();
        assert!(c.is_end());
    }

    #[test]
    fn cursors_compare_by_identity() {
        let m = sample();
        let other = sample();
        assert_eq!(m.find(&2), m.begin().peek_next());
        assert_ne!(m.find(&2), other.find(&2));
        assert_eq!(m.find(&9), m.end());
        assert_ne!(m.end(), other.end());
    }

    #[test]
    fn cursor_mut_edits_and_removes() {
        let mut m = sample();
        {
            let mut c = m.find_mut(&2);
            *c.value_mut().unwrap() = "B";
            assert_eq!(c.remove_current(), Some((2, "B")));
            assert_eq!(c.key(), Some(&1));
            assert_eq!(c.remove_current(), Some((1, "a")));
            assert!(c.is_end());
            assert_eq!(c.remove_current(), None);
        }
        assert_eq!(m.len(), 1);
        m.check_invariants();
        assert_eq!(m.iter().collect::<Vec<_>>(), vec![(&3, &"c")]);
    }

    #[test]
    fn iterators_agree_in_both_directions() {
        let mut m = sample();
        let fwd: Vec<i32> = m.keys().copied().collect();
        let back: Vec<i32> = m.iter().rev().map(|(k, _)| *k).collect();
        assert_eq!(fwd, vec![3, 2, 1]);
        assert_eq!(back, vec![1, 2, 3]);

        for v in m.values_mut() {
            *v = "z";
        }
        assert!(m.values().all(|v| *v == "z"));
        assert_eq!(m.iter_mut().len(), 3);

        let mut it = m.into_iter();
        assert_eq!(it.next_back(), Some((1, "z")));
        assert_eq!(it.next(), Some((3, "z")));
        assert_eq!(it.len(), 1);
    }

    #[test]
    fn iter_mut_walks_links_after_mass_erase() {
        let mut m: RobinHashMap<u32, u32> = (0..10_000).map(|i| (i, i)).collect();
        for i in 0..10_000 {
            if i % 1000 != 7 {
                m.erase(&i);
            }
        }
        assert_eq!(m.len(), 10);
        assert_eq!(m.values_mut().len(), 10);

        for (k, v) in m.iter_mut() {
            *v = k * 2;
        }
        let expected: Vec<(u32, u32)> = (0..10u32)
            .rev()
            .map(|j| j * 1000 + 7)
            .map(|k| (k, k * 2))
            .collect();
        let seen: Vec<(u32, u32)> = m.iter().map(|(k, v)| (*k, *v)).collect();
        assert_eq!(seen, expected);

        // Both ends meet in the middle without yielding a node twice.
        let mut it = m.iter_mut();
        let mut from_front = Vec::new();
        let mut from_back = Vec::new();
        loop {
            match it.next() {
                Some((k, _)) => from_front.push(*k),
                None => break,
            }
            match it.next_back() {
                Some((k, v)) => {
                    *v += 1;
                    from_back.push(*k);
                }
                None => break,
            }
        }
        assert_eq!(from_front.len() + from_back.len(), 10);
        assert_eq!(from_front, vec![9007, 8007, 7007, 6007, 5007]);
        assert_eq!(from_back, vec![7, 1007, 2007, 3007, 4007]);
        assert_eq!(m.get(&7), Some(&15));
        m.check_invariants();
    }

    #[test]
    fn adapters_run_from_either_end() {
        let mut m = sample();
        assert_eq!(m.keys().rev().copied().collect::<Vec<_>>(), vec![1, 2, 3]);
        assert_eq!(m.values().next_back(), Some(&"a"));
        *m.values_mut().next_back().unwrap() = "A";
        assert_eq!(m.get(&1), Some(&"A"));

        let mut keys = m.keys();
        for _ in keys.by_ref() {}
        assert_eq!(keys.next(), None);
        assert_eq!(keys.next_back(), None);
    }

    #[test]
    fn end_mut_is_past_the_oldest_entry() {
        let mut m = sample();
        let mut c = m.end_mut();
        assert!(c.is_end());
        assert_eq!(c.key(), None);
        assert_eq!(c.value_mut(), None);
        assert_eq!(c.remove_current(), None);
        assert!(c.as_cursor().is_end());
        assert_eq!(m.len(), 3);
    }

    #[test]
    fn cursor_handles_belong_to_their_map() {
        let mut m = sample();
        let copy = m.clone();
        let h = m.find(&2).handle().unwrap();
        assert_eq!(h.key_ref(&m), Some(&2));
        assert_eq!(h.key_ref(&copy), None);
        assert_eq!(m.end().handle(), None);
        assert_eq!(m.find_mut(&3).handle().and_then(|h| h.key_ref(&copy)), None);
    }

    #[test]
    fn iter_is_double_ended_without_overlap() {
        let m = sample();
        let mut it = m.iter();
        assert_eq!(it.next().map(|(k, _)| *k), Some(3));
        assert_eq!(it.next_back().map(|(k, _)| *k), Some(1));
        assert_eq!(it.next().map(|(k, _)| *k), Some(2));
        assert_eq!(it.next_back(), None);
        assert_eq!(it.next(), None);
    }
}
