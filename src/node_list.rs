//! NodeList: arena-backed ordering list that owns every entry of the map.
//!
//! Nodes live in a `SlotMap` and are linked newest-first through
//! `prev`/`next` keys. The slot table only ever stores `NodeId`s that point
//! back into this arena; it never owns a node.

use crate::robin_hash_map::RobinHashMap;
use core::hash::BuildHasher;
use core::sync::atomic::{AtomicU64, Ordering};
use slotmap::{DefaultKey, SlotMap};

pub(crate) type NodeId = DefaultKey;

/// Source of per-list owner tags. Arena keys alone cannot tell two maps apart.
static NEXT_OWNER: AtomicU64 = AtomicU64::new(0);

/// Stable identity of one entry.
///
/// Handles survive growth of the slot table because rebuilding never moves
/// nodes in the arena. A handle whose entry has been removed resolves to
/// `None` (slotmap keys are generational), and so does a handle used with a
/// map other than the one that issued it, including a clone of that map.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub struct Handle {
    owner: u64,
    id: NodeId,
}

impl Handle {
    pub(crate) fn new(owner: u64, id: NodeId) -> Self {
        Handle { owner, id }
    }

    /// Arena key, if this handle was issued by `list`.
    pub(crate) fn id_in<K, V>(&self, list: &NodeList<K, V>) -> Option<NodeId> {
        (self.owner == list.owner).then_some(self.id)
    }

    pub fn key_ref<'a, K, V, S>(&self, map: &'a RobinHashMap<K, V, S>) -> Option<&'a K>
    where
        S: BuildHasher,
    {
        let id = self.id_in(&map.nodes)?;
        map.nodes.get(id).map(|n| &n.key)
    }

    pub fn value_ref<'a, K, V, S>(&self, map: &'a RobinHashMap<K, V, S>) -> Option<&'a V>
    where
        S: BuildHasher,
    {
        let id = self.id_in(&map.nodes)?;
        map.nodes.get(id).map(|n| &n.value)
    }

    pub fn value_mut<'a, K, V, S>(&self, map: &'a mut RobinHashMap<K, V, S>) -> Option<&'a mut V>
    where
        S: BuildHasher,
    {
        let id = self.id_in(&map.nodes)?;
        map.nodes.get_mut(id).map(|n| &mut n.value)
    }
}

#[derive(Debug)]
pub(crate) struct Node<K, V> {
    pub(crate) key: K,
    pub(crate) value: V,
    pub(crate) hash: u64,
    /// Probe steps between the node's home slot and the slot it occupies.
    pub(crate) displacement: usize,
    prev: Option<NodeId>,
    next: Option<NodeId>,
}

impl<K, V> Node<K, V> {
    pub(crate) fn next_id(&self) -> Option<NodeId> {
        self.next
    }
    pub(crate) fn prev_id(&self) -> Option<NodeId> {
        self.prev
    }
}

pub(crate) struct NodeList<K, V> {
    owner: u64,
    nodes: SlotMap<NodeId, Node<K, V>>,
    head: Option<NodeId>, // newest
    tail: Option<NodeId>, // oldest
}

impl<K, V> NodeList<K, V> {
    #[cfg(test)]
    pub(crate) fn new() -> Self {
        Self::with_capacity(0)
    }

    pub(crate) fn with_capacity(n: usize) -> Self {
        Self {
            owner: NEXT_OWNER.fetch_add(1, Ordering::Relaxed),
            nodes: SlotMap::with_capacity_and_key(n),
            head: None,
            tail: None,
        }
    }

    pub(crate) fn len(&self) -> usize {
        self.nodes.len()
    }

    pub(crate) fn handle(&self, id: NodeId) -> Handle {
        Handle::new(self.owner, id)
    }

    pub(crate) fn head(&self) -> Option<NodeId> {
        self.head
    }
    pub(crate) fn tail(&self) -> Option<NodeId> {
        self.tail
    }

    pub(crate) fn next(&self, id: NodeId) -> Option<NodeId> {
        self.nodes.get(id).and_then(|n| n.next)
    }
    pub(crate) fn prev(&self, id: NodeId) -> Option<NodeId> {
        self.nodes.get(id).and_then(|n| n.prev)
    }

    pub(crate) fn get(&self, id: NodeId) -> Option<&Node<K, V>> {
        self.nodes.get(id)
    }
    pub(crate) fn get_mut(&mut self, id: NodeId) -> Option<&mut Node<K, V>> {
        self.nodes.get_mut(id)
    }

    /// Access a node the slot table references. Slot entries always point at
    /// live nodes, so a miss here is a broken invariant.
    #[inline]
    pub(crate) fn node(&self, id: NodeId) -> &Node<K, V> {
        &self.nodes[id]
    }
    #[inline]
    pub(crate) fn node_mut(&mut self, id: NodeId) -> &mut Node<K, V> {
        &mut self.nodes[id]
    }

    /// Allocate a node at the head of the traversal order.
    pub(crate) fn push_front(&mut self, key: K, value: V, hash: u64) -> NodeId {
        let old_head = self.head;
        let id = self.nodes.insert(Node {
            key,
            value,
            hash,
            displacement: 0,
            prev: None,
            next: old_head,
        });
        match old_head {
            Some(h) => self.nodes[h].prev = Some(id),
            None => self.tail = Some(id),
        }
        self.head = Some(id);
        id
    }

    /// Splice a node out of the order and free it.
    pub(crate) fn unlink(&mut self, id: NodeId) -> Option<Node<K, V>> {
        let node = self.nodes.remove(id)?;
        match node.prev {
            Some(p) => self.nodes[p].next = node.next,
            None => self.head = node.next,
        }
        match node.next {
            Some(n) => self.nodes[n].prev = node.prev,
            None => self.tail = node.prev,
        }
        Some(node)
    }

    pub(crate) fn pop_front(&mut self) -> Option<Node<K, V>> {
        let id = self.head?;
        self.unlink(id)
    }

    pub(crate) fn pop_back(&mut self) -> Option<Node<K, V>> {
        let id = self.tail?;
        self.unlink(id)
    }

    pub(crate) fn clear(&mut self) {
        self.nodes.clear();
        self.head = None;
        self.tail = None;
    }

    #[cfg(test)]
    pub(crate) fn check_links(&self) {
        let mut count = 0;
        let mut prev = None;
        let mut cur = self.head;
        while let Some(id) = cur {
            let node = self.nodes.get(id).expect("list links to a freed node");
            assert_eq!(node.prev, prev, "prev link disagrees with traversal");
            count += 1;
            assert!(count <= self.nodes.len(), "ordering list has a cycle");
            prev = Some(id);
            cur = node.next;
        }
        assert_eq!(prev, self.tail, "tail is not the last node reached");
        assert_eq!(count, self.nodes.len(), "arena holds unlinked nodes");
    }
}
