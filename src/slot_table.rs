//! SlotTable: open-addressing index over the node arena.
//!
//! Each slot is empty or holds the `NodeId` of one live node. Placement
//! follows robin-hood leapfrogging and removal uses backward shifting, so
//! the table never needs tombstones. Every routine here moves slot entries
//! and node displacements together; nothing else touches either.

use crate::node_list::{NodeId, NodeList};

pub(crate) struct SlotTable {
    slots: Vec<Option<NodeId>>,
}

impl SlotTable {
    pub(crate) fn with_capacity(capacity: usize) -> Self {
        debug_assert!(capacity > 0);
        Self {
            slots: vec![None; capacity],
        }
    }

    pub(crate) fn capacity(&self) -> usize {
        self.slots.len()
    }

    pub(crate) fn get(&self, pos: usize) -> Option<NodeId> {
        self.slots[pos]
    }

    #[inline]
    fn home(&self, hash: u64) -> usize {
        (hash % self.slots.len() as u64) as usize
    }

    #[inline]
    fn next_pos(&self, pos: usize) -> usize {
        let n = pos + 1;
        if n == self.slots.len() {
            0
        } else {
            n
        }
    }

    /// Probe for a node with the given cached hash whose key satisfies `eq`.
    ///
    /// Stops at the first empty slot, or as soon as the probe has travelled
    /// further than the resident it is looking at: a key that far from home
    /// would have displaced that resident when it was placed.
    pub(crate) fn find<K, V, F>(&self, nodes: &NodeList<K, V>, hash: u64, mut eq: F) -> Option<usize>
    where
        F: FnMut(&K) -> bool,
    {
        let mut pos = self.home(hash);
        let mut dist = 0;
        while let Some(id) = self.slots[pos] {
            let node = nodes.node(id);
            if dist > node.displacement {
                return None;
            }
            if node.hash == hash && eq(&node.key) {
                return Some(pos);
            }
            dist += 1;
            pos = self.next_pos(pos);
        }
        None
    }

    /// Slot currently holding `id`. Uses the cached hash only.
    pub(crate) fn position_of<K, V>(&self, nodes: &NodeList<K, V>, id: NodeId) -> Option<usize> {
        let hash = nodes.get(id)?.hash;
        let mut pos = self.home(hash);
        while let Some(resident) = self.slots[pos] {
            if resident == id {
                return Some(pos);
            }
            pos = self.next_pos(pos);
        }
        None
    }

    /// Robin-hood placement of a node that is in the arena but not yet in the
    /// table. Whenever the carried node has travelled further than the
    /// resident, the two trade places and the evicted resident is carried on.
    pub(crate) fn place<K, V>(&mut self, nodes: &mut NodeList<K, V>, id: NodeId) {
        nodes.node_mut(id).displacement = 0;
        let mut carried = id;
        let mut pos = self.home(nodes.node(id).hash);
        while let Some(resident) = self.slots[pos] {
            if nodes.node(carried).displacement > nodes.node(resident).displacement {
                self.slots[pos] = Some(carried);
                carried = resident;
            }
            nodes.node_mut(carried).displacement += 1;
            pos = self.next_pos(pos);
        }
        self.slots[pos] = Some(carried);
    }

    /// Empty `pos` and shift the displaced run that follows it back by one.
    pub(crate) fn remove_at<K, V>(&mut self, nodes: &mut NodeList<K, V>, pos: usize) -> Option<NodeId> {
        let removed = self.slots[pos].take()?;
        let mut gap = pos;
        let mut cur = self.next_pos(pos);
        while let Some(id) = self.slots[cur] {
            let node = nodes.node_mut(id);
            if node.displacement == 0 {
                break;
            }
            node.displacement -= 1;
            self.slots[gap] = self.slots[cur].take();
            gap = cur;
            cur = self.next_pos(cur);
        }
        Some(removed)
    }

    /// Reallocate at `capacity` and place every node again, oldest first, so
    /// collisions resolve the same way a fresh sequence of inserts would.
    pub(crate) fn rebuild<K, V>(&mut self, nodes: &mut NodeList<K, V>, capacity: usize) {
        self.slots = vec![None; capacity];
        let mut cur = nodes.tail();
        while let Some(id) = cur {
            cur = nodes.prev(id);
            self.place(nodes, id);
        }
    }

    pub(crate) fn clear(&mut self) {
        self.slots.iter_mut().for_each(|s| *s = None);
    }

    #[cfg(test)]
    pub(crate) fn check_against<K, V>(&self, nodes: &NodeList<K, V>) {
        use slotmap::SecondaryMap;

        let cap = self.capacity();
        let mut seen: SecondaryMap<NodeId, usize> = SecondaryMap::new();
        for (pos, slot) in self.slots.iter().enumerate() {
            let Some(id) = *slot else { continue };
            let node = nodes.get(id).expect("slot references a freed node");
            assert!(seen.insert(id, pos).is_none(), "node referenced by two slots");

            let home = self.home(node.hash);
            let dist = (pos + cap - home) % cap;
            assert_eq!(node.displacement, dist, "stale displacement at slot {}", pos);
            for back in 1..=dist {
                let p = (pos + cap - back) % cap;
                assert!(self.slots[p].is_some(), "empty slot {} inside probe run of slot {}", p, pos);
            }

            let next = self.next_pos(pos);
            if let Some(n) = self.slots[next] {
                assert!(
                    nodes.node(n).displacement <= node.displacement + 1,
                    "robin-hood order broken between slots {} and {}",
                    pos,
                    next
                );
            }
        }
        assert_eq!(seen.len(), nodes.len(), "slot table and ordering list disagree");
    }
}
