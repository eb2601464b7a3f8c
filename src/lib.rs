//! robin-hashmap: an open-addressing hash map with robin-hood placement,
//! backward-shift deletion, and a deterministic newest-first iteration order.
//!
//! Internal Design:
//!
//! Summary
//! - Goal: O(1) amortized insert/lookup/remove with iteration that never
//!   scans the sparse slot array.
//! - Layers:
//!   - NodeList<K, V>: arena (`slotmap`) that owns every entry and links the
//!     entries into a doubly linked list, newest at the head.
//!   - SlotTable: `Vec<Option<NodeId>>` used purely for probing. Slots hold
//!     arena keys, never the entries themselves.
//!   - RobinHashMap<K, V, S>: public API; hashes keys, keeps the two layers
//!     in step, and triggers growth.
//!   - Cursors and iterators walk the list only.
//!
//! Constraints
//! - Keys are unique. A duplicate insert returns `None` and the first value
//!   stays; removing an absent key is a no-op.
//! - `len * LOAD_FACTOR <= capacity` after every insert. Violations double
//!   the slot table and re-place every node. Capacity never shrinks.
//! - No tombstones: an empty slot always ends a probe run.
//! - Single-threaded: no internal locking; wrap in a mutex to share.
//!
//! Slot table invariants
//! - Every node stores its displacement: the distance from its home slot
//!   (`hash % capacity`) to the slot it occupies.
//! - Placement carries the incoming node forward and swaps it with any
//!   resident that has travelled less. Displacements along a run therefore
//!   grow by at most one per slot, which also lets lookups stop early.
//! - Removal empties the slot and pulls each following displaced node back
//!   one step until an empty slot or a node at its home slot.
//! - Slot moves and displacement updates happen together inside `SlotTable`;
//!   the list is never touched by probing.
//!
//! Ordering and handles
//! - Inserts link the new node at the head; iteration is newest first.
//! - Growth re-places nodes without moving them in the arena, so list order
//!   and `Handle`s survive rebuilds.
//! - Every list draws an owner tag at construction and stamps it on the
//!   handles it issues. A handle presented to another map resolves to `None`.
//! - `Clone` snapshots the pairs oldest first into a fresh table, giving a
//!   copy with the same order and no shared storage.
//!
//! Hasher
//! - Each node caches its `u64` hash. Probing compares cached hashes before
//!   calling `K: Eq`, and rebuilds never call `K: Hash`.
//! - The `BuildHasher` is chosen at construction and cloned with the map.

mod cursor;
mod node_list;
mod robin_hash_map;
mod robin_hash_map_proptest;
mod slot_table;

// Public surface
pub use cursor::{Cursor, CursorMut, IntoIter, Iter, IterMut, Keys, Values, ValuesMut};
pub use hashbrown::hash_map::DefaultHashBuilder;
pub use node_list::Handle;
pub use robin_hash_map::{OutOfRange, RobinHashMap, LOAD_FACTOR};
