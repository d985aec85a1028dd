//! The caller-addressed slot arena.

use std::iter::FusedIterator;
use std::ops::{Index, IndexMut};

use serde::{Deserialize, Serialize};

use crate::memory::EntityIndex;

/// A slot arena addressed by caller-chosen handles.
///
/// Unlike [`Arena`](crate::Arena) there is no allocator: [`StaticArena::put`]
/// stores a value at the handle the caller picked, growing the backing
/// storage on demand and leaving any slots in between vacant. Vacant slots
/// are not chained into a free list. Occupied slots are still threaded into
/// a doubly-linked list, so [`StaticArena::keys`] visits handles in the
/// order they most recently became live.
///
/// ```
/// use lacegraph::{EntityIndex, NodeIndex, StaticArena};
///
/// let mut arena: StaticArena<NodeIndex, &str> = StaticArena::new();
/// arena.put(NodeIndex::new(4), "a");
/// arena.put(NodeIndex::new(1), "b");
///
/// assert_eq!(arena.len(), 2);
/// assert!(arena.keys().eq([NodeIndex::new(4), NodeIndex::new(1)]));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StaticArena<K, V> {
    entries: Vec<Entry<K, V>>,
    first_used: Option<K>,
    last_used: Option<K>,
    len: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
enum Entry<K, V> {
    Vacant,
    Occupied {
        value: V,
        prev: Option<K>,
        next: Option<K>,
    },
}

impl<K, V> StaticArena<K, V>
where
    K: EntityIndex,
{
    /// Creates an empty arena.
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
            first_used: None,
            last_used: None,
            len: 0,
        }
    }

    /// Creates an empty arena with space for handles below `capacity`.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: Vec::with_capacity(capacity),
            ..Self::new()
        }
    }

    /// Returns the number of occupied slots.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Returns whether no slot is occupied.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Returns an exclusive upper bound on the handles ever occupied.
    pub fn upper_bound(&self) -> K {
        K::new(self.entries.len())
    }

    /// Returns whether `key` denotes an occupied slot.
    pub fn contains(&self, key: K) -> bool {
        matches!(
            self.entries.get(key.index()),
            Some(Entry::Occupied { .. })
        )
    }

    /// Stores `value` at `key`, growing the arena as needed.
    ///
    /// Returns the value previously stored at `key`, if any. Replacing a
    /// live slot keeps its position in the occupied order; filling a vacant
    /// slot links it at the tail.
    pub fn put(&mut self, key: K, value: V) -> Option<V> {
        if key.index() >= self.entries.len() {
            self.entries.resize_with(key.index() + 1, || Entry::Vacant);
        }

        match &mut self.entries[key.index()] {
            Entry::Occupied { value: slot, .. } => Some(std::mem::replace(slot, value)),
            entry @ Entry::Vacant => {
                *entry = Entry::Occupied {
                    value,
                    prev: self.last_used,
                    next: None,
                };
                match self.last_used {
                    Some(last) => self.set_next(last, Some(key)),
                    None => self.first_used = Some(key),
                }
                self.last_used = Some(key);
                self.len += 1;
                None
            }
        }
    }

    /// Vacates the slot at `key` and returns its value.
    ///
    /// Returns `None` without touching the arena when `key` is out of range
    /// or already vacant. The handle is not recycled; a later [`put`] to the
    /// same key simply re-occupies the slot.
    ///
    /// [`put`]: StaticArena::put
    pub fn remove(&mut self, key: K) -> Option<V> {
        let entry = self.entries.get_mut(key.index())?;
        if matches!(entry, Entry::Vacant) {
            return None;
        }

        let Entry::Occupied { value, prev, next } = std::mem::replace(entry, Entry::Vacant) else {
            unreachable!()
        };

        match prev {
            Some(prev) => self.set_next(prev, next),
            None => self.first_used = next,
        }
        match next {
            Some(next) => self.set_prev(next, prev),
            None => self.last_used = prev,
        }
        self.len -= 1;

        Some(value)
    }

    /// Borrows the value at `key`.
    pub fn get(&self, key: K) -> Option<&V> {
        match self.entries.get(key.index()) {
            Some(Entry::Occupied { value, .. }) => Some(value),
            _ => None,
        }
    }

    /// Mutably borrows the value at `key`.
    pub fn get_mut(&mut self, key: K) -> Option<&mut V> {
        match self.entries.get_mut(key.index()) {
            Some(Entry::Occupied { value, .. }) => Some(value),
            _ => None,
        }
    }

    /// Vacates every slot.
    pub fn clear(&mut self) {
        self.entries.clear();
        self.first_used = None;
        self.last_used = None;
        self.len = 0;
    }

    /// Iterates over the occupied handles in the order they most recently
    /// became live.
    pub fn keys(&self) -> Keys<'_, K, V> {
        Keys {
            arena: self,
            next: self.first_used,
            remaining: self.len,
        }
    }

    /// Iterates over `(handle, value)` pairs in occupied order.
    pub fn iter(&self) -> Iter<'_, K, V> {
        Iter {
            arena: self,
            next: self.first_used,
            remaining: self.len,
        }
    }

    fn set_next(&mut self, key: K, to: Option<K>) {
        match &mut self.entries[key.index()] {
            Entry::Occupied { next, .. } => *next = to,
            Entry::Vacant => unreachable!("linked slot is vacant"),
        }
    }

    fn set_prev(&mut self, key: K, to: Option<K>) {
        match &mut self.entries[key.index()] {
            Entry::Occupied { prev, .. } => *prev = to,
            Entry::Vacant => unreachable!("linked slot is vacant"),
        }
    }

    fn next_of(&self, key: K) -> Option<K> {
        match self.entries.get(key.index()) {
            Some(Entry::Occupied { next, .. }) => *next,
            _ => None,
        }
    }
}

impl<K, V> Default for StaticArena<K, V>
where
    K: EntityIndex,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V> Index<K> for StaticArena<K, V>
where
    K: EntityIndex,
{
    type Output = V;

    #[inline(always)]
    fn index(&self, key: K) -> &Self::Output {
        self.get(key).expect("invalid key")
    }
}

impl<K, V> IndexMut<K> for StaticArena<K, V>
where
    K: EntityIndex,
{
    #[inline(always)]
    fn index_mut(&mut self, key: K) -> &mut Self::Output {
        self.get_mut(key).expect("invalid key")
    }
}

/// Iterator created by [`StaticArena::keys`].
#[derive(Clone)]
pub struct Keys<'a, K, V> {
    arena: &'a StaticArena<K, V>,
    next: Option<K>,
    remaining: usize,
}

impl<'a, K, V> Iterator for Keys<'a, K, V>
where
    K: EntityIndex,
{
    type Item = K;

    fn next(&mut self) -> Option<Self::Item> {
        let key = self.next?;
        self.next = self.arena.next_of(key);
        self.remaining -= 1;
        Some(key)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<'a, K, V> ExactSizeIterator for Keys<'a, K, V> where K: EntityIndex {}
impl<'a, K, V> FusedIterator for Keys<'a, K, V> where K: EntityIndex {}

/// Iterator created by [`StaticArena::iter`].
#[derive(Clone)]
pub struct Iter<'a, K, V> {
    arena: &'a StaticArena<K, V>,
    next: Option<K>,
    remaining: usize,
}

impl<'a, K, V> Iterator for Iter<'a, K, V>
where
    K: EntityIndex,
{
    type Item = (K, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        let key = self.next?;
        self.next = self.arena.next_of(key);
        self.remaining -= 1;
        let value = match &self.arena.entries[key.index()] {
            Entry::Occupied { value, .. } => value,
            Entry::Vacant => unreachable!("occupied list visits a vacant slot"),
        };
        Some((key, value))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<'a, K, V> ExactSizeIterator for Iter<'a, K, V> where K: EntityIndex {}
impl<'a, K, V> FusedIterator for Iter<'a, K, V> where K: EntityIndex {}

impl<'a, K, V> IntoIterator for &'a StaticArena<K, V>
where
    K: EntityIndex,
{
    type Item = (K, &'a V);
    type IntoIter = Iter<'a, K, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::NodeIndex;

    fn n(index: usize) -> NodeIndex {
        NodeIndex::new(index)
    }

    #[test]
    fn put_grows_and_leaves_gaps_vacant() {
        let mut arena: StaticArena<NodeIndex, i32> = StaticArena::new();
        assert_eq!(arena.put(n(4), 40), None);

        assert_eq!(arena.len(), 1);
        assert_eq!(arena.upper_bound(), n(5));
        assert!(!arena.contains(n(0)));
        assert!(!arena.contains(n(3)));
        assert!(arena.contains(n(4)));
    }

    #[test]
    fn put_returns_the_prior_value() {
        let mut arena: StaticArena<NodeIndex, i32> = StaticArena::new();
        assert_eq!(arena.put(n(0), 1), None);
        assert_eq!(arena.put(n(0), 2), Some(1));
        assert_eq!(arena[n(0)], 2);
        assert_eq!(arena.len(), 1);
    }

    #[test]
    fn replacement_keeps_the_occupied_position() {
        let mut arena: StaticArena<NodeIndex, i32> = StaticArena::new();
        arena.put(n(0), 1);
        arena.put(n(1), 2);
        arena.put(n(0), 3);

        assert!(arena.keys().eq([n(0), n(1)]));
    }

    #[test]
    fn keys_follow_recency_of_liveness() {
        let mut arena: StaticArena<NodeIndex, i32> = StaticArena::new();
        arena.put(n(2), 20);
        arena.put(n(0), 0);
        arena.put(n(1), 10);
        arena.remove(n(0));
        arena.put(n(0), 5);

        assert!(arena.keys().eq([n(2), n(1), n(0)]));
        assert!(arena.iter().eq([(n(2), &20), (n(1), &10), (n(0), &5)]));
    }

    #[test]
    fn remove_is_a_noop_on_vacant_or_unknown_handles() {
        let mut arena: StaticArena<NodeIndex, i32> = StaticArena::new();
        arena.put(n(1), 1);

        assert_eq!(arena.remove(n(0)), None);
        assert_eq!(arena.remove(n(9)), None);
        assert_eq!(arena.remove(n(1)), Some(1));
        assert_eq!(arena.remove(n(1)), None);
        assert!(arena.is_empty());
    }

    #[test]
    fn vacated_slot_can_be_reoccupied() {
        let mut arena: StaticArena<NodeIndex, i32> = StaticArena::new();
        arena.put(n(0), 1);
        arena.put(n(1), 2);
        arena.remove(n(0));
        arena.put(n(0), 3);

        assert!(arena.keys().eq([n(1), n(0)]));
        assert_eq!(arena[n(0)], 3);
    }
}
