//! The dynamic slot arena.

use std::iter::FusedIterator;
use std::ops::{Index, IndexMut};

use serde::{Deserialize, Serialize};

use crate::memory::EntityIndex;

/// A slot arena with stable handles, LIFO handle reuse and insertion-ordered
/// traversal.
///
/// Occupied slots are threaded into a doubly-linked list anchored at
/// `first_used`/`last_used`, so [`Arena::keys`] visits live handles in the
/// order they most recently became live. Free slots form a singly-linked
/// stack anchored at `first_free`; [`Arena::insert`] pops its head, so the
/// most recently freed handle is reused first.
///
/// ```
/// use lacegraph::{Arena, NodeIndex};
///
/// let mut arena: Arena<NodeIndex, &str> = Arena::new();
/// let a = arena.insert("a");
/// let b = arena.insert("b");
/// arena.remove(a);
/// let c = arena.insert("c");
///
/// assert_eq!(c, a); // most recently freed slot is reused
/// assert!(arena.keys().eq([b, c]));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Arena<K, V> {
    entries: Vec<Entry<K, V>>,
    first_used: Option<K>,
    // Iteration does not need the tail anchor, but keeping it lets new
    // entries append in insertion order instead of pushing to the front.
    last_used: Option<K>,
    first_free: Option<K>,
    len: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
enum Entry<K, V> {
    Free {
        next_free: Option<K>,
    },
    Occupied {
        value: V,
        prev: Option<K>,
        next: Option<K>,
    },
}

impl<K, V> Arena<K, V>
where
    K: EntityIndex,
{
    /// Creates an empty arena.
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
            first_used: None,
            last_used: None,
            first_free: None,
            len: 0,
        }
    }

    /// Creates an empty arena with space for `capacity` slots.
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

    /// Returns an exclusive upper bound on the handles ever allocated.
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

    /// Stores `value` in a fresh slot and returns its handle.
    ///
    /// Reuses the most recently freed slot if there is one, otherwise
    /// appends. The handle is linked at the tail of the occupied list.
    pub fn insert(&mut self, value: V) -> K {
        let key = match self.first_free {
            Some(key) => {
                let next_free = match &self.entries[key.index()] {
                    Entry::Free { next_free } => *next_free,
                    Entry::Occupied { .. } => unreachable!("free list head is occupied"),
                };
                self.first_free = next_free;
                key
            }
            None => {
                let key = K::new(self.entries.len());
                self.entries.push(Entry::Free { next_free: None });
                key
            }
        };

        self.entries[key.index()] = Entry::Occupied {
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

        key
    }

    /// Frees the slot at `key` and returns its value.
    ///
    /// Returns `None` without touching the arena when `key` is out of range
    /// or already free. The slot is pushed onto the free stack and will be
    /// the next one reused.
    pub fn remove(&mut self, key: K) -> Option<V> {
        let entry = self.entries.get_mut(key.index())?;
        if matches!(entry, Entry::Free { .. }) {
            return None;
        }

        let entry = std::mem::replace(
            entry,
            Entry::Free {
                next_free: self.first_free,
            },
        );
        let Entry::Occupied { value, prev, next } = entry else {
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

        self.first_free = Some(key);
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

    /// Frees every slot and forgets all handles.
    pub fn clear(&mut self) {
        self.entries.clear();
        self.first_used = None;
        self.last_used = None;
        self.first_free = None;
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

    /// Mutably iterates over `(handle, value)` pairs.
    ///
    /// Visits slots in index order, not in occupied order.
    pub fn iter_mut(&mut self) -> IterMut<'_, K, V> {
        IterMut {
            remaining: self.len,
            entries: self.entries.iter_mut().enumerate(),
        }
    }

    /// Iterates over the free handles, most recently freed first.
    ///
    /// Exposed for tests; the reuse order of [`Arena::insert`] follows it.
    pub fn free_keys(&self) -> FreeKeys<'_, K, V> {
        FreeKeys {
            arena: self,
            next: self.first_free,
        }
    }

    fn set_next(&mut self, key: K, to: Option<K>) {
        match &mut self.entries[key.index()] {
            Entry::Occupied { next, .. } => *next = to,
            Entry::Free { .. } => unreachable!("linked slot is free"),
        }
    }

    fn set_prev(&mut self, key: K, to: Option<K>) {
        match &mut self.entries[key.index()] {
            Entry::Occupied { prev, .. } => *prev = to,
            Entry::Free { .. } => unreachable!("linked slot is free"),
        }
    }

    fn next_of(&self, key: K) -> Option<K> {
        match self.entries.get(key.index()) {
            Some(Entry::Occupied { next, .. }) => *next,
            _ => None,
        }
    }
}

impl<K, V> Default for Arena<K, V>
where
    K: EntityIndex,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V> Index<K> for Arena<K, V>
where
    K: EntityIndex,
{
    type Output = V;

    #[inline(always)]
    fn index(&self, key: K) -> &Self::Output {
        self.get(key).expect("invalid key")
    }
}

impl<K, V> IndexMut<K> for Arena<K, V>
where
    K: EntityIndex,
{
    #[inline(always)]
    fn index_mut(&mut self, key: K) -> &mut Self::Output {
        self.get_mut(key).expect("invalid key")
    }
}

/// Iterator created by [`Arena::keys`].
#[derive(Clone)]
pub struct Keys<'a, K, V> {
    arena: &'a Arena<K, V>,
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

/// Iterator created by [`Arena::iter`].
#[derive(Clone)]
pub struct Iter<'a, K, V> {
    arena: &'a Arena<K, V>,
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
            Entry::Free { .. } => unreachable!("occupied list visits a free slot"),
        };
        Some((key, value))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<'a, K, V> ExactSizeIterator for Iter<'a, K, V> where K: EntityIndex {}
impl<'a, K, V> FusedIterator for Iter<'a, K, V> where K: EntityIndex {}

impl<'a, K, V> IntoIterator for &'a Arena<K, V>
where
    K: EntityIndex,
{
    type Item = (K, &'a V);
    type IntoIter = Iter<'a, K, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Iterator created by [`Arena::iter_mut`].
pub struct IterMut<'a, K, V> {
    entries: std::iter::Enumerate<std::slice::IterMut<'a, Entry<K, V>>>,
    remaining: usize,
}

impl<'a, K, V> Iterator for IterMut<'a, K, V>
where
    K: EntityIndex,
{
    type Item = (K, &'a mut V);

    fn next(&mut self) -> Option<Self::Item> {
        for (index, entry) in self.entries.by_ref() {
            if let Entry::Occupied { value, .. } = entry {
                self.remaining -= 1;
                return Some((K::new(index), value));
            }
        }
        None
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<'a, K, V> ExactSizeIterator for IterMut<'a, K, V> where K: EntityIndex {}
impl<'a, K, V> FusedIterator for IterMut<'a, K, V> where K: EntityIndex {}

/// Iterator created by [`Arena::free_keys`].
#[derive(Clone)]
pub struct FreeKeys<'a, K, V> {
    arena: &'a Arena<K, V>,
    next: Option<K>,
}

impl<'a, K, V> Iterator for FreeKeys<'a, K, V>
where
    K: EntityIndex,
{
    type Item = K;

    fn next(&mut self) -> Option<Self::Item> {
        let key = self.next?;
        self.next = match self.arena.entries.get(key.index()) {
            Some(Entry::Free { next_free }) => *next_free,
            _ => None,
        };
        Some(key)
    }
}

impl<'a, K, V> FusedIterator for FreeKeys<'a, K, V> where K: EntityIndex {}
