//! Auxiliary per-entity data, kept in sync with graph mutations.
//!
//! An [`EntityMap`] stores one value per handle in a flat vector. On its own
//! it is just a map; registered with a graph it becomes a synchronized map:
//! the graph broadcasts every mutation to its [`HandlerRegistry`], and the
//! map's [`MutationHandler`] impl clears the slot of a removed entity, so a
//! recycled handle never observes a previous occupant's value.
//!
//! Registered handlers are owned by the registry and addressed through typed
//! [`MapToken`]s. A token is a plain copyable handle; accessing the registry
//! with a token whose slot was detached (or holds a handler of a different
//! type) reads as `None` rather than aliasing another map.

use std::any::Any;
use std::fmt;
use std::marker::PhantomData;
use std::ops::{Index, IndexMut};

use serde::{Deserialize, Serialize};

use crate::memory::EntityIndex;
use crate::Arena;

crate::make_entity! {
    /// Slot of a registered handler within one registry.
    pub struct HandlerIndex(u32);
}

/// Receiver of mutation notifications for entities keyed by `K`.
pub trait MutationHandler<K> {
    /// Called after the entity `key` was added.
    fn on_add(&mut self, key: K) {
        let _ = key;
    }

    /// Called when the entity `key` is being removed, while `key` still
    /// denotes it.
    fn on_remove(&mut self, key: K);
}

/// A flat map from entity handles to values.
///
/// Grows lazily on [`put`]; handles with no value read as `None`. The
/// [`MutationHandler`] impl ignores additions and clears the slot of a
/// removed entity.
///
/// [`put`]: EntityMap::put
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityMap<K, V> {
    values: Vec<Option<V>>,
    marker: PhantomData<fn(K) -> K>,
}

impl<K, V> EntityMap<K, V>
where
    K: EntityIndex,
{
    /// Creates an empty map.
    pub fn new() -> Self {
        Self {
            values: Vec::new(),
            marker: PhantomData,
        }
    }

    /// Associates `value` with `key`, returning the value it replaces.
    pub fn put(&mut self, key: K, value: V) -> Option<V> {
        if key.index() >= self.values.len() {
            self.values.resize_with(key.index() + 1, || None);
        }
        self.values[key.index()].replace(value)
    }

    /// Borrows the value associated with `key`.
    pub fn get(&self, key: K) -> Option<&V> {
        self.values.get(key.index())?.as_ref()
    }

    /// Mutably borrows the value associated with `key`.
    pub fn get_mut(&mut self, key: K) -> Option<&mut V> {
        self.values.get_mut(key.index())?.as_mut()
    }

    /// Removes and returns the value associated with `key`.
    pub fn take(&mut self, key: K) -> Option<V> {
        self.values.get_mut(key.index())?.take()
    }

    /// Returns whether `key` has an associated value.
    pub fn contains(&self, key: K) -> bool {
        self.get(key).is_some()
    }

    /// Drops all associations.
    pub fn clear(&mut self) {
        self.values.clear();
    }
}

impl<K, V> Default for EntityMap<K, V>
where
    K: EntityIndex,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V> MutationHandler<K> for EntityMap<K, V>
where
    K: EntityIndex,
{
    fn on_remove(&mut self, key: K) {
        self.take(key);
    }
}

impl<K, V> Index<K> for EntityMap<K, V>
where
    K: EntityIndex,
{
    type Output = V;

    #[inline(always)]
    fn index(&self, key: K) -> &Self::Output {
        self.get(key).expect("no value for key")
    }
}

impl<K, V> IndexMut<K> for EntityMap<K, V>
where
    K: EntityIndex,
{
    #[inline(always)]
    fn index_mut(&mut self, key: K) -> &mut Self::Output {
        self.get_mut(key).expect("no value for key")
    }
}

/// Typed handle of a handler registered in a [`HandlerRegistry`].
///
/// Tokens are plain copyable values; dropping one does not detach the
/// handler. After [`HandlerRegistry::detach`] the token reads as `None`.
pub struct MapToken<K, M> {
    index: HandlerIndex,
    marker: PhantomData<fn() -> (K, M)>,
}

impl<K, M> Clone for MapToken<K, M> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<K, M> Copy for MapToken<K, M> {}

impl<K, M> PartialEq for MapToken<K, M> {
    fn eq(&self, other: &Self) -> bool {
        self.index == other.index
    }
}

impl<K, M> Eq for MapToken<K, M> {}

impl<K, M> fmt::Debug for MapToken<K, M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("MapToken").field(&self.index).finish()
    }
}

/// A [`MutationHandler`] that can be stored behind a registry slot and
/// recovered by concrete type.
pub(crate) trait RegisteredHandler<K>: MutationHandler<K> {
    fn as_any(&self) -> &dyn Any;
    fn as_any_mut(&mut self) -> &mut dyn Any;
    fn into_any(self: Box<Self>) -> Box<dyn Any>;
}

impl<K, H> RegisteredHandler<K> for H
where
    H: MutationHandler<K> + Any,
{
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }

    fn into_any(self: Box<Self>) -> Box<dyn Any> {
        self
    }
}

/// The set of handlers a graph notifies about mutations of one entity kind.
///
/// Handlers are owned by the registry and live as long as the graph, unless
/// detached; callers keep only [`MapToken`]s. The registry is itself backed
/// by an [`Arena`], so attach and detach are O(1) and slots are recycled.
pub struct HandlerRegistry<K: 'static> {
    handlers: Arena<HandlerIndex, Box<dyn RegisteredHandler<K>>>,
}

impl<K> HandlerRegistry<K>
where
    K: Copy + 'static,
{
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self {
            handlers: Arena::new(),
        }
    }

    /// Returns the number of registered handlers.
    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    /// Returns whether no handler is registered.
    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }

    /// Takes ownership of `handler` and registers it for notifications.
    pub fn attach<M>(&mut self, handler: M) -> MapToken<K, M>
    where
        M: MutationHandler<K> + Any,
    {
        let index = self.handlers.insert(Box::new(handler));
        MapToken {
            index,
            marker: PhantomData,
        }
    }

    /// Deregisters the handler behind `token` and returns it to the caller.
    ///
    /// Returns `None` when the slot was already detached or holds a handler
    /// of a different concrete type.
    pub fn detach<M>(&mut self, token: MapToken<K, M>) -> Option<M>
    where
        M: Any,
    {
        if !self.handlers.get(token.index)?.as_any().is::<M>() {
            return None;
        }
        let handler = self.handlers.remove(token.index)?;
        Some(*handler.into_any().downcast().ok()?)
    }

    /// Borrows the handler behind `token`.
    pub fn get<M>(&self, token: MapToken<K, M>) -> Option<&M>
    where
        M: Any,
    {
        self.handlers.get(token.index)?.as_any().downcast_ref()
    }

    /// Mutably borrows the handler behind `token`.
    pub fn get_mut<M>(&mut self, token: MapToken<K, M>) -> Option<&mut M>
    where
        M: Any,
    {
        self.handlers
            .get_mut(token.index)?
            .as_any_mut()
            .downcast_mut()
    }

    /// Broadcasts the addition of `key` to every handler.
    pub fn notify_add(&mut self, key: K) {
        for (_, handler) in self.handlers.iter_mut() {
            handler.on_add(key);
        }
    }

    /// Broadcasts the removal of `key` to every handler.
    pub fn notify_remove(&mut self, key: K) {
        for (_, handler) in self.handlers.iter_mut() {
            handler.on_remove(key);
        }
    }
}

impl<K> Default for HandlerRegistry<K>
where
    K: Copy + 'static,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<K: 'static> fmt::Debug for HandlerRegistry<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HandlerRegistry")
            .field("handlers", &self.handlers.len())
            .finish()
    }
}
