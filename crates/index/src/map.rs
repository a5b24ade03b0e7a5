//! Dense map over a fixed universe.

use crate::universe::Universe;
use alloc::sync::Arc;
use alloc::vec::Vec;
use core::hash::Hash;

/// An array-backed map whose keys come from a shared [`Universe`].
///
/// Lookups by pre-resolved position are plain slice indexing, which keeps
/// hashing out of hot loops.
#[derive(Clone, Debug)]
pub struct IndexedMap<K, V> {
    universe: Arc<Universe<K>>,
    slots: Vec<Option<V>>,
}

impl<K: Clone + Eq + Hash, V> IndexedMap<K, V> {
    /// Creates an empty map over the universe.
    pub fn new(universe: Arc<Universe<K>>) -> Self {
        let mut slots = Vec::with_capacity(universe.len());
        slots.resize_with(universe.len(), || None);
        Self { universe, slots }
    }

    /// Returns the universe this map is keyed by.
    #[inline]
    pub fn universe(&self) -> &Arc<Universe<K>> {
        &self.universe
    }

    /// Gets the value for a key.
    pub fn get(&self, key: &K) -> Option<&V> {
        self.universe
            .index_of(key)
            .and_then(|i| self.slots[i].as_ref())
    }

    /// Gets a mutable value for a key.
    pub fn get_mut(&mut self, key: &K) -> Option<&mut V> {
        match self.universe.index_of(key) {
            Some(i) => self.slots[i].as_mut(),
            None => None,
        }
    }

    /// Gets the value at a universe position.
    #[inline]
    pub fn get_at(&self, index: usize) -> Option<&V> {
        self.slots.get(index).and_then(|v| v.as_ref())
    }

    /// Inserts a value. Returns false (dropping the value) if the key is not in the universe.
    pub fn insert(&mut self, key: &K, value: V) -> bool {
        match self.universe.index_of(key) {
            Some(i) => {
                self.slots[i] = Some(value);
                true
            }
            None => false,
        }
    }

    /// Inserts a value at a universe position, returning the previous value.
    ///
    /// # Panics
    ///
    /// Panics if `index` is outside the universe.
    #[inline]
    pub fn insert_at(&mut self, index: usize, value: V) -> Option<V> {
        self.slots[index].replace(value)
    }

    /// Removes the value for a key.
    pub fn remove(&mut self, key: &K) -> Option<V> {
        self.universe
            .index_of(key)
            .and_then(|i| self.slots[i].take())
    }

    /// Removes the value at a universe position.
    pub fn take_at(&mut self, index: usize) -> Option<V> {
        self.slots.get_mut(index).and_then(|v| v.take())
    }

    /// Returns true if the key has a value.
    pub fn contains_key(&self, key: &K) -> bool {
        self.get(key).is_some()
    }

    /// Removes every value, keeping the universe.
    pub fn clear(&mut self) {
        for slot in &mut self.slots {
            *slot = None;
        }
    }

    /// Iterates `(key, value)` pairs in universe order.
    pub fn iter(&self) -> impl Iterator<Item = (&K, &V)> {
        self.slots
            .iter()
            .enumerate()
            .filter_map(move |(i, v)| v.as_ref().map(|v| (&self.universe.keys()[i], v)))
    }

    /// Iterates values in universe order.
    pub fn values(&self) -> impl Iterator<Item = &V> {
        self.slots.iter().filter_map(|v| v.as_ref())
    }

    /// Returns the number of occupied slots.
    pub fn len(&self) -> usize {
        self.slots.iter().filter(|v| v.is_some()).count()
    }

    /// Returns true if no slot is occupied.
    pub fn is_empty(&self) -> bool {
        self.slots.iter().all(|v| v.is_none())
    }
}
