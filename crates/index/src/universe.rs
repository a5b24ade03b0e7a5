//! Fixed key universes.
//!
//! A universe enumerates every key a family of indexed collections may hold,
//! so maps and sets over it can address slots by position instead of hashing.

use alloc::vec::Vec;
use core::hash::Hash;
use hashbrown::HashMap;

/// A closed, pre-enumerated set of keys with stable positions.
#[derive(Clone, Debug)]
pub struct Universe<K> {
    keys: Vec<K>,
    positions: HashMap<K, usize>,
}

impl<K: Clone + Eq + Hash> Universe<K> {
    /// Creates a universe from keys in order. Duplicates keep their first position.
    pub fn new(keys: impl IntoIterator<Item = K>) -> Self {
        let mut universe = Self {
            keys: Vec::new(),
            positions: HashMap::new(),
        };
        for key in keys {
            if !universe.positions.contains_key(&key) {
                universe.positions.insert(key.clone(), universe.keys.len());
                universe.keys.push(key);
            }
        }
        universe
    }

    /// Returns the position of a key.
    #[inline]
    pub fn index_of(&self, key: &K) -> Option<usize> {
        self.positions.get(key).copied()
    }

    /// Returns the key at a position.
    #[inline]
    pub fn key(&self, index: usize) -> Option<&K> {
        self.keys.get(index)
    }

    /// Returns all keys in position order.
    #[inline]
    pub fn keys(&self) -> &[K] {
        &self.keys
    }

    /// Returns true if the key belongs to this universe.
    pub fn contains(&self, key: &K) -> bool {
        self.positions.contains_key(key)
    }

    /// Returns the number of keys.
    #[inline]
    pub fn len(&self) -> usize {
        self.keys.len()
    }

    /// Returns true if the universe has no keys.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_positions_follow_insertion_order() {
        let u = Universe::new(["b", "a", "c"]);
        assert_eq!(u.index_of(&"b"), Some(0));
        assert_eq!(u.index_of(&"c"), Some(2));
        assert_eq!(u.key(1), Some(&"a"));
        assert_eq!(u.index_of(&"z"), None);
    }

    #[test]
    fn test_duplicates_ignored() {
        let u = Universe::new([1, 2, 1, 3]);
        assert_eq!(u.len(), 3);
        assert_eq!(u.index_of(&1), Some(0));
        assert_eq!(u.keys(), &[1, 2, 3]);
    }
}
