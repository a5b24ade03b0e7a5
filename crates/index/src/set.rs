//! Bitset-backed sets over a fixed universe.

use crate::bitset::BitSet;
use crate::universe::Universe;
use alloc::rc::Rc;
use alloc::sync::Arc;
use alloc::vec::Vec;
use core::cell::RefCell;
use core::hash::Hash;

/// A set of keys drawn from a shared [`Universe`].
///
/// Sibling sets (same universe) combine with word-wise AND/OR.
#[derive(Clone, Debug)]
pub struct IndexedSet<K> {
    universe: Arc<Universe<K>>,
    bits: BitSet,
}

impl<K: Clone + Eq + Hash> IndexedSet<K> {
    /// Creates an empty set.
    pub fn empty(universe: Arc<Universe<K>>) -> Self {
        let bits = BitSet::with_capacity(universe.len());
        Self { universe, bits }
    }

    /// Creates a set holding the whole universe.
    pub fn full(universe: Arc<Universe<K>>) -> Self {
        let bits = BitSet::full(universe.len());
        Self { universe, bits }
    }

    /// Returns the universe.
    #[inline]
    pub fn universe(&self) -> &Arc<Universe<K>> {
        &self.universe
    }

    /// Returns the underlying bits.
    #[inline]
    pub fn bits(&self) -> &BitSet {
        &self.bits
    }

    /// Inserts a key. Returns true if it was newly added.
    pub fn insert(&mut self, key: &K) -> bool {
        match self.universe.index_of(key) {
            Some(i) => self.bits.insert(i),
            None => false,
        }
    }

    /// Removes a key. Returns true if it was present.
    pub fn remove(&mut self, key: &K) -> bool {
        match self.universe.index_of(key) {
            Some(i) => self.bits.remove(i),
            None => false,
        }
    }

    /// Returns true if the key is present.
    pub fn contains(&self, key: &K) -> bool {
        self.universe
            .index_of(key)
            .map(|i| self.bits.contains(i))
            .unwrap_or(false)
    }

    /// Inserts by universe position.
    #[inline]
    pub fn insert_index(&mut self, index: usize) -> bool {
        self.bits.insert(index)
    }

    /// Removes by universe position.
    #[inline]
    pub fn remove_index(&mut self, index: usize) -> bool {
        self.bits.remove(index)
    }

    /// Membership by universe position.
    #[inline]
    pub fn contains_index(&self, index: usize) -> bool {
        self.bits.contains(index)
    }

    /// Returns the number of keys present.
    pub fn len(&self) -> usize {
        self.bits.len()
    }

    /// Returns true if the set is empty.
    pub fn is_empty(&self) -> bool {
        self.bits.is_empty()
    }

    /// Keeps only keys also present in the sibling set.
    pub fn and(&mut self, other: &IndexedSet<K>) {
        debug_assert!(Arc::ptr_eq(&self.universe, &other.universe));
        self.bits.intersect_with(&other.bits);
    }

    /// Adds every key present in the sibling set.
    pub fn or(&mut self, other: &IndexedSet<K>) {
        debug_assert!(Arc::ptr_eq(&self.universe, &other.universe));
        self.bits.union_with(&other.bits);
    }

    /// Iterates universe positions in ascending order.
    pub fn iter_indices(&self) -> impl Iterator<Item = usize> + '_ {
        self.bits.iter()
    }

    /// Iterates keys in universe order.
    pub fn iter(&self) -> impl Iterator<Item = &K> + '_ {
        self.bits.iter().filter_map(move |i| self.universe.key(i))
    }
}

/// A set that is read through a live parent set.
///
/// Every read intersects the view's own members with the parent's current
/// members, so the view never reports a key the parent has since dropped.
#[derive(Clone, Debug)]
pub struct LiveView<K> {
    own: BitSet,
    parent: Rc<RefCell<IndexedSet<K>>>,
}

impl<K: Clone + Eq + Hash> LiveView<K> {
    /// Creates a view of `own` filtered through `parent`.
    pub fn new(own: &IndexedSet<K>, parent: Rc<RefCell<IndexedSet<K>>>) -> Self {
        Self {
            own: own.bits().clone(),
            parent,
        }
    }

    /// Membership by universe position.
    pub fn contains_index(&self, index: usize) -> bool {
        self.own.contains(index) && self.parent.borrow().contains_index(index)
    }

    /// Membership by key.
    pub fn contains(&self, key: &K) -> bool {
        let parent = self.parent.borrow();
        match parent.universe().index_of(key) {
            Some(i) => self.own.contains(i) && parent.contains_index(i),
            None => false,
        }
    }

    /// Snapshot of the current members' positions.
    pub fn indices(&self) -> Vec<usize> {
        let parent = self.parent.borrow();
        self.own
            .iter()
            .filter(|i| parent.contains_index(*i))
            .collect()
    }

    /// Number of current members.
    pub fn len(&self) -> usize {
        let mut bits = self.own.clone();
        bits.intersect_with(self.parent.borrow().bits());
        bits.len()
    }

    /// Returns true if the view currently has no members.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
