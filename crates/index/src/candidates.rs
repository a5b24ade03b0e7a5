//! Candidate position sets with a single-element fast path.

use crate::bitset::{BitSet, BitSetIter};

/// A set with capacity one.
///
/// Unique-key joins produce at most one candidate per row; this avoids
/// allocating a bitset for each of them.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct SingleSet {
    slot: Option<usize>,
}

impl SingleSet {
    /// Creates an empty set.
    pub const fn empty() -> Self {
        Self { slot: None }
    }

    /// Creates a set holding one position.
    pub const fn of(pos: usize) -> Self {
        Self { slot: Some(pos) }
    }

    /// Inserts a position. Returns true if it was newly added.
    ///
    /// The set is left unchanged when any position is already held; check
    /// [`SingleSet::is_empty`] to tell a duplicate from a full set.
    pub fn insert(&mut self, pos: usize) -> bool {
        match self.slot {
            None => {
                self.slot = Some(pos);
                true
            }
            Some(_) => false,
        }
    }

    /// Returns the held position.
    #[inline]
    pub fn get(&self) -> Option<usize> {
        self.slot
    }

    /// Returns true if the position is held.
    #[inline]
    pub fn contains(&self, pos: usize) -> bool {
        self.slot == Some(pos)
    }

    /// Returns 0 or 1.
    #[inline]
    pub fn len(&self) -> usize {
        self.slot.is_some() as usize
    }

    /// Returns true if nothing is held.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.slot.is_none()
    }
}

/// Positions of the rows in one table that may join with a given row of another.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CandidateSet {
    /// One or zero candidates.
    One(SingleSet),
    /// Any number of candidates.
    Many(BitSet),
}

impl Default for CandidateSet {
    fn default() -> Self {
        CandidateSet::One(SingleSet::empty())
    }
}

impl CandidateSet {
    /// Creates an empty candidate set.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Builds the smallest representation for the positions.
    pub fn from_positions(capacity: usize, positions: impl IntoIterator<Item = usize>) -> Self {
        let mut set = Self::empty();
        for pos in positions {
            set.insert(capacity, pos);
        }
        set
    }

    /// Inserts a position, promoting to a bitset on the second distinct member.
    pub fn insert(&mut self, capacity: usize, pos: usize) -> bool {
        if pos >= capacity {
            return false;
        }
        match self {
            CandidateSet::One(single) => {
                if single.contains(pos) {
                    return false;
                }
                if single.insert(pos) {
                    return true;
                }
                let mut bits = BitSet::with_capacity(capacity);
                if let Some(held) = single.get() {
                    bits.insert(held);
                }
                bits.insert(pos);
                *self = CandidateSet::Many(bits);
                true
            }
            CandidateSet::Many(bits) => bits.insert(pos),
        }
    }

    /// Returns true if the position is a candidate.
    pub fn contains(&self, pos: usize) -> bool {
        match self {
            CandidateSet::One(single) => single.contains(pos),
            CandidateSet::Many(bits) => bits.contains(pos),
        }
    }

    /// Returns the number of candidates.
    pub fn len(&self) -> usize {
        match self {
            CandidateSet::One(single) => single.len(),
            CandidateSet::Many(bits) => bits.len(),
        }
    }

    /// Returns true if there are no candidates.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Iterates candidate positions in ascending order.
    pub fn iter(&self) -> CandidateIter<'_> {
        match self {
            CandidateSet::One(single) => CandidateIter::One(single.get()),
            CandidateSet::Many(bits) => CandidateIter::Many(bits.iter()),
        }
    }
}

/// Iterator over a [`CandidateSet`].
#[derive(Clone, Debug)]
pub enum CandidateIter<'a> {
    One(Option<usize>),
    Many(BitSetIter<'a>),
}

impl Iterator for CandidateIter<'_> {
    type Item = usize;

    #[inline]
    fn next(&mut self) -> Option<usize> {
        match self {
            CandidateIter::One(slot) => slot.take(),
            CandidateIter::Many(iter) => iter.next(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec;
    use alloc::vec::Vec;

    #[test]
    fn test_single_set_capacity_one() {
        let mut set = SingleSet::empty();
        assert!(set.insert(4));
        assert!(!set.insert(4));
        assert!(!set.insert(5));
        assert_eq!(set.get(), Some(4));
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn test_candidate_insert_reports_new_members() {
        let mut set = CandidateSet::empty();
        assert!(set.insert(10, 3));
        assert!(!set.insert(10, 3));
        assert!(matches!(set, CandidateSet::One(_)));
        assert!(set.insert(10, 8));
        assert!(!set.insert(10, 8));
        assert_eq!(set.len(), 2);
    }

    #[test]
    fn test_candidate_set_stays_single() {
        let set = CandidateSet::from_positions(10, [7]);
        assert!(matches!(set, CandidateSet::One(_)));
        assert_eq!(set.iter().collect::<Vec<_>>(), vec![7]);
    }

    #[test]
    fn test_candidate_set_promotes() {
        let set = CandidateSet::from_positions(10, [7, 2, 7]);
        assert!(matches!(set, CandidateSet::Many(_)));
        assert_eq!(set.len(), 2);
        assert_eq!(set.iter().collect::<Vec<_>>(), vec![2, 7]);
    }

    #[test]
    fn test_candidate_out_of_capacity_ignored() {
        let set = CandidateSet::from_positions(3, [5]);
        assert!(set.is_empty());
    }
}
