//! Fixed-capacity bitset over dense positions.

use alloc::vec;
use alloc::vec::Vec;

const WORD_BITS: usize = 64;

#[inline]
fn word_count(capacity: usize) -> usize {
    (capacity + WORD_BITS - 1) / WORD_BITS
}

/// A set of positions in `0..capacity`, one bit per position.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct BitSet {
    words: Vec<u64>,
    capacity: usize,
}

impl BitSet {
    /// Creates an empty set able to hold positions `0..capacity`.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            words: vec![0; word_count(capacity)],
            capacity,
        }
    }

    /// Creates a set holding every position in `0..capacity`.
    pub fn full(capacity: usize) -> Self {
        let mut set = Self {
            words: vec![u64::MAX; word_count(capacity)],
            capacity,
        };
        set.clear_tail();
        set
    }

    /// Builds a set from positions; positions past `capacity` are ignored.
    pub fn from_positions(capacity: usize, positions: impl IntoIterator<Item = usize>) -> Self {
        let mut set = Self::with_capacity(capacity);
        for pos in positions {
            set.insert(pos);
        }
        set
    }

    fn clear_tail(&mut self) {
        let used = self.capacity % WORD_BITS;
        if used != 0 {
            if let Some(last) = self.words.last_mut() {
                *last &= (1u64 << used) - 1;
            }
        }
    }

    /// Returns the capacity.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Inserts a position. Returns true if it was newly added.
    #[inline]
    pub fn insert(&mut self, pos: usize) -> bool {
        if pos >= self.capacity {
            return false;
        }
        let (w, b) = (pos / WORD_BITS, pos % WORD_BITS);
        let was = self.words[w] & (1 << b) != 0;
        self.words[w] |= 1 << b;
        !was
    }

    /// Removes a position. Returns true if it was present.
    #[inline]
    pub fn remove(&mut self, pos: usize) -> bool {
        if pos >= self.capacity {
            return false;
        }
        let (w, b) = (pos / WORD_BITS, pos % WORD_BITS);
        let was = self.words[w] & (1 << b) != 0;
        self.words[w] &= !(1 << b);
        was
    }

    /// Returns true if the position is present.
    #[inline]
    pub fn contains(&self, pos: usize) -> bool {
        pos < self.capacity && self.words[pos / WORD_BITS] & (1 << (pos % WORD_BITS)) != 0
    }

    /// Returns the number of positions present.
    pub fn len(&self) -> usize {
        self.words.iter().map(|w| w.count_ones() as usize).sum()
    }

    /// Returns true if no position is present.
    pub fn is_empty(&self) -> bool {
        self.words.iter().all(|w| *w == 0)
    }

    /// Removes every position.
    pub fn clear(&mut self) {
        for w in &mut self.words {
            *w = 0;
        }
    }

    /// Keeps only positions also present in `other`.
    pub fn intersect_with(&mut self, other: &BitSet) {
        for (i, w) in self.words.iter_mut().enumerate() {
            *w &= other.words.get(i).copied().unwrap_or(0);
        }
    }

    /// Adds every position present in `other` that fits this capacity.
    pub fn union_with(&mut self, other: &BitSet) {
        for (w, o) in self.words.iter_mut().zip(other.words.iter()) {
            *w |= *o;
        }
        self.clear_tail();
    }

    /// Removes every position present in `other`.
    pub fn difference_with(&mut self, other: &BitSet) {
        for (w, o) in self.words.iter_mut().zip(other.words.iter()) {
            *w &= !*o;
        }
    }

    /// Returns true if every position of `self` is in `other`.
    pub fn is_subset(&self, other: &BitSet) -> bool {
        self.words
            .iter()
            .enumerate()
            .all(|(i, w)| w & !other.words.get(i).copied().unwrap_or(0) == 0)
    }

    /// Iterates positions in ascending order.
    pub fn iter(&self) -> BitSetIter<'_> {
        BitSetIter {
            words: &self.words,
            word_index: 0,
            current: self.words.first().copied().unwrap_or(0),
        }
    }
}

/// Ascending iterator over the positions of a [`BitSet`].
#[derive(Clone, Debug)]
pub struct BitSetIter<'a> {
    words: &'a [u64],
    word_index: usize,
    current: u64,
}

impl Iterator for BitSetIter<'_> {
    type Item = usize;

    fn next(&mut self) -> Option<usize> {
        loop {
            if self.current != 0 {
                let bit = self.current.trailing_zeros() as usize;
                self.current &= self.current - 1;
                return Some(self.word_index * WORD_BITS + bit);
            }
            self.word_index += 1;
            if self.word_index >= self.words.len() {
                return None;
            }
            self.current = self.words[self.word_index];
        }
    }
}
