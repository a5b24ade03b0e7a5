//! Narrowable value ranges.
//!
//! A [`Range`] starts unbounded and only ever tightens. Predicate pushdown
//! feeds comparisons into it and hands the result to the store's fetch.

use crate::comparator::Comparator;
use core::cmp::Ordering;
use core::fmt;

/// One end of a range.
#[derive(Clone, Debug, PartialEq)]
pub struct Bound<K> {
    pub value: K,
    pub inclusive: bool,
}

impl<K> Bound<K> {
    /// Creates an inclusive bound.
    pub fn inclusive(value: K) -> Self {
        Self {
            value,
            inclusive: true,
        }
    }

    /// Creates an exclusive bound.
    pub fn exclusive(value: K) -> Self {
        Self {
            value,
            inclusive: false,
        }
    }
}

/// A `[lower, upper]` interval over a comparator, narrowed monotonically.
#[derive(Clone)]
pub struct Range<K, C> {
    lower: Option<Bound<K>>,
    upper: Option<Bound<K>>,
    cmp: C,
}

impl<K: Clone, C: Comparator<K>> Range<K, C> {
    /// Creates a range with no bounds.
    pub fn unbounded(cmp: C) -> Self {
        Self {
            lower: None,
            upper: None,
            cmp,
        }
    }

    /// Returns the lower bound.
    #[inline]
    pub fn lower(&self) -> Option<&Bound<K>> {
        self.lower.as_ref()
    }

    /// Returns the upper bound.
    #[inline]
    pub fn upper(&self) -> Option<&Bound<K>> {
        self.upper.as_ref()
    }

    /// Returns true if neither end is bounded.
    pub fn is_unbounded(&self) -> bool {
        self.lower.is_none() && self.upper.is_none()
    }

    /// Tightens the lower bound. Returns true if the range changed.
    pub fn narrow_lower(&mut self, value: K, inclusive: bool) -> bool {
        let tighter = match &self.lower {
            None => true,
            Some(current) => match self.cmp.compare(&value, &current.value) {
                Ordering::Greater => true,
                Ordering::Equal => current.inclusive && !inclusive,
                Ordering::Less => false,
            },
        };
        if tighter {
            self.lower = Some(Bound { value, inclusive });
        }
        tighter
    }

    /// Tightens the upper bound. Returns true if the range changed.
    pub fn narrow_upper(&mut self, value: K, inclusive: bool) -> bool {
        let tighter = match &self.upper {
            None => true,
            Some(current) => match self.cmp.compare(&value, &current.value) {
                Ordering::Less => true,
                Ordering::Equal => current.inclusive && !inclusive,
                Ordering::Greater => false,
            },
        };
        if tighter {
            self.upper = Some(Bound { value, inclusive });
        }
        tighter
    }

    /// Tightens both ends to a single value.
    pub fn narrow_eq(&mut self, value: K) -> bool {
        let lower = self.narrow_lower(value.clone(), true);
        let upper = self.narrow_upper(value, true);
        lower || upper
    }

    /// Tightens with optional bounds on either side.
    pub fn narrow(&mut self, lower: Option<Bound<K>>, upper: Option<Bound<K>>) -> bool {
        let mut changed = false;
        if let Some(b) = lower {
            changed |= self.narrow_lower(b.value, b.inclusive);
        }
        if let Some(b) = upper {
            changed |= self.narrow_upper(b.value, b.inclusive);
        }
        changed
    }

    /// Tightens this range with the bounds of another.
    pub fn intersect<D>(&mut self, other: &Range<K, D>) -> bool {
        self.narrow(other.lower.clone(), other.upper.clone())
    }

    /// Returns true if the key lies within the range.
    pub fn contains(&self, key: &K) -> bool {
        let lower_ok = match &self.lower {
            None => true,
            Some(b) => match self.cmp.compare(key, &b.value) {
                Ordering::Greater => true,
                Ordering::Equal => b.inclusive,
                Ordering::Less => false,
            },
        };
        let upper_ok = match &self.upper {
            None => true,
            Some(b) => match self.cmp.compare(key, &b.value) {
                Ordering::Less => true,
                Ordering::Equal => b.inclusive,
                Ordering::Greater => false,
            },
        };
        lower_ok && upper_ok
    }

    /// Returns true if no key can satisfy both bounds.
    pub fn is_empty(&self) -> bool {
        match (&self.lower, &self.upper) {
            (Some(l), Some(u)) => match self.cmp.compare(&l.value, &u.value) {
                Ordering::Greater => true,
                Ordering::Equal => !(l.inclusive && u.inclusive),
                Ordering::Less => false,
            },
            _ => false,
        }
    }
}

impl<K: fmt::Debug, C> fmt::Debug for Range<K, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Range")
            .field("lower", &self.lower)
            .field("upper", &self.upper)
            .finish()
    }
}

impl<K: PartialEq, C> PartialEq for Range<K, C> {
    fn eq(&self, other: &Self) -> bool {
        self.lower == other.lower && self.upper == other.upper
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::comparator::SimpleComparator;

    fn range() -> Range<i64, SimpleComparator> {
        Range::unbounded(SimpleComparator::asc())
    }

    #[test]
    fn test_unbounded_contains_everything() {
        let r = range();
        assert!(r.is_unbounded());
        assert!(r.contains(&i64::MIN));
        assert!(r.contains(&i64::MAX));
    }

    #[test]
    fn test_narrow_never_widens() {
        let mut r = range();
        assert!(r.narrow_upper(10, true));
        assert!(!r.narrow_upper(20, true));
        assert_eq!(r.upper().unwrap().value, 10);
        assert!(r.narrow_upper(10, false));
        assert!(!r.contains(&10));
        assert!(r.narrow_lower(3, true));
        assert!(!r.narrow_lower(1, false));
        assert!(r.contains(&3));
        assert!(!r.contains(&2));
    }

    #[test]
    fn test_narrow_eq() {
        let mut r = range();
        r.narrow_lower(0, true);
        r.narrow_eq(5);
        assert!(r.contains(&5));
        assert!(!r.contains(&4));
        assert!(!r.contains(&6));
        assert!(!r.is_empty());
    }

    #[test]
    fn test_conflicting_bounds_empty() {
        let mut r = range();
        r.narrow_eq(5);
        r.narrow_lower(6, true);
        assert!(r.is_empty());

        let mut r = range();
        r.narrow_lower(5, false);
        r.narrow_upper(5, true);
        assert!(r.is_empty());
    }

    #[test]
    fn test_intersect() {
        let mut a = range();
        a.narrow_lower(1, true);
        let mut b = range();
        b.narrow_upper(9, false);
        a.intersect(&b);
        assert_eq!(a.lower().unwrap().value, 1);
        assert_eq!(a.upper().unwrap().value, 9);
        assert!(!a.upper().unwrap().inclusive);
    }
}
