//! Row-to-candidate indexes between two tables.
//!
//! A [`JoinMap`] from table A to table B stores, for every fetched row of A,
//! the positions of the rows of B it can join with, plus the fraction of the
//! full cross product those candidates cover.

use alloc::rc::Rc;
use alloc::vec::Vec;
use quarry_core::{Relation, Row, Value};
use quarry_index::{CandidateIter, CandidateSet, Comparator};

/// Candidate rows of a target table for each row of a source table.
#[derive(Clone, Debug, PartialEq)]
pub struct JoinMap {
    candidates: Vec<CandidateSet>,
    target_len: usize,
    ratio: f64,
}

impl JoinMap {
    /// Wraps precomputed candidate sets over a target of `target_len` rows.
    pub fn new(candidates: Vec<CandidateSet>, target_len: usize) -> Self {
        let pairs: usize = candidates.iter().map(CandidateSet::len).sum();
        let total = candidates.len() * target_len;
        let ratio = if total == 0 {
            0.0
        } else {
            pairs as f64 / total as f64
        };
        Self {
            candidates,
            target_len,
            ratio,
        }
    }

    /// Builds the map for `source.column REL target.column`.
    ///
    /// NULL never matches. Target rows are sorted once by the comparator, so
    /// each source row resolves its candidates with two binary searches.
    pub fn build<C: Comparator<Value> + ?Sized>(
        source: &[Rc<Row>],
        source_column: usize,
        target: &[Rc<Row>],
        target_column: usize,
        relation: Relation,
        cmp: &C,
    ) -> Self {
        let key = |row: &Rc<Row>, column: usize| -> Option<Value> {
            row.get(column).filter(|v| !v.is_null()).cloned()
        };
        let mut order: Vec<(usize, Value)> = target
            .iter()
            .enumerate()
            .filter_map(|(pos, row)| key(row, target_column).map(|v| (pos, v)))
            .collect();
        order.sort_by(|a, b| cmp.compare(&a.1, &b.1));

        let candidates = source
            .iter()
            .map(|row| {
                let value = match key(row, source_column) {
                    Some(v) => v,
                    None => return CandidateSet::empty(),
                };
                let lo = order.partition_point(|(_, v)| cmp.is_less(v, &value));
                let hi = order.partition_point(|(_, v)| !cmp.is_greater(v, &value));
                let slices: [&[(usize, Value)]; 2] = match relation {
                    Relation::Eq => [&order[lo..hi], &[]],
                    Relation::Ne => [&order[..lo], &order[hi..]],
                    Relation::Lt => [&order[hi..], &[]],
                    Relation::Le => [&order[lo..], &[]],
                    Relation::Gt => [&order[..lo], &[]],
                    Relation::Ge => [&order[..hi], &[]],
                };
                CandidateSet::from_positions(
                    target.len(),
                    slices.iter().flat_map(|s| s.iter().map(|(pos, _)| *pos)),
                )
            })
            .collect();
        Self::new(candidates, target.len())
    }

    /// Candidate positions for the source row at `source`.
    pub fn candidates(&self, source: usize) -> CandidateIter<'_> {
        match self.candidates.get(source) {
            Some(set) => set.iter(),
            None => CandidateIter::One(None),
        }
    }

    /// Candidate set for the source row at `source`.
    pub fn candidate_set(&self, source: usize) -> Option<&CandidateSet> {
        self.candidates.get(source)
    }

    /// Matched pairs divided by the full cross product, in `[0, 1]`.
    #[inline]
    pub fn ratio(&self) -> f64 {
        self.ratio
    }

    /// Number of source rows.
    pub fn source_len(&self) -> usize {
        self.candidates.len()
    }

    /// Number of target rows.
    pub fn target_len(&self) -> usize {
        self.target_len
    }

    /// The reciprocal map from target back to source.
    pub fn reversed(&self) -> JoinMap {
        let source_len = self.candidates.len();
        let mut back = alloc::vec![CandidateSet::empty(); self.target_len];
        for (source, set) in self.candidates.iter().enumerate() {
            for target in set.iter() {
                back[target].insert(source_len, source);
            }
        }
        JoinMap::new(back, source_len)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec;
    use quarry_index::SimpleComparator;

    fn rows(values: &[Option<i64>]) -> Vec<Rc<Row>> {
        values
            .iter()
            .enumerate()
            .map(|(i, v)| Rc::new(Row::new(i as u64, vec![Value::from(*v)])))
            .collect()
    }

    fn collect(map: &JoinMap, source: usize) -> Vec<usize> {
        map.candidates(source).collect()
    }

    #[test]
    fn test_equality_map() {
        let a = rows(&[Some(1), Some(2), Some(3)]);
        let b = rows(&[Some(1), Some(2), Some(2), Some(4)]);
        let map = JoinMap::build(&a, 0, &b, 0, Relation::Eq, &SimpleComparator::asc());
        assert_eq!(collect(&map, 0), vec![0]);
        assert_eq!(collect(&map, 1), vec![1, 2]);
        assert!(collect(&map, 2).is_empty());
        assert_eq!(map.ratio(), 3.0 / 12.0);
    }

    #[test]
    fn test_range_relations() {
        let a = rows(&[Some(2)]);
        let b = rows(&[Some(3), Some(1), Some(2)]);
        let cmp = SimpleComparator::asc();
        let cases = [
            (Relation::Lt, vec![0]),
            (Relation::Le, vec![0, 2]),
            (Relation::Gt, vec![1]),
            (Relation::Ge, vec![1, 2]),
            (Relation::Ne, vec![0, 1]),
        ];
        for (rel, expected) in cases {
            let map = JoinMap::build(&a, 0, &b, 0, rel, &cmp);
            assert_eq!(collect(&map, 0), expected, "relation {}", rel);
        }
    }

    #[test]
    fn test_null_never_matches() {
        let a = rows(&[None, Some(1)]);
        let b = rows(&[Some(1), None]);
        let map = JoinMap::build(&a, 0, &b, 0, Relation::Eq, &SimpleComparator::asc());
        assert!(collect(&map, 0).is_empty());
        assert_eq!(collect(&map, 1), vec![0]);
        let ne = JoinMap::build(&a, 0, &b, 0, Relation::Ne, &SimpleComparator::asc());
        assert!(collect(&ne, 1).is_empty());
    }

    #[test]
    fn test_reversed_is_reciprocal() {
        let a = rows(&[Some(1), Some(2), Some(2)]);
        let b = rows(&[Some(2), Some(5)]);
        let map = JoinMap::build(&a, 0, &b, 0, Relation::Eq, &SimpleComparator::asc());
        let back = map.reversed();
        assert_eq!(back.source_len(), 2);
        assert_eq!(collect(&back, 0), vec![1, 2]);
        assert!(collect(&back, 1).is_empty());
        assert_eq!(back.ratio(), map.ratio());
    }

    #[test]
    fn test_empty_side_ratio_zero() {
        let a = rows(&[]);
        let b = rows(&[Some(1)]);
        let map = JoinMap::build(&a, 0, &b, 0, Relation::Eq, &SimpleComparator::asc());
        assert_eq!(map.ratio(), 0.0);
        assert!(collect(&map, 0).is_empty());
    }
}
