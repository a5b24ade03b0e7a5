//! Row order of a result: insertion order, or a lazy stable multi-key sort.

use super::cell::Cell;
use alloc::vec::Vec;
use core::cell::{Cell as Counter, OnceCell};
use quarry_index::{Comparator, MultiKeyComparator, Order};
use quarry_storage::ValueComparator;
use quarry_core::Value;

pub(crate) enum RowOrder {
    Insertion,
    Sorted {
        keys: Vec<usize>,
        cmp: MultiKeyComparator<ValueComparator>,
        permutation: OnceCell<Vec<usize>>,
        passes: Counter<usize>,
    },
}

impl RowOrder {
    pub(crate) fn sorted(keys: Vec<(usize, Order)>, cmp: ValueComparator) -> Self {
        let (columns, orders) = keys.into_iter().unzip();
        RowOrder::Sorted {
            keys: columns,
            cmp: MultiKeyComparator::new(orders, cmp),
            permutation: OnceCell::new(),
            passes: Counter::new(0),
        }
    }

    /// Physical index of the `logical`-th row.
    pub(crate) fn physical(&self, rows: &[Vec<Cell>], logical: usize) -> Option<usize> {
        match self {
            RowOrder::Insertion => (logical < rows.len()).then_some(logical),
            RowOrder::Sorted { .. } => self.permutation(rows).get(logical).copied(),
        }
    }

    /// Accounts for a row appended at physical index `index`.
    ///
    /// Once sorted, the row is placed after every row it does not precede,
    /// so the order stays stable without sorting again.
    pub(crate) fn appended(&mut self, rows: &[Vec<Cell>], index: usize) {
        if let RowOrder::Sorted {
            keys,
            cmp,
            permutation,
            ..
        } = self
        {
            if let Some(order) = permutation.get_mut() {
                let key = sort_key(&rows[index], keys);
                let at = order.partition_point(|&i| {
                    cmp.compare(&sort_key(&rows[i], keys), &key) != core::cmp::Ordering::Greater
                });
                order.insert(at, index);
            }
        }
    }

    pub(crate) fn sort_passes(&self) -> usize {
        match self {
            RowOrder::Insertion => 0,
            RowOrder::Sorted { passes, .. } => passes.get(),
        }
    }

    fn permutation(&self, rows: &[Vec<Cell>]) -> &[usize] {
        match self {
            RowOrder::Insertion => &[],
            RowOrder::Sorted {
                keys,
                cmp,
                permutation,
                passes,
            } => permutation.get_or_init(|| {
                passes.set(passes.get() + 1);
                let extracted: Vec<Vec<Value>> = rows.iter().map(|r| sort_key(r, keys)).collect();
                let mut order: Vec<usize> = (0..rows.len()).collect();
                order.sort_by(|&a, &b| cmp.compare(&extracted[a], &extracted[b]));
                order
            }),
        }
    }
}

fn sort_key(row: &[Cell], keys: &[usize]) -> Vec<Value> {
    keys.iter()
        .map(|&k| row.get(k).map_or(Value::Null, |c| c.value().into_owned()))
        .collect()
}
