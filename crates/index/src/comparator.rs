//! Comparator implementations for column values and sort keys.

use alloc::sync::Arc;
use alloc::vec::Vec;
use core::cmp::Ordering;

/// Sort direction.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Order {
    /// Ascending order (smallest first)
    Asc,
    /// Descending order (largest first)
    Desc,
}

impl Order {
    /// Applies this order to a comparison result.
    #[inline]
    pub fn apply(&self, ord: Ordering) -> Ordering {
        match self {
            Order::Asc => ord,
            Order::Desc => ord.reverse(),
        }
    }

    /// Returns +1 for ascending and -1 for descending.
    #[inline]
    pub fn sign(&self) -> i8 {
        match self {
            Order::Asc => 1,
            Order::Desc => -1,
        }
    }

    /// Builds an order from a sign tag; any negative value is descending.
    pub fn from_sign(sign: i8) -> Self {
        if sign < 0 {
            Order::Desc
        } else {
            Order::Asc
        }
    }
}

/// A total order over keys.
pub trait Comparator<K: ?Sized> {
    /// Compares two keys according to the comparator's ordering.
    fn compare(&self, a: &K, b: &K) -> Ordering;

    /// Returns true if a < b according to this comparator.
    fn is_less(&self, a: &K, b: &K) -> bool {
        self.compare(a, b) == Ordering::Less
    }

    /// Returns true if a > b according to this comparator.
    fn is_greater(&self, a: &K, b: &K) -> bool {
        self.compare(a, b) == Ordering::Greater
    }

    /// Returns true if a == b according to this comparator.
    fn is_equal(&self, a: &K, b: &K) -> bool {
        self.compare(a, b) == Ordering::Equal
    }
}

impl<K: ?Sized, C: Comparator<K> + ?Sized> Comparator<K> for &C {
    fn compare(&self, a: &K, b: &K) -> Ordering {
        (**self).compare(a, b)
    }
}

impl<K: ?Sized, C: Comparator<K> + ?Sized> Comparator<K> for Arc<C> {
    fn compare(&self, a: &K, b: &K) -> Ordering {
        (**self).compare(a, b)
    }
}

/// Comparator for single keys that implement `Ord`.
#[derive(Clone, Copy, Debug)]
pub struct SimpleComparator {
    order: Order,
}

impl Default for SimpleComparator {
    fn default() -> Self {
        Self::asc()
    }
}

impl SimpleComparator {
    /// Creates a new simple comparator with the given order.
    pub fn new(order: Order) -> Self {
        Self { order }
    }

    /// Creates an ascending comparator.
    pub fn asc() -> Self {
        Self::new(Order::Asc)
    }

    /// Creates a descending comparator.
    pub fn desc() -> Self {
        Self::new(Order::Desc)
    }

    /// Returns the order of this comparator.
    pub fn order(&self) -> Order {
        self.order
    }
}

impl<K: Ord + ?Sized> Comparator<K> for SimpleComparator {
    fn compare(&self, a: &K, b: &K) -> Ordering {
        self.order.apply(a.cmp(b))
    }
}

/// Composite comparator over key tuples.
///
/// Position `i` of each tuple is compared with the inner comparator and the
/// `i`-th order; the first non-equal position decides.
#[derive(Clone, Debug)]
pub struct MultiKeyComparator<C> {
    orders: Vec<Order>,
    inner: C,
}

impl<C> MultiKeyComparator<C> {
    /// Creates a new multi-key comparator.
    pub fn new(orders: Vec<Order>, inner: C) -> Self {
        Self { orders, inner }
    }

    /// Returns the orders of this comparator.
    pub fn orders(&self) -> &[Order] {
        &self.orders
    }
}

impl<K, C: Comparator<K>> Comparator<[K]> for MultiKeyComparator<C> {
    fn compare(&self, a: &[K], b: &[K]) -> Ordering {
        for (i, order) in self.orders.iter().enumerate() {
            let cmp = match (a.get(i), b.get(i)) {
                (Some(av), Some(bv)) => order.apply(self.inner.compare(av, bv)),
                (None, Some(_)) => Ordering::Less,
                (Some(_), None) => Ordering::Greater,
                (None, None) => Ordering::Equal,
            };
            if cmp != Ordering::Equal {
                return cmp;
            }
        }
        Ordering::Equal
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec;

    #[test]
    fn test_order_apply() {
        assert_eq!(Order::Asc.apply(Ordering::Less), Ordering::Less);
        assert_eq!(Order::Desc.apply(Ordering::Less), Ordering::Greater);
        assert_eq!(Order::Asc.sign(), 1);
        assert_eq!(Order::Desc.sign(), -1);
        assert_eq!(Order::from_sign(-1), Order::Desc);
        assert_eq!(Order::from_sign(1), Order::Asc);
    }

    #[test]
    fn test_simple_comparator() {
        let asc = SimpleComparator::asc();
        assert_eq!(asc.compare(&1, &2), Ordering::Less);
        assert!(asc.is_equal(&3, &3));
        let desc = SimpleComparator::desc();
        assert_eq!(desc.compare(&1, &2), Ordering::Greater);
    }

    #[test]
    fn test_shared_comparator() {
        let cmp: Arc<dyn Comparator<i32> + Send + Sync> = Arc::new(SimpleComparator::asc());
        assert!(cmp.is_less(&1, &2));
    }

    #[test]
    fn test_multi_key_comparator() {
        let cmp = MultiKeyComparator::new(vec![Order::Asc, Order::Desc], SimpleComparator::asc());
        let a = [1, 5];
        let b = [1, 3];
        let c = [2, 9];
        assert_eq!(cmp.compare(&a[..], &b[..]), Ordering::Less);
        assert_eq!(cmp.compare(&b[..], &c[..]), Ordering::Less);
        assert_eq!(cmp.compare(&a[..], &a[..]), Ordering::Equal);
    }
}
