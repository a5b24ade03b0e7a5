//! Comparison relations between two values.

use crate::error::{Error, Result};
use crate::types::DataType;
use core::cmp::Ordering;
use core::fmt;

/// A binary comparison relation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Relation {
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
}

impl Relation {
    /// All relations, in a stable order.
    pub const ALL: [Relation; 6] = [
        Relation::Eq,
        Relation::Ne,
        Relation::Lt,
        Relation::Le,
        Relation::Gt,
        Relation::Ge,
    ];

    /// SQL spelling of the relation.
    pub fn symbol(&self) -> &'static str {
        match self {
            Relation::Eq => "=",
            Relation::Ne => "<>",
            Relation::Lt => "<",
            Relation::Le => "<=",
            Relation::Gt => ">",
            Relation::Ge => ">=",
        }
    }

    /// The relation seen from the other operand: `a < b` iff `b > a`.
    pub fn reversed(&self) -> Relation {
        match self {
            Relation::Lt => Relation::Gt,
            Relation::Le => Relation::Ge,
            Relation::Gt => Relation::Lt,
            Relation::Ge => Relation::Le,
            other => *other,
        }
    }

    /// Returns true for `<`, `<=`, `>` and `>=`.
    pub fn is_range(&self) -> bool {
        matches!(
            self,
            Relation::Lt | Relation::Le | Relation::Gt | Relation::Ge
        )
    }

    /// Decides the relation from the ordering of the left operand against the right.
    pub fn holds(&self, ordering: Ordering) -> bool {
        match self {
            Relation::Eq => ordering == Ordering::Equal,
            Relation::Ne => ordering != Ordering::Equal,
            Relation::Lt => ordering == Ordering::Less,
            Relation::Le => ordering != Ordering::Greater,
            Relation::Gt => ordering == Ordering::Greater,
            Relation::Ge => ordering != Ordering::Less,
        }
    }

    /// Rejects range relations on types without a meaningful order.
    pub fn check(&self, data_type: DataType) -> Result<()> {
        if self.is_range() && !data_type.supports_ordering() {
            return Err(Error::unsupported_relation(self.symbol(), data_type));
        }
        Ok(())
    }
}

impl fmt::Display for Relation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reversed_is_involution() {
        for rel in Relation::ALL {
            assert_eq!(rel.reversed().reversed(), rel);
        }
        assert_eq!(Relation::Lt.reversed(), Relation::Gt);
        assert_eq!(Relation::Ge.reversed(), Relation::Le);
    }

    #[test]
    fn test_holds_matches_reversed() {
        for rel in Relation::ALL {
            for ord in [Ordering::Less, Ordering::Equal, Ordering::Greater] {
                assert_eq!(rel.holds(ord), rel.reversed().holds(ord.reverse()));
            }
        }
    }

    #[test]
    fn test_check_rejects_unordered_types() {
        assert!(Relation::Lt.check(DataType::Int64).is_ok());
        assert!(Relation::Eq.check(DataType::Boolean).is_ok());
        assert_eq!(
            Relation::Gt.check(DataType::Bytes),
            Err(Error::unsupported_relation(">", DataType::Bytes))
        );
        assert!(Relation::Le.check(DataType::Boolean).is_err());
    }
}
