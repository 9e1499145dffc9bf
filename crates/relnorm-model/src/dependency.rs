use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::attrs::AttrSet;

/// Functional dependencies keyed by determinant. One dependent set per
/// determinant; re-adding a determinant merges the dependents.
pub type FdMap = BTreeMap<AttrSet, AttrSet>;

/// Multivalued dependencies keyed by determinant.
pub type MvdMap = BTreeMap<AttrSet, Vec<MvdSplit>>;

/// The two complementary sides of a multivalued dependency `X ->> Y | Z`.
///
/// The pair is unordered: construction stores the smaller side first so that
/// `Y | Z` and `Z | Y` compare equal.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct MvdSplit {
    pub left: AttrSet,
    pub right: AttrSet,
}

impl MvdSplit {
    pub fn new(first: AttrSet, second: AttrSet) -> Self {
        if second < first {
            Self {
                left: second,
                right: first,
            }
        } else {
            Self {
                left: first,
                right: second,
            }
        }
    }

    pub fn sides(&self) -> [&AttrSet; 2] {
        [&self.left, &self.right]
    }

    /// Attributes mentioned on either side.
    pub fn span(&self) -> AttrSet {
        self.left.union(&self.right)
    }

    pub fn is_overlapping(&self) -> bool {
        !self.left.is_disjoint(&self.right)
    }
}

impl fmt::Display for MvdSplit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} | {}", self.left, self.right)
    }
}

/// A reference from local columns to a key of another relation.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ForeignKey {
    pub columns: AttrSet,
    pub references: String,
    pub referenced_key: AttrSet,
}

impl fmt::Display for ForeignKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} references {}{}",
            self.columns, self.references, self.referenced_key
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn split_is_unordered() {
        let b = AttrSet::single("B");
        let c = AttrSet::single("C");
        assert_eq!(
            MvdSplit::new(b.clone(), c.clone()),
            MvdSplit::new(c, b)
        );
    }
}
