//! Canonical attribute sets.
//!
//! Every determinant, dependent, key and attribute list in the workspace is an
//! [`AttrSet`]. Equality is by value and the derived ordering compares the
//! sorted member names lexicographically, which gives every algorithm the same
//! deterministic iteration order.

use std::collections::BTreeSet;
use std::collections::btree_set;
use std::fmt;

use serde::{Deserialize, Serialize};

/// An ordered set of attribute names.
#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AttrSet(BTreeSet<String>);

impl AttrSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a set from raw names, trimming each and skipping blanks.
    pub fn from_names<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        names.into_iter().collect()
    }

    /// Parses `{A, B}` or `A, B` notation.
    pub fn parse(text: &str) -> Self {
        let trimmed = text.trim();
        let inner = trimmed
            .strip_prefix('{')
            .unwrap_or(trimmed)
            .trim_end()
            .trim_end_matches('}');
        Self::from_names(inner.split(','))
    }

    pub fn single(name: impl Into<String>) -> Self {
        let mut set = Self::new();
        set.insert(name);
        set
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.0.contains(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> + '_ {
        self.0.iter().map(String::as_str)
    }

    pub fn insert(&mut self, name: impl Into<String>) -> bool {
        let name = name.into();
        let trimmed = name.trim();
        if trimmed.is_empty() {
            return false;
        }
        if trimmed.len() == name.len() {
            self.0.insert(name)
        } else {
            self.0.insert(trimmed.to_string())
        }
    }

    pub fn remove(&mut self, name: &str) -> bool {
        self.0.remove(name)
    }

    pub fn extend_from(&mut self, other: &AttrSet) {
        for name in &other.0 {
            self.0.insert(name.clone());
        }
    }

    pub fn remove_all(&mut self, other: &AttrSet) {
        self.0.retain(|name| !other.0.contains(name));
    }

    pub fn is_subset(&self, other: &AttrSet) -> bool {
        self.0.is_subset(&other.0)
    }

    pub fn is_superset(&self, other: &AttrSet) -> bool {
        self.0.is_superset(&other.0)
    }

    /// True when `self` is contained in `other` and smaller than it.
    pub fn is_strict_subset(&self, other: &AttrSet) -> bool {
        self.len() < other.len() && self.is_subset(other)
    }

    /// True when either set contains the other.
    pub fn is_comparable(&self, other: &AttrSet) -> bool {
        self.is_subset(other) || other.is_subset(self)
    }

    pub fn is_disjoint(&self, other: &AttrSet) -> bool {
        self.0.is_disjoint(&other.0)
    }

    pub fn union(&self, other: &AttrSet) -> AttrSet {
        Self(self.0.union(&other.0).cloned().collect())
    }

    pub fn intersection(&self, other: &AttrSet) -> AttrSet {
        Self(self.0.intersection(&other.0).cloned().collect())
    }

    pub fn difference(&self, other: &AttrSet) -> AttrSet {
        Self(self.0.difference(&other.0).cloned().collect())
    }

    /// Member names in sorted order.
    pub fn names(&self) -> Vec<String> {
        self.0.iter().cloned().collect()
    }

    /// Members joined with `separator`, in sorted order.
    pub fn joined(&self, separator: &str) -> String {
        self.names().join(separator)
    }

    /// All subsets with exactly `size` members, in lexicographic order.
    pub fn subsets_of_size(&self, size: usize) -> impl Iterator<Item = AttrSet> + '_ {
        let names: Vec<&String> = self.0.iter().collect();
        IndexCombinations::new(names.len(), size)
            .map(move |indices| Self(indices.iter().map(|&idx| names[idx].clone()).collect()))
    }
}

impl fmt::Display for AttrSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{{}}}", self.joined(", "))
    }
}

impl<S: AsRef<str>> FromIterator<S> for AttrSet {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        let mut set = Self::new();
        for name in iter {
            set.insert(name.as_ref());
        }
        set
    }
}

impl<'a> IntoIterator for &'a AttrSet {
    type Item = &'a String;
    type IntoIter = btree_set::Iter<'a, String>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

/// Lexicographic `k`-combinations of the indices `0..n`.
///
/// Yields nothing when `k > n` and a single empty combination when `k == 0`.
#[derive(Debug, Clone)]
pub struct IndexCombinations {
    n: usize,
    indices: Vec<usize>,
    started: bool,
    done: bool,
}

impl IndexCombinations {
    pub fn new(n: usize, k: usize) -> Self {
        Self {
            n,
            indices: (0..k).collect(),
            started: false,
            done: k > n,
        }
    }
}

impl Iterator for IndexCombinations {
    type Item = Vec<usize>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        if !self.started {
            self.started = true;
            return Some(self.indices.clone());
        }
        let k = self.indices.len();
        let mut pos = k;
        while pos > 0 {
            pos -= 1;
            if self.indices[pos] < self.n - k + pos {
                self.indices[pos] += 1;
                for next in pos + 1..k {
                    self.indices[next] = self.indices[next - 1] + 1;
                }
                return Some(self.indices.clone());
            }
        }
        self.done = true;
        None
    }
}
