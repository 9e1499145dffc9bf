//! Empirical multivalued dependency discovery.
//!
//! The miner inspects the data sample only; declared dependencies play no
//! part. Every non-empty proper subset of the attributes is tried as a
//! determinant and every unordered two-way split of the remaining attributes
//! is checked, so the cost grows exponentially with the attribute count. This
//! is a deliberate boundary: schemas with more than a dozen or so attributes
//! should not be pushed through 4NF without declared dependencies.

use std::collections::{BTreeMap, BTreeSet};

use polars::prelude::DataFrame;
use relnorm_model::sample::has_columns;
use relnorm_model::{AttrSet, IndexCombinations, MvdSplit};
use tracing::debug;

use crate::sample::Sample;

/// A multivalued dependency `determinant ->> split.left | split.right` that
/// holds on the sample.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MinedMvd {
    pub determinant: AttrSet,
    pub split: MvdSplit,
}

/// Finds every non-trivial MVD that holds on `data`.
///
/// Determinants are visited by ascending size, then lexicographically.
/// Attributes that are constant within every determinant group carry no
/// multivalued information and are left out of the splits. An empty sample
/// yields no dependencies.
pub fn discover_mvds(attributes: &AttrSet, data: &DataFrame) -> Vec<MinedMvd> {
    let sample = Sample::from_frame(data, attributes);
    if sample.is_empty() || attributes.len() < 3 {
        return Vec::new();
    }
    let mut found = Vec::new();
    for size in 1..attributes.len() {
        for determinant in attributes.subsets_of_size(size) {
            let constant = constant_within(&sample, &determinant, attributes);
            let remaining = attributes.difference(&determinant).difference(&constant);
            if remaining.len() < 2 {
                continue;
            }
            for (left, right) in unordered_splits(&remaining) {
                let split = MvdSplit::new(left, right);
                if is_trivial_mvd(&determinant, &split, attributes) {
                    continue;
                }
                if holds_on_sample(&sample, &determinant, &split) {
                    debug!(determinant = %determinant, split = %split, "multivalued dependency holds");
                    found.push(MinedMvd {
                        determinant: determinant.clone(),
                        split,
                    });
                }
            }
        }
    }
    found
}

/// Checks `determinant ->> split` against `data`.
///
/// An empty sample satisfies every dependency. Otherwise returns false when
/// the frame lacks one of the involved columns.
pub fn mvd_holds(data: &DataFrame, determinant: &AttrSet, split: &MvdSplit) -> bool {
    if data.height() == 0 {
        return true;
    }
    let span = determinant.union(&split.span());
    if !has_columns(data, &span) {
        return false;
    }
    let sample = Sample::from_frame(data, &span);
    holds_on_sample(&sample, determinant, split)
}

/// An MVD is trivial when a side lies inside the determinant or when the
/// determinant plus one side already covers every attribute.
pub fn is_trivial_mvd(determinant: &AttrSet, split: &MvdSplit, attributes: &AttrSet) -> bool {
    split.sides().into_iter().any(|side| {
        side.is_subset(determinant) || determinant.union(side) == *attributes
    })
}

/// Within every determinant group, the set of right-side values must be the
/// same for each left-side value.
fn holds_on_sample(sample: &Sample, determinant: &AttrSet, split: &MvdSplit) -> bool {
    let det = sample.projector(determinant);
    let left = sample.projector(&split.left);
    let right = sample.projector(&split.right);
    let mut groups: BTreeMap<Vec<String>, BTreeMap<Vec<String>, BTreeSet<Vec<String>>>> =
        BTreeMap::new();
    for row in sample.rows() {
        groups
            .entry(det.values(row))
            .or_default()
            .entry(left.values(row))
            .or_default()
            .insert(right.values(row));
    }
    groups.values().all(|by_left| {
        let mut sets = by_left.values();
        match sets.next() {
            Some(reference) => sets.all(|set| set == reference),
            None => true,
        }
    })
}

/// Attributes outside `determinant` that take a single value in every group
/// of rows sharing the determinant's value.
fn constant_within(sample: &Sample, determinant: &AttrSet, attributes: &AttrSet) -> AttrSet {
    let det = sample.projector(determinant);
    attributes
        .difference(determinant)
        .iter()
        .filter(|name| {
            let column = sample.projector(&AttrSet::single(*name));
            let mut seen: BTreeMap<Vec<String>, Vec<String>> = BTreeMap::new();
            sample.rows().all(|row| {
                let value = column.values(row);
                match seen.get(&det.values(row)) {
                    Some(existing) => *existing == value,
                    None => {
                        seen.insert(det.values(row), value);
                        true
                    }
                }
            })
        })
        .collect()
}

/// Each unordered split of `attrs` into two non-empty halves, once. The half
/// containing the first attribute is returned first.
fn unordered_splits(attrs: &AttrSet) -> Vec<(AttrSet, AttrSet)> {
    let names = attrs.names();
    let mut splits = Vec::new();
    for size in 1..names.len() {
        for indices in IndexCombinations::new(names.len(), size) {
            if indices.first() != Some(&0) {
                continue;
            }
            let left: AttrSet = indices.iter().map(|&idx| names[idx].as_str()).collect();
            let right = attrs.difference(&left);
            splits.push((left, right));
        }
    }
    splits
}
