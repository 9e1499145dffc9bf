//! Lossless-join testing against the data sample.

use std::collections::{BTreeMap, BTreeSet};

use polars::prelude::DataFrame;
use relnorm_model::{AttrSet, IndexCombinations};
use tracing::debug;

use crate::sample::{Sample, Tuple};

/// Tests whether joining the projections of `data` onto `partition`
/// reproduces the sample exactly.
///
/// Projections are joined left to right, each on its overlap with the
/// attributes joined so far; an empty overlap fails the test. The partition
/// must cover `attributes`, and an empty sample never validates a partition.
pub fn is_lossless(attributes: &AttrSet, data: &DataFrame, partition: &[AttrSet]) -> bool {
    let sample = Sample::from_frame(data, attributes);
    joins_back(&sample, attributes, partition)
}

/// First partition, in [`candidate_partitions`] order, that joins back to the
/// sample. Partitions with fewer components are tried first.
pub fn find_lossless_partition(attributes: &AttrSet, data: &DataFrame) -> Option<Vec<AttrSet>> {
    let sample = Sample::from_frame(data, attributes);
    if sample.is_empty() {
        return None;
    }
    let found = candidate_partitions(attributes)
        .find(|partition| joins_back(&sample, attributes, partition));
    if let Some(partition) = &found {
        debug!(
            attributes = %attributes,
            components = partition.len(),
            "lossless partition found"
        );
    }
    found
}

fn joins_back(sample: &Sample, attributes: &AttrSet, partition: &[AttrSet]) -> bool {
    if partition.len() < 2 || sample.is_empty() {
        return false;
    }
    let mut covered = AttrSet::new();
    for subset in partition {
        covered.extend_from(subset);
    }
    if covered != *attributes {
        return false;
    }
    let Some((first, rest)) = partition.split_first() else {
        return false;
    };
    let mut joined_attrs = first.clone();
    let mut joined = sample.tuples(first);
    for subset in rest {
        let common = joined_attrs.intersection(subset);
        if common.is_empty() {
            return false;
        }
        joined = natural_join(&joined, &sample.tuples(subset), &common);
        joined_attrs.extend_from(subset);
    }
    joined == sample.tuples(attributes)
}

fn natural_join(left: &BTreeSet<Tuple>, right: &BTreeSet<Tuple>, on: &AttrSet) -> BTreeSet<Tuple> {
    let key_of = |tuple: &Tuple| -> Vec<String> {
        on.iter()
            .map(|name| tuple.get(name).cloned().unwrap_or_default())
            .collect()
    };
    let mut index: BTreeMap<Vec<String>, Vec<&Tuple>> = BTreeMap::new();
    for tuple in right {
        index.entry(key_of(tuple)).or_default().push(tuple);
    }
    let mut out = BTreeSet::new();
    for tuple in left {
        let Some(matches) = index.get(&key_of(tuple)) else {
            continue;
        };
        for other in matches {
            let mut merged = tuple.clone();
            for (name, value) in *other {
                merged.insert(name.clone(), value.clone());
            }
            out.insert(merged);
        }
    }
    out
}

/// Candidate decompositions of `attributes` for the lossless-join search.
///
/// Components have between 2 and n-1 attributes and a partition has between
/// 2 and n/2+1 components. A partition qualifies when its components cover
/// every attribute, each component shares an attribute with some other
/// component, and no component contains another. Partitions are produced by
/// component count, then in lexicographic order of the components (ordered
/// by size, then by name). The iterator is lazy; its length is combinatorial
/// in the attribute count.
pub fn candidate_partitions(attributes: &AttrSet) -> CandidatePartitions {
    let n = attributes.len();
    let subsets: Vec<AttrSet> = if n < 3 {
        Vec::new()
    } else {
        (2..n).flat_map(|size| attributes.subsets_of_size(size)).collect()
    };
    let max_components = n / 2 + 1;
    CandidatePartitions {
        attributes: attributes.clone(),
        combinations: IndexCombinations::new(subsets.len(), 2),
        subsets,
        components: 2,
        max_components,
    }
}

#[derive(Debug, Clone)]
pub struct CandidatePartitions {
    attributes: AttrSet,
    subsets: Vec<AttrSet>,
    combinations: IndexCombinations,
    components: usize,
    max_components: usize,
}

impl Iterator for CandidatePartitions {
    type Item = Vec<AttrSet>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.subsets.is_empty() {
            return None;
        }
        loop {
            match self.combinations.next() {
                Some(indices) => {
                    let partition: Vec<AttrSet> =
                        indices.iter().map(|&idx| self.subsets[idx].clone()).collect();
                    if is_valid_partition(&self.attributes, &partition) {
                        return Some(partition);
                    }
                }
                None => {
                    self.components += 1;
                    if self.components > self.max_components {
                        return None;
                    }
                    self.combinations = IndexCombinations::new(self.subsets.len(), self.components);
                }
            }
        }
    }
}

fn is_valid_partition(attributes: &AttrSet, partition: &[AttrSet]) -> bool {
    let mut covered = AttrSet::new();
    for subset in partition {
        covered.extend_from(subset);
    }
    if covered != *attributes {
        return false;
    }
    partition.iter().enumerate().all(|(idx, subset)| {
        let mut connected = false;
        for (other_idx, other) in partition.iter().enumerate() {
            if other_idx == idx {
                continue;
            }
            if subset.is_subset(other) {
                return false;
            }
            if !subset.is_disjoint(other) {
                connected = true;
            }
        }
        connected
    })
}
