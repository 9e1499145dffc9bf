//! Foreign key inference over the final relation set.

use std::cmp::Reverse;

use relnorm_model::{AttrSet, ForeignKey, Relation};
use tracing::debug;

/// A key some foreign key may point at.
struct Target {
    relation: usize,
    key: AttrSet,
    non_prime: usize,
}

/// Assigns foreign keys to every relation and returns how many were added.
///
/// Attribute subsets of each relation are visited by size, then
/// lexicographically. A subset that lies inside some relation's primary or
/// candidate key references the best such key: shortest first, then the
/// lexicographically smallest, then the relation with the most non-prime
/// attributes, then the earliest relation. When the best key belongs to the
/// relation itself no foreign key is recorded and the subset stays open for
/// its supersets. Subsets comparable to the columns of a recorded foreign key
/// are skipped.
pub fn assign_foreign_keys(relations: &mut [Relation]) -> usize {
    let mut targets: Vec<Target> = relations
        .iter()
        .enumerate()
        .flat_map(|(idx, relation)| {
            let non_prime = relation.non_prime_attributes().len();
            relation.keys().filter(|key| !key.is_empty()).map(move |key| Target {
                relation: idx,
                key: key.clone(),
                non_prime,
            })
        })
        .collect();
    targets.sort_by(|a, b| {
        (a.key.len(), &a.key, Reverse(a.non_prime), a.relation)
            .cmp(&(b.key.len(), &b.key, Reverse(b.non_prime), b.relation))
    });
    let max_size = targets.iter().map(|target| target.key.len()).max().unwrap_or(0);

    let mut assigned = 0;
    for idx in 0..relations.len() {
        let mut consumed: Vec<AttrSet> = relations[idx]
            .foreign_keys
            .iter()
            .map(|fk| fk.columns.clone())
            .collect();
        let mut found = Vec::new();
        let attributes = relations[idx].attributes.clone();
        for size in 1..=max_size.min(attributes.len()) {
            for subset in attributes.subsets_of_size(size) {
                if consumed.iter().any(|taken| taken.is_comparable(&subset)) {
                    continue;
                }
                let Some(target) = targets.iter().find(|target| target.key.is_superset(&subset))
                else {
                    continue;
                };
                if target.relation == idx {
                    continue;
                }
                found.push(ForeignKey {
                    columns: subset.clone(),
                    references: relations[target.relation].name.clone(),
                    referenced_key: target.key.clone(),
                });
                consumed.push(subset);
            }
        }
        let relation = &mut relations[idx];
        for foreign_key in found {
            debug!(relation = %relation.name, foreign_key = %foreign_key, "foreign key");
            relation.add_foreign_key(foreign_key);
            assigned += 1;
        }
    }
    assigned
}
