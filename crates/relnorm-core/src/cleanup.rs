//! Redundant relation removal after a level settles.

use std::collections::BTreeSet;

use relnorm_model::{AttrSet, NormalForm, Relation};
use tracing::debug;

/// Drops relations whose attribute set repeats an earlier one, then drops
/// `level` leftovers whose attributes sit strictly inside another relation.
/// Returns how many relations were removed. Order is preserved.
pub fn remove_redundant_relations(relations: &mut Vec<Relation>, level: NormalForm) -> usize {
    let before = relations.len();

    let mut seen: BTreeSet<AttrSet> = BTreeSet::new();
    relations.retain(|relation| {
        let fresh = seen.insert(relation.attributes.clone());
        if !fresh {
            debug!(relation = %relation.name, "duplicate attribute set");
        }
        fresh
    });

    let covered: Vec<bool> = relations
        .iter()
        .map(|relation| {
            relation.provenance.is_leftover_for(level)
                && relations
                    .iter()
                    .any(|other| relation.attributes.is_strict_subset(&other.attributes))
        })
        .collect();
    let mut flags = covered.into_iter();
    relations.retain(|relation| {
        let drop = flags.next().unwrap_or(false);
        if drop {
            debug!(relation = %relation.name, "leftover covered by another relation");
        }
        !drop
    });

    before - relations.len()
}
