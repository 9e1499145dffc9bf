use anyhow::Result;
use relnorm_model::{AttrSet, MvdSplit, NormalForm, Provenance, Relation};
use tracing::{debug, warn};

use super::{NormalFormRule, derive_relation};
use crate::miner::{discover_mvds, mvd_holds};

/// 4NF: no non-trivial MVD holds, whatever its determinant.
///
/// Recorded MVDs are checked against the data sample before use; the miner
/// supplies the ones the sample shows but nobody recorded.
pub struct FourthNormalForm;

impl NormalFormRule for FourthNormalForm {
    fn level(&self) -> NormalForm {
        NormalForm::Fourth
    }

    fn is_satisfied(&self, relation: &Relation) -> bool {
        effective_mvds(relation, false)
            .iter()
            .all(|(det, split)| non_trivial_sides(relation, det, split).is_empty())
    }

    /// Every non-trivial side of every effective MVD becomes
    /// `<name>_4NF_<det>_<side>` on determinant plus side, keyed by all of its
    /// attributes and without FDs. Schemas already covered by an earlier child
    /// are skipped. Attributes nobody collected go to `<name>_leftover_4NF`
    /// together with the primary key.
    fn decompose(&self, relation: &Relation) -> Result<Vec<Relation>> {
        let mut parts: Vec<Relation> = Vec::new();
        let mut collected = AttrSet::new();
        let mut first_determinant = None;

        for (det, split) in effective_mvds(relation, true) {
            for side in non_trivial_sides(relation, &det, &split) {
                let attributes = det.union(side);
                if parts.iter().any(|part| attributes.is_subset(&part.attributes)) {
                    continue;
                }
                let mut child = derive_relation(
                    relation,
                    format!("{}_4NF_{}_{}", relation.name, det.joined("_"), side.joined("_")),
                    attributes.clone(),
                    attributes.clone(),
                )?;
                child.mvds = relation.mvds_within(&attributes);
                debug!(relation = %relation.name, child = %child.name, determinant = %det, "split multivalued dependency");
                collected.extend_from(&attributes);
                first_determinant.get_or_insert_with(|| det.clone());
                parts.push(child);
            }
        }

        let Some(first_determinant) = first_determinant else {
            return Ok(vec![relation.clone()]);
        };
        let uncollected = relation.attributes.difference(&collected);
        if !uncollected.is_empty() {
            let mut attributes = uncollected.union(&relation.primary_key);
            if attributes == relation.attributes {
                attributes = uncollected.union(&first_determinant);
            }
            let mut leftover = derive_relation(
                relation,
                format!("{}_leftover_4NF", relation.name),
                attributes.clone(),
                relation.primary_key.intersection(&attributes),
            )?
            .with_provenance(Provenance::leftover_of(NormalForm::Fourth));
            leftover.fds = relation.fds_within(&attributes);
            leftover.mvds = relation.mvds_within(&attributes);
            leftover.finalize_keys(relation);
            parts.push(leftover);
        }
        Ok(parts)
    }
}

/// Recorded MVDs that the sample confirms, followed by mined ones not
/// already recorded.
fn effective_mvds(relation: &Relation, decomposing: bool) -> Vec<(AttrSet, MvdSplit)> {
    let mut mvds = Vec::new();
    for (det, splits) in &relation.mvds {
        for split in splits {
            if mvd_holds(&relation.data, det, split) {
                mvds.push((det.clone(), split.clone()));
            } else if decomposing {
                warn!(relation = %relation.name, determinant = %det, split = %split, "recorded multivalued dependency does not hold on the sample");
            } else {
                debug!(relation = %relation.name, determinant = %det, split = %split, "ignoring recorded multivalued dependency");
            }
        }
    }
    for mined in discover_mvds(&relation.attributes, &relation.data) {
        let entry = (mined.determinant, mined.split);
        if !mvds.contains(&entry) {
            mvds.push(entry);
        }
    }
    mvds
}

/// Sides of `split` that neither sit inside the determinant nor cover the
/// relation together with it.
fn non_trivial_sides<'a>(
    relation: &Relation,
    det: &AttrSet,
    split: &'a MvdSplit,
) -> Vec<&'a AttrSet> {
    if !det.is_subset(&relation.attributes) {
        return Vec::new();
    }
    split
        .sides()
        .into_iter()
        .filter(|side| {
            side.is_subset(&relation.attributes)
                && !side.is_subset(det)
                && det.union(side) != relation.attributes
        })
        .collect()
}
