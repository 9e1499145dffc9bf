use anyhow::Result;
use relnorm_model::{AttrSet, FdMap, NormalForm, Relation};
use tracing::debug;

use super::{NormalFormRule, derive_relation, effective_dependents};

/// 3NF: every FD has a superkey determinant or only prime dependents.
pub struct ThirdNormalForm;

impl NormalFormRule for ThirdNormalForm {
    fn level(&self) -> NormalForm {
        NormalForm::Third
    }

    fn is_satisfied(&self, relation: &Relation) -> bool {
        violations(relation).is_empty()
    }

    /// Moves each violating FD into `<name>_3NF_<determinant>`, keyed by its
    /// determinant and holding exactly that FD. The non-prime dependents are
    /// removed from the source, which keeps its name and the FDs that still
    /// fit; it is dropped once a single attribute remains.
    fn decompose(&self, relation: &Relation) -> Result<Vec<Relation>> {
        let violations = violations(relation);
        if violations.is_empty() {
            return Ok(vec![relation.clone()]);
        }
        let prime = relation.prime_attributes();
        let mut parts = Vec::with_capacity(violations.len() + 1);
        let mut remaining = relation.attributes.clone();

        for (det, deps) in &violations {
            let attributes = det.union(deps);
            let mut child = derive_relation(
                relation,
                format!("{}_3NF_{}", relation.name, det.joined("_")),
                attributes.clone(),
                det.clone(),
            )?;
            child.add_fd(det.clone(), deps.clone());
            child.mvds = relation.mvds_within(&attributes);
            child.finalize_keys(relation);
            debug!(relation = %relation.name, child = %child.name, "split transitive dependency");
            parts.push(child);
            remaining.remove_all(&deps.difference(&prime));
        }

        if let Some(rest) = remaining_relation(relation, &violations, remaining)? {
            parts.push(rest);
        }
        Ok(parts)
    }
}

fn violations(relation: &Relation) -> FdMap {
    let prime = relation.prime_attributes();
    relation
        .fds
        .iter()
        .filter_map(|(det, deps)| {
            let deps = effective_dependents(det, deps);
            let violates =
                !deps.is_empty() && !relation.is_superkey(det) && !deps.is_subset(&prime);
            violates.then(|| (det.clone(), deps))
        })
        .collect()
}

/// What is left of `relation` after the violating dependents moved out.
/// `None` when at most one attribute survives.
pub(super) fn remaining_relation(
    relation: &Relation,
    removed: &FdMap,
    attributes: AttrSet,
) -> Result<Option<Relation>> {
    if attributes.len() <= 1 {
        debug!(relation = %relation.name, "remaining relation dropped");
        return Ok(None);
    }
    let mut rest = derive_relation(
        relation,
        relation.name.clone(),
        attributes,
        relation.primary_key.clone(),
    )?;
    rest.fds = relation
        .fds_restricted_to(&rest.attributes)
        .into_iter()
        .filter(|(det, _)| !removed.contains_key(det))
        .collect();
    rest.mvds = relation.mvds_within(&rest.attributes);
    rest.finalize_keys(relation);
    Ok(Some(rest))
}
