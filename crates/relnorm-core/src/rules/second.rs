use anyhow::Result;
use relnorm_model::{AttrSet, FdMap, NormalForm, Provenance, Relation};
use tracing::debug;

use super::{NormalFormRule, derive_relation, effective_dependents};

/// 2NF: no non-prime attribute depends on a strict part of a key.
pub struct SecondNormalForm;

impl NormalFormRule for SecondNormalForm {
    fn level(&self) -> NormalForm {
        NormalForm::Second
    }

    fn is_satisfied(&self, relation: &Relation) -> bool {
        partial_dependencies(relation).is_empty()
    }

    /// Splits out each partial dependency, in determinant order, as
    /// `<name>_2NF_<attrs>` keyed by its determinant. Non-violating
    /// dependencies whose determinant falls inside the new schema (and outside
    /// the source primary key) pull their attributes in until nothing more
    /// fits. The `<name>_leftover_2NF` relation keeps every key attribute plus
    /// whatever no violation collected.
    fn decompose(&self, relation: &Relation) -> Result<Vec<Relation>> {
        let violations = partial_dependencies(relation);
        if violations.is_empty() {
            return Ok(vec![relation.clone()]);
        }
        let mut parts = Vec::with_capacity(violations.len() + 1);
        let mut collected = AttrSet::new();

        for (det, deps) in &violations {
            let seed = det.union(deps);
            let mut attributes = grow_schema(relation, &violations, seed.clone());
            for (other_det, other_deps) in &violations {
                if other_det == det {
                    continue;
                }
                if other_deps.is_subset(deps) && other_det.is_strict_subset(det) {
                    attributes.remove_all(other_deps);
                }
            }

            let mut child = derive_relation(
                relation,
                format!("{}_2NF_{}", relation.name, seed.joined("_")),
                attributes.clone(),
                det.clone(),
            )?;
            child.add_fd(det.clone(), deps.intersection(&attributes));
            for (fd_det, fd_deps) in relation.fds_restricted_to(&attributes) {
                if !violations.contains_key(&fd_det) {
                    child.add_fd(fd_det, fd_deps);
                }
            }
            child.mvds = relation.mvds_within(&attributes);
            child.finalize_keys(relation);
            debug!(relation = %relation.name, child = %child.name, determinant = %det, "split partial dependency");
            collected.extend_from(&child.attributes);
            parts.push(child);
        }

        let attributes = relation
            .attributes
            .difference(&collected)
            .union(&relation.prime_attributes());
        let mut leftover = derive_relation(
            relation,
            format!("{}_leftover_2NF", relation.name),
            attributes.clone(),
            relation.primary_key.clone(),
        )?
        .with_provenance(Provenance::leftover_of(NormalForm::Second));
        leftover.fds = relation.fds_restricted_to(&attributes);
        leftover.mvds = relation.mvds_within(&attributes);
        leftover.finalize_keys(relation);
        parts.push(leftover);
        Ok(parts)
    }
}

/// FDs whose determinant is a strict, non-key part of some key and whose
/// dependents include a non-prime attribute. Keyed by determinant, so
/// iteration is in lexicographic determinant order.
fn partial_dependencies(relation: &Relation) -> FdMap {
    let prime = relation.prime_attributes();
    relation
        .fds
        .iter()
        .filter(|(det, deps)| is_partial(relation, &prime, det, deps))
        .map(|(det, deps)| (det.clone(), effective_dependents(det, deps)))
        .collect()
}

fn is_partial(relation: &Relation, prime: &AttrSet, det: &AttrSet, deps: &AttrSet) -> bool {
    let non_prime = effective_dependents(det, deps).difference(prime);
    !non_prime.is_empty()
        && !relation.is_key(det)
        && relation.keys().any(|key| det.is_strict_subset(key))
}

/// Grows `attributes` with every non-violating FD or MVD whose determinant is
/// already inside it and not contained in the source primary key.
fn grow_schema(relation: &Relation, violations: &FdMap, mut attributes: AttrSet) -> AttrSet {
    loop {
        let before = attributes.len();
        for (det, deps) in &relation.fds {
            if violations.contains_key(det) {
                continue;
            }
            if det.is_subset(&attributes) && !det.is_subset(&relation.primary_key) {
                attributes.extend_from(deps);
            }
        }
        for (det, splits) in &relation.mvds {
            if det.is_subset(&attributes) && !det.is_subset(&relation.primary_key) {
                for split in splits {
                    attributes.extend_from(&split.span());
                }
            }
        }
        if attributes.len() == before {
            return attributes;
        }
    }
}
