use anyhow::Result;
use relnorm_model::{AttrSet, FdMap, NormalForm, Relation};
use tracing::debug;

use super::third::remaining_relation;
use super::{NormalFormRule, derive_relation, effective_dependents};

/// BCNF: every non-trivial FD has a superkey determinant.
pub struct BoyceCoddNormalForm;

impl NormalFormRule for BoyceCoddNormalForm {
    fn level(&self) -> NormalForm {
        NormalForm::BoyceCodd
    }

    fn is_satisfied(&self, relation: &Relation) -> bool {
        relation
            .fds
            .iter()
            .all(|(det, deps)| !violates(relation, det, deps))
    }

    /// Each violating FD becomes `<name>_part<n>` = determinant plus the
    /// dependents still present, keyed by the determinant and carrying every
    /// remaining FD that fits inside it. The dependents leave the source, and
    /// FDs whose determinant lost an attribute are dropped. The source keeps
    /// its name; it is dropped once a single attribute remains.
    fn decompose(&self, relation: &Relation) -> Result<Vec<Relation>> {
        let mut parts = Vec::new();
        let mut remaining = relation.attributes.clone();
        let mut remaining_fds = relation.fds.clone();
        let mut removed = FdMap::new();
        let mut counter = 1;

        for (det, deps) in &relation.fds {
            if !violates(relation, det, deps) || !det.is_subset(&remaining) {
                continue;
            }
            let moved = effective_dependents(det, deps).intersection(&remaining);
            if moved.is_empty() {
                continue;
            }
            let attributes = det.union(&moved);
            let mut child = derive_relation(
                relation,
                format!("{}_part{counter}", relation.name),
                attributes.clone(),
                det.clone(),
            )?;
            counter += 1;
            for (fd_det, fd_deps) in &remaining_fds {
                if fd_det.is_subset(&attributes) {
                    child.add_fd(fd_det.clone(), fd_deps.intersection(&attributes));
                }
            }
            child.add_fd(det.clone(), moved.clone());
            child.mvds = relation.mvds_within(&attributes);
            child.finalize_keys(relation);
            debug!(relation = %relation.name, child = %child.name, determinant = %det, "split non-key determinant");
            parts.push(child);

            remaining.remove_all(&moved);
            removed.insert(det.clone(), moved);
            remaining_fds = remaining_fds
                .into_iter()
                .filter(|(fd_det, _)| fd_det != det && fd_det.is_subset(&remaining))
                .filter_map(|(fd_det, fd_deps)| {
                    let kept = fd_deps.intersection(&remaining);
                    (!kept.is_empty()).then_some((fd_det, kept))
                })
                .collect();
        }

        if parts.is_empty() {
            return Ok(vec![relation.clone()]);
        }
        if let Some(rest) = remaining_relation(relation, &removed, remaining)? {
            parts.push(rest);
        }
        Ok(parts)
    }
}

fn violates(relation: &Relation, det: &AttrSet, deps: &AttrSet) -> bool {
    !effective_dependents(det, deps).is_empty() && !relation.is_superkey(det)
}
