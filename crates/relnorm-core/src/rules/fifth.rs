use anyhow::Result;
use relnorm_model::{NormalForm, Relation};
use tracing::debug;

use super::{NormalFormRule, derive_relation};
use crate::join::find_lossless_partition;

/// 5NF: no non-trivial lossless-join decomposition exists on the sample.
pub struct FifthNormalForm;

impl NormalFormRule for FifthNormalForm {
    fn level(&self) -> NormalForm {
        NormalForm::Fifth
    }

    fn is_satisfied(&self, relation: &Relation) -> bool {
        find_lossless_partition(&relation.attributes, &relation.data).is_none()
    }

    /// Splits along the first lossless partition found, one
    /// `<name>_5NF_<attrs>` relation per component.
    fn decompose(&self, relation: &Relation) -> Result<Vec<Relation>> {
        let Some(partition) = find_lossless_partition(&relation.attributes, &relation.data) else {
            return Ok(vec![relation.clone()]);
        };
        let mut parts = Vec::with_capacity(partition.len());
        for subset in partition {
            let mut child = derive_relation(
                relation,
                format!("{}_5NF_{}", relation.name, subset.joined("_")),
                subset.clone(),
                relation.primary_key.intersection(&subset),
            )?;
            child.fds = relation.fds_restricted_to(&subset);
            child.finalize_keys(relation);
            debug!(relation = %relation.name, child = %child.name, "split join dependency");
            parts.push(child);
        }
        Ok(parts)
    }
}
