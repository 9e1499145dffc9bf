use std::collections::BTreeSet;

use anyhow::{Context, Result};
use polars::prelude::DataFrame;
use relnorm_model::sample::{cell_value, frame_from_rows, row_values, split_multi_value};
use relnorm_model::{AttrSet, NormalForm, Relation};
use tracing::debug;

use super::{NormalFormRule, derive_relation};

/// 1NF: every cell holds a single value.
pub struct FirstNormalForm;

impl NormalFormRule for FirstNormalForm {
    fn level(&self) -> NormalForm {
        NormalForm::First
    }

    fn is_satisfied(&self, relation: &Relation) -> bool {
        relation.multivalued.is_disjoint(&relation.attributes)
    }

    /// One `NormalisedOneNF_<attr>` relation per multivalued attribute, keyed
    /// by the primary key plus that attribute with one row per listed value,
    /// followed by `<name>_LeftoverAttributes` holding the primary key and the
    /// single-valued attributes.
    fn decompose(&self, relation: &Relation) -> Result<Vec<Relation>> {
        let multivalued = relation.multivalued.intersection(&relation.attributes);
        if multivalued.is_empty() {
            return Ok(vec![relation.clone()]);
        }
        let mut parts = Vec::with_capacity(multivalued.len() + 1);
        for attr in multivalued.iter() {
            let mut attributes = relation.primary_key.clone();
            attributes.insert(attr);
            let data = expand_values(&relation.data, &relation.primary_key, attr)
                .with_context(|| format!("expand {attr} values of {}", relation.name))?;
            let mut child = Relation::new(
                format!("NormalisedOneNF_{attr}"),
                attributes.clone(),
                attributes.clone(),
            )
            .with_data(data);
            child.fds = relation.fds_within(&attributes);
            child.mvds = relation.mvds_within(&attributes);
            child.finalize_keys(relation);
            debug!(relation = %relation.name, child = %child.name, rows = child.data.height(), "expanded multivalued attribute");
            parts.push(child);
        }

        let attributes = relation
            .attributes
            .difference(&multivalued)
            .union(&relation.primary_key);
        let mut leftover = derive_relation(
            relation,
            format!("{}_LeftoverAttributes", relation.name),
            attributes.clone(),
            relation.primary_key.clone(),
        )?
        .with_multivalued(AttrSet::new());
        leftover.fds = relation
            .fds_restricted_to(&attributes)
            .into_iter()
            .filter_map(|(det, deps)| {
                let kept = deps.difference(&multivalued);
                (!kept.is_empty()).then_some((det, kept))
            })
            .collect();
        leftover.mvds = relation.mvds_within(&attributes);
        leftover.finalize_keys(relation);
        parts.push(leftover);
        Ok(parts)
    }
}

/// Rows of (primary key, one value of `attr`), deduplicated.
fn expand_values(df: &DataFrame, primary_key: &AttrSet, attr: &str) -> Result<DataFrame> {
    let key_names = primary_key.difference(&AttrSet::single(attr)).names();
    let mut columns = key_names.clone();
    columns.push(attr.to_string());
    let mut seen = BTreeSet::new();
    let mut rows = Vec::new();
    for idx in 0..df.height() {
        let key = row_values(df, &key_names, idx);
        for value in split_multi_value(&cell_value(df, attr, idx)) {
            let mut row = key.clone();
            row.push(value);
            if seen.insert(row.clone()) {
                rows.push(row);
            }
        }
    }
    Ok(frame_from_rows(&columns, &rows)?)
}
