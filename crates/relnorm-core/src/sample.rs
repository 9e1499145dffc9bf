//! In-memory row view of a relation's data sample.
//!
//! The miner and the join validator group and join rows many times over, so
//! the frame is read into plain string rows once and indexed by position.

use std::collections::{BTreeMap, BTreeSet};

use polars::prelude::DataFrame;
use relnorm_model::AttrSet;
use relnorm_model::sample::row_values;

/// A row as attribute name to value.
pub type Tuple = BTreeMap<String, String>;

#[derive(Debug, Clone)]
pub struct Sample {
    columns: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl Sample {
    /// Reads `attrs` from `df`. Columns missing from the frame read as empty.
    pub fn from_frame(df: &DataFrame, attrs: &AttrSet) -> Self {
        let columns = attrs.names();
        let rows = (0..df.height())
            .map(|idx| row_values(df, &columns, idx))
            .collect();
        Self { columns, rows }
    }

    pub fn height(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    fn positions(&self, attrs: &AttrSet) -> Vec<usize> {
        attrs
            .iter()
            .filter_map(|name| self.columns.iter().position(|column| column == name))
            .collect()
    }

    pub(crate) fn rows(&self) -> impl Iterator<Item = &[String]> + '_ {
        self.rows.iter().map(Vec::as_slice)
    }

    /// Accessor that extracts the values of `attrs` from a row.
    pub(crate) fn projector(&self, attrs: &AttrSet) -> Projector {
        Projector {
            positions: self.positions(attrs),
        }
    }

    /// Distinct rows restricted to `attrs`.
    pub fn tuples(&self, attrs: &AttrSet) -> BTreeSet<Tuple> {
        let positions = self.positions(attrs);
        self.rows
            .iter()
            .map(|row| {
                positions
                    .iter()
                    .map(|&pos| (self.columns[pos].clone(), row[pos].clone()))
                    .collect()
            })
            .collect()
    }
}

pub(crate) struct Projector {
    positions: Vec<usize>,
}

impl Projector {
    pub(crate) fn values(&self, row: &[String]) -> Vec<String> {
        self.positions.iter().map(|&pos| row[pos].clone()).collect()
    }
}
