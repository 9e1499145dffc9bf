use std::path::PathBuf;

use relnorm_core::LevelStats;
use relnorm_model::{NormalForm, Relation};

#[derive(Debug)]
pub struct NormalizeResult {
    pub sheet: PathBuf,
    pub source: String,
    pub target: NormalForm,
    pub relations: Vec<RelationRow>,
    pub levels: Vec<LevelStats>,
    /// Where the report was written, or `None` when it goes to stdout.
    pub output: Option<PathBuf>,
    /// Report text to print when no output path was given.
    pub printed: Option<String>,
    pub duration_ms: u128,
}

/// One final relation as shown in the summary table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelationRow {
    pub name: String,
    pub attributes: usize,
    pub primary_key: String,
    pub foreign_keys: Vec<String>,
    pub rows: usize,
}

impl From<&Relation> for RelationRow {
    fn from(relation: &Relation) -> Self {
        Self {
            name: relation.name.clone(),
            attributes: relation.attributes.len(),
            primary_key: relation.primary_key.joined(", "),
            foreign_keys: relation
                .foreign_keys
                .iter()
                .map(|fk| format!("{} -> {}", fk.columns, fk.references))
                .collect(),
            rows: relation.data.height(),
        }
    }
}

#[derive(Debug)]
pub struct CheckResult {
    pub sheet: PathBuf,
    pub relation: String,
    /// Level named in the sheet.
    pub requested: NormalForm,
    pub levels: Vec<LevelCheck>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LevelCheck {
    pub level: NormalForm,
    /// The level's own condition holds.
    pub satisfied: bool,
    /// This level and every lower one hold.
    pub cumulative: bool,
}

impl CheckResult {
    /// Highest level reached with every lower level holding as well.
    pub fn highest(&self) -> Option<NormalForm> {
        self.levels
            .iter()
            .filter(|check| check.cumulative)
            .map(|check| check.level)
            .last()
    }

    pub fn meets_requested(&self) -> bool {
        self.highest()
            .is_some_and(|level| level.index() >= self.requested.index())
    }
}
