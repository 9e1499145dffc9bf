//! Plain-text schema report.
//!
//! Each relation is written as a block headed by the level it was reported
//! at, with one line per schema property and `None` for empty properties.
//! Blocks are separated by a blank line.

use std::fmt::Write as _;
use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use relnorm_core::Reporter;
use relnorm_model::{AttrSet, NormalForm, Relation};

/// Renders one relation block, optionally headed by `--- <level> ---`.
pub fn render_relation(relation: &Relation, level: Option<NormalForm>) -> String {
    let mut out = String::new();
    if let Some(level) = level {
        let _ = writeln!(out, "--- {level} ---");
    }
    let _ = writeln!(out, "Table: {}", relation.name);
    let _ = writeln!(out, "- Attributes: {}", names(&relation.attributes));
    let _ = writeln!(out, "- Primary Key: {}", names(&relation.primary_key));

    let candidate_keys: Vec<String> = relation
        .candidate_keys
        .iter()
        .map(|key| key.joined(" & "))
        .collect();
    let _ = writeln!(out, "- Candidate Keys: {}", or_none(&candidate_keys));
    let _ = writeln!(
        out,
        "- Multivalued Attributes: {}",
        names(&relation.multivalued)
    );

    let fds: Vec<String> = relation
        .fds
        .iter()
        .map(|(det, deps)| format!("{det} -> {deps}"))
        .collect();
    let _ = writeln!(out, "- Functional Dependencies: {}", or_none(&fds));

    let mvds: Vec<String> = relation
        .mvds
        .iter()
        .flat_map(|(det, splits)| splits.iter().map(move |split| format!("{det} -->> {split}")))
        .collect();
    let _ = writeln!(out, "- Multivalued Dependencies: {}", or_none(&mvds));

    let foreign_keys: Vec<String> = relation
        .foreign_keys
        .iter()
        .map(|fk| format!("{} -> {}", fk.columns, fk.references))
        .collect();
    let _ = writeln!(out, "- Foreign Keys: {}", or_none(&foreign_keys));
    out
}

/// Renders every relation under the same level header, blank-line separated.
pub fn render_relations(relations: &[Relation], level: Option<NormalForm>) -> String {
    let mut out = String::new();
    for relation in relations {
        out.push_str(&render_relation(relation, level));
        out.push('\n');
    }
    out
}

fn names(attrs: &AttrSet) -> String {
    if attrs.is_empty() {
        "None".to_string()
    } else {
        attrs.joined(", ")
    }
}

fn or_none(items: &[String]) -> String {
    if items.is_empty() {
        "None".to_string()
    } else {
        items.join(", ")
    }
}

/// Collects the relation set after every level and once more at the end.
#[derive(Debug, Default, Clone)]
pub struct TextReport {
    buffer: String,
}

impl TextReport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn as_str(&self) -> &str {
        &self.buffer
    }

    pub fn into_string(self) -> String {
        self.buffer
    }

    /// Writes the accumulated report to `path`, replacing any existing file.
    pub fn write_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .with_context(|| format!("create report directory {}", parent.display()))?;
        }
        fs::write(path, &self.buffer).with_context(|| format!("write report {}", path.display()))
    }
}

impl Reporter for TextReport {
    fn level_complete(&mut self, level: NormalForm, relations: &[Relation]) -> Result<()> {
        self.buffer.push_str(&render_relations(relations, Some(level)));
        Ok(())
    }

    fn finished(&mut self, target: NormalForm, relations: &[Relation]) -> Result<()> {
        self.buffer.push_str(&render_relations(relations, Some(target)));
        Ok(())
    }
}
