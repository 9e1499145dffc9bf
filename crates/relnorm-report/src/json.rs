//! Machine-readable schema report.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use relnorm_core::Reporter;
use relnorm_model::{AttrSet, ForeignKey, NormalForm, Provenance, Relation};
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FunctionalDependencySummary {
    pub determinant: AttrSet,
    pub dependents: AttrSet,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MultivaluedDependencySummary {
    pub determinant: AttrSet,
    pub left: AttrSet,
    pub right: AttrSet,
}

/// Serializable view of a relation's schema. The data sample is reduced to
/// its row count.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RelationSummary {
    pub name: String,
    pub attributes: AttrSet,
    pub primary_key: AttrSet,
    pub candidate_keys: Vec<AttrSet>,
    pub multivalued: AttrSet,
    pub functional_dependencies: Vec<FunctionalDependencySummary>,
    pub multivalued_dependencies: Vec<MultivaluedDependencySummary>,
    pub foreign_keys: Vec<ForeignKey>,
    pub rows: usize,
    pub provenance: Provenance,
}

impl From<&Relation> for RelationSummary {
    fn from(relation: &Relation) -> Self {
        Self {
            name: relation.name.clone(),
            attributes: relation.attributes.clone(),
            primary_key: relation.primary_key.clone(),
            candidate_keys: relation.candidate_keys.clone(),
            multivalued: relation.multivalued.clone(),
            functional_dependencies: relation
                .fds
                .iter()
                .map(|(det, deps)| FunctionalDependencySummary {
                    determinant: det.clone(),
                    dependents: deps.clone(),
                })
                .collect(),
            multivalued_dependencies: relation
                .mvds
                .iter()
                .flat_map(|(det, splits)| {
                    splits.iter().map(move |split| MultivaluedDependencySummary {
                        determinant: det.clone(),
                        left: split.left.clone(),
                        right: split.right.clone(),
                    })
                })
                .collect(),
            foreign_keys: relation.foreign_keys.clone(),
            rows: relation.data.height(),
            provenance: relation.provenance.clone(),
        }
    }
}

/// Relation names present once a level settled.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LevelSnapshot {
    pub level: NormalForm,
    pub relations: Vec<String>,
}

/// Reporter producing a JSON document with the per-level relation names and
/// the final relations in full.
#[derive(Debug, Default, Clone, Serialize)]
pub struct JsonReport {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target: Option<NormalForm>,
    pub levels: Vec<LevelSnapshot>,
    pub relations: Vec<RelationSummary>,
}

impl JsonReport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn to_json_string(&self) -> Result<String> {
        serde_json::to_string_pretty(self).context("serialize JSON report")
    }

    pub fn write_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .with_context(|| format!("create report directory {}", parent.display()))?;
        }
        fs::write(path, self.to_json_string()?)
            .with_context(|| format!("write report {}", path.display()))
    }
}

impl Reporter for JsonReport {
    fn level_complete(&mut self, level: NormalForm, relations: &[Relation]) -> Result<()> {
        self.levels.push(LevelSnapshot {
            level,
            relations: relations.iter().map(|r| r.name.clone()).collect(),
        });
        Ok(())
    }

    fn finished(&mut self, target: NormalForm, relations: &[Relation]) -> Result<()> {
        self.target = Some(target);
        self.relations = relations.iter().map(RelationSummary::from).collect();
        Ok(())
    }
}
