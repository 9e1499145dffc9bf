//! Level-by-level normalization driver.
//!
//! For each level from 1NF up to the target, every relation failing the
//! level's rule is replaced by its decomposition until a full scan changes
//! nothing. 5NF gets a single pass. After each level below 5NF redundant
//! relations are removed, and once the target is reached foreign keys are
//! inferred.

use std::time::Instant;

use anyhow::{Result, bail};
use relnorm_model::{NormalForm, Provenance, Relation, RelationId};
use tracing::{debug, info, info_span};

use crate::cleanup::remove_redundant_relations;
use crate::foreign_keys::assign_foreign_keys;
use crate::rules::{RuleRegistry, default_registry};

/// Observer of normalization progress.
pub trait Reporter {
    /// Called once a level reaches its fixpoint, after cleanup.
    fn level_complete(&mut self, level: NormalForm, relations: &[Relation]) -> Result<()>;

    /// Called once with the final relations, after foreign key inference.
    fn finished(&mut self, target: NormalForm, relations: &[Relation]) -> Result<()> {
        let _ = (target, relations);
        Ok(())
    }
}

/// Reporter that ignores every event.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopReporter;

impl Reporter for NoopReporter {
    fn level_complete(&mut self, _level: NormalForm, _relations: &[Relation]) -> Result<()> {
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizeOptions {
    /// Upper bound on fixpoint passes at a single level.
    pub max_passes_per_level: usize,
    pub infer_foreign_keys: bool,
    pub clean_redundant: bool,
}

impl Default for NormalizeOptions {
    fn default() -> Self {
        Self {
            max_passes_per_level: 64,
            infer_foreign_keys: true,
            clean_redundant: true,
        }
    }
}

/// One relation that entered the working set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineageEntry {
    pub id: RelationId,
    pub name: String,
    pub parent: Option<RelationId>,
    pub base: RelationId,
    /// Level whose rule produced the relation; `None` for inputs.
    pub level: Option<NormalForm>,
}

/// Arena of every relation seen during a run, indexed by [`RelationId`].
#[derive(Debug, Clone, Default)]
pub struct Lineage {
    entries: Vec<LineageEntry>,
}

impl Lineage {
    pub fn get(&self, id: RelationId) -> Option<&LineageEntry> {
        self.entries.get(id.get() as usize)
    }

    /// Parent chain of `id`, nearest first, excluding `id` itself.
    pub fn ancestors(&self, id: RelationId) -> Vec<&LineageEntry> {
        let mut chain = Vec::new();
        let mut current = self.get(id).and_then(|entry| entry.parent);
        while let Some(parent) = current {
            let Some(entry) = self.get(parent) else {
                break;
            };
            chain.push(entry);
            current = entry.parent;
        }
        chain
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &LineageEntry> + '_ {
        self.entries.iter()
    }

    fn record(
        &mut self,
        relation: &mut Relation,
        parent: Option<&Provenance>,
        level: Option<NormalForm>,
    ) -> RelationId {
        let id = RelationId::new(self.entries.len() as u32);
        let base = parent.and_then(|p| p.base).unwrap_or(id);
        let parent_id = parent.and_then(|p| p.id);
        relation.provenance.id = Some(id);
        relation.provenance.parent = parent_id;
        relation.provenance.base = Some(base);
        self.entries.push(LineageEntry {
            id,
            name: relation.name.clone(),
            parent: parent_id,
            base,
            level,
        });
        id
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LevelStats {
    pub level: NormalForm,
    pub passes: usize,
    /// Relations replaced by their decomposition.
    pub decomposed: usize,
    /// Relations left after cleanup.
    pub relations: usize,
}

#[derive(Debug, Clone)]
pub struct NormalizeOutcome {
    pub relations: Vec<Relation>,
    pub lineage: Lineage,
    pub levels: Vec<LevelStats>,
}

pub struct Normalizer<'a> {
    registry: &'a RuleRegistry,
    options: NormalizeOptions,
}

impl Default for Normalizer<'static> {
    fn default() -> Self {
        Self::new()
    }
}

impl Normalizer<'static> {
    /// Driver over the standard rule registry.
    pub fn new() -> Self {
        Self {
            registry: default_registry(),
            options: NormalizeOptions::default(),
        }
    }
}

impl<'a> Normalizer<'a> {
    pub fn with_registry(registry: &'a RuleRegistry) -> Self {
        Self {
            registry,
            options: NormalizeOptions::default(),
        }
    }

    pub fn with_options(mut self, options: NormalizeOptions) -> Self {
        self.options = options;
        self
    }

    pub fn options(&self) -> &NormalizeOptions {
        &self.options
    }

    pub fn normalize(&self, relations: Vec<Relation>, target: NormalForm) -> Result<NormalizeOutcome> {
        self.normalize_with_reporter(relations, target, &mut NoopReporter)
    }

    /// Runs every level up to `target`, reporting each completed level.
    ///
    /// # Errors
    ///
    /// Fails when a level has no registered rule, when a rule fails to
    /// decompose, when the reporter fails, or when a level does not settle
    /// within `max_passes_per_level` passes.
    pub fn normalize_with_reporter(
        &self,
        relations: Vec<Relation>,
        target: NormalForm,
        reporter: &mut dyn Reporter,
    ) -> Result<NormalizeOutcome> {
        let start = Instant::now();
        let mut lineage = Lineage::default();
        let mut working = relations;
        for relation in &mut working {
            lineage.record(relation, None, None);
        }
        let mut levels = Vec::new();

        for level in target.through() {
            let span = info_span!("level", level = %level);
            let _guard = span.enter();
            let Some(rule) = self.registry.for_level(level) else {
                bail!("no rule registered for {level}");
            };

            let mut passes = 0;
            let mut decomposed = 0;
            loop {
                passes += 1;
                if passes > self.options.max_passes_per_level {
                    bail!(
                        "{level} did not settle within {} passes",
                        self.options.max_passes_per_level
                    );
                }
                let mut changed = false;
                let mut next = Vec::with_capacity(working.len());
                for relation in working {
                    if rule.is_satisfied(&relation) {
                        next.push(relation);
                        continue;
                    }
                    let parts = rule.decompose(&relation)?;
                    debug!(relation = %relation.name, parts = parts.len(), "decomposed");
                    changed = true;
                    decomposed += 1;
                    for mut part in parts {
                        lineage.record(&mut part, Some(&relation.provenance), Some(level));
                        next.push(part);
                    }
                }
                working = next;
                if !changed || level == NormalForm::Fifth {
                    break;
                }
            }

            if self.options.clean_redundant && level != NormalForm::Fifth {
                let removed = remove_redundant_relations(&mut working, level);
                if removed > 0 {
                    debug!(removed, "dropped redundant relations");
                }
            }
            info!(passes, decomposed, relations = working.len(), "level complete");
            levels.push(LevelStats {
                level,
                passes,
                decomposed,
                relations: working.len(),
            });
            reporter.level_complete(level, &working)?;
        }

        if self.options.infer_foreign_keys {
            let assigned = assign_foreign_keys(&mut working);
            debug!(assigned, "foreign keys inferred");
        }
        reporter.finished(target, &working)?;
        info!(
            target_level = %target,
            relations = working.len(),
            duration_ms = start.elapsed().as_millis(),
            "normalization complete"
        );
        Ok(NormalizeOutcome {
            relations: working,
            lineage,
            levels,
        })
    }
}

/// Normalizes `relations` to `target` with the standard rules and options.
pub fn normalize(relations: Vec<Relation>, target: NormalForm) -> Result<Vec<Relation>> {
    Ok(Normalizer::new().normalize(relations, target)?.relations)
}
