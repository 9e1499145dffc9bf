//! The relation entity: schema, dependencies, keys and a data sample.

use polars::prelude::DataFrame;

use crate::attrs::AttrSet;
use crate::dependency::{FdMap, ForeignKey, MvdMap, MvdSplit};
use crate::error::{ModelError, Result};
use crate::provenance::Provenance;

#[derive(Debug, Clone)]
pub struct Relation {
    pub name: String,
    pub attributes: AttrSet,
    pub primary_key: AttrSet,
    pub candidate_keys: Vec<AttrSet>,
    /// Attributes whose cells hold encoded value lists.
    pub multivalued: AttrSet,
    pub fds: FdMap,
    pub mvds: MvdMap,
    pub foreign_keys: Vec<ForeignKey>,
    pub data: DataFrame,
    pub provenance: Provenance,
}

impl Relation {
    pub fn new(name: impl Into<String>, attributes: AttrSet, primary_key: AttrSet) -> Self {
        Self {
            name: name.into(),
            attributes,
            primary_key,
            candidate_keys: Vec::new(),
            multivalued: AttrSet::new(),
            fds: FdMap::new(),
            mvds: MvdMap::new(),
            foreign_keys: Vec::new(),
            data: DataFrame::empty(),
            provenance: Provenance::default(),
        }
    }

    pub fn with_candidate_keys(mut self, keys: Vec<AttrSet>) -> Self {
        self.candidate_keys = keys;
        self
    }

    pub fn with_multivalued(mut self, multivalued: AttrSet) -> Self {
        self.multivalued = multivalued;
        self
    }

    pub fn with_data(mut self, data: DataFrame) -> Self {
        self.data = data;
        self
    }

    pub fn with_provenance(mut self, provenance: Provenance) -> Self {
        self.provenance = provenance;
        self
    }

    /// Records `determinant -> dependents`, merging with any existing
    /// dependents for the same determinant. Empty dependents are ignored.
    pub fn add_fd(&mut self, determinant: AttrSet, dependents: AttrSet) {
        if dependents.is_empty() {
            return;
        }
        self.fds
            .entry(determinant)
            .and_modify(|existing| existing.extend_from(&dependents))
            .or_insert(dependents);
    }

    /// Records a multivalued dependency. Returns false when it was already present.
    pub fn add_mvd(&mut self, determinant: AttrSet, split: MvdSplit) -> bool {
        let splits = self.mvds.entry(determinant).or_default();
        if splits.contains(&split) {
            return false;
        }
        splits.push(split);
        true
    }

    pub fn add_foreign_key(&mut self, foreign_key: ForeignKey) {
        if !self.foreign_keys.contains(&foreign_key) {
            self.foreign_keys.push(foreign_key);
        }
    }

    /// Primary key followed by the candidate keys.
    pub fn keys(&self) -> impl Iterator<Item = &AttrSet> + '_ {
        std::iter::once(&self.primary_key).chain(self.candidate_keys.iter())
    }

    /// True iff `attrs` contains the primary key or some candidate key.
    pub fn is_superkey(&self, attrs: &AttrSet) -> bool {
        self.keys().any(|key| attrs.is_superset(key))
    }

    pub fn is_key(&self, attrs: &AttrSet) -> bool {
        self.keys().any(|key| key == attrs)
    }

    pub fn prime_attributes(&self) -> AttrSet {
        let mut prime = AttrSet::new();
        for key in self.keys() {
            prime.extend_from(key);
        }
        prime
    }

    pub fn non_prime_attributes(&self) -> AttrSet {
        self.attributes.difference(&self.prime_attributes())
    }

    /// Closure of `attrs` under this relation's functional dependencies.
    pub fn attribute_closure(&self, attrs: &AttrSet) -> AttrSet {
        let mut closure = attrs.clone();
        loop {
            let before = closure.len();
            for (determinant, dependents) in &self.fds {
                if determinant.is_subset(&closure) {
                    closure.extend_from(dependents);
                }
            }
            if closure.len() == before {
                return closure;
            }
        }
    }

    /// FDs whose determinant and dependents both lie inside `attrs`.
    pub fn fds_within(&self, attrs: &AttrSet) -> FdMap {
        self.fds
            .iter()
            .filter(|(det, deps)| det.is_subset(attrs) && deps.is_subset(attrs))
            .map(|(det, deps)| (det.clone(), deps.clone()))
            .collect()
    }

    /// FDs whose determinant lies inside `attrs`, dependents cut down to `attrs`.
    pub fn fds_restricted_to(&self, attrs: &AttrSet) -> FdMap {
        self.fds
            .iter()
            .filter(|(det, _)| det.is_subset(attrs))
            .filter_map(|(det, deps)| {
                let kept = deps.intersection(attrs);
                (!kept.is_empty()).then(|| (det.clone(), kept))
            })
            .collect()
    }

    /// MVDs whose determinant and both sides lie inside `attrs`.
    pub fn mvds_within(&self, attrs: &AttrSet) -> MvdMap {
        let mut mvds = MvdMap::new();
        for (det, splits) in &self.mvds {
            if !det.is_subset(attrs) {
                continue;
            }
            let kept: Vec<MvdSplit> = splits
                .iter()
                .filter(|split| split.span().is_subset(attrs))
                .cloned()
                .collect();
            if !kept.is_empty() {
                mvds.insert(det.clone(), kept);
            }
        }
        mvds
    }

    /// Checks the structural invariants of the schema.
    pub fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(ModelError::InvalidRelationName(self.name.clone()));
        }
        if self.primary_key.is_empty() {
            return Err(ModelError::EmptyPrimaryKey {
                relation: self.name.clone(),
            });
        }
        for key in self.keys() {
            if !key.is_subset(&self.attributes) {
                return Err(ModelError::KeyOutsideAttributes {
                    relation: self.name.clone(),
                    key: key.clone(),
                });
            }
        }
        self.check_known("multivalued attributes".to_string(), &self.multivalued)?;
        for (det, deps) in &self.fds {
            if deps.is_empty() {
                return Err(ModelError::EmptyDependent {
                    relation: self.name.clone(),
                    determinant: det.clone(),
                });
            }
            self.check_known(format!("{det} -> {deps}"), &det.union(deps))?;
        }
        for (det, splits) in &self.mvds {
            for split in splits {
                let dependency = format!("{det} ->> {split}");
                if split.is_overlapping() {
                    return Err(ModelError::OverlappingMvd {
                        relation: self.name.clone(),
                        dependency,
                    });
                }
                self.check_known(dependency, &det.union(&split.span()))?;
            }
        }
        Ok(())
    }

    fn check_known(&self, dependency: String, attrs: &AttrSet) -> Result<()> {
        let missing = attrs.difference(&self.attributes);
        if missing.is_empty() {
            Ok(())
        } else {
            Err(ModelError::MalformedDependency {
                relation: self.name.clone(),
                dependency,
                missing,
            })
        }
    }

    /// Re-establishes the key invariants after a decomposition step.
    ///
    /// Candidate keys that no longer fit are dropped. A primary key that no
    /// longer fits is replaced by `source`'s primary key cut down to the
    /// surviving attributes, or by all attributes when nothing of it
    /// survives. Finally any FD determinant whose closure spans the relation
    /// is promoted to a (minimal) candidate key.
    pub fn finalize_keys(&mut self, source: &Relation) {
        let attrs = self.attributes.clone();
        self.candidate_keys
            .retain(|key| !key.is_empty() && key.is_subset(&attrs));
        if self.primary_key.is_empty() || !self.primary_key.is_subset(&attrs) {
            self.primary_key = recompute_primary_key(source, &attrs);
        }
        let determinants: Vec<AttrSet> = self
            .fds
            .keys()
            .filter(|det| !det.is_empty() && det.is_subset(&attrs))
            .cloned()
            .collect();
        for det in determinants {
            if self.is_superkey(&det) || !self.attribute_closure(&det).is_superset(&attrs) {
                continue;
            }
            let key = self.minimize_key(det);
            self.candidate_keys.push(key);
        }
        let primary = self.primary_key.clone();
        let mut unique: Vec<AttrSet> = Vec::with_capacity(self.candidate_keys.len());
        for key in self.candidate_keys.drain(..) {
            if key != primary && !unique.contains(&key) {
                unique.push(key);
            }
        }
        self.candidate_keys = unique;
    }

    fn minimize_key(&self, key: AttrSet) -> AttrSet {
        let mut minimal = key;
        for name in minimal.names() {
            if minimal.len() == 1 {
                break;
            }
            let mut smaller = minimal.clone();
            smaller.remove(&name);
            if self.attribute_closure(&smaller).is_superset(&self.attributes) {
                minimal = smaller;
            }
        }
        minimal
    }
}

fn recompute_primary_key(source: &Relation, attrs: &AttrSet) -> AttrSet {
    let kept = source.primary_key.intersection(attrs);
    if kept.is_empty() {
        attrs.clone()
    } else {
        kept
    }
}
