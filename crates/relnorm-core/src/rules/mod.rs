//! Normal-form rules and their registry.
//!
//! Each level from 1NF to 5NF is a [`NormalFormRule`]: a membership test plus
//! a decomposition for relations that fail it. The [`RuleRegistry`] keeps the
//! rules in level order and resolves level names (`"3NF"`, `"bcnf"`, ...).
//!
//! # Example
//!
//! ```
//! use relnorm_core::rules::default_registry;
//! use relnorm_model::{AttrSet, Relation};
//!
//! # fn main() -> anyhow::Result<()> {
//! let mut relation = Relation::new(
//!     "R",
//!     AttrSet::from_names(["A", "B", "C"]),
//!     AttrSet::from_names(["A"]),
//! );
//! relation.add_fd(AttrSet::from_names(["B"]), AttrSet::from_names(["C"]));
//!
//! let rule = default_registry().get("BCNF").expect("registered");
//! assert!(!rule.is_satisfied(&relation));
//! let parts = rule.decompose(&relation)?;
//! let names: Vec<&str> = parts.iter().map(|part| part.name.as_str()).collect();
//! assert_eq!(names, ["R_part1", "R"]);
//! # Ok(())
//! # }
//! ```

mod bcnf;
mod fifth;
mod first;
mod fourth;
mod second;
mod third;

use std::collections::HashMap;
use std::sync::OnceLock;

use anyhow::{Context, Result};
use relnorm_model::sample::project_frame;
use relnorm_model::{AttrSet, NormalForm, Relation};

pub use bcnf::BoyceCoddNormalForm;
pub use fifth::FifthNormalForm;
pub use first::FirstNormalForm;
pub use fourth::FourthNormalForm;
pub use second::SecondNormalForm;
pub use third::ThirdNormalForm;

/// Membership test and decomposition for one normal form.
///
/// # Implementing a Rule
///
/// `decompose` is only required to make progress on relations for which
/// `is_satisfied` returns false; a satisfied relation comes back unchanged.
/// Children receive dependencies strictly by attribute containment and have
/// their keys re-established with [`Relation::finalize_keys`].
pub trait NormalFormRule: Send + Sync {
    /// The level this rule enforces.
    fn level(&self) -> NormalForm;

    /// Returns a human-readable description of the rule.
    fn description(&self) -> &'static str {
        self.level().description()
    }

    fn is_satisfied(&self, relation: &Relation) -> bool;

    /// Splits a violating relation.
    ///
    /// # Errors
    ///
    /// Returns an error if projecting the data sample fails.
    fn decompose(&self, relation: &Relation) -> Result<Vec<Relation>>;
}

/// Normal-form rules in level order, indexed by level token.
pub struct RuleRegistry {
    rules: Vec<Box<dyn NormalFormRule>>,
    index: HashMap<&'static str, usize>,
}

impl Default for RuleRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl RuleRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self {
            rules: Vec::new(),
            index: HashMap::new(),
        }
    }

    /// Registers a rule for its level, replacing any rule already registered
    /// for that level.
    pub fn register(&mut self, rule: Box<dyn NormalFormRule>) {
        let level = rule.level();
        match self.rules.iter_mut().find(|existing| existing.level() == level) {
            Some(slot) => *slot = rule,
            None => {
                self.rules.push(rule);
                self.rules.sort_by_key(|rule| rule.level());
            }
        }
        self.index = self
            .rules
            .iter()
            .enumerate()
            .map(|(idx, rule)| (rule.level().as_str(), idx))
            .collect();
    }

    /// Looks a rule up by level name (case-insensitive).
    pub fn get(&self, name: &str) -> Option<&dyn NormalFormRule> {
        let level: NormalForm = name.parse().ok()?;
        self.for_level(level)
    }

    pub fn for_level(&self, level: NormalForm) -> Option<&dyn NormalFormRule> {
        self.index
            .get(level.as_str())
            .and_then(|&idx| self.rules.get(idx))
            .map(|rule| &**rule)
    }

    /// Returns the number of registered rules.
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    /// Returns true if no rules are registered.
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Registered levels in application order.
    pub fn levels(&self) -> impl Iterator<Item = NormalForm> + '_ {
        self.rules.iter().map(|rule| rule.level())
    }
}

/// Cached registry with the six standard rules.
static DEFAULT_REGISTRY: OnceLock<RuleRegistry> = OnceLock::new();

/// Returns the registry holding the 1NF through 5NF rules.
pub fn default_registry() -> &'static RuleRegistry {
    DEFAULT_REGISTRY.get_or_init(build_default_registry)
}

/// Builds a registry with the six standard rules.
pub fn build_default_registry() -> RuleRegistry {
    let mut registry = RuleRegistry::new();
    registry.register(Box::new(FirstNormalForm));
    registry.register(Box::new(SecondNormalForm));
    registry.register(Box::new(ThirdNormalForm));
    registry.register(Box::new(BoyceCoddNormalForm));
    registry.register(Box::new(FourthNormalForm));
    registry.register(Box::new(FifthNormalForm));
    registry
}

/// Starts a child of `source` on `attributes`: projected (deduplicated) data,
/// candidate keys that fit, and no dependencies yet.
pub(crate) fn derive_relation(
    source: &Relation,
    name: String,
    attributes: AttrSet,
    primary_key: AttrSet,
) -> Result<Relation> {
    let data = project_frame(&source.data, &attributes)
        .with_context(|| format!("project {} onto {}", source.name, attributes))?;
    let candidate_keys = source
        .candidate_keys
        .iter()
        .filter(|key| key.is_subset(&attributes))
        .cloned()
        .collect();
    let multivalued = source.multivalued.intersection(&attributes);
    Ok(Relation::new(name, attributes, primary_key)
        .with_candidate_keys(candidate_keys)
        .with_multivalued(multivalued)
        .with_data(data))
}

/// Dependents of an FD that are not already part of its determinant.
pub(crate) fn effective_dependents(determinant: &AttrSet, dependents: &AttrSet) -> AttrSet {
    dependents.difference(determinant)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_registry_has_all_levels() {
        let registry = default_registry();
        assert_eq!(registry.len(), 6);
        let levels: Vec<_> = registry.levels().collect();
        assert_eq!(levels, NormalForm::ALL.to_vec());
    }

    #[test]
    fn lookup_is_case_insensitive() {
        let registry = default_registry();
        for name in ["bcnf", "BCNF", "Bcnf"] {
            let rule = registry.get(name).expect("rule");
            assert_eq!(rule.level(), NormalForm::BoyceCodd);
        }
        assert!(registry.get("6NF").is_none());
    }

    #[test]
    fn register_replaces_existing_level() {
        struct Strict;
        impl NormalFormRule for Strict {
            fn level(&self) -> NormalForm {
                NormalForm::Third
            }
            fn description(&self) -> &'static str {
                "strict"
            }
            fn is_satisfied(&self, _relation: &Relation) -> bool {
                false
            }
            fn decompose(&self, relation: &Relation) -> Result<Vec<Relation>> {
                Ok(vec![relation.clone()])
            }
        }

        let mut registry = build_default_registry();
        registry.register(Box::new(Strict));
        assert_eq!(registry.len(), 6);
        let rule = registry.for_level(NormalForm::Third).expect("rule");
        assert_eq!(rule.description(), "strict");
    }

    #[test]
    fn partial_registry_resolves_by_level() {
        let mut registry = RuleRegistry::new();
        assert!(registry.is_empty());
        registry.register(Box::new(FourthNormalForm));
        registry.register(Box::new(FirstNormalForm));
        let levels: Vec<_> = registry.levels().collect();
        assert_eq!(levels, vec![NormalForm::First, NormalForm::Fourth]);
        assert!(registry.for_level(NormalForm::Fourth).is_some());
        assert!(registry.for_level(NormalForm::Second).is_none());
    }
}
