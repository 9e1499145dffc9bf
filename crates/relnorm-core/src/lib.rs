//! Normalization engine: normal-form rules, multivalued dependency mining,
//! lossless-join testing and the level-by-level driver.

pub mod cleanup;
pub mod foreign_keys;
pub mod join;
pub mod miner;
pub mod normalizer;
pub mod rules;
pub mod sample;

pub use cleanup::remove_redundant_relations;
pub use foreign_keys::assign_foreign_keys;
pub use join::{candidate_partitions, find_lossless_partition, is_lossless};
pub use miner::{MinedMvd, discover_mvds, is_trivial_mvd, mvd_holds};
pub use normalizer::{
    LevelStats, Lineage, LineageEntry, NoopReporter, NormalizeOptions, NormalizeOutcome,
    Normalizer, Reporter, normalize,
};
pub use rules::{NormalFormRule, RuleRegistry, build_default_registry, default_registry};
