//! Report writers for normalization runs.

pub mod json;
pub mod text;

pub use json::{
    FunctionalDependencySummary, JsonReport, LevelSnapshot, MultivaluedDependencySummary,
    RelationSummary,
};
pub use text::{TextReport, render_relation, render_relations};
