use polars::error::PolarsError;
use thiserror::Error;

use crate::attrs::AttrSet;

#[derive(Debug, Error)]
pub enum ModelError {
    #[error("unknown normal form: {0}")]
    UnknownNormalForm(String),
    #[error("invalid relation name: {0:?}")]
    InvalidRelationName(String),
    #[error("relation {relation}: primary key is empty")]
    EmptyPrimaryKey { relation: String },
    #[error("relation {relation}: key {key} is not contained in the attributes")]
    KeyOutsideAttributes { relation: String, key: AttrSet },
    #[error("relation {relation}: {dependency} references unknown attributes {missing}")]
    MalformedDependency {
        relation: String,
        dependency: String,
        missing: AttrSet,
    },
    #[error("relation {relation}: {dependency} has overlapping sides")]
    OverlappingMvd {
        relation: String,
        dependency: String,
    },
    #[error("relation {relation}: functional dependency on {determinant} has no dependents")]
    EmptyDependent {
        relation: String,
        determinant: AttrSet,
    },
    #[error("polars error: {0}")]
    Polars(#[from] PolarsError),
}

pub type Result<T> = std::result::Result<T, ModelError>;
