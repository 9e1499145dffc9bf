//! Error types for schema sheet loading.

use std::path::PathBuf;

use relnorm_model::ModelError;
use thiserror::Error;

/// Errors that can occur while reading a schema sheet.
#[derive(Debug, Error)]
pub enum IngestError {
    // === File Errors ===
    /// Sheet file not found.
    #[error("schema sheet not found: {path}")]
    FileNotFound { path: PathBuf },

    /// Failed to read or tokenize the CSV.
    #[error("failed to read CSV {path}: {source}")]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    // === Layout Errors ===
    /// The sheet has no non-blank rows.
    #[error("schema sheet is empty: {path}")]
    EmptySheet { path: PathBuf },

    /// A required row (level, name or header) is missing.
    #[error("schema sheet {path} has no {row} row")]
    MissingRow { path: PathBuf, row: &'static str },

    /// The first cell is not a normal form token.
    #[error("invalid target level '{value}' in {path}")]
    InvalidLevel {
        path: PathBuf,
        value: String,
        #[source]
        source: ModelError,
    },

    /// A dependency line could not be split into its sides.
    #[error("malformed dependency '{line}' in {path}")]
    MalformedDependency { path: PathBuf, line: String },

    // === Schema Errors ===
    /// The loaded relation breaks a schema invariant.
    #[error("invalid relation in {path}: {source}")]
    InvalidRelation {
        path: PathBuf,
        #[source]
        source: ModelError,
    },

    /// Failed DataFrame operation.
    #[error("DataFrame operation failed: {message}")]
    DataFrame { message: String },
}

impl From<polars::prelude::PolarsError> for IngestError {
    fn from(err: polars::prelude::PolarsError) -> Self {
        Self::DataFrame {
            message: err.to_string(),
        }
    }
}

/// Result type for ingestion operations.
pub type Result<T> = std::result::Result<T, IngestError>;
