use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::ModelError;

/// Normalization levels in the order they are applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum NormalForm {
    #[serde(rename = "1NF")]
    First,
    #[serde(rename = "2NF")]
    Second,
    #[serde(rename = "3NF")]
    Third,
    #[serde(rename = "BCNF")]
    BoyceCodd,
    #[serde(rename = "4NF")]
    Fourth,
    #[serde(rename = "5NF")]
    Fifth,
}

impl NormalForm {
    pub const ALL: [NormalForm; 6] = [
        NormalForm::First,
        NormalForm::Second,
        NormalForm::Third,
        NormalForm::BoyceCodd,
        NormalForm::Fourth,
        NormalForm::Fifth,
    ];

    /// Returns the conventional short token (`1NF`, `BCNF`, ...).
    pub fn as_str(&self) -> &'static str {
        match self {
            NormalForm::First => "1NF",
            NormalForm::Second => "2NF",
            NormalForm::Third => "3NF",
            NormalForm::BoyceCodd => "BCNF",
            NormalForm::Fourth => "4NF",
            NormalForm::Fifth => "5NF",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            NormalForm::First => "First normal form: atomic values only",
            NormalForm::Second => "Second normal form: no partial key dependencies",
            NormalForm::Third => "Third normal form: no transitive dependencies on non-prime attributes",
            NormalForm::BoyceCodd => "Boyce-Codd normal form: every determinant is a superkey",
            NormalForm::Fourth => "Fourth normal form: no non-trivial multivalued dependencies",
            NormalForm::Fifth => "Fifth normal form: no non-trivial lossless join decomposition",
        }
    }

    /// Position in [`NormalForm::ALL`].
    pub fn index(&self) -> usize {
        match self {
            NormalForm::First => 0,
            NormalForm::Second => 1,
            NormalForm::Third => 2,
            NormalForm::BoyceCodd => 3,
            NormalForm::Fourth => 4,
            NormalForm::Fifth => 5,
        }
    }

    /// Levels from 1NF up to and including `self`.
    pub fn through(self) -> impl Iterator<Item = NormalForm> {
        Self::ALL.into_iter().take(self.index() + 1)
    }
}

impl fmt::Display for NormalForm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for NormalForm {
    type Err = ModelError;

    /// Case-insensitive; accepts the short tokens and bare level digits.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_uppercase().replace([' ', '-', '_'], "");
        match normalized.as_str() {
            "1NF" | "1" => Ok(NormalForm::First),
            "2NF" | "2" => Ok(NormalForm::Second),
            "3NF" | "3" => Ok(NormalForm::Third),
            "BCNF" | "BOYCECODD" | "BOYCECODDNF" => Ok(NormalForm::BoyceCodd),
            "4NF" | "4" => Ok(NormalForm::Fourth),
            "5NF" | "5" => Ok(NormalForm::Fifth),
            _ => Err(ModelError::UnknownNormalForm(s.to_string())),
        }
    }
}
