use std::fmt;

use crate::normal_form::NormalForm;

/// Handle into the normalizer's lineage arena.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize,
)]
pub struct RelationId(u32);

impl RelationId {
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    pub const fn get(self) -> u32 {
        self.0
    }
}

impl fmt::Display for RelationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Where a relation came from.
///
/// `id`, `parent` and `base` are assigned by the normalizer when the relation
/// enters the working set. `leftover` is set by the rule that produced the
/// relation when it holds the attributes no violation claimed.
#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Provenance {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<RelationId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent: Option<RelationId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base: Option<RelationId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub leftover: Option<NormalForm>,
}

impl Provenance {
    pub fn leftover_of(level: NormalForm) -> Self {
        Self {
            leftover: Some(level),
            ..Self::default()
        }
    }

    pub fn is_leftover_for(&self, level: NormalForm) -> bool {
        self.leftover == Some(level)
    }
}
