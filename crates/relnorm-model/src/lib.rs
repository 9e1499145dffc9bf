pub mod attrs;
pub mod dependency;
pub mod error;
pub mod normal_form;
pub mod provenance;
pub mod relation;
pub mod sample;

pub use attrs::{AttrSet, IndexCombinations};
pub use dependency::{FdMap, ForeignKey, MvdMap, MvdSplit};
pub use error::{ModelError, Result};
pub use normal_form::NormalForm;
pub use provenance::{Provenance, RelationId};
pub use relation::Relation;
