//! Loading relations from schema sheets.

pub mod error;
pub mod schema_sheet;

pub use error::{IngestError, Result};
pub use schema_sheet::{ROW_END, SchemaSheet, parse_schema_rows, read_schema_sheet};
