//! Schema sheet reader.
//!
//! A sheet is a headerless CSV laid out top to bottom:
//!
//! ```text
//! 3NF
//! Orders
//! OrderId,Customer,City
//! 1,alice,Paris
//! -Rowend-
//! {OrderId}
//! None
//! None
//! {Customer} --> {City}
//! ```
//!
//! The rows after `-Rowend-` are the primary key, the candidate keys, the
//! multivalued attributes and then one dependency per row. A trailer row may
//! be split over several cells when its commas were not quoted; the cells are
//! joined back together.

use std::path::Path;

use csv::ReaderBuilder;
use relnorm_model::sample::frame_from_rows;
use relnorm_model::{AttrSet, MvdSplit, NormalForm, Relation};
use tracing::{debug, warn};

use crate::error::{IngestError, Result};

/// Marker row closing the data section.
pub const ROW_END: &str = "-Rowend-";

/// A loaded sheet: the requested target level and the relation.
#[derive(Debug, Clone)]
pub struct SchemaSheet {
    pub level: NormalForm,
    pub relation: Relation,
}

/// Reads and validates the schema sheet at `path`.
pub fn read_schema_sheet(path: &Path) -> Result<SchemaSheet> {
    if !path.is_file() {
        return Err(IngestError::FileNotFound {
            path: path.to_path_buf(),
        });
    }
    let mut reader = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_path(path)
        .map_err(|source| IngestError::Csv {
            path: path.to_path_buf(),
            source,
        })?;
    let mut rows: Vec<Vec<String>> = Vec::new();
    for record in reader.records() {
        let record = record.map_err(|source| IngestError::Csv {
            path: path.to_path_buf(),
            source,
        })?;
        let row: Vec<String> = record.iter().map(normalize_cell).collect();
        if row.iter().all(String::is_empty) {
            continue;
        }
        rows.push(row);
    }
    parse_schema_rows(&rows, path)
}

/// Builds a sheet from already tokenized, non-blank rows. `origin` is only
/// used in error messages.
pub fn parse_schema_rows(rows: &[Vec<String>], origin: &Path) -> Result<SchemaSheet> {
    let missing = |row: &'static str| IngestError::MissingRow {
        path: origin.to_path_buf(),
        row,
    };
    if rows.is_empty() {
        return Err(IngestError::EmptySheet {
            path: origin.to_path_buf(),
        });
    }
    let level_token = first_cell(&rows[0]);
    let level: NormalForm = level_token
        .parse()
        .map_err(|source| IngestError::InvalidLevel {
            path: origin.to_path_buf(),
            value: level_token.to_string(),
            source,
        })?;
    let name = rows.get(1).map(|row| first_cell(row)).ok_or_else(|| missing("name"))?;
    let header = rows.get(2).ok_or_else(|| missing("header"))?;
    let columns: Vec<String> = header
        .iter()
        .filter(|cell| !cell.is_empty())
        .cloned()
        .collect();
    if columns.is_empty() {
        return Err(missing("header"));
    }
    let attributes = AttrSet::from_names(&columns);

    let body = &rows[3..];
    let end = body.iter().position(|row| first_cell(row) == ROW_END);
    let (data_rows, trailer) = match end {
        Some(idx) => (&body[..idx], Some(&body[idx + 1..])),
        None => (body, None),
    };
    let data_rows: Vec<Vec<String>> = data_rows
        .iter()
        .map(|row| (0..columns.len()).map(|idx| row.get(idx).cloned().unwrap_or_default()).collect())
        .collect();
    let data = frame_from_rows(&columns, &data_rows)?;

    let mut relation = match trailer {
        Some(trailer) => build_relation(name, attributes, trailer, origin)?,
        None => {
            warn!(relation = %name, "no -Rowend- marker; using every attribute as the key");
            Relation::new(name, attributes.clone(), attributes)
        }
    };
    relation.data = data;
    relation
        .validate()
        .map_err(|source| IngestError::InvalidRelation {
            path: origin.to_path_buf(),
            source,
        })?;
    debug!(
        relation = %relation.name,
        level = %level,
        attributes = relation.attributes.len(),
        rows = relation.data.height(),
        fds = relation.fds.len(),
        mvds = relation.mvds.len(),
        "schema sheet loaded"
    );
    Ok(SchemaSheet { level, relation })
}

fn build_relation(
    name: &str,
    attributes: AttrSet,
    trailer: &[Vec<String>],
    origin: &Path,
) -> Result<Relation> {
    let mut lines = trailer.iter().map(|row| join_cells(row));
    let primary_key = match lines.next() {
        Some(line) if !is_none(&line) => AttrSet::parse(&line),
        _ => attributes.clone(),
    };
    let mut relation = Relation::new(name, attributes, primary_key);

    let mut dependencies = Vec::new();
    let mut slots = 0;
    for line in lines {
        if is_dependency(&line) {
            dependencies.push(line);
            continue;
        }
        match slots {
            0 => relation.candidate_keys = parse_key_list(&line),
            1 => relation.multivalued = parse_name_list(&line),
            _ => {
                return Err(IngestError::MalformedDependency {
                    path: origin.to_path_buf(),
                    line,
                });
            }
        }
        slots += 1;
    }
    for line in dependencies {
        add_dependency(&mut relation, &line, origin)?;
    }
    Ok(relation)
}

fn add_dependency(relation: &mut Relation, line: &str, origin: &Path) -> Result<()> {
    let malformed = || IngestError::MalformedDependency {
        path: origin.to_path_buf(),
        line: line.to_string(),
    };
    if let Some((det, dependent)) = line.split_once("-->>") {
        let det = AttrSet::parse(det);
        let sides: Vec<AttrSet> = dependent.split('|').map(AttrSet::parse).collect();
        if det.is_empty() || sides.iter().any(AttrSet::is_empty) {
            return Err(malformed());
        }
        if let [left, right] = sides.as_slice() {
            relation.add_mvd(det, MvdSplit::new(left.clone(), right.clone()));
        } else {
            for side in sides {
                let rest = relation.attributes.difference(&det).difference(&side);
                if rest.is_empty() {
                    return Err(malformed());
                }
                relation.add_mvd(det.clone(), MvdSplit::new(side, rest));
            }
        }
        return Ok(());
    }
    let (det, dependent) = line.split_once("-->").ok_or_else(malformed)?;
    let det = AttrSet::parse(det);
    let dependent = AttrSet::parse(dependent);
    if det.is_empty() || dependent.is_empty() {
        return Err(malformed());
    }
    relation.add_fd(det, dependent);
    Ok(())
}

/// `{A, C}, {D}` into `[{A, C}, {D}]`; `None` or blank into nothing.
fn parse_key_list(line: &str) -> Vec<AttrSet> {
    if is_none(line) {
        return Vec::new();
    }
    line.split('}')
        .map(|part| AttrSet::parse(part.trim().trim_start_matches(',')))
        .filter(|key| !key.is_empty())
        .collect()
}

fn parse_name_list(line: &str) -> AttrSet {
    if is_none(line) {
        AttrSet::new()
    } else {
        AttrSet::parse(line)
    }
}

fn is_dependency(line: &str) -> bool {
    line.contains("-->")
}

fn is_none(line: &str) -> bool {
    let trimmed = line.trim();
    trimmed.is_empty() || trimmed.eq_ignore_ascii_case("none")
}

fn first_cell(row: &[String]) -> &str {
    row.first().map(String::as_str).unwrap_or("")
}

/// Rejoins a row that the CSV split on unquoted commas.
fn join_cells(row: &[String]) -> String {
    row.iter()
        .filter(|cell| !cell.is_empty())
        .map(String::as_str)
        .collect::<Vec<_>>()
        .join(", ")
}

fn normalize_cell(raw: &str) -> String {
    raw.trim().trim_matches('\u{feff}').to_string()
}
