//! Helpers for the string-celled data sample carried by each relation.

use std::collections::BTreeSet;

use polars::prelude::{
    AnyValue, BooleanChunked, Column, DataFrame, IntoColumn, NamedFrom, NewChunkedArray,
    PolarsResult, Series,
};

use crate::attrs::AttrSet;

pub fn any_to_string(value: AnyValue) -> String {
    match value {
        AnyValue::String(value) => value.to_string(),
        AnyValue::StringOwned(value) => value.to_string(),
        AnyValue::Null => String::new(),
        _ => value.to_string(),
    }
}

/// Cell as a trimmed string; missing columns and nulls read as empty.
pub fn cell_value(df: &DataFrame, name: &str, idx: usize) -> String {
    match df.column(name) {
        Ok(column) => any_to_string(column.get(idx).unwrap_or(AnyValue::Null))
            .trim()
            .to_string(),
        Err(_) => String::new(),
    }
}

pub fn row_values(df: &DataFrame, names: &[String], idx: usize) -> Vec<String> {
    names.iter().map(|name| cell_value(df, name, idx)).collect()
}

pub fn has_columns(df: &DataFrame, attrs: &AttrSet) -> bool {
    attrs.iter().all(|name| df.column(name).is_ok())
}

/// Builds a frame of string columns. Short rows are padded with empty cells.
pub fn frame_from_rows(columns: &[String], rows: &[Vec<String>]) -> PolarsResult<DataFrame> {
    let cols: Vec<Column> = columns
        .iter()
        .enumerate()
        .map(|(pos, name)| {
            let values: Vec<String> = rows
                .iter()
                .map(|row| row.get(pos).cloned().unwrap_or_default())
                .collect();
            Series::new(name.as_str().into(), values).into_column()
        })
        .collect();
    DataFrame::new(cols)
}

/// Projects `df` onto `attrs` (in sorted order) and removes duplicate rows.
pub fn project_frame(df: &DataFrame, attrs: &AttrSet) -> PolarsResult<DataFrame> {
    let names = attrs.names();
    let projected = if has_columns(df, attrs) {
        df.select(names.iter().map(String::as_str))?
    } else {
        let rows: Vec<Vec<String>> = (0..df.height())
            .map(|idx| row_values(df, &names, idx))
            .collect();
        frame_from_rows(&names, &rows)?
    };
    dedupe_rows(&projected, &names)
}

fn dedupe_rows(df: &DataFrame, names: &[String]) -> PolarsResult<DataFrame> {
    let mut seen = BTreeSet::new();
    let keep: Vec<bool> = (0..df.height())
        .map(|idx| seen.insert(row_values(df, names, idx)))
        .collect();
    if keep.iter().all(|flag| *flag) {
        return Ok(df.clone());
    }
    let mask = BooleanChunked::from_slice("dedupe".into(), &keep);
    df.filter(&mask)
}

/// Distinct rows of `df` restricted to `attrs`, values in sorted attribute order.
pub fn distinct_rows(df: &DataFrame, attrs: &AttrSet) -> BTreeSet<Vec<String>> {
    let names = attrs.names();
    (0..df.height())
        .map(|idx| row_values(df, &names, idx))
        .collect()
}

/// Expands an encoded multi-value cell such as `{a, b, c}`.
///
/// Values without braces are a single value. An empty brace list yields one
/// empty value so the owning row is not lost.
pub fn split_multi_value(raw: &str) -> Vec<String> {
    let trimmed = raw.trim();
    if !trimmed.contains('{') {
        return vec![trimmed.to_string()];
    }
    let inner = trimmed.trim_start_matches('{').trim_end_matches('}');
    let values: Vec<String> = inner
        .split(',')
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(str::to_string)
        .collect();
    if values.is_empty() {
        vec![String::new()]
    } else {
        values
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(values: &[&str]) -> Vec<String> {
        values.iter().map(|value| value.to_string()).collect()
    }

    #[test]
    fn projection_removes_duplicates() {
        let df = frame_from_rows(
            &names(&["A", "B", "C"]),
            &[names(&["1", "x", "p"]), names(&["1", "x", "q"]), names(&["2", "y", "p"])],
        )
        .expect("frame");
        let projected = project_frame(&df, &AttrSet::from_names(["A", "B"])).expect("project");
        assert_eq!(projected.height(), 2);
        assert_eq!(cell_value(&projected, "B", 1), "y");
    }

    #[test]
    fn projection_fills_missing_columns() {
        let df = frame_from_rows(&names(&["A"]), &[names(&["1"])]).expect("frame");
        let projected = project_frame(&df, &AttrSet::from_names(["A", "Z"])).expect("project");
        assert_eq!(projected.width(), 2);
        assert_eq!(cell_value(&projected, "Z", 0), "");
    }

    #[test]
    fn multi_values_are_split() {
        assert_eq!(split_multi_value("{a, b ,c}"), names(&["a", "b", "c"]));
        assert_eq!(split_multi_value(" plain "), names(&["plain"]));
        assert_eq!(split_multi_value("{}"), names(&[""]));
    }
}
