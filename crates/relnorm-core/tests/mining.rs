//! Miner and join validator checks over random samples.

use std::collections::{BTreeMap, BTreeSet};

use polars::prelude::DataFrame;
use proptest::prelude::*;
use relnorm_core::{discover_mvds, find_lossless_partition, is_lossless, is_trivial_mvd, mvd_holds};
use relnorm_model::sample::{distinct_rows, frame_from_rows};
use relnorm_model::{AttrSet, MvdSplit};

type Row = BTreeMap<String, String>;

const COLUMNS: [&str; 4] = ["A", "B", "C", "D"];

fn frame(rows: &[Vec<String>]) -> DataFrame {
    let columns: Vec<String> = COLUMNS.iter().map(|c| (*c).to_string()).collect();
    frame_from_rows(&columns, rows).expect("frame")
}

fn rows_strategy() -> impl Strategy<Value = Vec<Vec<String>>> {
    prop::collection::vec(
        prop::collection::vec(prop::sample::select(vec!["0", "1", "2"]), COLUMNS.len())
            .prop_map(|row| row.into_iter().map(str::to_string).collect()),
        1..10,
    )
}

/// Distinct rows of `data` on `attrs`, keyed by attribute name.
fn projection(data: &DataFrame, attrs: &AttrSet) -> BTreeSet<Row> {
    let names = attrs.names();
    distinct_rows(data, attrs)
        .into_iter()
        .map(|values| names.iter().cloned().zip(values).collect())
        .collect()
}

/// Nested-loop natural join: rows agreeing on every shared attribute merge.
fn join_rows(left: &BTreeSet<Row>, right: &BTreeSet<Row>) -> BTreeSet<Row> {
    let mut joined = BTreeSet::new();
    for l in left {
        for r in right {
            let agree = r
                .iter()
                .all(|(name, value)| l.get(name).is_none_or(|other| other == value));
            if agree {
                let mut row = l.clone();
                row.extend(r.iter().map(|(name, value)| (name.clone(), value.clone())));
                joined.insert(row);
            }
        }
    }
    joined
}

fn join_projections(data: &DataFrame, partition: &[AttrSet]) -> BTreeSet<Row> {
    let mut parts = partition.iter().map(|subset| projection(data, subset));
    let first = parts.next().unwrap_or_default();
    parts.fold(first, |acc, part| join_rows(&acc, &part))
}

#[test]
fn three_way_join_dependency_is_found() {
    let rows: Vec<Vec<String>> = [
        ["a1", "b1", "c2", "d"],
        ["a1", "b2", "c1", "d"],
        ["a2", "b1", "c1", "d"],
        ["a1", "b1", "c1", "d"],
    ]
    .iter()
    .map(|row| row.iter().map(|v| (*v).to_string()).collect())
    .collect();
    let data = frame(&rows);
    let attributes = AttrSet::from_names(["A", "B", "C"]);

    assert!(discover_mvds(&attributes, &data).is_empty());
    let partition = find_lossless_partition(&attributes, &data).expect("partition");
    let mut components = partition.clone();
    components.sort();
    assert_eq!(
        components,
        vec![
            AttrSet::from_names(["A", "B"]),
            AttrSet::from_names(["A", "C"]),
            AttrSet::from_names(["B", "C"]),
        ]
    );
    assert_eq!(join_projections(&data, &partition), projection(&data, &attributes));
}

#[test]
fn cross_product_yields_the_textbook_dependency() {
    let mut rows = Vec::new();
    for b in ["b1", "b2"] {
        for c in ["c1", "c2", "c3"] {
            rows.push(vec!["a".to_string(), b.to_string(), c.to_string(), "d".to_string()]);
        }
    }
    let data = frame(&rows);
    let attributes = AttrSet::from_names(["A", "B", "C"]);
    let mined = discover_mvds(&attributes, &data);
    assert_eq!(mined.len(), 1);
    assert_eq!(mined[0].determinant, AttrSet::single("A"));
    assert_eq!(
        mined[0].split,
        MvdSplit::new(AttrSet::single("B"), AttrSet::single("C"))
    );
}

#[test]
fn missing_columns_fail_the_check() {
    let data = frame(&[vec!["1".into(), "2".into(), "3".into(), "4".into()]]);
    let split = MvdSplit::new(AttrSet::single("B"), AttrSet::single("Z"));
    assert!(!mvd_holds(&data, &AttrSet::single("A"), &split));
}

#[test]
fn empty_sample_validates_nothing() {
    let data = frame(&[]);
    let attributes = AttrSet::from_names(COLUMNS);
    assert!(discover_mvds(&attributes, &data).is_empty());
    assert!(find_lossless_partition(&attributes, &data).is_none());
    let split = MvdSplit::new(AttrSet::single("B"), AttrSet::single("C"));
    assert!(mvd_holds(&data, &AttrSet::single("A"), &split));
}

#[test]
fn disconnected_partition_is_not_lossless() {
    let data = frame(&[vec!["1".into(), "2".into(), "3".into(), "4".into()]]);
    let attributes = AttrSet::from_names(COLUMNS);
    let partition = vec![AttrSet::from_names(["A", "B"]), AttrSet::from_names(["C", "D"])];
    assert!(!is_lossless(&attributes, &data, &partition));
}

proptest! {
    #[test]
    fn mined_dependencies_hold_and_are_non_trivial(rows in rows_strategy()) {
        let data = frame(&rows);
        let attributes = AttrSet::from_names(COLUMNS);
        for mined in discover_mvds(&attributes, &data) {
            prop_assert!(!is_trivial_mvd(&mined.determinant, &mined.split, &attributes));
            prop_assert!(mvd_holds(&data, &mined.determinant, &mined.split));
            prop_assert!(mined.split.left.is_disjoint(&mined.determinant));
            prop_assert!(mined.split.right.is_disjoint(&mined.determinant));
        }
    }

    #[test]
    fn found_partitions_cover_and_join_back(rows in rows_strategy()) {
        let data = frame(&rows);
        let attributes = AttrSet::from_names(COLUMNS);
        if let Some(partition) = find_lossless_partition(&attributes, &data) {
            let mut covered = AttrSet::new();
            for subset in &partition {
                prop_assert!(subset.len() >= 2 && subset.len() < attributes.len());
                covered.extend_from(subset);
            }
            prop_assert_eq!(covered, attributes.clone());
            prop_assert_eq!(join_projections(&data, &partition), projection(&data, &attributes));
        }
    }

    #[test]
    fn lossless_verdict_matches_a_plain_join(rows in rows_strategy()) {
        let data = frame(&rows);
        let attributes = AttrSet::from_names(COLUMNS);
        let partition = vec![
            AttrSet::from_names(["A", "B"]),
            AttrSet::from_names(["B", "C"]),
            AttrSet::from_names(["C", "D"]),
        ];
        let expected = join_projections(&data, &partition) == projection(&data, &attributes);
        prop_assert_eq!(is_lossless(&attributes, &data, &partition), expected);
    }
}
