//! Tests for relnorm-model types.

use proptest::prelude::*;

use relnorm_model::{AttrSet, ModelError, MvdSplit, Relation};

fn attrs(names: &[&str]) -> AttrSet {
    AttrSet::from_names(names.iter().copied())
}

fn sample_relation() -> Relation {
    let mut relation = Relation::new("R", attrs(&["A", "B", "C", "D"]), attrs(&["A", "B"]))
        .with_candidate_keys(vec![attrs(&["C", "D"])]);
    relation.add_fd(attrs(&["A", "B"]), attrs(&["C"]));
    relation.add_fd(attrs(&["C"]), attrs(&["D"]));
    relation
}

#[test]
fn add_fd_merges_dependents() {
    let mut relation = sample_relation();
    relation.add_fd(attrs(&["A", "B"]), attrs(&["D"]));
    assert_eq!(relation.fds.len(), 2);
    assert_eq!(relation.fds[&attrs(&["A", "B"])], attrs(&["C", "D"]));
}

#[test]
fn add_mvd_skips_duplicates() {
    let mut relation = sample_relation();
    let det = attrs(&["A"]);
    assert!(relation.add_mvd(det.clone(), MvdSplit::new(attrs(&["B"]), attrs(&["C", "D"]))));
    assert!(!relation.add_mvd(det.clone(), MvdSplit::new(attrs(&["C", "D"]), attrs(&["B"]))));
    assert_eq!(relation.mvds[&det].len(), 1);
}

#[test]
fn prime_and_non_prime_attributes() {
    let relation = Relation::new("R", attrs(&["A", "B", "C"]), attrs(&["A"]))
        .with_candidate_keys(vec![attrs(&["B"])]);
    assert_eq!(relation.prime_attributes(), attrs(&["A", "B"]));
    assert_eq!(relation.non_prime_attributes(), attrs(&["C"]));
}

#[test]
fn closure_follows_chains() {
    let relation = sample_relation();
    assert_eq!(
        relation.attribute_closure(&attrs(&["A", "B"])),
        attrs(&["A", "B", "C", "D"])
    );
    assert_eq!(relation.attribute_closure(&attrs(&["D"])), attrs(&["D"]));
}

#[test]
fn validate_rejects_unknown_attributes() {
    let mut relation = sample_relation();
    relation.add_fd(attrs(&["A"]), attrs(&["Z"]));
    let err = relation.validate().expect_err("unknown dependent");
    assert!(matches!(err, ModelError::MalformedDependency { .. }));
}

#[test]
fn validate_rejects_key_outside_attributes() {
    let relation = Relation::new("R", attrs(&["A"]), attrs(&["B"]));
    let err = relation.validate().expect_err("key outside");
    assert!(matches!(err, ModelError::KeyOutsideAttributes { .. }));
}

#[test]
fn validate_rejects_overlapping_mvd() {
    let mut relation = sample_relation();
    relation.add_mvd(attrs(&["A"]), MvdSplit::new(attrs(&["B", "C"]), attrs(&["C", "D"])));
    let err = relation.validate().expect_err("overlap");
    assert!(matches!(err, ModelError::OverlappingMvd { .. }));
}

#[test]
fn finalize_keys_falls_back_to_intersection() {
    let source = Relation::new("R", attrs(&["A", "B", "C"]), attrs(&["A", "B"]));
    let mut child = Relation::new("R", attrs(&["A", "C"]), source.primary_key.clone());
    child.finalize_keys(&source);
    assert_eq!(child.primary_key, attrs(&["A"]));
}

#[test]
fn finalize_keys_falls_back_to_all_attributes() {
    let source = Relation::new("R", attrs(&["A", "B", "C"]), attrs(&["A"]));
    let mut child = Relation::new("R", attrs(&["B", "C"]), source.primary_key.clone());
    child.finalize_keys(&source);
    assert_eq!(child.primary_key, attrs(&["B", "C"]));
}

#[test]
fn finalize_keys_keeps_intact_candidate_key_as_candidate() {
    let source = Relation::new("R", attrs(&["A", "B", "C"]), attrs(&["A"]))
        .with_candidate_keys(vec![attrs(&["B"])]);
    let mut child = Relation::new("R", attrs(&["B", "C"]), source.primary_key.clone())
        .with_candidate_keys(source.candidate_keys.clone());
    child.finalize_keys(&source);
    assert_eq!(child.primary_key, attrs(&["B", "C"]));
    assert_eq!(child.candidate_keys, vec![attrs(&["B"])]);
}

#[test]
fn finalize_keys_cuts_primary_key_even_when_candidate_key_survives() {
    let source = Relation::new("R", attrs(&["A", "B", "C"]), attrs(&["A", "B"]))
        .with_candidate_keys(vec![attrs(&["A", "C"])]);
    let mut child = Relation::new("R", attrs(&["A", "C"]), source.primary_key.clone())
        .with_candidate_keys(source.candidate_keys.clone());
    child.finalize_keys(&source);
    assert_eq!(child.primary_key, attrs(&["A"]));
    assert_eq!(child.candidate_keys, vec![attrs(&["A", "C"])]);
}

#[test]
fn finalize_keys_promotes_implied_keys() {
    let source = Relation::new("R", attrs(&["B", "C"]), attrs(&["B"]));
    let mut child = Relation::new("R_part", attrs(&["B", "C"]), attrs(&["B"]));
    child.add_fd(attrs(&["B"]), attrs(&["C"]));
    child.add_fd(attrs(&["C"]), attrs(&["B"]));
    child.finalize_keys(&source);
    assert_eq!(child.candidate_keys, vec![attrs(&["C"])]);
    assert!(child.is_superkey(&attrs(&["C"])));
}

fn subset_of(universe: &'static [&'static str]) -> impl Strategy<Value = AttrSet> {
    proptest::collection::vec(any::<bool>(), universe.len()).prop_map(move |mask| {
        universe
            .iter()
            .zip(mask)
            .filter_map(|(name, keep)| keep.then_some(*name))
            .collect()
    })
}

const UNIVERSE: &[&str] = &["A", "B", "C", "D", "E"];

proptest! {
    #[test]
    fn superkeys_are_upward_closed(extra in subset_of(UNIVERSE), ck in subset_of(UNIVERSE)) {
        let relation = Relation::new("R", attrs(UNIVERSE), attrs(&["A", "B"]))
            .with_candidate_keys(vec![ck.clone()]);
        let over_primary = relation.primary_key.union(&extra);
        let over_candidate = ck.union(&extra);
        prop_assert!(relation.is_superkey(&over_primary));
        prop_assert!(relation.is_superkey(&over_candidate));
    }
}
