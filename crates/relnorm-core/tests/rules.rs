//! Decomposition behavior of the individual normal-form rules.

use polars::prelude::DataFrame;
use relnorm_core::default_registry;
use relnorm_core::rules::{
    BoyceCoddNormalForm, FifthNormalForm, FirstNormalForm, FourthNormalForm, NormalFormRule,
    SecondNormalForm, ThirdNormalForm,
};
use relnorm_model::sample::{cell_value, frame_from_rows};
use relnorm_model::{AttrSet, MvdSplit, NormalForm, Relation};

fn attrs(names: &[&str]) -> AttrSet {
    AttrSet::from_names(names.iter().copied())
}

fn frame(columns: &[&str], rows: &[&[&str]]) -> DataFrame {
    let columns: Vec<String> = columns.iter().map(|c| (*c).to_string()).collect();
    let rows: Vec<Vec<String>> = rows
        .iter()
        .map(|row| row.iter().map(|v| (*v).to_string()).collect())
        .collect();
    frame_from_rows(&columns, &rows).expect("frame")
}

fn names(relations: &[Relation]) -> Vec<&str> {
    relations.iter().map(|r| r.name.as_str()).collect()
}

fn course_relation() -> Relation {
    Relation::new(
        "Course",
        attrs(&["Course", "Teacher", "Book"]),
        attrs(&["Course", "Teacher", "Book"]),
    )
    .with_data(frame(
        &["Course", "Teacher", "Book"],
        &[
            &["c1", "t1", "b1"],
            &["c1", "t1", "b2"],
            &["c1", "t2", "b1"],
            &["c1", "t2", "b2"],
            &["c2", "t3", "b3"],
        ],
    ))
}

#[test]
fn key_determined_relation_satisfies_every_level_through_bcnf() {
    let mut relation = Relation::new("R", attrs(&["A", "B", "C"]), attrs(&["A"]));
    relation.add_fd(attrs(&["A"]), attrs(&["B", "C"]));
    for level in NormalForm::BoyceCodd.through() {
        let rule = default_registry().for_level(level).expect("rule");
        assert!(rule.is_satisfied(&relation), "{level}");
        let parts = rule.decompose(&relation).expect("decompose");
        assert_eq!(names(&parts), vec!["R"]);
    }
}

#[test]
fn first_normal_form_expands_value_lists() {
    let relation = Relation::new("R", attrs(&["A", "M", "X"]), attrs(&["A"]))
        .with_multivalued(attrs(&["M"]))
        .with_data(frame(
            &["A", "M", "X"],
            &[&["1", "{x, y}", "p"], &["2", "z", "q"], &["3", "{}", "r"]],
        ));
    let rule = FirstNormalForm;
    assert!(!rule.is_satisfied(&relation));

    let parts = rule.decompose(&relation).expect("decompose");
    assert_eq!(names(&parts), vec!["NormalisedOneNF_M", "R_LeftoverAttributes"]);

    let expanded = &parts[0];
    assert_eq!(expanded.attributes, attrs(&["A", "M"]));
    assert_eq!(expanded.primary_key, attrs(&["A", "M"]));
    let rows: Vec<(String, String)> = (0..expanded.data.height())
        .map(|idx| {
            (
                cell_value(&expanded.data, "A", idx),
                cell_value(&expanded.data, "M", idx),
            )
        })
        .collect();
    assert_eq!(
        rows,
        vec![
            ("1".to_string(), "x".to_string()),
            ("1".to_string(), "y".to_string()),
            ("2".to_string(), "z".to_string()),
            ("3".to_string(), String::new()),
        ]
    );

    let leftover = &parts[1];
    assert_eq!(leftover.attributes, attrs(&["A", "X"]));
    assert!(leftover.multivalued.is_empty());
    assert!(rule.is_satisfied(leftover));
}

#[test]
fn second_normal_form_splits_partial_dependency() {
    let mut relation = Relation::new("R", attrs(&["A", "B", "C"]), attrs(&["A", "B"]));
    relation.add_fd(attrs(&["B"]), attrs(&["C"]));
    let rule = SecondNormalForm;
    assert!(!rule.is_satisfied(&relation));

    let parts = rule.decompose(&relation).expect("decompose");
    assert_eq!(names(&parts), vec!["R_2NF_B_C", "R_leftover_2NF"]);
    assert_eq!(parts[0].primary_key, attrs(&["B"]));
    assert_eq!(parts[0].fds[&attrs(&["B"])], attrs(&["C"]));
    assert_eq!(parts[1].attributes, attrs(&["A", "B"]));
    assert!(parts[1].provenance.is_leftover_for(NormalForm::Second));
    assert!(parts.iter().all(|part| rule.is_satisfied(part)));
}

#[test]
fn second_normal_form_pulls_in_transitive_attributes() {
    let mut relation = Relation::new("R", attrs(&["A", "B", "C", "D"]), attrs(&["A", "B"]));
    relation.add_fd(attrs(&["B"]), attrs(&["C"]));
    relation.add_fd(attrs(&["C"]), attrs(&["D"]));

    let parts = SecondNormalForm.decompose(&relation).expect("decompose");
    assert_eq!(parts[0].attributes, attrs(&["B", "C", "D"]));
    assert_eq!(parts[0].fds[&attrs(&["C"])], attrs(&["D"]));
    assert_eq!(parts[1].attributes, attrs(&["A", "B"]));
}

#[test]
fn second_normal_form_needs_determinant_inside_one_key() {
    // {A, C} is all prime but straddles two keys, so it is not a part of
    // either and the FD is left to the later levels.
    let mut relation = Relation::new("R", attrs(&["A", "B", "C", "D", "E"]), attrs(&["A", "B"]))
        .with_candidate_keys(vec![attrs(&["C", "D"])]);
    relation.add_fd(attrs(&["A", "C"]), attrs(&["E"]));
    assert!(SecondNormalForm.is_satisfied(&relation));
    assert!(!ThirdNormalForm.is_satisfied(&relation));
}

#[test]
fn third_normal_form_moves_transitive_dependency() {
    let mut relation = Relation::new("R", attrs(&["A", "B", "C"]), attrs(&["A", "B"]));
    relation.add_fd(attrs(&["B"]), attrs(&["C"]));
    let rule = ThirdNormalForm;
    assert!(!rule.is_satisfied(&relation));

    let parts = rule.decompose(&relation).expect("decompose");
    assert_eq!(names(&parts), vec!["R_3NF_B", "R"]);
    assert_eq!(parts[0].attributes, attrs(&["B", "C"]));
    assert_eq!(parts[0].primary_key, attrs(&["B"]));
    assert_eq!(parts[1].attributes, attrs(&["A", "B"]));
    assert_eq!(parts[1].primary_key, attrs(&["A", "B"]));
    assert!(parts[1].fds.is_empty());
}

#[test]
fn third_normal_form_tolerates_prime_dependents() {
    // C -> B has a prime dependent, so only BCNF objects to it.
    let mut relation = Relation::new("R", attrs(&["A", "B", "C"]), attrs(&["A", "B"]))
        .with_candidate_keys(vec![attrs(&["A", "C"])]);
    relation.add_fd(attrs(&["A", "B"]), attrs(&["C"]));
    relation.add_fd(attrs(&["C"]), attrs(&["B"]));
    assert!(ThirdNormalForm.is_satisfied(&relation));
    assert!(!BoyceCoddNormalForm.is_satisfied(&relation));

    let parts = BoyceCoddNormalForm.decompose(&relation).expect("decompose");
    assert_eq!(names(&parts), vec!["R_part1", "R"]);
    assert_eq!(parts[0].attributes, attrs(&["B", "C"]));
    assert_eq!(parts[0].primary_key, attrs(&["C"]));
    // The remainder loses B: its key is what is left of the source key,
    // while {A, C} stays on as a candidate key.
    assert_eq!(parts[1].attributes, attrs(&["A", "C"]));
    assert_eq!(parts[1].primary_key, attrs(&["A"]));
    assert_eq!(parts[1].candidate_keys, vec![attrs(&["A", "C"])]);
    assert!(parts.iter().all(|part| BoyceCoddNormalForm.is_satisfied(part)));
}

#[test]
fn bcnf_matches_third_normal_form_on_transitive_dependency() {
    let mut relation = Relation::new("R", attrs(&["A", "B", "C"]), attrs(&["A", "B"]));
    relation.add_fd(attrs(&["B"]), attrs(&["C"]));
    let parts = BoyceCoddNormalForm.decompose(&relation).expect("decompose");
    assert_eq!(parts[0].attributes, attrs(&["B", "C"]));
    assert_eq!(parts[0].fds[&attrs(&["B"])], attrs(&["C"]));
    assert_eq!(parts[1].attributes, attrs(&["A", "B"]));
    assert!(parts[1].fds.is_empty());
}

#[test]
fn fourth_normal_form_splits_mined_dependency() {
    let relation = course_relation();
    let rule = FourthNormalForm;
    assert!(!rule.is_satisfied(&relation));

    let parts = rule.decompose(&relation).expect("decompose");
    assert_eq!(
        names(&parts),
        vec!["Course_4NF_Course_Book", "Course_4NF_Course_Teacher"]
    );
    assert_eq!(parts[0].primary_key, attrs(&["Book", "Course"]));
    assert_eq!(parts[0].data.height(), 3);
    assert!(parts.iter().all(|part| part.fds.is_empty()));
    assert!(parts.iter().all(|part| rule.is_satisfied(part)));
}

#[test]
fn fourth_normal_form_ignores_contradicted_recorded_dependency() {
    let mut relation = Relation::new("R", attrs(&["A", "B", "C"]), attrs(&["A", "B", "C"]))
        .with_data(frame(
            &["A", "B", "C"],
            &[&["a", "b1", "c1"], &["a", "b2", "c2"]],
        ));
    relation.add_mvd(attrs(&["A"]), MvdSplit::new(attrs(&["B"]), attrs(&["C"])));
    assert!(FourthNormalForm.is_satisfied(&relation));
    let parts = FourthNormalForm.decompose(&relation).expect("decompose");
    assert_eq!(names(&parts), vec!["R"]);
    assert_eq!(parts[0].mvds.len(), 1);
}

#[test]
fn fourth_normal_form_trusts_recorded_dependency_without_data() {
    let mut relation = Relation::new("R", attrs(&["A", "B", "C", "D"]), attrs(&["A", "B", "C"]));
    relation.add_mvd(attrs(&["A"]), MvdSplit::new(attrs(&["B"]), attrs(&["C", "D"])));

    let parts = FourthNormalForm.decompose(&relation).expect("decompose");
    assert_eq!(names(&parts), vec!["R_4NF_A_B", "R_4NF_A_C_D"]);
}

#[test]
fn fourth_normal_form_splits_dependency_on_primary_key() {
    let mut relation = Relation::new("R", attrs(&["A", "B", "C"]), attrs(&["A"]));
    relation.add_mvd(attrs(&["A"]), MvdSplit::new(attrs(&["B"]), attrs(&["C"])));
    let rule = FourthNormalForm;
    assert!(!rule.is_satisfied(&relation));

    let parts = rule.decompose(&relation).expect("decompose");
    assert_eq!(names(&parts), vec!["R_4NF_A_B", "R_4NF_A_C"]);
    assert_eq!(parts[0].attributes, attrs(&["A", "B"]));
    assert_eq!(parts[1].attributes, attrs(&["A", "C"]));
    assert_eq!(parts[1].primary_key, attrs(&["A", "C"]));
    assert!(parts.iter().all(|part| rule.is_satisfied(part)));
}

#[test]
fn fourth_normal_form_leftover_keeps_uncollected_attributes() {
    let mut relation = Relation::new("R", attrs(&["A", "B", "C", "D"]), attrs(&["A", "B", "C"]));
    relation.add_mvd(attrs(&["A"]), MvdSplit::new(attrs(&["B"]), attrs(&["C"])));

    let parts = FourthNormalForm.decompose(&relation).expect("decompose");
    assert_eq!(names(&parts), vec!["R_4NF_A_B", "R_4NF_A_C", "R_leftover_4NF"]);
    // Primary key plus D would be the whole relation again, so the
    // determinant stands in for the key.
    let leftover = &parts[2];
    assert_eq!(leftover.attributes, attrs(&["A", "D"]));
    assert_eq!(leftover.primary_key, attrs(&["A"]));
    assert!(leftover.provenance.is_leftover_for(NormalForm::Fourth));
}

#[test]
fn fifth_normal_form_splits_along_lossless_partition() {
    let relation = course_relation();
    let rule = FifthNormalForm;
    assert!(!rule.is_satisfied(&relation));

    let parts = rule.decompose(&relation).expect("decompose");
    assert_eq!(
        names(&parts),
        vec!["Course_5NF_Book_Course", "Course_5NF_Book_Teacher"]
    );
    assert_eq!(parts[0].primary_key, attrs(&["Book", "Course"]));
    assert!(parts.iter().all(|part| rule.is_satisfied(part)));
}

#[test]
fn fifth_normal_form_without_data_is_satisfied() {
    let relation = Relation::new("R", attrs(&["A", "B", "C"]), attrs(&["A"]));
    assert!(FifthNormalForm.is_satisfied(&relation));
}
