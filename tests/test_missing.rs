//! Integration tests for cleaning the shot table

use polars::prelude::*;
use shotxg::pipeline::{
    add_goal_indicator, analyze_missing_values, count_goals, fill_missing_values,
    get_columns_with_missing, TargetMapping, GOAL, GOAL_OUTCOME, MISSING_TEXT_FILL,
};

#[path = "common/mod.rs"]
mod common;

fn goal_mapping() -> TargetMapping {
    TargetMapping::new(GOAL_OUTCOME.to_string())
}

#[test]
fn test_analyze_missing_values_on_shots() {
    let df = common::create_shots_dataframe();

    let ratios = analyze_missing_values(&df).unwrap();

    assert_eq!(ratios.len(), df.width());
    // shot_first_time: 2 of 4 missing, outcome: 1 of 4
    assert_eq!(ratios[0], ("shot_first_time".to_string(), 0.5));
    assert_eq!(ratios[1], ("shot_outcome_name".to_string(), 0.25));
    assert_eq!(
        get_columns_with_missing(&ratios),
        vec!["shot_first_time", "shot_outcome_name"]
    );
}

#[test]
fn test_analyze_missing_values_empty_dataframe() {
    let df = DataFrame::empty();
    assert!(analyze_missing_values(&df).unwrap().is_empty());
}

#[test]
fn test_fill_then_goal_indicator() {
    let df = common::create_shots_dataframe();

    let filled = fill_missing_values(df).unwrap();
    for column in filled.get_columns() {
        assert_eq!(column.null_count(), 0, "{} still has nulls", column.name());
    }

    let outcome = filled.column("shot_outcome_name").unwrap().str().unwrap().get(2);
    assert_eq!(outcome, Some(MISSING_TEXT_FILL));
    let first_time = filled.column("shot_first_time").unwrap().bool().unwrap().get(1);
    assert_eq!(first_time, Some(false));

    let with_goal = add_goal_indicator(filled, "shot_outcome_name", &goal_mapping()).unwrap();
    let goals: Vec<Option<i32>> = with_goal.column(GOAL).unwrap().i32().unwrap().iter().collect();
    assert_eq!(goals, vec![Some(1), Some(0), Some(0), Some(0)]);
    assert_eq!(count_goals(&with_goal).unwrap(), (1, 3));
}

#[test]
fn test_goal_indicator_is_exact_match() {
    let df = df! {
        "shot_outcome_name" => [Some("Goal"), Some("goal"), Some("Goal "), Some("Saved"), None],
    }
    .unwrap();

    let with_goal = add_goal_indicator(df, "shot_outcome_name", &goal_mapping()).unwrap();
    let goals: Vec<Option<i32>> = with_goal.column(GOAL).unwrap().i32().unwrap().iter().collect();

    assert_eq!(goals, vec![Some(1), Some(0), Some(0), Some(0), Some(0)]);
}

#[test]
fn test_count_goals_requires_indicator() {
    let df = common::create_shots_dataframe();
    let err = count_goals(&df).unwrap_err();
    assert!(err.to_string().contains("goal"));
}
