//! Integration tests for joining freeze frames and aggregating shot features

use polars::prelude::*;
use shotxg::pipeline::{
    engineer_features, ColumnMap, FeatureError, GoalkeeperPolicy, ANGLE, DEFENDERS_IN_SPACE,
    DISTANCE, KEEPER_DISTANCE, OPPONENTS_IN_SPACE,
};

#[path = "common/mod.rs"]
mod common;

use common::{
    assert_has_columns, create_freeze_frames_dataframe, create_shots_dataframe,
    create_synthetic_tables, value_for_shot,
};

#[test]
fn test_one_row_per_joined_shot() {
    let shots = create_shots_dataframe();
    let ff = create_freeze_frames_dataframe();

    let engineered =
        engineer_features(&shots, &ff, &ColumnMap::default(), GoalkeeperPolicy::First).unwrap();
    let df = engineered.df;

    // Shot "d" has no freeze frame and falls out of the join
    assert_eq!(df.height(), 3);
    let ids: Vec<&str> = df
        .column("id")
        .unwrap()
        .str()
        .unwrap()
        .iter()
        .map(|v| v.unwrap())
        .collect();
    assert_eq!(ids, vec!["a", "b", "c"], "Shot order should be preserved");

    assert_has_columns(
        &df,
        &[
            "match_id",
            "team_name",
            "shot_outcome_name",
            "shot_statsbomb_xg",
            DISTANCE,
            ANGLE,
            OPPONENTS_IN_SPACE,
            DEFENDERS_IN_SPACE,
            KEEPER_DISTANCE,
        ],
    );
}

#[test]
fn test_in_space_counts() {
    let shots = create_shots_dataframe();
    let ff = create_freeze_frames_dataframe();

    let df = engineer_features(&shots, &ff, &ColumnMap::default(), GoalkeeperPolicy::First)
        .unwrap()
        .df;

    // a: keeper and the defensive midfielder are closer than the shooter
    assert_eq!(value_for_shot(&df, "a", OPPONENTS_IN_SPACE), 2.0);
    assert_eq!(value_for_shot(&df, "a", DEFENDERS_IN_SPACE), 1.0);
    assert!((value_for_shot(&df, "a", KEEPER_DISTANCE) - 1.0).abs() < 1e-12);
    assert!((value_for_shot(&df, "a", DISTANCE) - 10.0).abs() < 1e-12);

    // b: only the keeper; the winger is a teammate
    assert_eq!(value_for_shot(&df, "b", OPPONENTS_IN_SPACE), 1.0);
    assert_eq!(value_for_shot(&df, "b", DEFENDERS_IN_SPACE), 0.0);
    assert_eq!(value_for_shot(&df, "b", KEEPER_DISTANCE), 0.0);
}

#[test]
fn test_missing_keeper_falls_back_to_zero() {
    let shots = create_shots_dataframe();
    let ff = create_freeze_frames_dataframe();

    let engineered =
        engineer_features(&shots, &ff, &ColumnMap::default(), GoalkeeperPolicy::First).unwrap();

    assert_eq!(engineered.shots_without_keeper, 1);
    assert_eq!(engineered.shots_with_multiple_keepers, 0);
    assert_eq!(value_for_shot(&engineered.df, "c", KEEPER_DISTANCE), 0.0);
    assert_eq!(value_for_shot(&engineered.df, "c", OPPONENTS_IN_SPACE), 1.0);
}

#[test]
fn test_strict_policy_rejects_missing_keeper() {
    let shots = create_shots_dataframe();
    let ff = create_freeze_frames_dataframe();

    let err = engineer_features(&shots, &ff, &ColumnMap::default(), GoalkeeperPolicy::Strict)
        .unwrap_err();

    match err.downcast_ref::<FeatureError>() {
        Some(FeatureError::GoalkeeperCount { shot_id, count }) => {
            assert_eq!(shot_id, "c");
            assert_eq!(*count, 0);
        }
        other => panic!("Expected a goalkeeper count error, got {:?}", other),
    }
}

#[test]
fn test_multiple_keepers_use_the_first() {
    let shots = create_shots_dataframe();
    let extra = df! {
        "id" => ["b"],
        "location_x" => [110.0f64],
        "location_y" => [40.0f64],
        "teammate" => [false],
        "position_name" => ["Goalkeeper"],
    }
    .unwrap();
    let ff = create_freeze_frames_dataframe().vstack(&extra).unwrap();

    let engineered =
        engineer_features(&shots, &ff, &ColumnMap::default(), GoalkeeperPolicy::First).unwrap();

    assert_eq!(engineered.shots_with_multiple_keepers, 1);
    // First keeper row for "b" stands on the goal line
    assert_eq!(value_for_shot(&engineered.df, "b", KEEPER_DISTANCE), 0.0);
}

#[test]
fn test_strict_policy_rejects_multiple_keepers() {
    // Shot "a" only, so no other shot trips the policy first
    let shots = create_shots_dataframe().head(Some(1));
    let ff = df! {
        "id" => ["a", "a", "a"],
        "location_x" => [119.0f64, 117.0, 100.0],
        "location_y" => [40.0f64, 40.0, 30.0],
        "teammate" => [false, false, true],
        "position_name" => ["Goalkeeper", "Goalkeeper", "Center Forward"],
    }
    .unwrap();

    let err = engineer_features(&shots, &ff, &ColumnMap::default(), GoalkeeperPolicy::Strict)
        .unwrap_err();

    match err.downcast_ref::<FeatureError>() {
        Some(FeatureError::GoalkeeperCount { shot_id, count }) => {
            assert_eq!(shot_id, "a");
            assert_eq!(*count, 2);
        }
        other => panic!("Expected a goalkeeper count error, got {:?}", other),
    }
}

#[test]
fn test_teammate_keeper_is_ignored() {
    let shots = create_shots_dataframe().head(Some(1));
    // The shooter's own keeper comes first in the frame
    let ff = df! {
        "id" => ["a", "a"],
        "location_x" => [20.0f64, 118.0],
        "location_y" => [40.0f64, 40.0],
        "teammate" => [true, false],
        "position_name" => ["Goalkeeper", "Goalkeeper"],
    }
    .unwrap();

    for policy in [GoalkeeperPolicy::First, GoalkeeperPolicy::Strict] {
        let engineered =
            engineer_features(&shots, &ff, &ColumnMap::default(), policy).unwrap();

        assert_eq!(engineered.shots_without_keeper, 0);
        assert_eq!(engineered.shots_with_multiple_keepers, 0);
        assert!((value_for_shot(&engineered.df, "a", KEEPER_DISTANCE) - 2.0).abs() < 1e-12);
        assert_eq!(value_for_shot(&engineered.df, "a", OPPONENTS_IN_SPACE), 1.0);
    }
}

#[test]
fn test_opponents_in_space_bounded_by_opponent_rows() {
    let (shots, ff) = create_synthetic_tables(150, 11);

    let df = engineer_features(&shots, &ff, &ColumnMap::default(), GoalkeeperPolicy::Strict)
        .unwrap()
        .df;
    assert_eq!(df.height(), 150);

    let ff_ids = ff.column("id").unwrap().str().unwrap().clone();
    let teammates = ff.column("teammate").unwrap().bool().unwrap().clone();

    let ids = df.column("id").unwrap().str().unwrap().clone();
    let in_space = df
        .column(OPPONENTS_IN_SPACE)
        .unwrap()
        .cast(&DataType::Int64)
        .unwrap();
    let in_space = in_space.i64().unwrap();

    for (id, count) in ids.iter().zip(in_space.iter()) {
        let id = id.unwrap();
        let opponents = ff_ids
            .iter()
            .zip(teammates.iter())
            .filter(|(fid, mate)| *fid == Some(id) && *mate == Some(false))
            .count() as i64;
        assert!(
            count.unwrap() <= opponents,
            "Shot {} has {} opponents in space but only {} opponents",
            id,
            count.unwrap(),
            opponents
        );
    }
}

#[test]
fn test_missing_freeze_frame_column_is_reported() {
    let shots = create_shots_dataframe();
    let ff = create_freeze_frames_dataframe().drop("teammate").unwrap();

    let err = engineer_features(&shots, &ff, &ColumnMap::default(), GoalkeeperPolicy::First)
        .unwrap_err();
    assert!(matches!(
        err.downcast_ref::<FeatureError>(),
        Some(FeatureError::MissingColumn { column, .. }) if column == "teammate"
    ));
}

#[test]
fn test_no_matching_freeze_frames_is_an_error() {
    let shots = create_shots_dataframe();
    let ff = df! {
        "id" => ["zzz"],
        "location_x" => [119.0f64],
        "location_y" => [40.0f64],
        "teammate" => [false],
        "position_name" => ["Goalkeeper"],
    }
    .unwrap();

    let err = engineer_features(&shots, &ff, &ColumnMap::default(), GoalkeeperPolicy::First)
        .unwrap_err();
    assert!(matches!(
        err.downcast_ref::<FeatureError>(),
        Some(FeatureError::EmptyJoin)
    ));
}
