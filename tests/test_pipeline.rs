//! End-to-end pipeline tests from CSV files to scored shots

use shotxg::pipeline::{
    add_goal_indicator, compute_correlation_matrix, count_goals, engineer_features,
    evaluate_scored, expand_location_column, fill_missing_values, fit_xg_model,
    load_dataset_with_progress, score_dataset, strongest_correlations, ColumnMap, FitOptions,
    GoalkeeperPolicy, TargetMapping, TrainTestSplit, DISTANCE, GOAL, GOAL_OUTCOME, PREDICTORS,
    XG,
};
use tempfile::TempDir;

#[path = "common/mod.rs"]
mod common;

#[test]
fn test_full_pipeline_from_csv() {
    let temp_dir = TempDir::new().unwrap();
    let (mut shots, mut ff) = common::create_synthetic_tables(300, 42);
    let shots_path = common::write_csv(&temp_dir, "shots.csv", &mut shots);
    let ff_path = common::write_csv(&temp_dir, "freeze_frames.csv", &mut ff);

    let columns = ColumnMap::default();

    // Load
    let (shots, shot_rows, _, _) = load_dataset_with_progress(&shots_path, 10000).unwrap();
    let (ff, _, _, _) = load_dataset_with_progress(&ff_path, 10000).unwrap();
    assert_eq!(shot_rows, 300);

    // Clean
    let shots = fill_missing_values(shots).unwrap();
    let shots = add_goal_indicator(
        shots,
        &columns.shots.outcome,
        &TargetMapping::new(GOAL_OUTCOME.to_string()),
    )
    .unwrap();
    let (goals, non_goals) = count_goals(&shots).unwrap();
    assert_eq!(goals + non_goals, 300);
    assert!(goals > 0 && non_goals > 0);

    // Engineer
    let engineered = engineer_features(&shots, &ff, &columns, GoalkeeperPolicy::Strict).unwrap();
    assert_eq!(engineered.df.height(), 300, "Every shot has a freeze frame");
    assert_eq!(engineered.shots_without_keeper, 0);

    // Explore
    let correlations = compute_correlation_matrix(&engineered.df).unwrap();
    for predictor in PREDICTORS {
        assert!(
            correlations.get(predictor, GOAL).is_some(),
            "{} missing from the correlation matrix",
            predictor
        );
    }
    let strongest = strongest_correlations(&correlations, 5);
    assert!(!strongest.is_empty());

    // Model
    let split = TrainTestSplit::new(engineered.df.height(), 0.8, 42);
    let (train, _) = split.apply(&engineered.df).unwrap();
    let model = fit_xg_model(&train, FitOptions::default()).unwrap();
    let scored = score_dataset(engineered.df, &model).unwrap();
    assert_eq!(scored.height(), 300, "Every row is scored, not just the test rows");

    // Evaluate
    let (_, test) = split.apply(&scored).unwrap();
    let eval = evaluate_scored(&test).unwrap();
    assert_eq!(eval.n_shots, 60);
    assert!((0.0..=1.0).contains(&eval.auc));
}

#[test]
fn test_pipeline_with_packed_locations() {
    let temp_dir = TempDir::new().unwrap();

    let shots_csv = "\
id,match_id,team_name,location,shot_outcome_name,shot_statsbomb_xg
s1,7,Arsenal,\"[110.0, 40.0]\",Goal,0.3
s2,7,Arsenal,\"[100.0, 30.0]\",Saved,0.05
";
    let ff_csv = "\
id,location,teammate,position_name
s1,\"[119.0, 40.0]\",false,Goalkeeper
s1,\"[112.0, 40.0]\",false,Center Defensive Midfield
s2,\"[120.0, 40.0]\",false,Goalkeeper
";
    let shots_path = temp_dir.path().join("shots.csv");
    let ff_path = temp_dir.path().join("ff.csv");
    std::fs::write(&shots_path, shots_csv).unwrap();
    std::fs::write(&ff_path, ff_csv).unwrap();

    let columns = ColumnMap::default();
    let (mut shots, _, _, _) = load_dataset_with_progress(&shots_path, 100).unwrap();
    let (mut ff, _, _, _) = load_dataset_with_progress(&ff_path, 100).unwrap();
    expand_location_column(&mut shots, "location", "location_x", "location_y").unwrap();
    expand_location_column(&mut ff, "location", "location_x", "location_y").unwrap();

    let shots = add_goal_indicator(
        shots,
        &columns.shots.outcome,
        &TargetMapping::new(GOAL_OUTCOME.to_string()),
    )
    .unwrap();
    let engineered = engineer_features(&shots, &ff, &columns, GoalkeeperPolicy::Strict).unwrap();

    assert_eq!(engineered.df.height(), 2);
    assert!((common::value_for_shot(&engineered.df, "s1", DISTANCE) - 10.0).abs() < 1e-12);
    assert_eq!(
        common::value_for_shot(&engineered.df, "s1", "opponents_in_space"),
        2.0
    );
    assert_eq!(common::value_for_shot(&engineered.df, "s1", GOAL), 1.0);
    assert!(engineered.df.column(XG).is_err(), "Scores are added by the model step");
}
