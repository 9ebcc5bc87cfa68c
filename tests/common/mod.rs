//! Shared test utilities and fixture generators

#![allow(dead_code)]

use polars::prelude::*;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::path::PathBuf;
use tempfile::TempDir;

/// Four hand-made shots in the default StatsBomb column layout.
///
/// - `a`: (110, 40), a goal. Opposing keeper at (119, 40) and a defensive
///   midfielder at (112, 40) are in space; a teammate and a far forward are not.
/// - `b`: (100, 30), saved. Only the keeper on the goal line is in space.
/// - `c`: (118, 40), outcome missing. No goalkeeper in its freeze frame.
/// - `d`: no freeze frame at all.
pub fn create_shots_dataframe() -> DataFrame {
    df! {
        "id" => ["a", "b", "c", "d"],
        "match_id" => [1i64, 1, 2, 2],
        "team_name" => ["Arsenal", "Arsenal", "Chelsea", "Arsenal"],
        "player_name" => ["Saka", "Rice", "Palmer", "Havertz"],
        "location_x" => [110.0f64, 100.0, 118.0, 95.0],
        "location_y" => [40.0f64, 30.0, 40.0, 50.0],
        "shot_outcome_name" => [Some("Goal"), Some("Saved"), None, Some("Off T")],
        "shot_statsbomb_xg" => [0.35f64, 0.04, 0.6, 0.02],
        "shot_first_time" => [Some(true), None, None, Some(false)],
    }
    .unwrap()
}

/// Freeze frames matching [`create_shots_dataframe`]
pub fn create_freeze_frames_dataframe() -> DataFrame {
    df! {
        "id" => ["a", "a", "a", "a", "b", "b", "c"],
        "location_x" => [119.0f64, 112.0, 115.0, 90.0, 120.0, 95.0, 119.0],
        "location_y" => [40.0f64, 40.0, 40.0, 40.0, 40.0, 35.0, 40.0],
        "teammate" => [false, false, true, false, false, true, false],
        "position_name" => [
            "Goalkeeper",
            "Center Defensive Midfield",
            "Left Wing",
            "Center Forward",
            "Goalkeeper",
            "Right Wing",
            "Right Back",
        ],
    }
    .unwrap()
}

/// Seeded synthetic shots and freeze frames large enough to fit the model.
///
/// Goals are drawn with a probability that falls with distance, so the fitted
/// distance coefficient should come out negative.
pub fn create_synthetic_tables(n_shots: usize, seed: u64) -> (DataFrame, DataFrame) {
    let mut rng = StdRng::seed_from_u64(seed);
    let teams = ["Arsenal", "Chelsea", "Liverpool"];

    let mut ids = Vec::with_capacity(n_shots);
    let mut match_ids = Vec::with_capacity(n_shots);
    let mut team_names = Vec::with_capacity(n_shots);
    let mut xs = Vec::with_capacity(n_shots);
    let mut ys = Vec::with_capacity(n_shots);
    let mut outcomes = Vec::with_capacity(n_shots);
    let mut reference = Vec::with_capacity(n_shots);

    let mut ff_ids = Vec::new();
    let mut ff_xs = Vec::new();
    let mut ff_ys = Vec::new();
    let mut ff_teammates = Vec::new();
    let mut ff_positions = Vec::new();

    for i in 0..n_shots {
        let x: f64 = rng.gen_range(88.0..118.0);
        let y: f64 = rng.gen_range(22.0..58.0);
        let distance = ((120.0 - x).powi(2) + (40.0 - y).powi(2)).sqrt();
        let p_goal = (0.55 - 0.018 * distance).clamp(0.02, 0.6);
        let goal = rng.gen_bool(p_goal);

        let id = format!("shot-{}", i);
        ids.push(id.clone());
        match_ids.push((i / 12) as i64);
        team_names.push(teams[i % teams.len()]);
        xs.push(x);
        ys.push(y);
        outcomes.push(if goal { "Goal" } else { "Saved" });
        reference.push(p_goal);

        // Opposing keeper somewhere near the goal line
        ff_ids.push(id.clone());
        ff_xs.push(rng.gen_range(114.0..120.0));
        ff_ys.push(rng.gen_range(37.0..43.0));
        ff_teammates.push(false);
        ff_positions.push("Goalkeeper");

        for _ in 0..rng.gen_range(1..5) {
            ff_ids.push(id.clone());
            ff_xs.push(rng.gen_range(80.0..120.0));
            ff_ys.push(rng.gen_range(15.0..65.0));
            let teammate = rng.gen_bool(0.4);
            ff_teammates.push(teammate);
            ff_positions.push(if rng.gen_bool(0.5) {
                "Left Defensive Midfield"
            } else {
                "Center Back"
            });
        }
    }

    let shots = df! {
        "id" => ids,
        "match_id" => match_ids,
        "team_name" => team_names,
        "location_x" => xs,
        "location_y" => ys,
        "shot_outcome_name" => outcomes,
        "shot_statsbomb_xg" => reference,
    }
    .unwrap();

    let freeze_frames = df! {
        "id" => ff_ids,
        "location_x" => ff_xs,
        "location_y" => ff_ys,
        "teammate" => ff_teammates,
        "position_name" => ff_positions,
    }
    .unwrap();

    (shots, freeze_frames)
}

/// Write a DataFrame as CSV into `dir`
pub fn write_csv(dir: &TempDir, name: &str, df: &mut DataFrame) -> PathBuf {
    let path = dir.path().join(name);
    let mut file = std::fs::File::create(&path).unwrap();
    CsvWriter::new(&mut file).finish(df).unwrap();
    path
}

/// Create a temporary directory with a test CSV file
pub fn create_temp_csv(df: &mut DataFrame) -> (TempDir, PathBuf) {
    let temp_dir = TempDir::new().unwrap();
    let csv_path = write_csv(&temp_dir, "test_data.csv", df);
    (temp_dir, csv_path)
}

/// Assert that a DataFrame contains specific columns
pub fn assert_has_columns(df: &DataFrame, expected_cols: &[&str]) {
    let actual_cols: Vec<String> = df.get_column_names().iter().map(|s| s.to_string()).collect();
    for col in expected_cols {
        assert!(
            actual_cols.contains(&col.to_string()),
            "Missing expected column: '{}'. Actual columns: {:?}",
            col,
            actual_cols
        );
    }
}

/// Look up a float value of `column` on the row where `id` equals `shot_id`
pub fn value_for_shot(df: &DataFrame, shot_id: &str, column: &str) -> f64 {
    let ids = df.column("id").unwrap().str().unwrap().clone();
    let idx = ids
        .iter()
        .position(|v| v == Some(shot_id))
        .unwrap_or_else(|| panic!("shot '{}' not found", shot_id));
    let values = df.column(column).unwrap().cast(&DataType::Float64).unwrap();
    values.f64().unwrap().get(idx).unwrap()
}
