//! Column mapping for the shot and freeze-frame tables
//!
//! Defaults follow the flattened StatsBomb open-data layout. A JSON file can
//! override any subset of the names.

use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Outcome value that marks a goal
pub const GOAL_OUTCOME: &str = "Goal";

/// Position name of the goalkeeper in freeze frames
pub const GOALKEEPER_POSITION: &str = "Goalkeeper";

/// Substring that marks a defensive position in freeze frames
pub const DEFENSIVE_MARKER: &str = "Defensive";

// Engineered column names
pub const GOAL: &str = "goal";
pub const DISTANCE: &str = "distance";
pub const ANGLE: &str = "angle";
pub const OPPONENTS_IN_SPACE: &str = "opponents_in_space";
pub const DEFENDERS_IN_SPACE: &str = "defenders_in_space";
pub const KEEPER_DISTANCE: &str = "keeper_distance";
pub const XG: &str = "xg";

/// Predictors of the xG model, in coefficient order
pub const PREDICTORS: [&str; 5] = [
    DISTANCE,
    ANGLE,
    OPPONENTS_IN_SPACE,
    DEFENDERS_IN_SPACE,
    KEEPER_DISTANCE,
];

/// Column names of the shot-level table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShotColumns {
    pub id: String,
    pub match_id: String,
    pub team: String,
    pub x: String,
    pub y: String,
    /// Packed "[x, y]" column used when `x`/`y` are absent
    pub location: String,
    pub outcome: String,
    pub reference_xg: String,
}

impl Default for ShotColumns {
    fn default() -> Self {
        Self {
            id: "id".to_string(),
            match_id: "match_id".to_string(),
            team: "team_name".to_string(),
            x: "location_x".to_string(),
            y: "location_y".to_string(),
            location: "location".to_string(),
            outcome: "shot_outcome_name".to_string(),
            reference_xg: "shot_statsbomb_xg".to_string(),
        }
    }
}

/// Column names of the freeze-frame table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FreezeFrameColumns {
    pub shot_id: String,
    pub x: String,
    pub y: String,
    pub location: String,
    pub teammate: String,
    pub position: String,
}

impl Default for FreezeFrameColumns {
    fn default() -> Self {
        Self {
            shot_id: "id".to_string(),
            x: "location_x".to_string(),
            y: "location_y".to_string(),
            location: "location".to_string(),
            teammate: "teammate".to_string(),
            position: "position_name".to_string(),
        }
    }
}

/// Full column mapping for both input tables
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ColumnMap {
    pub shots: ShotColumns,
    pub freeze_frames: FreezeFrameColumns,
}

impl ColumnMap {
    /// Load a column map from a JSON file. Missing keys keep their defaults.
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read column map: {}", path.display()))?;
        serde_json::from_str(&raw)
            .with_context(|| format!("Failed to parse column map: {}", path.display()))
    }
}
