//! Shot feature engineering
//!
//! Adds geometric features to each shot, joins the freeze frames on the shot
//! identifier, flags opponents standing between the shooter and goal, and
//! aggregates back to one row per shot.

use anyhow::{Context, Result};
use polars::prelude::*;

use super::columns::{
    ColumnMap, FreezeFrameColumns, ShotColumns, ANGLE, DEFENDERS_IN_SPACE, DEFENSIVE_MARKER,
    DISTANCE, GOALKEEPER_POSITION, KEEPER_DISTANCE, OPPONENTS_IN_SPACE,
};
use super::error::FeatureError;
use super::geometry::{distance_to_goal, shot_angle};
use super::loader::require_columns;

// Freeze-frame columns after preparation. The prefix keeps them apart from
// shot columns once joined.
const FF_SHOT_ID: &str = "ff_shot_id";
const FF_DISTANCE: &str = "ff_distance";
const FF_TEAMMATE: &str = "ff_teammate";
const FF_DEFENSIVE: &str = "ff_defensive";
const FF_GOALKEEPER: &str = "ff_goalkeeper";

// Row-level flags computed on the joined table
const IN_SPACE: &str = "in_space";
const DEFENDER_IN_SPACE: &str = "defender_in_space";
const IS_KEEPER: &str = "is_keeper";
const KEEPER_ROWS: &str = "keeper_rows";
const SHOT_ROW: &str = "shot_row";
const FF_ROW: &str = "ff_row";

/// How to resolve shots whose freeze frame does not hold exactly one opposing goalkeeper
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum GoalkeeperPolicy {
    /// First goalkeeper row wins; no goalkeeper means a keeper distance of 0
    #[default]
    First,
    /// Anything but exactly one goalkeeper row is an error
    Strict,
}

impl std::fmt::Display for GoalkeeperPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GoalkeeperPolicy::First => write!(f, "first"),
            GoalkeeperPolicy::Strict => write!(f, "strict"),
        }
    }
}

impl std::str::FromStr for GoalkeeperPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "first" => Ok(GoalkeeperPolicy::First),
            "strict" => Ok(GoalkeeperPolicy::Strict),
            _ => Err(format!(
                "Unknown goalkeeper policy: '{}'. Use 'first' or 'strict'.",
                s
            )),
        }
    }
}

/// Engineered table with one row per shot, plus goalkeeper bookkeeping
#[derive(Debug, Clone)]
pub struct EngineeredShots {
    pub df: DataFrame,
    /// Shots whose freeze frame held no opposing goalkeeper
    pub shots_without_keeper: usize,
    /// Shots whose freeze frame held more than one opposing goalkeeper
    pub shots_with_multiple_keepers: usize,
}

/// Read a column as `f64` values, casting numeric types
pub fn column_as_f64(df: &DataFrame, name: &str) -> Result<Vec<Option<f64>>> {
    let column = df
        .column(name)
        .with_context(|| format!("Column '{}' not found", name))?
        .cast(&DataType::Float64)
        .with_context(|| format!("Column '{}' must be numeric", name))?;
    Ok(column.f64()?.iter().collect())
}

/// Read a column as booleans.
///
/// Text columns accept "true"/"1" (any case); numeric columns are true when non-zero.
/// Nulls read as false.
pub fn column_as_bool(df: &DataFrame, name: &str) -> Result<Vec<bool>> {
    let column = df
        .column(name)
        .with_context(|| format!("Column '{}' not found", name))?;

    let values = match column.dtype() {
        DataType::Boolean => column.bool()?.iter().map(|v| v.unwrap_or(false)).collect(),
        DataType::String => column
            .str()?
            .iter()
            .map(|v| {
                v.map(|s| {
                    let s = s.trim();
                    s.eq_ignore_ascii_case("true") || s == "1"
                })
                .unwrap_or(false)
            })
            .collect(),
        dtype if dtype.is_primitive_numeric() => column
            .cast(&DataType::Float64)?
            .f64()?
            .iter()
            .map(|v| v.map(|x| x != 0.0).unwrap_or(false))
            .collect(),
        other => anyhow::bail!("Column '{}' has type {} and cannot be read as a flag", name, other),
    };

    Ok(values)
}

/// Add `distance` and `angle` columns computed from the shot location
pub fn add_shot_geometry(mut df: DataFrame, columns: &ShotColumns) -> Result<DataFrame> {
    let xs = column_as_f64(&df, &columns.x)?;
    let ys = column_as_f64(&df, &columns.y)?;

    let (distances, angles): (Vec<Option<f64>>, Vec<Option<f64>>) = xs
        .iter()
        .zip(ys.iter())
        .map(|(x, y)| match (x, y) {
            (Some(x), Some(y)) => (Some(distance_to_goal(*x, *y)), Some(shot_angle(*x, *y))),
            _ => (None, None),
        })
        .unzip();

    df.with_column(Column::new(DISTANCE.into(), distances))?;
    df.with_column(Column::new(ANGLE.into(), angles))?;
    Ok(df)
}

/// Reduce the freeze-frame table to the per-player columns the join needs.
///
/// `key_dtype` is the dtype of the shot identifier so both join keys match.
fn prepare_freeze_frames(
    ff: &DataFrame,
    columns: &FreezeFrameColumns,
    key_dtype: &DataType,
) -> Result<DataFrame> {
    let shot_ids = ff
        .column(&columns.shot_id)?
        .cast(key_dtype)
        .with_context(|| {
            format!(
                "Freeze-frame column '{}' cannot be matched to the shot identifier type {}",
                columns.shot_id, key_dtype
            )
        })?
        .with_name(FF_SHOT_ID.into());

    let xs = column_as_f64(ff, &columns.x)?;
    let ys = column_as_f64(ff, &columns.y)?;
    let distances: Vec<Option<f64>> = xs
        .iter()
        .zip(ys.iter())
        .map(|(x, y)| match (x, y) {
            (Some(x), Some(y)) => Some(distance_to_goal(*x, *y)),
            _ => None,
        })
        .collect();

    let teammates = column_as_bool(ff, &columns.teammate)?;

    let positions = ff.column(&columns.position)?.cast(&DataType::String)?;
    let (defensive, goalkeeper): (Vec<bool>, Vec<bool>) = positions
        .str()?
        .iter()
        .map(|p| match p {
            Some(p) => (p.contains(DEFENSIVE_MARKER), p == GOALKEEPER_POSITION),
            None => (false, false),
        })
        .unzip();

    let prepared = DataFrame::new(vec![
        shot_ids,
        Column::new(FF_DISTANCE.into(), distances),
        Column::new(FF_TEAMMATE.into(), teammates),
        Column::new(FF_DEFENSIVE.into(), defensive),
        Column::new(FF_GOALKEEPER.into(), goalkeeper),
    ])?;

    Ok(prepared)
}

/// Join shots with freeze frames and aggregate to one engineered row per shot.
///
/// Every shot column is carried through. The result adds `distance`, `angle`,
/// `opponents_in_space`, `defenders_in_space` and `keeper_distance`. Shots
/// without any freeze-frame row are dropped by the inner join.
pub fn engineer_features(
    shots: &DataFrame,
    freeze_frames: &DataFrame,
    columns: &ColumnMap,
    policy: GoalkeeperPolicy,
) -> Result<EngineeredShots> {
    let shot_cols = &columns.shots;
    let ff_cols = &columns.freeze_frames;

    require_columns(shots, &[&shot_cols.id, &shot_cols.x, &shot_cols.y], "shots")?;
    require_columns(
        freeze_frames,
        &[
            &ff_cols.shot_id,
            &ff_cols.x,
            &ff_cols.y,
            &ff_cols.teammate,
            &ff_cols.position,
        ],
        "freeze-frame",
    )?;

    let shots = add_shot_geometry(shots.clone(), shot_cols)?;
    let key_dtype = shots.column(&shot_cols.id)?.dtype().clone();
    let ff = prepare_freeze_frames(freeze_frames, ff_cols, &key_dtype)?;

    // Every shot-level column survives the group-by unchanged
    let mut aggregations: Vec<Expr> = shots
        .get_column_names()
        .iter()
        .filter(|name| name.as_str() != shot_cols.id)
        .map(|name| col(name.as_str()).first())
        .collect();

    aggregations.extend([
        col(IN_SPACE)
            .cast(DataType::Int32)
            .sum()
            .cast(DataType::Int32)
            .alias(OPPONENTS_IN_SPACE),
        col(DEFENDER_IN_SPACE)
            .cast(DataType::Int32)
            .sum()
            .cast(DataType::Int32)
            .alias(DEFENDERS_IN_SPACE),
        col(IS_KEEPER)
            .cast(DataType::Int32)
            .sum()
            .cast(DataType::Int32)
            .alias(KEEPER_ROWS),
        col(FF_DISTANCE)
            .filter(col(IS_KEEPER))
            .first()
            .alias(KEEPER_DISTANCE),
    ]);

    let opponent = col(FF_TEAMMATE).eq(lit(false));

    // The join does not promise row order; "first" means shot order, then
    // freeze-frame order, so both are restored explicitly.
    let aggregated = shots
        .lazy()
        .with_row_index(SHOT_ROW, None)
        .join(
            ff.lazy().with_row_index(FF_ROW, None),
            [col(shot_cols.id.as_str())],
            [col(FF_SHOT_ID)],
            JoinArgs::new(JoinType::Inner),
        )
        .sort([SHOT_ROW, FF_ROW], SortMultipleOptions::default())
        .with_columns([
            col(FF_DISTANCE)
                .lt(col(DISTANCE))
                .and(opponent.clone())
                .fill_null(lit(false))
                .alias(IN_SPACE),
            col(FF_GOALKEEPER).and(opponent).alias(IS_KEEPER),
        ])
        .with_column(col(IN_SPACE).and(col(FF_DEFENSIVE)).alias(DEFENDER_IN_SPACE))
        .group_by_stable([col(shot_cols.id.as_str())])
        .agg(aggregations)
        .collect()
        .context("Failed to join shots with freeze frames")?;

    if aggregated.height() == 0 {
        return Err(FeatureError::EmptyJoin.into());
    }

    resolve_goalkeepers(aggregated, &shot_cols.id, policy)
}

/// Apply the goalkeeper policy and drop the bookkeeping column
fn resolve_goalkeepers(
    df: DataFrame,
    id_column: &str,
    policy: GoalkeeperPolicy,
) -> Result<EngineeredShots> {
    let keeper_rows: Vec<i32> = df
        .column(KEEPER_ROWS)?
        .i32()?
        .iter()
        .map(|v| v.unwrap_or(0))
        .collect();

    let shots_without_keeper = keeper_rows.iter().filter(|&&n| n == 0).count();
    let shots_with_multiple_keepers = keeper_rows.iter().filter(|&&n| n > 1).count();

    if policy == GoalkeeperPolicy::Strict {
        if let Some(idx) = keeper_rows.iter().position(|&n| n != 1) {
            let ids = df.column(id_column)?.cast(&DataType::String)?;
            let shot_id = ids.str()?.get(idx).unwrap_or("<null>").to_string();
            return Err(FeatureError::GoalkeeperCount {
                shot_id,
                count: keeper_rows[idx].max(0) as u32,
            }
            .into());
        }
    }

    // Multiple keepers already resolved to the first by the aggregation
    let df = df
        .lazy()
        .with_column(col(KEEPER_DISTANCE).fill_null(lit(0.0)))
        .drop([KEEPER_ROWS])
        .collect()?;

    Ok(EngineeredShots {
        df,
        shots_without_keeper,
        shots_with_multiple_keepers,
    })
}
