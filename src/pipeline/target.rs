//! Goal indicator derivation
//!
//! Maps the shot outcome column to the binary `goal` target used by the model.

use anyhow::{Context, Result};
use polars::prelude::*;

use super::columns::GOAL;

/// Mapping from an outcome value to the binary target
#[derive(Debug, Clone)]
pub struct TargetMapping {
    /// Value that maps to 1 (event)
    pub event_value: String,
}

impl TargetMapping {
    /// Create a new target mapping
    pub fn new(event_value: String) -> Self {
        Self { event_value }
    }
}

/// Create a binary target mask: 1 where the value equals the event value, else 0.
///
/// Nulls and every other value map to 0.
pub fn create_target_mask(df: &DataFrame, target: &str, mapping: &TargetMapping) -> Result<Vec<i32>> {
    let target_col = df
        .column(target)
        .with_context(|| format!("Outcome column '{}' not found", target))?;

    let as_text = target_col
        .cast(&DataType::String)
        .with_context(|| format!("Outcome column '{}' cannot be read as text", target))?;

    let mask = as_text
        .str()?
        .iter()
        .map(|v| match v {
            Some(s) if s == mapping.event_value => 1,
            _ => 0,
        })
        .collect();

    Ok(mask)
}

/// Add the `goal` indicator column derived from `outcome_column`.
pub fn add_goal_indicator(
    mut df: DataFrame,
    outcome_column: &str,
    mapping: &TargetMapping,
) -> Result<DataFrame> {
    let mask = create_target_mask(&df, outcome_column, mapping)?;
    df.with_column(Column::new(GOAL.into(), mask))?;
    Ok(df)
}

/// Count goals and non-goals in the `goal` column
pub fn count_goals(df: &DataFrame) -> Result<(usize, usize)> {
    let goal = df
        .column(GOAL)
        .with_context(|| format!("Column '{}' not found - derive the goal indicator first", GOAL))?
        .cast(&DataType::Int32)?;

    let goals = goal.i32()?.iter().filter(|v| *v == Some(1)).count();
    Ok((goals, df.height() - goals))
}
