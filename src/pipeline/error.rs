//! Typed errors for feature engineering and model fitting.

use thiserror::Error;

/// Errors raised while shaping shots and freeze frames into model features.
#[derive(Error, Debug)]
pub enum FeatureError {
    #[error("Column '{column}' not found in {table} table. Available columns: {available:?}")]
    MissingColumn {
        table: String,
        column: String,
        available: Vec<String>,
    },

    #[error("Could not parse location '{value}' in column '{column}' (expected \"[x, y]\")")]
    BadLocation { column: String, value: String },

    #[error("Shot '{shot_id}' has {count} goalkeeper row(s) in its freeze frame; expected exactly one")]
    GoalkeeperCount { shot_id: String, count: u32 },

    #[error("No shot matched a freeze frame - the joined table is empty")]
    EmptyJoin,
}

/// Errors raised while fitting or applying the logistic model.
#[derive(Error, Debug)]
pub enum ModelError {
    #[error("Cannot fit a model on an empty dataset")]
    EmptyData,

    #[error("Predictor '{0}' contains non-finite values")]
    NonFinitePredictor(String),

    #[error("Target column '{0}' must contain both goals and non-goals")]
    DegenerateTarget(String),

    #[error("Hessian became singular at iteration {0}")]
    SingularHessian(usize),

    #[error("Expected {expected} predictor values, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },
}
