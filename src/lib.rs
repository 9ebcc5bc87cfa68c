//! shotxg: Expected Goals Library
//!
//! Builds an expected-goals model from shot events and their freeze frames:
//! feature engineering, logistic regression, evaluation and plots.

pub mod cli;
pub mod pipeline;
pub mod report;
pub mod utils;
pub mod visualize;
