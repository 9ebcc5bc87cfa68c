//! Report module - terminal tables for the run

pub mod model_report;
pub mod summary;

pub use model_report::*;
pub use summary::*;
