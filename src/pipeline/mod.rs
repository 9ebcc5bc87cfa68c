//! Pipeline module - load, clean, engineer, explore, model and evaluate

pub mod columns;
pub mod correlation;
pub mod error;
pub mod evaluation;
pub mod features;
pub mod geometry;
pub mod loader;
pub mod missing;
pub mod model;
pub mod split;
pub mod target;

pub use columns::*;
pub use correlation::*;
pub use error::*;
pub use evaluation::*;
pub use features::*;
pub use geometry::*;
pub use loader::*;
pub use missing::*;
pub use model::*;
pub use split::*;
pub use target::*;
