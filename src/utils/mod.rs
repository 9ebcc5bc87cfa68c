//! Terminal output helpers - spinners and styled status lines

pub mod progress;
pub mod styling;

pub use progress::*;
pub use styling::*;
