//! The normalization pipeline: transform then normalize.

pub mod extract;
pub mod locate;
mod stage;
mod transform;

pub use stage::{normalize, process};
pub use transform::transform;
