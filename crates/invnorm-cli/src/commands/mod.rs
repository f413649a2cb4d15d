//! CLI subcommands.

pub mod batch;
pub mod mappings;
pub mod normalize;
