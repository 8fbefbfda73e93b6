//! Command implementations.

pub mod completions;
pub mod seed;
pub mod status;
pub mod version;
