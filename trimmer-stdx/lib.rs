//! Small helpers for the host environment shared by the IO-side crates.

pub mod env;
pub mod path;
