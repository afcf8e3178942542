//! Small stateless helpers shared by services built on this crate.

pub mod casing;
pub mod jitter;

pub use casing::{to_lower_snake_case, to_upper_snake_case};
pub use jitter::{apply_jitter, jitter_duration};
