//! Three-way merge
//!
//! - `presence`: which merge inputs track a path
//! - `plan`: per-path decisions from the split, current and other snapshots
//! - `conflict`: conflict file synthesis

pub mod conflict;
pub mod plan;
pub mod presence;
