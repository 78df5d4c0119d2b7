//! twig: a small content-addressed version-control engine
//!
//! The crate is split the same way the command layer consumes it:
//!
//! - `areas`: on-disk areas of a repository (object database, index, refs, workspace)
//! - `artifacts`: data structures and algorithms (objects, commit graph, merge planning, ...)
//! - `commands`: porcelain operations implemented on top of [`areas::repository::Repository`]
//! - `errors`: user-facing failure taxonomy
//! - `logging`: tracing subscriber setup for the binary

pub mod areas;
pub mod artifacts;
pub mod commands;
pub mod errors;
pub mod logging;

/// Name of the repository metadata directory inside the working tree
pub const REPOSITORY_DIR: &str = ".twig";
