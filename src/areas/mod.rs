//! Core repository components
//!
//! - `database`: Object database for blobs and commits
//! - `index`: Staging area (additions, removals and staged copies)
//! - `refs`: Branch references and HEAD
//! - `repository`: Handle tying the other areas together
//! - `workspace`: Working directory file system operations

pub mod database;
pub mod index;
pub mod refs;
pub mod repository;
pub mod workspace;
