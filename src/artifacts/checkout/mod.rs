//! Working-tree sync
//!
//! Switching the working directory between commits and restoring single
//! files. Every check runs before the working tree is touched.

pub mod migration;
