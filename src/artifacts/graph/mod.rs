//! Commit graph traversal
//!
//! - `commit_graph`: ancestor closure, split point search and first-parent history

pub mod commit_graph;
