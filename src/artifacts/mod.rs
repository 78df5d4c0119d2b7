//! Data structures and algorithms
//!
//! - `branch`: Branch names
//! - `checkout`: Working tree migration between two commits
//! - `core`: Shared utilities (pager wrapper)
//! - `graph`: Commit graph traversal and split point search
//! - `index`: Binary codec of the staging area file
//! - `merge`: Merge planning and conflict files
//! - `objects`: Object types (blob, commit) and their ids
//! - `status`: Working tree status inspection

pub mod branch;
pub mod checkout;
pub mod core;
pub mod graph;
pub mod index;
pub mod merge;
pub mod objects;
pub mod status;
