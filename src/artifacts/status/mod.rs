//! Working tree status inspection
//!
//! Compares the working directory against the staging area and the HEAD
//! commit.
//!
//! ## Components
//!
//! - `file_change`: Unstaged change categories
//! - `status_info`: Status collection

pub mod file_change;
pub mod status_info;
