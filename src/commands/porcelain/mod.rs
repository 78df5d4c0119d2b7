//! Porcelain commands
//!
//! ## Commands
//!
//! - `init`: Create the repository layout and the root commit
//! - `add`, `rm`: Stage additions and removals
//! - `commit`: Fold the staging area into a new commit
//! - `log`: `log`, `global-log` and `find`
//! - `status`: Branches, staging area and working tree status
//! - `branch`: `branch` and `rm-branch`
//! - `checkout`: Restore files or switch branches
//! - `reset`: Move the current branch to any commit
//! - `merge`: Three-way merge of another branch into the current one

pub mod add;
pub mod branch;
pub mod checkout;
pub mod commit;
pub mod init;
pub mod log;
pub mod merge;
pub mod reset;
pub mod rm;
pub mod status;
