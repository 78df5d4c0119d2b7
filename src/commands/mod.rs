//! Command implementations
//!
//! Every user-facing command is an inherent method on
//! [`Repository`](crate::areas::repository::Repository), one file per command
//! group under `porcelain`. Commands validate first, then mutate: no command
//! touches the working tree or the refs before all of its checks passed.

pub mod porcelain;
