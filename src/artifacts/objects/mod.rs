//! Object types stored in the object database
//!
//! Every object is identified by the SHA-1 of its serialized form. There are
//! two kinds:
//!
//! - **Blob**: raw file content
//! - **Commit**: a full snapshot (path to blob id), its parents, a timestamp and a message
//!
//! Both serialize as `<type> <size>\0<content>`.

pub mod blob;
pub mod commit;
pub mod object;
pub mod object_id;
pub mod object_type;

/// Length of a SHA-1 hash in hexadecimal format
pub const OBJECT_ID_LENGTH: usize = 40;

/// Length of an abbreviated object id as printed by `log`
pub const SHORT_OBJECT_ID_LENGTH: usize = 7;
