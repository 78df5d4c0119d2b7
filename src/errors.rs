//! User-facing failures
//!
//! Every failure a command can report to the user is a [`TwigError`]. The
//! variants carry the exact message printed by the binary; [`ErrorKind`]
//! groups them for callers that only care about the category.
//!
//! Lower level failures (I/O, decoding) stay as `anyhow::Error` with context
//! and are reported as fatal errors.

use crate::artifacts::objects::object_id::ObjectId;
use std::path::PathBuf;
use thiserror::Error;

/// Category of a [`TwigError`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The request itself is invalid in the current repository state
    Validation,
    /// A commit, branch, object or path could not be found
    NotFound,
    /// An untracked working file would be overwritten
    UntrackedConflict,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TwigError {
    #[error("Not in an initialized twig directory.")]
    NotInitialized,

    #[error("A twig version-control system already exists in the current directory.")]
    AlreadyInitialized,

    #[error("File does not exist.")]
    FileDoesNotExist(PathBuf),

    #[error("No reason to remove the file.")]
    NoReasonToRemove(PathBuf),

    #[error("No changes added to the commit.")]
    NothingToCommit,

    #[error("Please enter a commit message.")]
    EmptyMessage,

    #[error("Invalid path: {0}")]
    InvalidPath(String),

    #[error("A branch with that name already exists.")]
    BranchExists(String),

    #[error("invalid branch name: {0}")]
    InvalidBranchName(String),

    #[error("A branch with that name does not exist.")]
    BranchNotFound(String),

    #[error("No such branch exists.")]
    NoSuchBranch(String),

    #[error("No need to checkout the current branch.")]
    CheckoutCurrentBranch,

    #[error("Cannot remove the current branch.")]
    RemoveCurrentBranch,

    #[error("Cannot merge a branch with itself.")]
    MergeWithSelf,

    #[error("You have uncommitted changes.")]
    UncommittedChanges,

    #[error("Incorrect operands.")]
    IncorrectOperands,

    #[error("No commit with that id exists.")]
    CommitNotFound(String),

    #[error("File does not exist in that commit.")]
    FileNotInCommit(PathBuf),

    #[error("Found no commit with that message.")]
    NoCommitWithMessage,

    #[error("object {0} not found")]
    ObjectNotFound(ObjectId),

    #[error("parent commit {0} is not in the object store")]
    MissingParent(ObjectId),

    #[error("There is an untracked file in the way; delete it, or add and commit it first.")]
    UntrackedConflict(Vec<PathBuf>),
}

impl TwigError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            TwigError::NotInitialized
            | TwigError::AlreadyInitialized
            | TwigError::FileDoesNotExist(_)
            | TwigError::NoReasonToRemove(_)
            | TwigError::NothingToCommit
            | TwigError::EmptyMessage
            | TwigError::InvalidPath(_)
            | TwigError::BranchExists(_)
            | TwigError::InvalidBranchName(_)
            | TwigError::CheckoutCurrentBranch
            | TwigError::RemoveCurrentBranch
            | TwigError::MergeWithSelf
            | TwigError::UncommittedChanges
            | TwigError::IncorrectOperands => ErrorKind::Validation,
            TwigError::BranchNotFound(_)
            | TwigError::NoSuchBranch(_)
            | TwigError::CommitNotFound(_)
            | TwigError::FileNotInCommit(_)
            | TwigError::NoCommitWithMessage
            | TwigError::ObjectNotFound(_)
            | TwigError::MissingParent(_) => ErrorKind::NotFound,
            TwigError::UntrackedConflict(_) => ErrorKind::UntrackedConflict,
        }
    }
}

/// Extract the [`ErrorKind`] of an `anyhow` error, if it wraps a [`TwigError`]
pub fn error_kind(error: &anyhow::Error) -> Option<ErrorKind> {
    error.downcast_ref::<TwigError>().map(TwigError::kind)
}
