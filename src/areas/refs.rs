//! Branch references and HEAD
//!
//! ## File Format
//!
//! - `HEAD` holds `ref: refs/heads/<name>`, naming the current branch
//! - `refs/heads/<name>` holds the 40-character id of the branch tip
//!
//! There is no detached HEAD: exactly one branch is current at any time.

use crate::artifacts::branch::branch_name::BranchName;
use crate::artifacts::objects::object_id::ObjectId;
use crate::errors::TwigError;
use anyhow::Context;
use derive_new::new;
use file_guard::Lock;
use std::io::Write;
use std::ops::DerefMut;
use std::path::Path;
use walkdir::WalkDir;

/// Regex pattern for parsing the content of `HEAD`
const SYMREF_REGEX: &str = r"^ref: (.+)$";

/// Name of the HEAD reference
pub const HEAD_REF_NAME: &str = "HEAD";

/// Branch manager
///
/// Reads and writes `HEAD` and the branch files under `refs/heads`. Ref files
/// are written under an exclusive file lock.
#[derive(Debug, new)]
pub struct Refs {
    /// Path to the repository directory (typically `.twig`)
    path: Box<Path>,
}

impl Refs {
    /// Branch named by `HEAD`
    pub fn current_branch(&self) -> anyhow::Result<BranchName> {
        let head_path = self.head_path();
        let content = std::fs::read_to_string(&head_path)
            .with_context(|| format!("failed to read HEAD at {:?}", head_path))?;

        let symref = regex::Regex::new(SYMREF_REGEX)?;
        let captures = symref
            .captures(content.trim())
            .with_context(|| format!("HEAD is not a branch reference: {:?}", content.trim()))?;

        BranchName::try_parse_ref_path(&captures[1])
    }

    /// Make `name` the current branch
    pub fn set_current_branch(&self, name: &BranchName) -> anyhow::Result<()> {
        if !self.branch_exists(name) {
            return Err(TwigError::NoSuchBranch(name.to_string()).into());
        }

        self.update_ref_file(self.head_path(), format!("ref: {}", name.to_ref_path()))?;
        tracing::info!(branch = %name, "switched current branch");

        Ok(())
    }

    pub fn is_current_branch(&self, name: &BranchName) -> anyhow::Result<bool> {
        Ok(&self.current_branch()? == name)
    }

    /// Commit at the tip of the current branch
    pub fn head(&self) -> anyhow::Result<ObjectId> {
        let current = self.current_branch()?;
        self.read_branch(&current)
    }

    /// Commit at the tip of `name`
    pub fn read_branch(&self, name: &BranchName) -> anyhow::Result<ObjectId> {
        let branch_path = self.branch_path(name);
        if !branch_path.is_file() {
            return Err(TwigError::BranchNotFound(name.to_string()).into());
        }

        self.read_ref_file(&branch_path)
    }

    pub fn branch_exists(&self, name: &BranchName) -> bool {
        self.branch_path(name).is_file()
    }

    /// Point the current branch at `oid`
    pub fn update_head(&self, oid: &ObjectId) -> anyhow::Result<()> {
        let current = self.current_branch()?;
        self.update_branch(&current, oid)
    }

    /// Point `name` at `oid`, creating the branch if needed
    pub fn update_branch(&self, name: &BranchName, oid: &ObjectId) -> anyhow::Result<()> {
        self.update_ref_file(self.branch_path(name), oid.to_string())?;
        tracing::info!(branch = %name, oid = %oid, "moved branch");

        Ok(())
    }

    pub fn create_branch(&self, name: &BranchName, source_oid: &ObjectId) -> anyhow::Result<()> {
        if self.branch_exists(name) {
            return Err(TwigError::BranchExists(name.to_string()).into());
        }

        self.update_branch(name, source_oid)
    }

    pub fn delete_branch(&self, name: &BranchName) -> anyhow::Result<ObjectId> {
        let branch_path = self.branch_path(name);
        let oid = self.read_branch(name)?;

        std::fs::remove_file(&branch_path)
            .with_context(|| format!("failed to delete branch file at {:?}", branch_path))?;
        self.prune_branch_empty_parent_dirs(&branch_path)?;
        tracing::info!(branch = %name, oid = %oid, "deleted branch");

        Ok(oid)
    }

    /// Every branch, sorted by name
    pub fn list_branches(&self) -> anyhow::Result<Vec<BranchName>> {
        let heads_path = self.heads_path();
        let mut branches = Vec::new();

        for entry in WalkDir::new(&heads_path) {
            let entry = entry?;
            if !entry.file_type().is_file() {
                continue;
            }

            let relative_path = entry
                .path()
                .strip_prefix(&heads_path)
                .with_context(|| format!("ref {:?} escapes refs/heads", entry.path()))?;
            let name = relative_path
                .components()
                .map(|component| component.as_os_str().to_string_lossy())
                .collect::<Vec<_>>()
                .join("/");

            match BranchName::try_parse(name) {
                Ok(branch) => branches.push(branch),
                Err(error) => tracing::warn!(path = ?entry.path(), %error, "skipping ref file"),
            }
        }

        branches.sort();
        Ok(branches)
    }

    fn update_ref_file(&self, path: Box<Path>, raw_ref: String) -> anyhow::Result<()> {
        std::fs::create_dir_all(path.parent().with_context(|| {
            format!(
                "failed to create parent directories for ref file at {:?}",
                path
            )
        })?)?;

        let mut ref_file = std::fs::OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .open(&path)
            .with_context(|| format!("failed to open ref file at {:?}", path))?;
        let mut lock = file_guard::lock(&mut ref_file, Lock::Exclusive, 0, 1)?;
        lock.deref_mut().write_all(raw_ref.as_bytes())?;

        Ok(())
    }

    fn read_ref_file(&self, path: &Path) -> anyhow::Result<ObjectId> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read ref file at {:?}", path))?;

        ObjectId::try_parse(content.trim().to_string())
            .with_context(|| format!("ref file at {:?} does not hold a commit id", path))
    }

    fn prune_branch_empty_parent_dirs(&self, path: &Path) -> anyhow::Result<()> {
        if let Some(parent) = path.parent()
            && parent != self.heads_path().as_ref()
            && parent.read_dir()?.next().is_none()
        {
            std::fs::remove_dir(parent).with_context(|| {
                format!("failed to remove empty branch directory at {:?}", parent)
            })?;
            self.prune_branch_empty_parent_dirs(parent)?;
        }

        Ok(())
    }

    fn branch_path(&self, name: &BranchName) -> Box<Path> {
        self.heads_path().join(name.as_ref()).into_boxed_path()
    }

    pub fn head_path(&self) -> Box<Path> {
        self.path.join(HEAD_REF_NAME).into_boxed_path()
    }

    pub fn refs_path(&self) -> Box<Path> {
        self.path.join("refs").into_boxed_path()
    }

    pub fn heads_path(&self) -> Box<Path> {
        self.refs_path().join("heads").into_boxed_path()
    }
}
