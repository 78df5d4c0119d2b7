//! Working directory
//!
//! All paths handed to and returned from the workspace are relative to the
//! working-tree root. The repository directory is never listed.

use crate::REPOSITORY_DIR;
use crate::artifacts::objects::blob::Blob;
use crate::errors::TwigError;
use anyhow::Context;
use bytes::Bytes;
use std::path::{Component, Path, PathBuf};
use walkdir::WalkDir;

#[derive(Debug)]
pub struct Workspace {
    path: Box<Path>,
}

impl Workspace {
    pub fn new(path: Box<Path>) -> Self {
        Workspace { path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Normalize a user supplied path to a working-tree relative one
    ///
    /// `.` components are dropped; absolute paths, `..` components and paths
    /// inside the repository directory are rejected.
    pub fn normalize(&self, path: &str) -> anyhow::Result<PathBuf> {
        let mut normalized = PathBuf::new();

        for component in Path::new(path).components() {
            match component {
                Component::Normal(name) => normalized.push(name),
                Component::CurDir => {}
                _ => return Err(TwigError::InvalidPath(path.to_string()).into()),
            }
        }

        if normalized.as_os_str().is_empty() || Self::is_ignored(&normalized) {
            return Err(TwigError::InvalidPath(path.to_string()).into());
        }

        Ok(normalized)
    }

    pub fn file_exists(&self, file_path: &Path) -> bool {
        self.path.join(file_path).is_file()
    }

    pub fn read_file(&self, file_path: &Path) -> anyhow::Result<Bytes> {
        let full_path = self.path.join(file_path);
        let content = std::fs::read(&full_path)
            .with_context(|| format!("Failed to read file: {:?}", file_path))?;

        Ok(Bytes::from(content))
    }

    pub fn parse_blob(&self, file_path: &Path) -> anyhow::Result<Blob> {
        Ok(Blob::new(self.read_file(file_path)?))
    }

    /// Create or overwrite a working file, creating its parent directories
    ///
    /// An empty directory standing at `file_path` is replaced; one with any
    /// content left in it is an error.
    pub fn write_file(&self, file_path: &Path, data: &[u8]) -> anyhow::Result<()> {
        let full_path = self.path.join(file_path);

        if let Some(parent) = full_path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory for: {:?}", file_path))?;
        }
        if full_path.is_dir() {
            std::fs::remove_dir(&full_path).with_context(|| {
                format!("Failed to replace directory with a file: {:?}", file_path)
            })?;
        }

        std::fs::write(&full_path, data)
            .with_context(|| format!("Failed to write to file: {:?}", file_path))
    }

    /// Delete a working file if present and prune directories left empty
    pub fn remove_file(&self, file_path: &Path) -> anyhow::Result<()> {
        let full_path = self.path.join(file_path);

        if full_path.is_file() {
            std::fs::remove_file(&full_path)
                .with_context(|| format!("Failed to remove file: {:?}", file_path))?;
        }

        self.prune_empty_parent_dirs(&full_path)
    }

    /// Every file in the working tree, sorted
    pub fn list_files(&self) -> anyhow::Result<Vec<PathBuf>> {
        self.walk_files(&self.path)
    }

    /// Every file below `dir`, sorted; empty when `dir` is not a directory
    pub fn list_files_under(&self, dir: &Path) -> anyhow::Result<Vec<PathBuf>> {
        let full_path = self.path.join(dir);

        if full_path.is_dir() {
            self.walk_files(&full_path)
        } else {
            Ok(Vec::new())
        }
    }

    fn walk_files(&self, root: &Path) -> anyhow::Result<Vec<PathBuf>> {
        let mut files = Vec::new();

        let walker = WalkDir::new(root)
            .into_iter()
            .filter_entry(|entry| entry.depth() == 0 || entry.file_name() != REPOSITORY_DIR);

        for entry in walker {
            let entry = entry?;
            if !entry.file_type().is_file() {
                continue;
            }

            let relative_path = entry
                .path()
                .strip_prefix(self.path.as_ref())
                .with_context(|| format!("{:?} is outside the working tree", entry.path()))?;
            files.push(relative_path.to_path_buf());
        }

        files.sort();
        Ok(files)
    }

    fn is_ignored(path: &Path) -> bool {
        matches!(
            path.components().next(),
            Some(Component::Normal(name)) if name == REPOSITORY_DIR
        )
    }

    fn prune_empty_parent_dirs(&self, path: &Path) -> anyhow::Result<()> {
        if let Some(parent) = path.parent()
            && parent != self.path.as_ref()
            && parent.starts_with(self.path.as_ref())
            && parent.is_dir()
            && parent.read_dir()?.next().is_none()
        {
            std::fs::remove_dir(parent)
                .with_context(|| format!("Failed to remove empty directory: {:?}", parent))?;
            self.prune_empty_parent_dirs(parent)?;
        }

        Ok(())
    }
}
