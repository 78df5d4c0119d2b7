//! Staging area (index)
//!
//! The index records what the next commit changes relative to HEAD:
//!
//! - `additions`: path to blob id of content staged for addition
//! - `removals`: paths staged for removal
//!
//! Content staged for addition is copied to the staging directory
//! (`.twig/staging/<blob id>`) and only enters the object database when a
//! commit is made. The index file itself is described in
//! [`crate::artifacts::index`].

use crate::artifacts::index::checksum::Checksum;
use crate::artifacts::index::index_entry::{IndexEntry, RemovalEntry};
use crate::artifacts::index::index_header::IndexHeader;
use crate::artifacts::index::{HEADER_SIZE, SIGNATURE, VERSION};
use crate::artifacts::objects::blob::Blob;
use crate::artifacts::objects::commit::Tracking;
use crate::artifacts::objects::object::{Object, Packable};
use crate::artifacts::objects::object_id::ObjectId;
use anyhow::{Context, anyhow};
use bytes::Bytes;
use std::collections::{BTreeMap, BTreeSet};
use std::ops::DerefMut;
use std::path::{Path, PathBuf};

/// Staging area
#[derive(Debug, Clone)]
pub struct Index {
    /// Path to the index file (typically `.twig/index`)
    path: Box<Path>,
    /// Directory holding staged blob copies (typically `.twig/staging`)
    staging_path: Box<Path>,
    /// Files staged for addition
    additions: BTreeMap<PathBuf, ObjectId>,
    /// Files staged for removal
    removals: BTreeSet<PathBuf>,
    /// Flag indicating if the index has been modified since loading
    changed: bool,
}

impl Index {
    pub fn new(path: Box<Path>, staging_path: Box<Path>) -> Self {
        Index {
            path,
            staging_path,
            additions: BTreeMap::new(),
            removals: BTreeSet::new(),
            changed: false,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn staging_path(&self) -> &Path {
        &self.staging_path
    }

    pub fn additions(&self) -> &BTreeMap<PathBuf, ObjectId> {
        &self.additions
    }

    pub fn removals(&self) -> &BTreeSet<PathBuf> {
        &self.removals
    }

    pub fn staged_oid(&self, path: &Path) -> Option<&ObjectId> {
        self.additions.get(path)
    }

    pub fn is_staged_for_addition(&self, path: &Path) -> bool {
        self.additions.contains_key(path)
    }

    pub fn is_staged_for_removal(&self, path: &Path) -> bool {
        self.removals.contains(path)
    }

    pub fn is_empty(&self) -> bool {
        self.additions.is_empty() && self.removals.is_empty()
    }

    pub fn is_changed(&self) -> bool {
        self.changed
    }

    /// Load the index from disk
    ///
    /// A missing or empty index file means an empty staging area. The
    /// checksum trailer is verified.
    ///
    /// # Locking
    ///
    /// Acquires a shared lock on the index file during reading.
    pub fn rehydrate(&mut self) -> anyhow::Result<()> {
        self.additions.clear();
        self.removals.clear();
        self.changed = false;

        if !self.path.exists() {
            return Ok(());
        }

        let mut index_file = std::fs::OpenOptions::new()
            .read(true)
            .open(&self.path)
            .with_context(|| format!("Unable to open index file {}", self.path.display()))?;
        let mut lock = file_guard::lock(&mut index_file, file_guard::Lock::Shared, 0, 1)?;

        // if the index file is empty, return early
        if lock.deref_mut().metadata()?.len() == 0 {
            return Ok(());
        }

        let mut reader = Checksum::new(lock);
        let header = self.parse_header(&mut reader)?;

        for _ in 0..header.additions_count {
            let entry = IndexEntry::read_from(&mut reader)?;
            self.additions.insert(entry.name, entry.oid);
        }
        for _ in 0..header.removals_count {
            let entry = RemovalEntry::read_from(&mut reader)?;
            self.removals.insert(entry.name);
        }

        reader.verify()
    }

    fn parse_header(&self, reader: &mut Checksum) -> anyhow::Result<IndexHeader> {
        let header_bytes = reader.read(HEADER_SIZE)?;
        let header = IndexHeader::parse(&header_bytes)?;

        if header.marker != SIGNATURE {
            return Err(anyhow!("Invalid index file signature"));
        }

        if header.version != VERSION {
            return Err(anyhow!(
                "Unsupported index file version: {}",
                header.version
            ));
        }

        Ok(header)
    }

    /// Persist the index
    ///
    /// # Locking
    ///
    /// Acquires an exclusive lock on the index file during writing.
    pub fn write_updates(&mut self) -> anyhow::Result<()> {
        let mut index_file = std::fs::OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .open(&self.path)
            .with_context(|| format!("Unable to open index file {}", self.path.display()))?;
        let lock = file_guard::lock(&mut index_file, file_guard::Lock::Exclusive, 0, 1)?;

        let mut writer = Checksum::new(lock);

        let header = IndexHeader::new(
            String::from(SIGNATURE),
            VERSION,
            self.additions.len() as u32,
            self.removals.len() as u32,
        );
        writer.write(&header.serialize()?)?;

        for (name, oid) in &self.additions {
            let entry = IndexEntry::new(name.clone(), oid.clone());
            writer.write(&entry.serialize()?)?;
        }
        for name in &self.removals {
            let entry = RemovalEntry::new(name.clone());
            writer.write(&entry.serialize()?)?;
        }

        writer.finish()?;
        self.changed = false;

        Ok(())
    }

    /// Stage `blob` for addition under `path`
    ///
    /// Writes the staged copy if it is not there yet and drops any pending
    /// removal of the same path.
    pub fn add(&mut self, path: PathBuf, blob: &Blob) -> anyhow::Result<ObjectId> {
        let oid = blob.object_id()?;
        let copy_path = self.staging_path.join(oid.as_ref());

        if !copy_path.exists() {
            std::fs::create_dir_all(&self.staging_path).with_context(|| {
                format!(
                    "Unable to create staging directory {}",
                    self.staging_path.display()
                )
            })?;
            std::fs::write(&copy_path, blob.content())
                .with_context(|| format!("Unable to write staged copy {}", copy_path.display()))?;
        }

        self.removals.remove(&path);
        if let Some(previous) = self.additions.insert(path, oid.clone())
            && previous != oid
        {
            self.discard_copy_if_unused(&previous)?;
        }
        self.changed = true;

        Ok(oid)
    }

    /// Drop a staged addition and its staged copy
    ///
    /// Returns whether `path` was staged.
    pub fn unstage(&mut self, path: &Path) -> anyhow::Result<bool> {
        match self.additions.remove(path) {
            Some(oid) => {
                self.discard_copy_if_unused(&oid)?;
                self.changed = true;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Stage `path` for removal
    pub fn stage_removal(&mut self, path: PathBuf) {
        self.removals.insert(path);
        self.changed = true;
    }

    /// Cancel a pending removal; returns whether there was one
    pub fn cancel_removal(&mut self, path: &Path) -> bool {
        let removed = self.removals.remove(path);
        self.changed |= removed;
        removed
    }

    /// Content of a staged copy
    pub fn staged_blob(&self, oid: &ObjectId) -> anyhow::Result<Blob> {
        let copy_path = self.staging_path.join(oid.as_ref());
        let content = std::fs::read(&copy_path)
            .with_context(|| format!("Unable to read staged copy {}", copy_path.display()))?;

        Ok(Blob::new(Bytes::from(content)))
    }

    /// Fold the staging area over `base`: additions overlaid, removals dropped
    pub fn apply_to(&self, base: &Tracking) -> Tracking {
        let mut tracking = base.clone();
        tracking.extend(
            self.additions
                .iter()
                .map(|(path, oid)| (path.clone(), oid.clone())),
        );
        for path in &self.removals {
            tracking.remove(path);
        }

        tracking
    }

    /// Empty the staging area and delete every staged copy
    pub fn clear(&mut self) -> anyhow::Result<()> {
        self.additions.clear();
        self.removals.clear();
        self.changed = true;

        if self.staging_path.exists() {
            for entry in std::fs::read_dir(&self.staging_path)? {
                let entry = entry?;
                if entry.file_type()?.is_file() {
                    std::fs::remove_file(entry.path()).with_context(|| {
                        format!("Unable to remove staged copy {}", entry.path().display())
                    })?;
                }
            }
        }

        Ok(())
    }

    fn discard_copy_if_unused(&self, oid: &ObjectId) -> anyhow::Result<()> {
        if self.additions.values().any(|staged| staged == oid) {
            return Ok(());
        }

        let copy_path = self.staging_path.join(oid.as_ref());
        if copy_path.exists() {
            std::fs::remove_file(&copy_path)
                .with_context(|| format!("Unable to remove staged copy {}", copy_path.display()))?;
        }

        Ok(())
    }
}
