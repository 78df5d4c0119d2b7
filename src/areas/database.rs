//! Object database
//!
//! Objects are stored zlib-compressed under `.twig/objects/<xx>/<yyyy...>`,
//! keyed by the SHA-1 of their serialized form. Writes go through a temporary
//! file followed by a rename, so a reader never sees a partial object.

use crate::artifacts::objects::blob::Blob;
use crate::artifacts::objects::commit::Commit;
use crate::artifacts::objects::object::{Object, ObjectBox, Unpackable};
use crate::artifacts::objects::object_id::ObjectId;
use crate::artifacts::objects::object_type::ObjectType;
use crate::errors::TwigError;
use anyhow::Context;
use bytes::Bytes;
use fake::rand;
use std::io::{BufRead, Cursor, Read, Write};
use std::path::{Path, PathBuf};

#[derive(Debug)]
pub struct Database {
    path: Box<Path>,
}

impl Database {
    pub fn new(path: Box<Path>) -> Self {
        Database { path }
    }

    pub fn objects_path(&self) -> &Path {
        &self.path
    }

    /// Store `object` and return its id
    ///
    /// Storing an object that is already present is a no-op.
    pub fn store(&self, object: &impl Object) -> anyhow::Result<ObjectId> {
        let object_id = object.object_id()?;
        let object_path = self.path.join(object_id.to_path());

        if !object_path.exists() {
            std::fs::create_dir_all(
                object_path
                    .parent()
                    .context(format!("Invalid object path {}", object_path.display()))?,
            )
            .context(format!(
                "Unable to create object directory {}",
                object_path.display()
            ))?;

            self.write_object(object_path, object.serialize()?)?;
            tracing::trace!(oid = %object_id, kind = %object.object_type(), "stored object");
        }

        Ok(object_id)
    }

    pub fn put_blob(&self, blob: &Blob) -> anyhow::Result<ObjectId> {
        self.store(blob)
    }

    /// Store a commit whose parents must already be in the database
    pub fn put_commit(&self, commit: &Commit) -> anyhow::Result<ObjectId> {
        if let Some(missing) = commit.parents().iter().find(|parent| !self.contains(parent)) {
            return Err(TwigError::MissingParent(missing.clone()).into());
        }

        let oid = self.store(commit)?;
        tracing::debug!(oid = %oid, parents = commit.parents().len(), "stored commit");

        Ok(oid)
    }

    pub fn contains(&self, object_id: &ObjectId) -> bool {
        self.path.join(object_id.to_path()).is_file()
    }

    pub fn parse_object(&self, object_id: &ObjectId) -> anyhow::Result<ObjectBox> {
        let (object_type, object_reader) = self.parse_object_as_bytes(object_id)?;

        match object_type {
            ObjectType::Blob => Ok(ObjectBox::Blob(Box::new(Blob::deserialize(object_reader)?))),
            ObjectType::Commit => Ok(ObjectBox::Commit(Box::new(Commit::deserialize(
                object_reader,
            )?))),
        }
    }

    /// Load a blob, failing with [`TwigError::ObjectNotFound`] when absent
    pub fn load_blob(&self, object_id: &ObjectId) -> anyhow::Result<Blob> {
        if !self.contains(object_id) {
            return Err(TwigError::ObjectNotFound(object_id.clone()).into());
        }

        match self.parse_object(object_id)? {
            ObjectBox::Blob(blob) => Ok(*blob),
            other => anyhow::bail!(
                "object {object_id} is a {}, not a blob",
                other.object_type()
            ),
        }
    }

    /// Load a commit, failing with [`TwigError::CommitNotFound`] when absent
    pub fn load_commit(&self, object_id: &ObjectId) -> anyhow::Result<Commit> {
        if !self.contains(object_id) {
            return Err(TwigError::CommitNotFound(object_id.to_string()).into());
        }

        match self.parse_object(object_id)? {
            ObjectBox::Commit(commit) => Ok(*commit),
            _ => Err(TwigError::CommitNotFound(object_id.to_string()).into()),
        }
    }

    pub fn get_object_type(&self, object_id: &ObjectId) -> anyhow::Result<ObjectType> {
        let (object_type, _) = self.parse_object_as_bytes(object_id)?;
        Ok(object_type)
    }

    /// Ids of every stored commit, sorted
    pub fn list_commits(&self) -> anyhow::Result<Vec<ObjectId>> {
        let mut commits = Vec::new();

        for oid in self.list_objects()? {
            if self.get_object_type(&oid)? == ObjectType::Commit {
                commits.push(oid);
            }
        }

        Ok(commits)
    }

    /// Resolve a full or abbreviated commit id
    ///
    /// When several commits share the prefix the smallest id wins.
    pub fn resolve_commit(&self, prefix: &str) -> anyhow::Result<ObjectId> {
        let not_found = || TwigError::CommitNotFound(prefix.to_string());

        if prefix.is_empty() || !prefix.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(not_found().into());
        }

        let mut candidates = self.find_objects_by_prefix(&prefix.to_ascii_lowercase())?;
        candidates.sort();

        for candidate in candidates {
            if self.get_object_type(&candidate)? == ObjectType::Commit {
                return Ok(candidate);
            }
        }

        Err(not_found().into())
    }

    /// Find all objects whose id starts with the given prefix
    ///
    /// For prefixes of 2+ characters only the matching fan-out directory is
    /// searched.
    pub fn find_objects_by_prefix(&self, prefix: &str) -> anyhow::Result<Vec<ObjectId>> {
        if prefix.len() < 2 {
            return Ok(self
                .list_objects()?
                .into_iter()
                .filter(|oid| oid.starts_with(prefix))
                .collect());
        }

        let mut matches = Vec::new();
        let (dir_name, file_prefix) = prefix.split_at(2);
        let dir_path = self.path.join(dir_name);

        if dir_path.is_dir() {
            for entry in std::fs::read_dir(&dir_path)? {
                let entry = entry?;
                let file_name = entry.file_name();
                let file_name_str = file_name.to_string_lossy();

                if file_name_str.starts_with(file_prefix)
                    && let Ok(oid) = ObjectId::try_parse(format!("{dir_name}{file_name_str}"))
                {
                    matches.push(oid);
                }
            }
        }

        Ok(matches)
    }

    fn list_objects(&self) -> anyhow::Result<Vec<ObjectId>> {
        let mut objects = Vec::new();

        if !self.path.exists() {
            return Ok(objects);
        }

        for entry in walkdir::WalkDir::new(&self.path).min_depth(2).max_depth(2) {
            let entry = entry?;
            if !entry.file_type().is_file() {
                continue;
            }

            let dir_name = entry
                .path()
                .parent()
                .and_then(|parent| parent.file_name())
                .map(|name| name.to_string_lossy().into_owned())
                .unwrap_or_default();
            let file_name = entry.file_name().to_string_lossy();

            // temporary files and stray entries are skipped
            if let Ok(oid) = ObjectId::try_parse(format!("{dir_name}{file_name}")) {
                objects.push(oid);
            }
        }

        objects.sort();
        Ok(objects)
    }

    fn parse_object_as_bytes(
        &self,
        object_id: &ObjectId,
    ) -> anyhow::Result<(ObjectType, impl BufRead)> {
        let object_path = self.path.join(object_id.to_path());
        let object_content = self.read_object(object_path)?;
        let mut object_reader = Cursor::new(object_content);

        let object_type = ObjectType::parse_object_type(&mut object_reader)?;

        Ok((object_type, object_reader))
    }

    fn read_object(&self, object_path: PathBuf) -> anyhow::Result<Bytes> {
        let object_content = std::fs::read(&object_path).context(format!(
            "Unable to read object file {}",
            object_path.display()
        ))?;

        Self::decompress(object_content.into())
    }

    fn write_object(&self, object_path: PathBuf, object_content: Bytes) -> anyhow::Result<()> {
        let object_dir = object_path
            .parent()
            .context(format!("Invalid object path {}", object_path.display()))?;
        let temp_object_path = object_dir.join(Self::generate_temp_name());

        let object_content = Self::compress(object_content)?;

        let mut file = std::fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&temp_object_path)
            .context(format!(
                "Unable to open object file {}",
                temp_object_path.display()
            ))?;

        file.write_all(&object_content).context(format!(
            "Unable to write object file {}",
            temp_object_path.display()
        ))?;

        // rename the temp file to the object file to make it atomic
        std::fs::rename(&temp_object_path, &object_path).context(format!(
            "Unable to rename object file to {}",
            object_path.display()
        ))?;

        Ok(())
    }

    fn compress(data: Bytes) -> anyhow::Result<Bytes> {
        let mut encoder =
            flate2::write::ZlibEncoder::new(Vec::new(), flate2::Compression::default());
        encoder
            .write_all(&data)
            .context("Unable to compress object content")?;

        encoder
            .finish()
            .map(|compressed_content| compressed_content.into())
            .context("Unable to finish compressing object content")
    }

    fn decompress(data: Bytes) -> anyhow::Result<Bytes> {
        let mut decoder = flate2::read::ZlibDecoder::new(&*data);
        let mut decompressed_content = Vec::new();
        decoder
            .read_to_end(&mut decompressed_content)
            .context("Unable to decompress object content")?;

        Ok(decompressed_content.into())
    }

    fn generate_temp_name() -> String {
        format!("tmp-obj-{}", rand::random::<u32>())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::artifacts::objects::commit::Tracking;
    use crate::errors::{ErrorKind, error_kind};
    use assert_fs::TempDir;
    use pretty_assertions::assert_eq;
    use rstest::{fixture, rstest};

    #[fixture]
    fn objects_dir() -> TempDir {
        TempDir::new().expect("Failed to create temp dir")
    }

    fn database(dir: &TempDir) -> Database {
        Database::new(dir.path().join("objects").into_boxed_path())
    }

    fn child_of(parent: &ObjectId, message: &str) -> Commit {
        Commit::new(
            vec![parent.clone()],
            Commit::root().timestamp(),
            message.to_string(),
            Tracking::new(),
        )
    }

    #[rstest]
    fn stored_blob_reads_back(objects_dir: TempDir) -> anyhow::Result<()> {
        let database = database(&objects_dir);
        let blob = Blob::from(&b"some content\n"[..]);

        let oid = database.put_blob(&blob)?;
        let again = database.put_blob(&blob)?;

        assert_eq!(oid, again);
        assert!(database.contains(&oid));
        assert_eq!(database.load_blob(&oid)?, blob);
        assert_eq!(database.get_object_type(&oid)?, ObjectType::Blob);
        Ok(())
    }

    #[rstest]
    fn commit_with_unknown_parent_is_rejected(objects_dir: TempDir) -> anyhow::Result<()> {
        let database = database(&objects_dir);
        let orphan_parent = Commit::root().object_id()?;

        let error = database
            .put_commit(&child_of(&orphan_parent, "orphan"))
            .unwrap_err();

        assert_eq!(error_kind(&error), Some(ErrorKind::NotFound));
        assert!(!database.objects_path().join(orphan_parent.to_path()).exists());
        Ok(())
    }

    #[rstest]
    fn commits_are_listed_and_resolved_by_prefix(objects_dir: TempDir) -> anyhow::Result<()> {
        let database = database(&objects_dir);
        let root = database.put_commit(&Commit::root())?;
        let child = database.put_commit(&child_of(&root, "child"))?;
        database.put_blob(&Blob::from(&b"not a commit"[..]))?;

        let mut expected = vec![root.clone(), child.clone()];
        expected.sort();
        assert_eq!(database.list_commits()?, expected);

        assert_eq!(database.resolve_commit(&child.to_short_oid())?, child);
        assert_eq!(
            database.resolve_commit(&root.as_ref().to_ascii_uppercase())?,
            root
        );
        assert_eq!(database.load_commit(&child)?.message(), "child");
        Ok(())
    }

    #[rstest]
    #[case("")]
    #[case("not-hex")]
    #[case("0000000")]
    fn unknown_prefixes_are_not_found(
        objects_dir: TempDir,
        #[case] prefix: &str,
    ) -> anyhow::Result<()> {
        let database = database(&objects_dir);
        database.put_commit(&Commit::root())?;

        let error = database.resolve_commit(prefix).unwrap_err();
        assert_eq!(error_kind(&error), Some(ErrorKind::NotFound));
        Ok(())
    }

    #[rstest]
    fn blob_id_does_not_resolve_as_commit(objects_dir: TempDir) -> anyhow::Result<()> {
        let database = database(&objects_dir);
        let blob = database.put_blob(&Blob::from(&b"data"[..]))?;

        assert!(database.resolve_commit(blob.as_ref()).is_err());
        assert!(database.load_commit(&blob).is_err());
        Ok(())
    }
}
