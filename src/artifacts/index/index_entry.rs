//! Index entry representation
//!
//! Additions are stored as the binary blob id followed by a length-prefixed
//! path. Removals only carry the length-prefixed path.

use crate::artifacts::index::checksum::Checksum;
use crate::artifacts::objects::OBJECT_ID_LENGTH;
use crate::artifacts::objects::object::Packable;
use crate::artifacts::objects::object_id::ObjectId;
use anyhow::Context;
use byteorder::WriteBytesExt;
use bytes::Bytes;
use derive_new::new;
use std::io::Write;
use std::path::{Path, PathBuf};

/// Maximum path length supported in index entries
pub const MAX_PATH_SIZE: usize = u16::MAX as usize;

/// Size of the binary blob id stored for an addition
const OID_SIZE: usize = OBJECT_ID_LENGTH / 2;

/// Size of the path length prefix
const PATH_LENGTH_SIZE: usize = 2;

/// A file staged for addition
#[derive(Debug, Clone, PartialEq, Eq, new)]
pub struct IndexEntry {
    /// File path relative to the working tree root
    pub name: PathBuf,
    /// Blob id of the staged content
    pub oid: ObjectId,
}

impl IndexEntry {
    pub(crate) fn read_from(reader: &mut Checksum) -> anyhow::Result<Self> {
        let oid_bytes = reader.read(OID_SIZE)?;
        let oid = ObjectId::read_h40_from(&mut oid_bytes.as_ref())?;
        let name = read_path(reader)?;

        Ok(IndexEntry { name, oid })
    }
}

impl Packable for IndexEntry {
    fn serialize(&self) -> anyhow::Result<Bytes> {
        let mut entry_bytes = Vec::new();
        self.oid.write_h40_to(&mut entry_bytes)?;
        write_path(&mut entry_bytes, &self.name)?;

        Ok(Bytes::from(entry_bytes))
    }
}

/// A file staged for removal
#[derive(Debug, Clone, PartialEq, Eq, new)]
pub struct RemovalEntry {
    pub name: PathBuf,
}

impl RemovalEntry {
    pub(crate) fn read_from(reader: &mut Checksum) -> anyhow::Result<Self> {
        Ok(RemovalEntry {
            name: read_path(reader)?,
        })
    }
}

impl Packable for RemovalEntry {
    fn serialize(&self) -> anyhow::Result<Bytes> {
        let mut entry_bytes = Vec::new();
        write_path(&mut entry_bytes, &self.name)?;

        Ok(Bytes::from(entry_bytes))
    }
}

fn write_path(bytes: &mut Vec<u8>, path: &Path) -> anyhow::Result<()> {
    let path = path
        .to_str()
        .with_context(|| format!("path is not valid UTF-8: {}", path.display()))?;
    if path.len() > MAX_PATH_SIZE {
        anyhow::bail!("path is too long for the index: {path}");
    }

    bytes.write_u16::<byteorder::NetworkEndian>(path.len() as u16)?;
    bytes.write_all(path.as_bytes())?;

    Ok(())
}

fn read_path(reader: &mut Checksum) -> anyhow::Result<PathBuf> {
    let length = reader.read_u16()? as usize;
    let path = reader.read(length)?;
    let path = String::from_utf8(path.to_vec()).context("Invalid path in index entry")?;

    Ok(PathBuf::from(path))
}
