//! Hashing stream over the locked `.twig/index` file
//!
//! Every byte of the header and the staged entries passes through the SHA-1
//! digest; the digest itself is the trailer of the file.

use crate::artifacts::index::CHECKSUM_SIZE;
use anyhow::Context;
use byteorder::{ByteOrder, NetworkEndian};
use bytes::Bytes;
use file_guard::FileGuard;
use sha1::{Digest, Sha1};
use std::fs::File;
use std::io::{Read, Write};
use std::ops::DerefMut;

pub struct Checksum<'f> {
    file: FileGuard<&'f mut File>,
    digest: Sha1,
}

impl<'f> Checksum<'f> {
    pub(crate) fn new(file: FileGuard<&'f mut File>) -> Self {
        Checksum {
            file,
            digest: Sha1::new(),
        }
    }

    pub(crate) fn read(&mut self, size: usize) -> anyhow::Result<Bytes> {
        let mut buffer = vec![0; size];
        self.file
            .deref_mut()
            .read_exact(&mut buffer)
            .context("Staging index is truncated")?;

        self.digest.update(&buffer);
        Ok(Bytes::from(buffer))
    }

    pub(crate) fn read_u16(&mut self) -> anyhow::Result<u16> {
        let bytes = self.read(2)?;
        Ok(NetworkEndian::read_u16(&bytes))
    }

    pub(crate) fn write(&mut self, data: &[u8]) -> anyhow::Result<()> {
        self.file
            .deref_mut()
            .write_all(data)
            .context("Failed to write the staging index")?;
        self.digest.update(data);

        Ok(())
    }

    /// Append the digest of everything written so far
    pub(crate) fn finish(mut self) -> anyhow::Result<()> {
        let trailer = self.digest.finalize_reset();
        self.file
            .deref_mut()
            .write_all(&trailer)
            .context("Failed to write the staging index checksum")
    }

    /// Compare the stored trailer with the digest of everything read so far
    pub(crate) fn verify(mut self) -> anyhow::Result<()> {
        let mut stored = [0u8; CHECKSUM_SIZE];
        self.file
            .deref_mut()
            .read_exact(&mut stored)
            .context("Staging index has no checksum")?;

        if self.digest.finalize_reset().as_slice() != stored.as_slice() {
            anyhow::bail!("Staging index is corrupt: checksum mismatch");
        }

        Ok(())
    }
}
