//! Output plumbing shared by the history commands

use minus::Pager;
use std::io::{self, Write};

/// `io::Write` sink feeding `log` and `global-log` output into a minus pager
///
/// The pager only accepts `str`, so a multi-byte character split across two
/// writes is held back until its remaining bytes arrive.
pub struct PagerWriter {
    pager: Pager,
    pending: Vec<u8>,
}

impl PagerWriter {
    pub fn new(pager: Pager) -> Self {
        PagerWriter {
            pager,
            pending: Vec::new(),
        }
    }

    fn push_complete_chars(&mut self) -> io::Result<()> {
        let complete = match std::str::from_utf8(&self.pending) {
            Ok(text) => text.len(),
            // a truncated trailing sequence has no error length
            Err(error) if error.error_len().is_none() => error.valid_up_to(),
            Err(error) => return Err(io::Error::new(io::ErrorKind::InvalidData, error)),
        };

        let rest = self.pending.split_off(complete);
        let text = String::from_utf8(std::mem::replace(&mut self.pending, rest))
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;

        self.pager.push_str(text).map_err(io::Error::other)
    }
}

impl Write for PagerWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.pending.extend_from_slice(buf);
        self.push_complete_chars()?;

        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        if self.pending.is_empty() {
            return Ok(());
        }

        let text = String::from_utf8_lossy(&self.pending).into_owned();
        self.pending.clear();
        self.pager.push_str(text).map_err(io::Error::other)
    }
}
