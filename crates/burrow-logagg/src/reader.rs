//! Forward-only archive reader.
//!
//! [`ArchiveReader`] walks an existing archive a record at a time.
//! There is no backward seek and no random access; restarting means
//! reopening. Abandoning a record's value stream early is fine — the
//! next call to [`ArchiveReader::next`] skips whatever was left.

use std::fs::File;
use std::io::{self, BufReader, Read};
use std::path::Path;

use crate::error::{LogAggError, Result};
use crate::frame;
use crate::types::ContainerLogKey;

/// Maximum accepted record key length.
const MAX_KEY_LEN: u32 = 4096;

/// Single-pass reader over an aggregated log archive.
pub struct ArchiveReader {
    inner: BufReader<File>,
    /// Bytes of the current record's value not yet consumed.
    value_remaining: u64,
}

impl ArchiveReader {
    /// Opens an existing archive for forward-only reading.
    ///
    /// # Errors
    ///
    /// Returns an I/O error if the archive cannot be opened.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::open(path.as_ref())?;
        Ok(Self {
            inner: BufReader::new(file),
            value_remaining: 0,
        })
    }

    /// Advances to the next record, decoding its key into `key`.
    ///
    /// Returns a bounded reader over the record's value bytes, or
    /// `Ok(None)` once no records remain — end of archive is a normal
    /// outcome, not an error.
    ///
    /// # Errors
    ///
    /// Returns [`LogAggError::Corrupt`] or
    /// [`LogAggError::TruncatedRecord`] if the archive ends inside a
    /// record, and I/O errors from the underlying file.
    pub fn next(&mut self, key: &mut ContainerLogKey) -> Result<Option<ValueReader<'_>>> {
        self.skip_pending_value()?;

        let Some(key_len) = frame::try_read_u32(&mut self.inner)? else {
            return Ok(None);
        };
        if key_len > MAX_KEY_LEN {
            return Err(LogAggError::Corrupt(format!(
                "record key length {key_len} exceeds limit"
            )));
        }

        let mut key_bytes = vec![0u8; key_len as usize];
        self.inner
            .read_exact(&mut key_bytes)
            .map_err(|_| LogAggError::Corrupt("record key cut short".into()))?;
        let decoded = String::from_utf8(key_bytes)
            .map_err(|_| LogAggError::Corrupt("record key is not valid UTF-8".into()))?;

        let value_len = frame::read_u32(&mut self.inner)?;

        key.fill(decoded);
        self.value_remaining = u64::from(value_len);
        Ok(Some(ValueReader { archive: self }))
    }

    /// Discards whatever the caller left unread of the previous value.
    fn skip_pending_value(&mut self) -> Result<()> {
        if self.value_remaining == 0 {
            return Ok(());
        }
        let skipped = io::copy(
            &mut (&mut self.inner).take(self.value_remaining),
            &mut io::sink(),
        )?;
        if skipped < self.value_remaining {
            return Err(LogAggError::TruncatedRecord {
                expected: self.value_remaining,
                actual: skipped,
            });
        }
        self.value_remaining = 0;
        Ok(())
    }
}

/// Bounded reader over one record's value bytes.
///
/// Reads at most the record's declared value length; reaching the end
/// of the value yields a clean zero-byte read. The archive ending
/// before the declared length is satisfied is an `UnexpectedEof` error.
pub struct ValueReader<'a> {
    archive: &'a mut ArchiveReader,
}

impl ValueReader<'_> {
    /// Returns the number of value bytes not yet read.
    #[must_use]
    pub fn remaining(&self) -> u64 {
        self.archive.value_remaining
    }
}

impl Read for ValueReader<'_> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if self.archive.value_remaining == 0 || buf.is_empty() {
            return Ok(0);
        }
        let cap = usize::try_from(self.archive.value_remaining)
            .map_or(buf.len(), |remaining| remaining.min(buf.len()));
        let n = self.archive.inner.read(&mut buf[..cap])?;
        if n == 0 {
            return Err(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                format!(
                    "record value cut short with {} bytes left",
                    self.archive.value_remaining
                ),
            ));
        }
        self.archive.value_remaining -= n as u64;
        Ok(n)
    }
}
