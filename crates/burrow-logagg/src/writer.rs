//! Append-only archive writer.
//!
//! One [`ArchiveWriter`] owns one destination archive for the duration
//! of an aggregation run. The file is created under mode `0o640`
//! (owner read-write, group read, nothing for others) before any
//! payload byte is written, and the mode is never relaxed afterwards.

use std::fs::{self, OpenOptions};
use std::io::{BufWriter, Write};
use std::os::unix::fs::{OpenOptionsExt, PermissionsExt};
use std::path::{Path, PathBuf};

use burrow_addressing::Identity;
use tracing::{debug, warn};

use crate::error::{LogAggError, Result};
use crate::frame;
use crate::traits::ValueSource;
use crate::types::ContainerLogKey;

/// Permission mode every aggregated log archive is created with.
pub const ARCHIVE_MODE: u32 = 0o640;

/// Writes `(key, value)` records to a single archive file, append-only.
///
/// Not shareable across concurrent callers; concurrent aggregation runs
/// must target distinct archives.
pub struct ArchiveWriter {
    path: PathBuf,
    out: Option<BufWriter<fs::File>>,
}

impl ArchiveWriter {
    /// Creates the destination archive and any missing parent
    /// directories, writing as the given aggregator identity.
    ///
    /// The file is opened with mode `0o640` and additionally `fchmod`ed
    /// to that exact mode on the open handle, so the final permissions
    /// do not depend on the process umask and are fixed before any data
    /// is flushed.
    ///
    /// # Errors
    ///
    /// Returns [`LogAggError::Creation`] if the file cannot be created
    /// or opened for writing, and [`LogAggError::Permissions`] if the
    /// mode cannot be applied.
    pub fn create<P: AsRef<Path>>(path: P, identity: &Identity) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|source| LogAggError::Creation {
                path: path.clone(),
                source,
            })?;
        }

        let file = OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .mode(ARCHIVE_MODE)
            .open(&path)
            .map_err(|source| LogAggError::Creation {
                path: path.clone(),
                source,
            })?;

        // The umask may have stripped bits at creation; fchmod the open
        // handle to the exact mode before anything is written.
        file.set_permissions(fs::Permissions::from_mode(ARCHIVE_MODE))
            .map_err(|source| LogAggError::Permissions {
                path: path.clone(),
                source,
            })?;

        debug!(
            path = %path.display(),
            user = identity.short_user_name(),
            "created aggregated log archive"
        );

        Ok(Self {
            path,
            out: Some(BufWriter::new(file)),
        })
    }

    /// Returns the destination path of this archive.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Appends one record: the serialized key, then the value bytes
    /// produced by `source`.
    ///
    /// The value is buffered before anything hits the file, so a record
    /// is either written whole or not at all. Appends with the same key
    /// are not deduplicated; each call adds another record.
    ///
    /// # Errors
    ///
    /// Returns [`LogAggError::WriterClosed`] after [`close`](Self::close),
    /// [`LogAggError::EmptyKey`] for an unfilled key, and I/O errors
    /// from the underlying file.
    pub fn append(&mut self, key: &ContainerLogKey, source: &mut dyn ValueSource) -> Result<()> {
        if self.out.is_none() {
            return Err(LogAggError::WriterClosed);
        }
        if key.is_empty() {
            return Err(LogAggError::EmptyKey);
        }

        let mut value = Vec::new();
        source.write_value(&mut value)?;

        let key_bytes = key.as_str().as_bytes();
        let out = self.out.as_mut().ok_or(LogAggError::WriterClosed)?;
        frame::write_u32(out, frame::checked_len(key_bytes.len(), "record key")?)?;
        out.write_all(key_bytes)?;
        frame::write_u32(out, frame::checked_len(value.len(), "record value")?)?;
        out.write_all(&value)?;

        debug!(key = %key, value_bytes = value.len(), "appended record");
        Ok(())
    }

    /// Flushes and releases the file handle.
    ///
    /// Closing twice is safe and does not disturb previously written
    /// bytes; further appends fail with [`LogAggError::WriterClosed`].
    ///
    /// # Errors
    ///
    /// Returns an I/O error if the final flush fails.
    pub fn close(&mut self) -> Result<()> {
        if let Some(mut out) = self.out.take() {
            out.flush()?;
        }
        Ok(())
    }
}

impl Drop for ArchiveWriter {
    fn drop(&mut self) {
        if let Some(mut out) = self.out.take() {
            if let Err(err) = out.flush() {
                warn!(path = %self.path.display(), error = %err, "flush on drop failed");
            }
        }
    }
}
