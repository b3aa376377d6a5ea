//! Wire format for record values.
//!
//! A record's value is a sequence of frames, each length-prefixed with
//! big-endian `u32` fields so every frame boundary is computable:
//!
//! - Sub-entry frame: `(nameLen > 0, nameBytes, contentLen, contentBytes)`
//!   holding one source log file, named by its base name.
//! - Diagnostic frame: `(0u32, msgLen, msgBytes)` holding one UTF-8
//!   diagnostic line, e.g. an ownership-mismatch report.
//!
//! There is no trailing terminator; the end of a value is implied by
//! its declared byte length at the record level.

use std::io::{self, Read, Write};

use crate::error::{LogAggError, Result};

/// Maximum accepted sub-entry name length, bounding allocation on
/// corrupt input. Log file base names are far below this.
pub(crate) const MAX_NAME_LEN: u32 = 4096;

/// Maximum accepted diagnostic message length.
pub(crate) const MAX_DIAGNOSTIC_LEN: u32 = 64 * 1024;

/// A decoded frame header; sub-entry content is left in the stream for
/// the caller to consume.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Frame {
    /// One source log file: base name and declared content length.
    SubEntry {
        /// Base name of the source file (e.g. `stdout`).
        name: String,
        /// Exact number of content bytes following the header.
        len: u64,
    },
    /// One in-band diagnostic line, fully decoded.
    Diagnostic(String),
}

pub(crate) fn write_u32<W: Write + ?Sized>(out: &mut W, value: u32) -> io::Result<()> {
    out.write_all(&value.to_be_bytes())
}

pub(crate) fn checked_len(len: usize, what: &str) -> io::Result<u32> {
    u32::try_from(len).map_err(|_| {
        io::Error::new(
            io::ErrorKind::InvalidInput,
            format!("{what} exceeds the 4 GiB frame limit"),
        )
    })
}

/// Writes one sub-entry frame for a source file.
///
/// The declared length is `content.len()` exactly, so a reader can
/// always locate the next frame header.
pub(crate) fn write_sub_entry<W: Write + ?Sized>(
    out: &mut W,
    name: &str,
    content: &[u8],
) -> io::Result<()> {
    debug_assert!(!name.is_empty());
    write_u32(out, checked_len(name.len(), "sub-entry name")?)?;
    out.write_all(name.as_bytes())?;
    write_u32(out, checked_len(content.len(), "sub-entry content")?)?;
    out.write_all(content)
}

/// Writes one diagnostic frame.
pub(crate) fn write_diagnostic<W: Write + ?Sized>(out: &mut W, message: &str) -> io::Result<()> {
    write_u32(out, 0)?;
    write_u32(out, checked_len(message.len(), "diagnostic")?)?;
    out.write_all(message.as_bytes())
}

/// Reads a big-endian `u32`, returning `Ok(None)` on clean end of
/// stream and an error if the stream ends inside the field.
pub(crate) fn try_read_u32<R: Read + ?Sized>(reader: &mut R) -> Result<Option<u32>> {
    let mut buf = [0u8; 4];
    let mut filled = 0;
    while filled < buf.len() {
        let n = reader.read(&mut buf[filled..])?;
        if n == 0 {
            if filled == 0 {
                return Ok(None);
            }
            return Err(LogAggError::Corrupt(format!(
                "length field cut short after {filled} bytes"
            )));
        }
        filled += n;
    }
    Ok(Some(u32::from_be_bytes(buf)))
}

/// Reads a big-endian `u32` that must be present.
pub(crate) fn read_u32<R: Read + ?Sized>(reader: &mut R) -> Result<u32> {
    try_read_u32(reader)?.ok_or_else(|| LogAggError::Corrupt("unexpected end of stream".into()))
}

fn read_utf8<R: Read + ?Sized>(reader: &mut R, len: u32, what: &str) -> Result<String> {
    let mut buf = vec![0u8; len as usize];
    reader
        .read_exact(&mut buf)
        .map_err(|_| LogAggError::Corrupt(format!("{what} cut short")))?;
    String::from_utf8(buf).map_err(|_| LogAggError::Corrupt(format!("{what} is not valid UTF-8")))
}

/// Reads the next frame header from a value stream.
///
/// Returns `Ok(None)` when the stream is cleanly exhausted — the only
/// normal termination. Diagnostic frames are decoded in full; for a
/// sub-entry the content bytes remain in the stream.
pub(crate) fn read_frame<R: Read + ?Sized>(reader: &mut R) -> Result<Option<Frame>> {
    let Some(name_len) = try_read_u32(reader)? else {
        return Ok(None);
    };

    if name_len == 0 {
        let msg_len = read_u32(reader)?;
        if msg_len > MAX_DIAGNOSTIC_LEN {
            return Err(LogAggError::Corrupt(format!(
                "diagnostic length {msg_len} exceeds limit"
            )));
        }
        let message = read_utf8(reader, msg_len, "diagnostic")?;
        return Ok(Some(Frame::Diagnostic(message)));
    }

    if name_len > MAX_NAME_LEN {
        return Err(LogAggError::Corrupt(format!(
            "sub-entry name length {name_len} exceeds limit"
        )));
    }
    let name = read_utf8(reader, name_len, "sub-entry name")?;
    let len = u64::from(read_u32(reader)?);
    Ok(Some(Frame::SubEntry { name, len }))
}
