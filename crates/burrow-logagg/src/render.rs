//! Human-readable rendering of one record's value stream.
//!
//! For every sub-entry the renderer emits a header block and the raw
//! content bytes verbatim (the archive stores UTF-8 text as written):
//!
//! ```text
//! \n\nLogType:<name>\nLogLength:<len>\nLog Contents:\n<content>
//! ```
//!
//! Diagnostic frames are reproduced as their message followed by a
//! newline. The renderer stops cleanly when the value stream is
//! exhausted; that is the only normal termination.

use std::io::{self, Read, Write};

use crate::error::{LogAggError, Result};
use crate::frame::{self, Frame};

/// Renders one record's value stream as readable text.
///
/// # Errors
///
/// Returns [`LogAggError::TruncatedRecord`] if the stream ends inside a
/// sub-entry's declared content, [`LogAggError::Corrupt`] for malformed
/// frames, and I/O errors from `out`.
pub fn render_container_log<R: Read, W: Write>(value: &mut R, out: &mut W) -> Result<()> {
    loop {
        match frame::read_frame(value)? {
            None => return Ok(()),
            Some(Frame::Diagnostic(message)) => {
                out.write_all(message.as_bytes())?;
                out.write_all(b"\n")?;
            }
            Some(Frame::SubEntry { name, len }) => {
                write!(out, "\n\nLogType:{name}\nLogLength:{len}\nLog Contents:\n")?;
                let copied = io::copy(&mut value.by_ref().take(len), out)?;
                if copied < len {
                    return Err(LogAggError::TruncatedRecord {
                        expected: len,
                        actual: copied,
                    });
                }
            }
        }
    }
}
