//! Seams between the writer and the things that produce record values.

use std::io::Write;
use std::path::Path;

use crate::error::Result;

/// Produces the value bytes of one archive record.
///
/// `ArchiveWriter::append` drives a `ValueSource` to stream its frames
/// into the record being written. Implementations must declare exact
/// lengths for everything they emit.
pub trait ValueSource {
    /// Streams this source's value bytes into `out`.
    ///
    /// # Errors
    ///
    /// Returns an error only for failures writing to `out`; per-file
    /// problems on the producing side must be absorbed in-band.
    fn write_value(&mut self, out: &mut dyn Write) -> Result<()>;
}

/// Supplies the expected owner for each log file about to be read.
///
/// Queried once per file rather than once per collection pass, so a
/// single pass over a mixed-ownership directory (e.g. symlinked files)
/// can expect a different owner for each file.
pub trait OwnerLookup {
    /// Returns the account name this file is expected to be owned by.
    fn expected_owner(&mut self, path: &Path) -> String;
}

impl<F> OwnerLookup for F
where
    F: FnMut(&Path) -> String,
{
    fn expected_owner(&mut self, path: &Path) -> String {
        self(path)
    }
}

/// An [`OwnerLookup`] that expects the same owner for every file.
#[derive(Debug, Clone)]
pub struct FixedOwner(String);

impl FixedOwner {
    /// Creates a lookup that always expects `owner`.
    #[must_use]
    pub fn new(owner: impl Into<String>) -> Self {
        Self(owner.into())
    }
}

impl OwnerLookup for FixedOwner {
    fn expected_owner(&mut self, _path: &Path) -> String {
        self.0.clone()
    }
}
