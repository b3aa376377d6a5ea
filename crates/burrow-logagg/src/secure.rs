//! Race-free file ownership verification.
//!
//! The aggregator runs with elevated privilege on a shared node, so it
//! must not read a file just because a path claims to belong to a user.
//! [`verify_and_open`] opens the file first and then checks the owner
//! of the *open descriptor* (`fstat`), never a separate `stat` followed
//! by an `open`. A path swapped between check and use therefore cannot
//! smuggle another user's file past the check.

use std::fs::File;
use std::os::unix::fs::MetadataExt;
use std::path::Path;

use nix::unistd::{Uid, User};
use tracing::debug;

use crate::error::Result;

/// Outcome of an ownership verification.
///
/// A mismatch is an expected, recoverable business outcome and is
/// therefore an `Ok` variant; errors are reserved for I/O failures.
#[derive(Debug)]
pub enum Verification {
    /// The owner matched; the already-open handle may be read.
    Granted(File),
    /// The owner did not match; no handle is exposed.
    Mismatch {
        /// Account name (or numeric uid) that actually owns the file.
        actual_owner: String,
    },
}

/// Opens `path` and verifies that its actual owner is `expected_owner`.
///
/// The check runs on the open descriptor, so the verified handle in
/// [`Verification::Granted`] is guaranteed to refer to the same
/// filesystem object that was checked.
///
/// # Errors
///
/// Returns an error if the file cannot be opened or `fstat` fails; an
/// ownership mismatch is not an error.
pub fn verify_and_open(path: &Path, expected_owner: &str) -> Result<Verification> {
    let file = File::open(path)?;
    let metadata = file.metadata()?;
    let actual_owner = owner_name(metadata.uid());

    if actual_owner == expected_owner {
        debug!(path = %path.display(), owner = %actual_owner, "ownership verified");
        Ok(Verification::Granted(file))
    } else {
        debug!(
            path = %path.display(),
            actual = %actual_owner,
            expected = %expected_owner,
            "ownership mismatch"
        );
        Ok(Verification::Mismatch { actual_owner })
    }
}

/// Resolves a uid to its account name, falling back to the numeric uid
/// when no passwd entry exists.
#[must_use]
pub fn owner_name(uid: u32) -> String {
    match User::from_uid(Uid::from_raw(uid)) {
        Ok(Some(user)) => user.name,
        _ => uid.to_string(),
    }
}

/// Returns the account name of the effective user of this process.
#[must_use]
pub fn effective_user_name() -> String {
    owner_name(Uid::effective().as_raw())
}
