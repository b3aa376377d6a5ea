//! Collection of one container's log files into a record value.
//!
//! A [`ContainerLogCollector`] walks the configured log roots, verifies
//! the ownership of each file it finds, and streams the survivors as
//! sub-entry frames. Per-file problems never fail the record: an
//! ownership mismatch becomes an in-band diagnostic frame and anything
//! else (vanished file, unreadable file) is skipped with a warning.

use std::fs;
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::error::Result;
use crate::frame;
use crate::secure::{verify_and_open, Verification};
use crate::traits::{OwnerLookup, ValueSource};
use crate::types::ContainerId;

/// Collects a container's log files from an ordered set of log roots.
///
/// For each root, files are taken from `root/<application-id>/<container-id>`
/// and processed in lexicographic base-name order, so the mapping from
/// files to per-file expected owners is stable across platforms and runs.
pub struct ContainerLogCollector<O> {
    roots: Vec<PathBuf>,
    container: ContainerId,
    owner: O,
}

impl<O: OwnerLookup> ContainerLogCollector<O> {
    /// Creates a collector over the given log roots.
    pub fn new<I, P>(roots: I, container: ContainerId, owner: O) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        Self {
            roots: roots.into_iter().map(Into::into).collect(),
            container,
            owner,
        }
    }

    /// Returns the container this collector gathers logs for.
    #[must_use]
    pub const fn container(&self) -> ContainerId {
        self.container
    }

    fn collect_file(&mut self, path: &Path, out: &mut dyn Write) -> Result<()> {
        let expected = self.owner.expected_owner(path);
        // Listed files can vanish or turn unreadable before we get to
        // them; that only costs this file, not the record.
        let verification = match verify_and_open(path, &expected) {
            Ok(verification) => verification,
            Err(err) => {
                warn!(path = %path.display(), error = %err, "skipping log file that could not be opened");
                return Ok(());
            }
        };
        match verification {
            Verification::Granted(mut file) => {
                // Frame lengths are u32; a file past that limit is
                // unrepresentable and costs only itself.
                if file.metadata().is_ok_and(|m| m.len() > u64::from(u32::MAX)) {
                    warn!(path = %path.display(), "log file exceeds the 4 GiB frame limit, skipping");
                    return Ok(());
                }
                let mut content = Vec::new();
                if let Err(err) = file.read_to_end(&mut content) {
                    warn!(path = %path.display(), error = %err, "skipping unreadable log file");
                    return Ok(());
                }
                if u32::try_from(content.len()).is_err() {
                    // Grew past the limit between the check and the read.
                    warn!(path = %path.display(), bytes = content.len(), "log file exceeds the 4 GiB frame limit, skipping");
                    return Ok(());
                }
                let name = base_name(path);
                debug!(path = %path.display(), bytes = content.len(), "aggregating log file");
                frame::write_sub_entry(out, &name, &content)?;
            }
            Verification::Mismatch { actual_owner } => {
                let message = format!(
                    "Owner '{actual_owner}' for path '{}' did not match expected owner '{expected}'",
                    path.display()
                );
                warn!(path = %path.display(), "ownership mismatch, emitting diagnostic");
                frame::write_diagnostic(out, &message)?;
            }
        }
        Ok(())
    }
}

fn base_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}

/// Lists the regular files directly inside `dir`, sorted by base name.
///
/// Symlinks are followed so a symlinked log file counts as a regular
/// file; subdirectories are ignored.
fn list_log_files(dir: &Path) -> io::Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for entry in fs::read_dir(dir)? {
        match entry {
            Ok(entry) => {
                let path = entry.path();
                if path.is_file() {
                    files.push(path);
                }
            }
            Err(err) => {
                warn!(dir = %dir.display(), error = %err, "skipping unlistable directory entry");
            }
        }
    }
    files.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
    Ok(files)
}

impl<O: OwnerLookup> ValueSource for ContainerLogCollector<O> {
    fn write_value(&mut self, out: &mut dyn Write) -> Result<()> {
        let subdir = PathBuf::from(self.container.application().to_string())
            .join(self.container.to_string());

        // Cloned so the loop does not hold a borrow across collect_file.
        let roots = self.roots.clone();
        for root in &roots {
            let dir = root.join(&subdir);
            let files = match list_log_files(&dir) {
                Ok(files) => files,
                Err(err) if err.kind() == io::ErrorKind::NotFound => {
                    debug!(dir = %dir.display(), "no logs under this root, skipping");
                    continue;
                }
                Err(err) => {
                    warn!(dir = %dir.display(), error = %err, "log directory unreadable, skipping");
                    continue;
                }
            };

            for path in files {
                self.collect_file(&path, out)?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frame::{read_frame, Frame};
    use crate::secure::effective_user_name;
    use crate::traits::FixedOwner;
    use crate::types::ApplicationId;
    use std::io::Cursor;

    fn sample_container() -> ContainerId {
        ContainerId::new(ApplicationId::new(1, 1), 1, 1)
    }

    fn container_dir(root: &Path, container: ContainerId) -> PathBuf {
        root.join(container.application().to_string())
            .join(container.to_string())
    }

    fn write_log(dir: &Path, name: &str, content: &[u8]) {
        fs::create_dir_all(dir).expect("create log dir");
        fs::write(dir.join(name), content).expect("write log file");
    }

    fn collect(collector: &mut impl ValueSource) -> Vec<u8> {
        let mut value = Vec::new();
        collector.write_value(&mut value).expect("collect");
        value
    }

    #[test]
    fn collects_files_in_lexicographic_order() {
        let root = tempfile::tempdir().expect("tempdir");
        let dir = container_dir(root.path(), sample_container());
        write_log(&dir, "stdout", b"out");
        write_log(&dir, "gc.log", b"gc");
        write_log(&dir, "stderr", b"err");

        let mut collector = ContainerLogCollector::new(
            [root.path()],
            sample_container(),
            FixedOwner::new(effective_user_name()),
        );
        let value = collect(&mut collector);

        let mut cursor = Cursor::new(value);
        let mut names = Vec::new();
        while let Some(frame) = read_frame(&mut cursor).expect("frame") {
            let Frame::SubEntry { name, len } = frame else {
                panic!("unexpected diagnostic");
            };
            io::copy(&mut (&mut cursor).take(len), &mut io::sink()).expect("skip content");
            names.push(name);
        }
        assert_eq!(names, vec!["gc.log", "stderr", "stdout"]);
    }

    #[test]
    fn missing_container_directory_yields_empty_value() {
        let root = tempfile::tempdir().expect("tempdir");
        let mut collector = ContainerLogCollector::new(
            [root.path()],
            sample_container(),
            FixedOwner::new(effective_user_name()),
        );
        assert!(collect(&mut collector).is_empty());
    }

    #[test]
    fn subdirectories_are_ignored() {
        let root = tempfile::tempdir().expect("tempdir");
        let dir = container_dir(root.path(), sample_container());
        write_log(&dir, "stdout", b"out");
        fs::create_dir_all(dir.join("tmp")).expect("create subdir");

        let mut collector = ContainerLogCollector::new(
            [root.path()],
            sample_container(),
            FixedOwner::new(effective_user_name()),
        );
        let value = collect(&mut collector);

        let mut cursor = Cursor::new(value);
        let frame = read_frame(&mut cursor).expect("frame").expect("some");
        let Frame::SubEntry { name, len } = frame else {
            panic!("unexpected diagnostic");
        };
        assert_eq!(name, "stdout");
        io::copy(&mut (&mut cursor).take(len), &mut io::sink()).expect("skip content");
        assert!(read_frame(&mut cursor).expect("frame").is_none());
    }

    #[test]
    fn files_are_gathered_across_multiple_roots() {
        let root_a = tempfile::tempdir().expect("tempdir");
        let root_b = tempfile::tempdir().expect("tempdir");
        write_log(&container_dir(root_a.path(), sample_container()), "stdout", b"a");
        write_log(&container_dir(root_b.path(), sample_container()), "stderr", b"b");

        let mut collector = ContainerLogCollector::new(
            [root_a.path(), root_b.path()],
            sample_container(),
            FixedOwner::new(effective_user_name()),
        );
        let value = collect(&mut collector);

        let mut cursor = Cursor::new(value);
        let mut names = Vec::new();
        while let Some(frame) = read_frame(&mut cursor).expect("frame") {
            let Frame::SubEntry { name, len } = frame else {
                panic!("unexpected diagnostic");
            };
            io::copy(&mut (&mut cursor).take(len), &mut io::sink()).expect("skip content");
            names.push(name);
        }
        // Root order is preserved; sorting applies within each root.
        assert_eq!(names, vec!["stdout", "stderr"]);
    }

    #[test]
    fn ownership_mismatch_becomes_diagnostic_not_content() {
        let root = tempfile::tempdir().expect("tempdir");
        let dir = container_dir(root.path(), sample_container());
        write_log(&dir, "stdout", b"secret bytes");

        let mut collector = ContainerLogCollector::new(
            [root.path()],
            sample_container(),
            FixedOwner::new("randomUser"),
        );
        let value = collect(&mut collector);

        let mut cursor = Cursor::new(value);
        let frame = read_frame(&mut cursor).expect("frame").expect("some");
        let Frame::Diagnostic(message) = frame else {
            panic!("expected diagnostic");
        };
        assert!(message.contains("did not match expected owner 'randomUser'"));
        assert!(message.contains(&format!("Owner '{}'", effective_user_name())));
        assert!(message.contains("stdout"));
        assert!(read_frame(&mut cursor).expect("frame").is_none());
    }

    #[test]
    fn unreadable_file_is_skipped_without_failing_the_record() {
        use std::os::unix::fs::PermissionsExt;

        if nix::unistd::Uid::effective().is_root() {
            // Root bypasses permission bits; nothing to provoke here.
            return;
        }
        let root = tempfile::tempdir().expect("tempdir");
        let dir = container_dir(root.path(), sample_container());
        write_log(&dir, "locked", b"cannot be opened");
        write_log(&dir, "stdout", b"out");
        fs::set_permissions(dir.join("locked"), fs::Permissions::from_mode(0o000))
            .expect("chmod");

        let mut collector = ContainerLogCollector::new(
            [root.path()],
            sample_container(),
            FixedOwner::new(effective_user_name()),
        );
        let value = collect(&mut collector);

        // "locked" sorts first but contributes nothing, not even a
        // diagnostic; the readable file survives.
        let mut cursor = Cursor::new(value);
        let frame = read_frame(&mut cursor).expect("frame").expect("some");
        let Frame::SubEntry { name, len } = frame else {
            panic!("unexpected diagnostic");
        };
        assert_eq!(name, "stdout");
        io::copy(&mut (&mut cursor).take(len), &mut io::sink()).expect("skip content");
        assert!(read_frame(&mut cursor).expect("frame").is_none());
    }

    #[test]
    fn oversized_file_is_skipped_without_failing_the_record() {
        let root = tempfile::tempdir().expect("tempdir");
        let dir = container_dir(root.path(), sample_container());
        write_log(&dir, "stdout", b"out");
        // Sparse file one byte past the u32 frame limit.
        let huge = fs::File::create(dir.join("core.dump")).expect("create");
        huge.set_len(u64::from(u32::MAX) + 1).expect("extend sparse file");

        let mut collector = ContainerLogCollector::new(
            [root.path()],
            sample_container(),
            FixedOwner::new(effective_user_name()),
        );
        let value = collect(&mut collector);

        // "core.dump" sorts first but is unrepresentable in a frame;
        // the record still carries the normal file.
        let mut cursor = Cursor::new(value);
        let frame = read_frame(&mut cursor).expect("frame").expect("some");
        let Frame::SubEntry { name, len } = frame else {
            panic!("unexpected diagnostic");
        };
        assert_eq!(name, "stdout");
        assert_eq!(len, 3);
        io::copy(&mut (&mut cursor).take(len), &mut io::sink()).expect("skip content");
        assert!(read_frame(&mut cursor).expect("frame").is_none());
    }

    #[test]
    fn expected_owner_is_queried_per_file() {
        let root = tempfile::tempdir().expect("tempdir");
        let dir = container_dir(root.path(), sample_container());
        write_log(&dir, "stderr", b"err");
        write_log(&dir, "stdout", b"out");

        // First file (stderr, lexicographically) is checked against a
        // bogus owner, the second against the real one.
        let me = effective_user_name();
        let mut owners = vec!["randomUser".to_string(), me].into_iter();
        let mut collector = ContainerLogCollector::new(
            [root.path()],
            sample_container(),
            move |_: &Path| owners.next().unwrap_or_default(),
        );
        let value = collect(&mut collector);

        let mut cursor = Cursor::new(value);
        let first = read_frame(&mut cursor).expect("frame").expect("some");
        assert!(matches!(first, Frame::Diagnostic(ref m) if m.contains("stderr")));
        let second = read_frame(&mut cursor).expect("frame").expect("some");
        let Frame::SubEntry { name, len } = second else {
            panic!("expected sub-entry for stdout");
        };
        assert_eq!(name, "stdout");
        assert_eq!(len, 3);
    }
}
