//! Identifier types for applications, containers, and archive records.
//!
//! This module provides:
//! - [`ApplicationId`] — Cluster-wide application identifier
//! - [`ContainerId`] — Identifier of one container of an application
//! - [`ContainerLogKey`] — The record key under which a container's logs
//!   are stored in an archive

use std::fmt;

use serde::{Deserialize, Serialize};

/// Cluster-wide identifier of an application.
///
/// Rendered as `application_<cluster-timestamp>_<sequence>`, which is
/// also the directory name containers log under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ApplicationId {
    cluster_timestamp: u64,
    id: u32,
}

impl ApplicationId {
    /// Creates an application id from the cluster start timestamp and a
    /// per-cluster sequence number.
    #[must_use]
    pub const fn new(cluster_timestamp: u64, id: u32) -> Self {
        Self {
            cluster_timestamp,
            id,
        }
    }

    /// Returns the cluster start timestamp this id is scoped to.
    #[must_use]
    pub const fn cluster_timestamp(&self) -> u64 {
        self.cluster_timestamp
    }

    /// Returns the per-cluster sequence number.
    #[must_use]
    pub const fn id(&self) -> u32 {
        self.id
    }
}

impl fmt::Display for ApplicationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "application_{}_{:04}", self.cluster_timestamp, self.id)
    }
}

/// Identifier of a single container belonging to an application attempt.
///
/// Rendered as
/// `container_<cluster-timestamp>_<app-sequence>_<attempt>_<container-sequence>`,
/// which is also the directory name the container's log files live in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ContainerId {
    app: ApplicationId,
    attempt: u32,
    id: u32,
}

impl ContainerId {
    /// Creates a container id for the given application attempt.
    #[must_use]
    pub const fn new(app: ApplicationId, attempt: u32, id: u32) -> Self {
        Self { app, attempt, id }
    }

    /// Returns the application this container belongs to.
    #[must_use]
    pub const fn application(&self) -> ApplicationId {
        self.app
    }

    /// Returns the application attempt number.
    #[must_use]
    pub const fn attempt(&self) -> u32 {
        self.attempt
    }

    /// Returns the per-attempt container sequence number.
    #[must_use]
    pub const fn id(&self) -> u32 {
        self.id
    }
}

impl fmt::Display for ContainerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "container_{}_{:04}_{:02}_{:06}",
            self.app.cluster_timestamp(),
            self.app.id(),
            self.attempt,
            self.id
        )
    }
}

/// The key under which one container's logs are stored in an archive.
///
/// An opaque wrapper around the container id string. The no-argument
/// [`Default`] form is an empty key used purely as a mutable decode
/// target by `ArchiveReader::next`; it is never valid to append.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ContainerLogKey(String);

impl ContainerLogKey {
    /// Creates the key for a container.
    #[must_use]
    pub fn new(container: &ContainerId) -> Self {
        Self(container.to_string())
    }

    /// Returns the key as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns true if this key has not been filled in yet.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Replaces this key's contents with a decoded value.
    pub(crate) fn fill(&mut self, decoded: String) {
        self.0 = decoded;
    }
}

impl fmt::Display for ContainerLogKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_container() -> ContainerId {
        ContainerId::new(ApplicationId::new(1, 1), 1, 1)
    }

    #[test]
    fn application_id_display_format() {
        let app = ApplicationId::new(1_400_000_000_000, 7);
        assert_eq!(app.to_string(), "application_1400000000000_0007");
    }

    #[test]
    fn container_id_display_format() {
        assert_eq!(sample_container().to_string(), "container_1_0001_01_000001");
    }

    #[test]
    fn container_id_exposes_application() {
        let container = sample_container();
        assert_eq!(container.application().to_string(), "application_1_0001");
        assert_eq!(container.attempt(), 1);
        assert_eq!(container.id(), 1);
    }

    #[test]
    fn log_key_wraps_container_id() {
        let key = ContainerLogKey::new(&sample_container());
        assert_eq!(key.as_str(), "container_1_0001_01_000001");
        assert!(!key.is_empty());
    }

    #[test]
    fn default_log_key_is_empty() {
        let key = ContainerLogKey::default();
        assert!(key.is_empty());
        assert_eq!(key.as_str(), "");
    }

    #[test]
    fn log_key_fill_replaces_contents() {
        let mut key = ContainerLogKey::default();
        key.fill("container_1_0001_01_000002".to_string());
        assert_eq!(key.as_str(), "container_1_0001_01_000002");
    }
}
