//! # burrow-logagg
//!
//! Secure append-only archive format for aggregated container logs.
//!
//! Many short-lived, differently-owned containers on a shared node each
//! leave stdout/stderr and auxiliary log files behind. This crate
//! serializes them into a single sequential archive a job owner can
//! later retrieve and render as readable text:
//!
//! - [`ContainerLogCollector`] — Gathers one container's log files
//!   across the configured log roots
//! - [`verify_and_open`] — Race-free ownership check guarding every
//!   file read, since the aggregator runs with elevated privilege
//! - [`ArchiveWriter`] — Creates the archive under mode `0o640` and
//!   appends `(key, value)` records
//! - [`ArchiveReader`] — Forward-only, single-pass record cursor
//! - [`render_container_log`] — Decodes a record's value stream into
//!   human-readable text
//!
//! ## Example
//!
//! ```rust,no_run
//! use burrow_addressing::Identity;
//! use burrow_logagg::{
//!     render_container_log, ApplicationId, ArchiveReader, ArchiveWriter,
//!     ContainerId, ContainerLogCollector, ContainerLogKey, FixedOwner,
//! };
//!
//! let container = ContainerId::new(ApplicationId::new(1, 1), 1, 1);
//! let identity = Identity::new("aggregator");
//!
//! // Aggregate: one record per container.
//! let mut writer = ArchiveWriter::create("/srv/logs/aggregated.log", &identity)?;
//! let mut collector = ContainerLogCollector::new(
//!     ["/var/log/containers"],
//!     container,
//!     FixedOwner::new("jobowner"),
//! );
//! writer.append(&ContainerLogKey::new(&container), &mut collector)?;
//! writer.close()?;
//!
//! // Retrieve: forward-only, one record at a time.
//! let mut reader = ArchiveReader::open("/srv/logs/aggregated.log")?;
//! let mut key = ContainerLogKey::default();
//! let mut rendered = Vec::new();
//! while let Some(mut value) = reader.next(&mut key)? {
//!     render_container_log(&mut value, &mut rendered)?;
//! }
//! # Ok::<(), burrow_logagg::LogAggError>(())
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod collector;
pub mod error;
pub mod frame;
pub mod reader;
pub mod render;
pub mod secure;
pub mod traits;
pub mod types;
pub mod writer;

// Re-export main types
pub use collector::ContainerLogCollector;
pub use error::{LogAggError, Result};
pub use frame::Frame;
pub use reader::{ArchiveReader, ValueReader};
pub use render::render_container_log;
pub use secure::{effective_user_name, owner_name, verify_and_open, Verification};
pub use traits::{FixedOwner, OwnerLookup, ValueSource};
pub use types::{ApplicationId, ContainerId, ContainerLogKey};
pub use writer::{ArchiveWriter, ARCHIVE_MODE};
