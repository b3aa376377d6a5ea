//! # burrow-addressing
//!
//! Coordinator address resolution and token retargeting for Burrow.
//!
//! The log aggregation core talks to a single managing cluster service
//! (the coordinator) over several protocols. This crate is the thin
//! configuration surface the core consumes:
//!
//! - [`ServiceProtocol`] — The protocol a caller wants an endpoint for
//! - [`AddressingConfig`] — Per-protocol socket addresses, loadable from JSON
//! - [`Identity`] — An already-resolved user identity carrying auth tokens
//! - [`resolve_service_address`] — Protocol → address lookup that also
//!   retargets scheduler tokens when the scheduler endpoint is resolved
//!
//! Transport, RPC, and the authentication handshake itself are out of
//! scope; callers receive an address and an identity whose tokens point
//! at the right service, nothing more.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

use std::fmt;
use std::fs;
use std::net::{Ipv4Addr, SocketAddr, SocketAddrV4};
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

/// Default port for the client-facing coordinator protocol.
pub const DEFAULT_CLIENT_PORT: u16 = 8032;
/// Default port for the administrative coordinator protocol.
pub const DEFAULT_ADMIN_PORT: u16 = 8033;
/// Default port for the scheduler coordinator protocol.
pub const DEFAULT_SCHEDULER_PORT: u16 = 8030;

/// Errors raised while loading addressing configuration.
#[derive(Debug, Error)]
pub enum AddressingError {
    /// The configuration file could not be read.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The configuration file is not valid JSON for [`AddressingConfig`].
    #[error("configuration parse error: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Result type alias for addressing operations.
pub type Result<T> = std::result::Result<T, AddressingError>;

/// The coordinator protocols a caller can request an endpoint for.
///
/// Every variant is a supported protocol; requesting an endpoint for an
/// unknown protocol is unrepresentable by construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ServiceProtocol {
    /// Application-facing client protocol (submissions, status, log retrieval).
    Client,
    /// Administrative protocol (node and queue management).
    Admin,
    /// Scheduler protocol used by per-application workers.
    Scheduler,
}

impl ServiceProtocol {
    /// Returns the string representation of this protocol.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Client => "client",
            Self::Admin => "admin",
            Self::Scheduler => "scheduler",
        }
    }
}

impl fmt::Display for ServiceProtocol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Per-protocol coordinator socket addresses.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddressingConfig {
    /// Endpoint for [`ServiceProtocol::Client`].
    #[serde(default = "default_client_address")]
    pub client_address: SocketAddr,
    /// Endpoint for [`ServiceProtocol::Admin`].
    #[serde(default = "default_admin_address")]
    pub admin_address: SocketAddr,
    /// Endpoint for [`ServiceProtocol::Scheduler`].
    #[serde(default = "default_scheduler_address")]
    pub scheduler_address: SocketAddr,
}

fn default_client_address() -> SocketAddr {
    SocketAddr::V4(SocketAddrV4::new(Ipv4Addr::UNSPECIFIED, DEFAULT_CLIENT_PORT))
}

fn default_admin_address() -> SocketAddr {
    SocketAddr::V4(SocketAddrV4::new(Ipv4Addr::UNSPECIFIED, DEFAULT_ADMIN_PORT))
}

fn default_scheduler_address() -> SocketAddr {
    SocketAddr::V4(SocketAddrV4::new(Ipv4Addr::UNSPECIFIED, DEFAULT_SCHEDULER_PORT))
}

impl Default for AddressingConfig {
    fn default() -> Self {
        Self {
            client_address: default_client_address(),
            admin_address: default_admin_address(),
            scheduler_address: default_scheduler_address(),
        }
    }
}

impl AddressingConfig {
    /// Loads the configuration from a JSON file.
    ///
    /// Missing fields fall back to the default endpoints.
    ///
    /// # Errors
    ///
    /// Returns [`AddressingError`] if the file cannot be read or parsed.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let raw = fs::read_to_string(path.as_ref())?;
        let config = serde_json::from_str(&raw)?;
        Ok(config)
    }

    /// Returns the endpoint configured for the given protocol.
    #[must_use]
    pub const fn resolve(&self, protocol: ServiceProtocol) -> SocketAddr {
        match protocol {
            ServiceProtocol::Client => self.client_address,
            ServiceProtocol::Admin => self.admin_address,
            ServiceProtocol::Scheduler => self.scheduler_address,
        }
    }
}

/// The kind of an authentication token held by an [`Identity`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenKind {
    /// Token presented to the scheduler protocol by per-application workers.
    Scheduler,
    /// Delegation token for client-side operations.
    Delegation,
}

/// An already-validated authentication token.
///
/// Tokens are opaque to this crate except for their kind and the
/// service endpoint they are currently bound to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Token {
    kind: TokenKind,
    service: Option<SocketAddr>,
}

impl Token {
    /// Creates a token of the given kind, not yet bound to a service.
    #[must_use]
    pub const fn new(kind: TokenKind) -> Self {
        Self {
            kind,
            service: None,
        }
    }

    /// Returns the token kind.
    #[must_use]
    pub const fn kind(&self) -> TokenKind {
        self.kind
    }

    /// Returns the service endpoint this token is bound to, if any.
    #[must_use]
    pub const fn service(&self) -> Option<SocketAddr> {
        self.service
    }

    /// Rebinds this token to a service endpoint.
    pub fn retarget(&mut self, service: SocketAddr) {
        self.service = Some(service);
    }
}

/// An already-resolved user identity.
///
/// Credential setup happens elsewhere; consumers of this crate receive
/// an identity with its short account name and validated tokens.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    short_user_name: String,
    tokens: Vec<Token>,
}

impl Identity {
    /// Creates an identity for the given short account name.
    #[must_use]
    pub fn new(short_user_name: impl Into<String>) -> Self {
        Self {
            short_user_name: short_user_name.into(),
            tokens: Vec::new(),
        }
    }

    /// Adds a token to this identity.
    #[must_use]
    pub fn with_token(mut self, token: Token) -> Self {
        self.tokens.push(token);
        self
    }

    /// Returns the short account name.
    #[must_use]
    pub fn short_user_name(&self) -> &str {
        &self.short_user_name
    }

    /// Returns the identity's tokens.
    #[must_use]
    pub fn tokens(&self) -> &[Token] {
        &self.tokens
    }

    /// Rebinds every token of the given kind to a service endpoint.
    pub fn retarget_tokens(&mut self, kind: TokenKind, service: SocketAddr) {
        for token in &mut self.tokens {
            if token.kind() == kind {
                debug!(kind = ?kind, service = %service, "retargeting token");
                token.retarget(service);
            }
        }
    }
}

/// Resolves the coordinator endpoint for a protocol.
///
/// When the scheduler endpoint is resolved, every scheduler-kind token
/// held by `identity` is rebound to that endpoint so it can be handed
/// directly to per-application workers.
pub fn resolve_service_address(
    config: &AddressingConfig,
    protocol: ServiceProtocol,
    identity: &mut Identity,
) -> SocketAddr {
    let address = config.resolve(protocol);
    debug!(protocol = %protocol, address = %address, "resolved coordinator endpoint");
    if protocol == ServiceProtocol::Scheduler {
        identity.retarget_tokens(TokenKind::Scheduler, address);
    }
    address
}
