// Retrieval boundary: where raw inventory lists come from.
// The correlation engine never sees this; the collector drives it.

use async_trait::async_trait;
use std::fmt;

use crate::models::{
    ClusterRaw, DatacenterRaw, DatastoreRaw, HostRaw, NetworkRaw, VmRaw,
};

/// Categorised failure kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceErrorKind {
    /// Endpoint address could not be parsed
    Address,
    /// Credentials rejected (401)
    Authentication,
    /// Endpoint unreachable
    Connection,
    /// Non-success HTTP status
    Api(u16),
    Timeout,
    /// Response body or document could not be decoded
    Parse,
    Io,
    Other,
}

impl fmt::Display for SourceErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SourceErrorKind::Address => f.write_str("address"),
            SourceErrorKind::Authentication => f.write_str("authentication"),
            SourceErrorKind::Connection => f.write_str("connection"),
            SourceErrorKind::Api(status) => write!(f, "api {status}"),
            SourceErrorKind::Timeout => f.write_str("timeout"),
            SourceErrorKind::Parse => f.write_str("parse"),
            SourceErrorKind::Io => f.write_str("io"),
            SourceErrorKind::Other => f.write_str("other"),
        }
    }
}

/// Error carrying a kind + human-readable message. Cloneable so one failed
/// cycle can be handed to every caller sharing it.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("[{kind}] {message}")]
pub struct SourceError {
    pub kind: SourceErrorKind,
    pub message: String,
}

impl SourceError {
    pub fn new(kind: SourceErrorKind, msg: impl Into<String>) -> Self {
        Self {
            kind,
            message: msg.into(),
        }
    }

    pub fn address(msg: impl Into<String>) -> Self {
        Self::new(SourceErrorKind::Address, msg)
    }

    pub fn auth(msg: impl Into<String>) -> Self {
        Self::new(SourceErrorKind::Authentication, msg)
    }

    pub fn connection(msg: impl Into<String>) -> Self {
        Self::new(SourceErrorKind::Connection, msg)
    }

    pub fn api(status: u16, msg: impl Into<String>) -> Self {
        Self::new(SourceErrorKind::Api(status), msg)
    }

    pub fn parse(msg: impl Into<String>) -> Self {
        Self::new(SourceErrorKind::Parse, msg)
    }

    pub fn io(msg: impl Into<String>) -> Self {
        Self::new(SourceErrorKind::Io, msg)
    }

    pub fn other(msg: impl Into<String>) -> Self {
        Self::new(SourceErrorKind::Other, msg)
    }
}

impl From<reqwest::Error> for SourceError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            Self::new(SourceErrorKind::Timeout, format!("HTTP timeout: {e}"))
        } else if e.is_connect() {
            Self::connection(format!("Connection failed: {e}"))
        } else if e.is_decode() {
            Self::parse(format!("Response decode failed: {e}"))
        } else {
            Self::other(format!("HTTP error: {e}"))
        }
    }
}

impl From<serde_json::Error> for SourceError {
    fn from(e: serde_json::Error) -> Self {
        Self::parse(format!("JSON parse error: {e}"))
    }
}

impl From<url::ParseError> for SourceError {
    fn from(e: url::ParseError) -> Self {
        Self::address(format!("Invalid endpoint address: {e}"))
    }
}

impl From<std::io::Error> for SourceError {
    fn from(e: std::io::Error) -> Self {
        Self::io(e.to_string())
    }
}

pub type SourceResult<T> = Result<T, SourceError>;

/// Something that can open a retrieval session (one per poll cycle).
#[async_trait]
pub trait InventorySource: Send + Sync {
    async fn connect(&self) -> SourceResult<Box<dyn InventorySession>>;
}

/// One open session. Per-datacenter calls take the datacenter's source-side id.
#[async_trait]
pub trait InventorySession: Send + Sync {
    async fn list_datacenters(&self) -> SourceResult<Vec<DatacenterRaw>>;
    async fn list_datastores(&self, datacenter: &str) -> SourceResult<Vec<DatastoreRaw>>;
    async fn list_clusters(&self, datacenter: &str) -> SourceResult<Vec<ClusterRaw>>;
    async fn list_hosts(&self, datacenter: &str) -> SourceResult<Vec<HostRaw>>;
    async fn list_vms(&self, datacenter: &str) -> SourceResult<Vec<VmRaw>>;
    async fn list_networks(&self, datacenter: &str) -> SourceResult<Vec<NetworkRaw>>;
    /// Best-effort session teardown.
    async fn close(&self);
}
