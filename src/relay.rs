//! File relay collaborator seam
//!
//! Some deployments separate the process that runs the pipeline from the
//! process that performs delivery. A relay makes a downloaded file visible
//! to the delivery side and answers with an identifier for it: either a
//! filesystem path/identifier the delivery primitive understands, or a URL.
//! The pipeline only ever delivers from the local filesystem, so URL
//! identifiers are ignored by the caller (see
//! [`VideoStore::prepare_for_delivery`](crate::storage::VideoStore::prepare_for_delivery)).

use crate::error::Result;
use async_trait::async_trait;
use std::path::Path;

/// External helper that makes a local file visible to the delivery process
#[async_trait]
pub trait FileRelay: Send + Sync {
    /// Forward a local file to the relay at `host:port`
    ///
    /// Returns the identifier the relay assigned: a local filesystem
    /// identifier (used) or a URL (discarded by the caller).
    async fn forward(&self, path: &Path, host: &str, port: u16) -> Result<String>;
}

/// Relay that performs no forwarding and echoes the path back
///
/// The default when host and delivery share a filesystem.
pub struct NoopRelay;

#[async_trait]
impl FileRelay for NoopRelay {
    async fn forward(&self, path: &Path, _host: &str, _port: u16) -> Result<String> {
        Ok(path.display().to_string())
    }
}
