//! Delivery collaborator seam
//!
//! The host messaging platform implements this trait per inbound message;
//! the pipeline uses it for every progress note, result, and the video
//! itself. Videos are always delivered as a local filesystem path content
//! unit — the pipeline never hands the platform a URL-based video
//! reference.

use crate::error::Result;
use async_trait::async_trait;
use std::path::Path;

/// Outbound channel back to the requesting actor
#[async_trait]
pub trait VideoDelivery: Send + Sync {
    /// Send a plain text message
    async fn send_text(&self, text: &str) -> Result<()>;

    /// Send a video from a local filesystem path
    ///
    /// The path must be visible to whatever process performs the actual
    /// transfer; see the relay seam when it is a separate process. May take
    /// a long time for large files — the pipeline bounds its wait and
    /// treats an elapsed wait as a warning, not a failure.
    async fn send_video(&self, path: &Path) -> Result<()>;
}
