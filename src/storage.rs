//! Local video storage: download, relay hand-off, guaranteed cleanup
//!
//! Downloaded videos are transient. Each one lives in the dedicated storage
//! directory under a collision-free name for the duration of a single
//! generation run and is deleted when the run terminates, whatever the
//! outcome. [`DownloadedAsset`] owns the file: its `Drop` is the backstop
//! deleter for exit paths that skip the explicit cleanup step.

use crate::config::{RelayConfig, StorageConfig};
use crate::error::{Error, Result};
use crate::relay::FileRelay;
use futures::StreamExt;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tokio::io::AsyncWriteExt;
use tracing::{debug, info, warn};
use uuid::Uuid;

/// Connect budget for one download request
const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Read budget for one download; assets are large but bounded
const READ_TIMEOUT: Duration = Duration::from_secs(300);

/// A downloaded video, alive between download and terminal cleanup
///
/// Owns the local file. Prefer [`VideoStore::cleanup`] at run end; dropping
/// an undefused asset deletes the file best-effort as a safety net.
#[derive(Debug)]
pub struct DownloadedAsset {
    local_path: PathBuf,
    source_url: String,
    released: bool,
}

impl DownloadedAsset {
    /// Local path of the downloaded file
    pub fn path(&self) -> &Path {
        &self.local_path
    }
}

impl Drop for DownloadedAsset {
    fn drop(&mut self) {
        if self.released {
            return;
        }
        match std::fs::remove_file(&self.local_path) {
            Ok(()) => debug!(path = %self.local_path.display(), "removed leftover video file"),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => {
                warn!(path = %self.local_path.display(), error = %e, "failed to remove leftover video file");
            }
        }
    }
}

/// Storage service for transient downloaded videos
pub struct VideoStore {
    dir: PathBuf,
    prefix: String,
    relay_config: RelayConfig,
    relay: Arc<dyn FileRelay>,
    http: reqwest::Client,
}

impl VideoStore {
    /// Create the store, its storage directory, and its download client
    pub async fn new(
        storage: &StorageConfig,
        relay_config: RelayConfig,
        relay: Arc<dyn FileRelay>,
    ) -> Result<Self> {
        tokio::fs::create_dir_all(&storage.storage_dir)
            .await
            .map_err(|e| {
                Error::Io(std::io::Error::new(
                    e.kind(),
                    format!(
                        "Failed to create storage directory '{}': {}",
                        storage.storage_dir.display(),
                        e
                    ),
                ))
            })?;

        let http = reqwest::Client::builder()
            .connect_timeout(CONNECT_TIMEOUT)
            .read_timeout(READ_TIMEOUT)
            .build()?;

        Ok(Self {
            dir: storage.storage_dir.clone(),
            prefix: storage.file_prefix.clone(),
            relay_config,
            relay,
            http,
        })
    }

    /// Directory downloaded videos are written to
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Stream a remote video into a freshly named local file
    ///
    /// Any transport or filesystem error removes the partial file before the
    /// error is returned; no partial file is ever left referenced.
    pub async fn download(&self, url: &str) -> Result<DownloadedAsset> {
        let filename = format!(
            "{}_{}_{}.mp4",
            self.prefix,
            chrono::Utc::now().format("%Y%m%d_%H%M%S"),
            &Uuid::new_v4().simple().to_string()[..8]
        );
        let path = self.dir.join(filename);

        let response = self
            .http
            .get(url)
            .send()
            .await
            .map_err(|e| Error::Download(format!("request failed: {e}")))?;
        let status = response.status();
        if !status.is_success() {
            return Err(Error::Download(format!("server returned status {status}")));
        }

        let mut file = tokio::fs::File::create(&path)
            .await
            .map_err(|e| Error::Download(format!("could not create local file: {e}")))?;

        let mut stream = response.bytes_stream();
        while let Some(chunk) = stream.next().await {
            let write_result = match chunk {
                Ok(bytes) => file.write_all(&bytes).await.map_err(|e| e.to_string()),
                Err(e) => Err(e.to_string()),
            };
            if let Err(e) = write_result {
                drop(file);
                remove_quietly(&path).await;
                return Err(Error::Download(format!("transfer interrupted: {e}")));
            }
        }

        if let Err(e) = file.flush().await {
            drop(file);
            remove_quietly(&path).await;
            return Err(Error::Download(format!("could not finish local file: {e}")));
        }

        info!(path = %path.display(), url = %url, "video saved locally");
        Ok(DownloadedAsset {
            local_path: path,
            source_url: url.to_string(),
            released: false,
        })
    }

    /// Resolve the path the delivery collaborator should be handed
    ///
    /// When the relay is configured, the local path is forwarded and the
    /// relay's identifier used in its place — unless that identifier is a
    /// remote URL. Delivery in this pipeline is filesystem-based, so a URL
    /// is discarded and the original local path kept; the relay's only job
    /// here is making the file visible to the delivery process. Relay
    /// failures degrade to the original path the same way.
    pub async fn prepare_for_delivery(&self, asset: &DownloadedAsset) -> PathBuf {
        let Some((host, port)) = self.relay_config.endpoint() else {
            return asset.path().to_path_buf();
        };

        match self.relay.forward(asset.path(), host, port).await {
            Ok(identifier)
                if !identifier.is_empty()
                    && !identifier.starts_with("http://")
                    && !identifier.starts_with("https://") =>
            {
                info!(identifier = %identifier, "using relay-returned local identifier");
                PathBuf::from(identifier)
            }
            Ok(identifier) => {
                warn!(
                    identifier = %identifier,
                    "relay returned a URL or empty identifier; keeping the original local path"
                );
                asset.path().to_path_buf()
            }
            Err(e) => {
                warn!(error = %e, "file relay failed; keeping the original local path");
                asset.path().to_path_buf()
            }
        }
    }

    /// Delete the asset's file at run end
    ///
    /// An already-gone file is tolerated silently; any other deletion error
    /// is logged and swallowed. Cleanup must never fail a run.
    pub async fn cleanup(&self, mut asset: DownloadedAsset) {
        asset.released = true;
        match tokio::fs::remove_file(&asset.local_path).await {
            Ok(()) => {
                debug!(path = %asset.local_path.display(), url = %asset.source_url, "removed local video file");
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => {
                warn!(path = %asset.local_path.display(), error = %e, "failed to remove local video file");
            }
        }
    }
}

async fn remove_quietly(path: &Path) {
    if let Err(e) = tokio::fs::remove_file(path).await
        && e.kind() != std::io::ErrorKind::NotFound
    {
        warn!(path = %path.display(), error = %e, "failed to remove partial download");
    }
}
