//! # vidpipe
//!
//! Backend library for chat bots that turn a prompt plus a reference image
//! into a delivered video file, via a remote generation API.
//!
//! ## Design Philosophy
//!
//! vidpipe is designed to be:
//! - **Library-first** - No CLI or UI, purely a Rust crate for embedding
//! - **Host-agnostic** - The messaging platform supplies delivery and relay
//!   collaborators through traits; the core never talks to a chat protocol
//! - **Abuse-resistant** - Admission control (group authorization + per-group
//!   rate limiting) and per-actor deduplication run before any work starts
//! - **Leak-free** - Downloaded files and dedup slots are released exactly
//!   once per run, on every exit path
//!
//! ## Quick Start
//!
//! ```no_run
//! use std::path::Path;
//! use std::sync::Arc;
//! use vidpipe::{
//!     Command, Config, InboundMessage, MessageSegment, ImagePayload,
//!     VideoDelivery, VideoPipeline,
//! };
//!
//! struct ConsoleDelivery;
//!
//! #[async_trait::async_trait]
//! impl VideoDelivery for ConsoleDelivery {
//!     async fn send_text(&self, text: &str) -> vidpipe::Result<()> {
//!         println!("{text}");
//!         Ok(())
//!     }
//!
//!     async fn send_video(&self, path: &Path) -> vidpipe::Result<()> {
//!         println!("video at {}", path.display());
//!         Ok(())
//!     }
//! }
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = Config {
//!         api: vidpipe::ApiConfig {
//!             api_key: "sk-...".to_string(),
//!             ..Default::default()
//!         },
//!         ..Default::default()
//!     };
//!
//!     let pipeline = VideoPipeline::new(config).await?;
//!
//!     // Subscribe to run events
//!     let mut events = pipeline.subscribe();
//!     tokio::spawn(async move {
//!         while let Ok(event) = events.recv().await {
//!             println!("Event: {:?}", event);
//!         }
//!     });
//!
//!     // Hand over an inbound message from the host platform
//!     let message = InboundMessage {
//!         actor_id: "user-1".into(),
//!         group_id: None,
//!         segments: vec![MessageSegment::Image {
//!             image: ImagePayload::new("image/jpeg", vec![/* ... */]),
//!         }],
//!     };
//!     pipeline
//!         .handle_command(
//!             &message,
//!             Command::Generate { prompt: "turn into a dance".to_string() },
//!             Arc::new(ConsoleDelivery),
//!         )
//!         .await?;
//!
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::unwrap_used)]
#![warn(clippy::expect_used)]

/// Admission control (authorization + rate limiting)
pub mod admission;
/// Retrying client for the generation API
pub mod client;
/// Configuration types
pub mod config;
/// Per-actor task deduplication
pub mod dedup;
/// Delivery collaborator seam
pub mod delivery;
/// Error types
pub mod error;
/// Video URL extraction from API responses
pub mod extraction;
/// Generation orchestration pipeline
pub mod pipeline;
/// File relay collaborator seam
pub mod relay;
/// Local video storage and cleanup
pub mod storage;
/// Core types and events
pub mod types;

// Re-export commonly used types
pub use config::{AdmissionConfig, ApiConfig, Config, GroupControlMode, RelayConfig, StorageConfig};
pub use delivery::VideoDelivery;
pub use error::{AdmissionError, Error, ExtractionError, Result};
pub use pipeline::{Command, VideoPipeline};
pub use relay::{FileRelay, NoopRelay};
pub use types::{
    ActorId, Event, GenerationRequest, GroupId, ImagePayload, InboundMessage, MessageSegment,
    TaskId,
};
