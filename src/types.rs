//! Core types for vidpipe

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use uuid::Uuid;

/// Identifier of the actor (user) who issued a command
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ActorId(pub String);

impl ActorId {
    /// Borrow the inner string
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for ActorId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for ActorId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl std::fmt::Display for ActorId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Identifier of the shared context (chat room) a command arrived in
///
/// The unit of rate limiting. Direct messages have no group id.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GroupId(pub String);

impl GroupId {
    /// Borrow the inner string
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for GroupId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for GroupId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl std::fmt::Display for GroupId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Opaque identifier of one generation run
///
/// Fresh per admitted run; the deduplicator releases an actor's slot only
/// when the releasing run presents the matching id.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaskId(Uuid);

impl TaskId {
    /// Generate a fresh task id
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Short form shown to the actor (first 8 hex chars)
    pub fn short(&self) -> String {
        self.0.simple().to_string()[..8].to_string()
    }
}

impl Default for TaskId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for TaskId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Reference image payload attached to a generation request
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImagePayload {
    /// Mime type of the image data (e.g., "image/jpeg")
    pub mime: String,
    /// Raw image bytes
    pub data: Vec<u8>,
}

impl ImagePayload {
    /// Create a payload from raw bytes
    pub fn new(mime: impl Into<String>, data: Vec<u8>) -> Self {
        let mime = mime.into();
        Self {
            mime: if mime.is_empty() {
                "image/jpeg".to_string()
            } else {
                mime
            },
            data,
        }
    }

    /// Render as the `data:` URI the generation API expects
    pub fn to_data_uri(&self) -> String {
        format!("data:{};base64,{}", self.mime, BASE64.encode(&self.data))
    }
}

/// One segment of an inbound platform message
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum MessageSegment {
    /// Plain text
    Text {
        /// The text content
        text: String,
    },
    /// An embedded image
    Image {
        /// The image payload
        image: ImagePayload,
    },
    /// A quoted/replied message and its segments
    Quote {
        /// Segments of the quoted message
        segments: Vec<MessageSegment>,
    },
}

/// Inbound message as handed over by the host messaging platform
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct InboundMessage {
    /// The originating actor
    pub actor_id: ActorId,
    /// Group context, if the message came from a group
    pub group_id: Option<GroupId>,
    /// Message segments in platform order
    pub segments: Vec<MessageSegment>,
}

impl InboundMessage {
    /// First image in the message, scanning quoted segments one level deep
    ///
    /// Platform order decides which image wins when several are present.
    pub fn first_image(&self) -> Option<&ImagePayload> {
        for segment in &self.segments {
            match segment {
                MessageSegment::Image { image } => return Some(image),
                MessageSegment::Quote { segments } => {
                    let quoted = segments.iter().find_map(|s| match s {
                        MessageSegment::Image { image } => Some(image),
                        _ => None,
                    });
                    if let Some(image) = quoted {
                        return Some(image);
                    }
                }
                MessageSegment::Text { .. } => {}
            }
        }
        None
    }
}

/// A fully-formed request handed to one generation run
///
/// Immutable once constructed; owned exclusively by that run.
#[derive(Clone, Debug)]
pub struct GenerationRequest {
    /// The requesting actor
    pub actor_id: ActorId,
    /// Group context, if any
    pub group_id: Option<GroupId>,
    /// Free-text prompt supplied by the actor
    pub prompt: String,
    /// Reference image
    pub image: ImagePayload,
}

/// Event emitted during a generation run
///
/// Published on the pipeline's broadcast channel; consumers subscribe via
/// [`VideoPipeline::subscribe`](crate::VideoPipeline::subscribe).
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Event {
    /// A run passed admission and was spawned
    RunStarted {
        /// Requesting actor
        actor: ActorId,
        /// Run identifier
        task: TaskId,
    },

    /// The API call succeeded and a video URL was extracted
    UrlExtracted {
        /// Run identifier
        task: TaskId,
        /// Resolved video URL
        video_url: String,
    },

    /// The video was saved to local storage
    AssetDownloaded {
        /// Run identifier
        task: TaskId,
        /// Local path of the downloaded file
        path: PathBuf,
    },

    /// The video was handed to the delivery collaborator
    Delivered {
        /// Run identifier
        task: TaskId,
    },

    /// The bounded delivery wait elapsed; the transfer may still complete
    DeliveryTimedOut {
        /// Run identifier
        task: TaskId,
    },

    /// The run failed and the actor was told why
    RunFailed {
        /// Run identifier
        task: TaskId,
        /// User-facing failure text
        error: String,
    },

    /// Terminal cleanup finished (file removed, dedup slot released)
    RunCleaned {
        /// Run identifier
        task: TaskId,
    },
}
