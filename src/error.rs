//! Error types for vidpipe
//!
//! This module provides error handling for the library, including:
//! - Domain-specific error types (admission, extraction, download, delivery)
//! - A user-facing `Display` message for every failure a run can report
//! - Context information (config key, response snippet, limit/window)

use thiserror::Error;

/// Result type alias for vidpipe operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for vidpipe
///
/// This is the primary error type used throughout the library. Every variant's
/// `Display` output is suitable for surfacing to the requesting actor; the
/// orchestrator reports failures verbatim from here.
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration error with context about which setting is invalid
    #[error("configuration error: {message}")]
    Config {
        /// Human-readable error message describing the configuration issue
        message: String,
        /// The configuration key that caused the error (e.g., "api_key")
        key: Option<String>,
    },

    /// Video generation is switched off in the configuration
    #[error("video generation is currently disabled")]
    Disabled,

    /// Admission denied (authorization or rate limit)
    #[error("{0}")]
    Admission(#[from] AdmissionError),

    /// The inbound message carried no usable image
    #[error("no image found; attach an image or quote a message containing one")]
    NoImage,

    /// The actor already has a generation run in flight
    #[error("a video generation task is already running for you; wait for it to finish")]
    DuplicateInFlight,

    /// Remote API call failed after exhausting the retry policy
    #[error("{0}")]
    Api(String),

    /// The API response contained no recognizable video URL
    #[error("video URL extraction failed: {0}")]
    Extraction(#[from] ExtractionError),

    /// Downloading the generated video failed
    #[error("video download failed: {0}")]
    Download(String),

    /// Delivering the video to the actor failed
    #[error("video delivery failed: {0}")]
    Delivery(String),

    /// File relay collaborator failed
    #[error("file relay error: {0}")]
    Relay(String),

    /// Network error
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Admission failures (authorization and rate limiting)
///
/// Produced before any asynchronous work starts; always user-visible and
/// never retried by the pipeline.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum AdmissionError {
    /// Whitelist mode is active and the group is not on the list
    #[error("this group is not authorized for video generation")]
    GroupNotAllowed,

    /// Blacklist mode is active and the group is on the list
    #[error("video generation is restricted in this group")]
    GroupBlocked,

    /// The group exhausted its fixed-window call budget
    #[error("group call limit reached ({max_calls} calls per {window_secs} seconds), try again later")]
    RateLimited {
        /// Maximum calls allowed inside one window
        max_calls: u32,
        /// Window length in seconds
        window_secs: u64,
    },
}

/// URL extraction failures
///
/// The response was well-formed HTTP but its body did not yield a usable
/// video URL. Diagnostics carry a truncated snippet, never the full payload.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum ExtractionError {
    /// Response body is missing the `choices` array
    #[error("response is missing the choices field")]
    MissingChoices,

    /// First choice is missing its `message` object
    #[error("choices[0] is missing the message field")]
    MissingMessage,

    /// Message content is absent or not a string
    #[error("message content is missing or not a string")]
    InvalidContent,

    /// No strategy produced a candidate that survived resolution and validation
    #[error("no usable video URL in response; content started with: {snippet}")]
    NoUrlFound {
        /// Truncated prefix of the message content, for diagnostics
        snippet: String,
    },
}
