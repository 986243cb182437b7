//! Configuration types for vidpipe

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::PathBuf;

/// Remote generation API settings
///
/// Groups settings for the chat-completions endpoint that performs the
/// actual video generation. Used as a nested sub-config within [`Config`].
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Base URL of the generation server (default: "https://api.x.ai")
    #[serde(default = "default_server_url")]
    pub server_url: String,

    /// Model identifier sent in the request body (default: "grok-imagine-0.9")
    #[serde(default = "default_model_id")]
    pub model_id: String,

    /// Bearer token for the Authorization header
    #[serde(default)]
    pub api_key: String,

    /// Master switch for the generation feature (default: true)
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Read budget for one generation request, in seconds (default: 180)
    ///
    /// Connection setup and request transmission get short fixed budgets;
    /// this setting only bounds how long the server may take to produce
    /// the response body.
    #[serde(default = "default_timeout_seconds")]
    pub timeout_seconds: u64,

    /// Maximum API call attempts before giving up (default: 3)
    #[serde(default = "default_max_retry_attempts")]
    pub max_retry_attempts: u32,
}

impl ApiConfig {
    /// Full endpoint URL: configured base plus the fixed completions suffix
    pub fn api_url(&self) -> String {
        format!("{}/v1/chat/completions", self.server_url.trim_end_matches('/'))
    }
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            server_url: default_server_url(),
            model_id: default_model_id(),
            api_key: String::new(),
            enabled: true,
            timeout_seconds: default_timeout_seconds(),
            max_retry_attempts: default_max_retry_attempts(),
        }
    }
}

/// Group access control mode
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GroupControlMode {
    /// No group filtering (default)
    #[default]
    Off,
    /// Only groups on the list may generate
    Whitelist,
    /// Groups on the list may not generate
    Blacklist,
}

/// Admission settings (authorization and rate limiting)
///
/// Authorization is a pure membership test against `group_list`, evaluated
/// before rate limiting. Rate limiting is a per-group fixed window; requests
/// without a group context (direct messages) are never limited.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct AdmissionConfig {
    /// Group access control mode (default: off)
    #[serde(default)]
    pub group_control_mode: GroupControlMode,

    /// Group identifiers the control mode applies to
    #[serde(default)]
    pub group_list: Vec<String>,

    /// Enable per-group rate limiting (default: true)
    #[serde(default = "default_true")]
    pub rate_limit_enabled: bool,

    /// Fixed window length in seconds (default: 3600)
    #[serde(default = "default_rate_limit_window_seconds")]
    pub rate_limit_window_seconds: u64,

    /// Maximum admitted calls per group inside one window (default: 5)
    #[serde(default = "default_rate_limit_max_calls")]
    pub rate_limit_max_calls: u32,

    /// Actors allowed to run the diagnostics command
    #[serde(default)]
    pub authorized_actors: HashSet<String>,
}

impl Default for AdmissionConfig {
    fn default() -> Self {
        Self {
            group_control_mode: GroupControlMode::Off,
            group_list: Vec::new(),
            rate_limit_enabled: true,
            rate_limit_window_seconds: default_rate_limit_window_seconds(),
            rate_limit_max_calls: default_rate_limit_max_calls(),
            authorized_actors: HashSet::new(),
        }
    }
}

/// Local video storage settings
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Directory for transient downloaded videos (default: "./videos")
    ///
    /// Created at startup. Files in it live only for the duration of one
    /// generation run and are always deleted at run end.
    #[serde(default = "default_storage_dir")]
    pub storage_dir: PathBuf,

    /// Filename prefix for downloaded videos (default: "video")
    #[serde(default = "default_file_prefix")]
    pub file_prefix: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            storage_dir: default_storage_dir(),
            file_prefix: default_file_prefix(),
        }
    }
}

/// File relay collaborator settings
///
/// When both host and port are set, downloaded videos are forwarded to the
/// relay before delivery so a separate delivery process can see the file.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct RelayConfig {
    /// Relay host (None = relay disabled)
    #[serde(default)]
    pub relay_host: Option<String>,

    /// Relay port (None = relay disabled)
    #[serde(default)]
    pub relay_port: Option<u16>,
}

impl RelayConfig {
    /// Host and port when the relay is fully configured
    pub fn endpoint(&self) -> Option<(&str, u16)> {
        match (self.relay_host.as_deref(), self.relay_port) {
            (Some(host), Some(port)) if !host.is_empty() => Some((host, port)),
            _ => None,
        }
    }
}

/// Main configuration for [`VideoPipeline`](crate::VideoPipeline)
///
/// Fields are organized into logical sub-configs:
/// - [`api`](ApiConfig) — generation endpoint, model, key, timeouts, retries
/// - [`admission`](AdmissionConfig) — group control, rate limiting, diagnostics access
/// - [`storage`](StorageConfig) — transient video directory and naming
/// - [`relay`](RelayConfig) — optional file relay collaborator
///
/// All sub-config fields are flattened for serialization, so the JSON/TOML
/// format stays flat (no nesting) and matches the option names the host
/// platform exposes.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Config {
    /// Generation API settings
    #[serde(flatten)]
    pub api: ApiConfig,

    /// Admission settings (authorization + rate limiting)
    #[serde(flatten)]
    pub admission: AdmissionConfig,

    /// Local video storage settings
    #[serde(flatten)]
    pub storage: StorageConfig,

    /// File relay collaborator settings
    #[serde(flatten)]
    pub relay: RelayConfig,
}

fn default_server_url() -> String {
    "https://api.x.ai".to_string()
}

fn default_model_id() -> String {
    "grok-imagine-0.9".to_string()
}

fn default_timeout_seconds() -> u64 {
    180
}

fn default_max_retry_attempts() -> u32 {
    3
}

fn default_rate_limit_window_seconds() -> u64 {
    3600
}

fn default_rate_limit_max_calls() -> u32 {
    5
}

fn default_storage_dir() -> PathBuf {
    PathBuf::from("./videos")
}

fn default_file_prefix() -> String {
    "video".to_string()
}

fn default_true() -> bool {
    true
}
