//! Inbound command surface and the static texts it answers with

use crate::config::GroupControlMode;
use crate::types::TaskId;

use super::VideoPipeline;

/// A parsed inbound command
///
/// Command-word parsing belongs to the host platform; the pipeline receives
/// the already-classified command plus the message it arrived in.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Command {
    /// Generate a video from the message's image and this prompt
    Generate {
        /// Free-text prompt supplied by the actor
        prompt: String,
    },
    /// Report pipeline configuration state (authorized actors only)
    Diagnostics,
    /// Static usage text
    Help,
}

pub(super) const MSG_DIAGNOSTICS_RESTRICTED: &str =
    "The diagnostics command is restricted to authorized users.";

pub(super) const HELP_TEXT: &str = "Video generation help\n\n\
    1. Send or quote a message containing an image\n\
    2. Issue the generate command with a prompt describing the motion\n\n\
    The video is delivered from the local filesystem. If delivery fails, the \
    bot and the messaging backend usually do not share file paths; configure \
    the file relay in that case.";

pub(super) fn ack_message(task: TaskId) -> String {
    format!(
        "Generating your video (task {}); this usually takes a few minutes.",
        task.short()
    )
}

impl VideoPipeline {
    /// Configuration report for the diagnostics command
    pub(super) fn diagnostics_report(&self) -> String {
        let api = &self.config.api;
        let admission = &self.config.admission;

        let key_state = if api.api_key.is_empty() {
            "NOT configured"
        } else {
            "configured"
        };
        let control = match admission.group_control_mode {
            GroupControlMode::Off => "off".to_string(),
            GroupControlMode::Whitelist => {
                format!("whitelist ({} groups)", admission.group_list.len())
            }
            GroupControlMode::Blacklist => {
                format!("blacklist ({} groups)", admission.group_list.len())
            }
        };
        let rate_limit = if admission.rate_limit_enabled {
            format!(
                "{} calls per {} seconds per group",
                admission.rate_limit_max_calls, admission.rate_limit_window_seconds
            )
        } else {
            "disabled".to_string()
        };
        let relay = match self.config.relay.endpoint() {
            Some((host, port)) => format!("{host}:{port}"),
            None => "disabled".to_string(),
        };

        format!(
            "Video generation diagnostics\n\
             API key: {key_state}\n\
             Endpoint: {}\n\
             Storage directory: {}\n\
             Feature enabled: {}\n\
             Group control: {control}\n\
             Rate limit: {rate_limit}\n\
             File relay: {relay}",
            api.api_url(),
            self.store.dir().display(),
            if api.enabled { "yes" } else { "no" },
        )
    }
}
