//! Retrying client for the remote generation API
//!
//! One generation call is a POST to the chat-completions endpoint carrying
//! the prompt and the reference image as a data URI. Connection setup and
//! request transmission get short fixed budgets; the read budget is the
//! configurable one, since generation itself dominates. Failures are retried
//! a bounded number of times with a small fixed backoff; 403 and malformed
//! response bodies are terminal.

use crate::config::ApiConfig;
use crate::error::{Error, Result};
use crate::extraction;
use crate::types::ImagePayload;
use serde_json::Value;
use std::time::Duration;
use tracing::{info, warn};

/// Connect and write budget for one request
const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Slack added to the read budget for the whole-request deadline
const REQUEST_TIMEOUT_SLACK: Duration = Duration::from_secs(10);

/// Backoff after a non-2xx status before the next attempt
const STATUS_RETRY_BACKOFF: Duration = Duration::from_secs(2);

/// Backoff after a transport-level failure before the next attempt
const TRANSPORT_RETRY_BACKOFF: Duration = Duration::from_secs(1);

/// Client for the generation endpoint, with bounded fixed-backoff retries
#[derive(Clone)]
pub struct GenerationClient {
    http: reqwest::Client,
    config: ApiConfig,
    api_url: String,
}

impl GenerationClient {
    /// Build a client from API configuration
    pub fn new(config: ApiConfig) -> Result<Self> {
        let http = reqwest::Client::builder()
            .connect_timeout(CONNECT_TIMEOUT)
            .read_timeout(Duration::from_secs(config.timeout_seconds))
            .build()?;
        let api_url = config.api_url();
        Ok(Self {
            http,
            config,
            api_url,
        })
    }

    /// Call the API and return the resolved video URL
    ///
    /// Retries up to `max_retry_attempts` on transport errors and retryable
    /// statuses. The error of the final attempt is returned verbatim; it is
    /// what the actor sees.
    pub async fn generate(&self, prompt: &str, image: &ImagePayload) -> Result<String> {
        if self.config.api_key.is_empty() {
            return Err(Error::Config {
                message: "API key is not configured".to_string(),
                key: Some("api_key".to_string()),
            });
        }

        let payload = serde_json::json!({
            "model": self.config.model_id,
            "messages": [{
                "role": "user",
                "content": [
                    {"type": "text", "text": prompt},
                    {"type": "image_url", "image_url": {"url": image.to_data_uri()}}
                ]
            }]
        });

        let max_attempts = self.config.max_retry_attempts;
        let request_timeout =
            Duration::from_secs(self.config.timeout_seconds) + REQUEST_TIMEOUT_SLACK;

        for attempt in 1..=max_attempts {
            info!(attempt, max_attempts, url = %self.api_url, "calling generation API");

            let response = self
                .http
                .post(&self.api_url)
                .bearer_auth(&self.config.api_key)
                .json(&payload)
                .timeout(request_timeout)
                .send()
                .await;

            let (error, backoff) = match response {
                Ok(response) => {
                    let status = response.status();
                    let body = match response.text().await {
                        Ok(body) => body,
                        Err(e) => {
                            let error = format!("failed to read API response: {e}");
                            if attempt == max_attempts {
                                return Err(Error::Api(error));
                            }
                            warn!(error = %error, "API response unreadable, retrying");
                            tokio::time::sleep(TRANSPORT_RETRY_BACKOFF).await;
                            continue;
                        }
                    };

                    if status.is_success() {
                        return self.handle_success(&body);
                    }

                    // A 403 signals a key or permission problem, never transience
                    if status == reqwest::StatusCode::FORBIDDEN {
                        return Err(Error::Api(
                            "API access denied; check the key and its permissions".to_string(),
                        ));
                    }

                    (status_error(status, &body), STATUS_RETRY_BACKOFF)
                }
                Err(e) if e.is_timeout() => (
                    format!(
                        "API request timed out after {} seconds",
                        self.config.timeout_seconds
                    ),
                    TRANSPORT_RETRY_BACKOFF,
                ),
                Err(e) => (format!("API request error: {e}"), TRANSPORT_RETRY_BACKOFF),
            };

            if attempt == max_attempts {
                return Err(Error::Api(error));
            }
            warn!(error = %error, attempt, max_attempts, "API call failed, retrying");
            tokio::time::sleep(backoff).await;
        }

        Err(Error::Api("all API call attempts failed".to_string()))
    }

    /// Decode a 200 body and hand it to the extraction cascade
    ///
    /// Both a JSON decode failure and an extraction failure are terminal for
    /// the run; the response arrived, it just did not contain a result.
    fn handle_success(&self, body: &str) -> Result<String> {
        let decoded: Value = match serde_json::from_str(body) {
            Ok(value) => value,
            Err(e) => {
                return Err(Error::Api(format!(
                    "API response JSON decode failed: {e}; body started with: {}",
                    extraction::snippet(body)
                )));
            }
        };

        let url = extraction::extract_video_url(&decoded, &self.config.server_url)?;
        info!(video_url = %url, "video URL extracted from API response");
        Ok(url)
    }
}

/// Describe a non-2xx response, preferring the server's own error text
fn status_error(status: reqwest::StatusCode, body: &str) -> String {
    let detail = serde_json::from_str::<Value>(body).ok().and_then(|value| {
        value
            .get("error")
            .or_else(|| value.get("message"))
            .map(|d| match d {
                Value::String(s) => s.clone(),
                other => other.to_string(),
            })
    });

    match detail {
        Some(detail) => format!("API request failed (status {status}): {detail}"),
        None => format!(
            "API request failed (status {status}): {}",
            extraction::snippet(body)
        ),
    }
}
