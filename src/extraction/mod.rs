//! Video URL extraction from generation API responses
//!
//! The generation API wraps its result in a chat-completion body; where the
//! video URL lands varies between structured fields and free-form message
//! text. Extraction is a fixed, ordered cascade of pure strategies; the
//! first candidate that survives resolution and validation wins. No I/O.

mod content;
mod shared;
mod structured;

// unwrap/expect are acceptable in tests for concise failure-on-error assertions
#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests;

pub use shared::{is_valid_video_url, resolve_url};
pub(crate) use shared::snippet;

use crate::error::ExtractionError;
use serde_json::Value;
use tracing::debug;

/// One extraction rule: pure function over the response and its text content
type Strategy = fn(response: &Value, content: &str) -> Option<String>;

/// Declared cascade order; structured fields always win over text scraping
const STRATEGIES: &[(&str, Strategy)] = &[
    ("structured", |response, _| structured::extract(response)),
    ("html_tag", |_, content| content::from_html_tag(content)),
    ("direct_url", |_, content| content::direct_url(content)),
    ("markdown", |_, content| content::from_markdown(content)),
];

/// Extract the video URL from a decoded API response body
///
/// Validates the expected response shape, then tries each strategy in the
/// declared order. Every candidate goes through [`resolve_url`]: relative
/// paths are joined against `base_url`, and the result must pass
/// [`is_valid_video_url`]. A candidate that fails validation does not stop
/// the cascade; later strategies still get their chance.
pub fn extract_video_url(response: &Value, base_url: &str) -> Result<String, ExtractionError> {
    let content = message_content(response)?;

    for (name, strategy) in STRATEGIES {
        let Some(candidate) = strategy(response, content) else {
            continue;
        };
        debug!(strategy = name, candidate = %candidate, "extraction strategy matched");
        if let Some(url) = shared::resolve_url(&candidate, base_url) {
            return Ok(url);
        }
        debug!(strategy = name, candidate = %candidate, "candidate rejected by validation");
    }

    Err(ExtractionError::NoUrlFound {
        snippet: shared::snippet(content),
    })
}

/// Pull `choices[0].message.content` out of the response, with shape diagnostics
fn message_content(response: &Value) -> Result<&str, ExtractionError> {
    let choice = response
        .get("choices")
        .and_then(Value::as_array)
        .and_then(|choices| choices.first())
        .ok_or(ExtractionError::MissingChoices)?;
    let message = choice
        .get("message")
        .ok_or(ExtractionError::MissingMessage)?;
    message
        .get("content")
        .and_then(Value::as_str)
        .ok_or(ExtractionError::InvalidContent)
}
