//! Structured-field extraction: explicit URL fields in the response body

use serde_json::Value;

/// Fields of the first choice's message that may carry file listings
const LIST_FIELDS: &[&str] = &["attachments", "media", "files"];

/// Extract from a top-level `video_url` field or a message file listing
///
/// The top-level field is taken as-is (validation happens later in the
/// cascade); list entries must already point at an `.mp4` to disambiguate
/// them from thumbnails and other attachments.
pub(super) fn extract(response: &Value) -> Option<String> {
    if let Some(url) = response.get("video_url").and_then(Value::as_str) {
        return Some(url.to_string());
    }

    let message = response
        .get("choices")
        .and_then(Value::as_array)
        .and_then(|choices| choices.first())
        .and_then(|choice| choice.get("message"))?;

    for field in LIST_FIELDS {
        let Some(items) = message.get(field).and_then(Value::as_array) else {
            continue;
        };
        for item in items {
            if let Some(url) = item.get("url").and_then(Value::as_str)
                && url.to_ascii_lowercase().ends_with(".mp4")
            {
                return Some(url.to_string());
            }
        }
    }

    None
}
