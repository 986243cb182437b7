//! Candidate resolution and validation shared by all strategies

use tracing::debug;
use url::Url;

/// Characters that never appear in a well-formed video URL
///
/// A greedy regex can swallow surrounding markup; any of these in the
/// resolved candidate means the match overran its boundaries.
const FORBIDDEN_CHARS: [char; 7] = ['<', '>', '"', '\'', '\n', '\r', '\t'];

/// Maximum diagnostic snippet length, in characters
pub(crate) const SNIPPET_LEN: usize = 200;

/// Resolve a raw candidate against the API base and validate it
///
/// A leading-slash path is joined onto `base_url`; anything else is used
/// as-is. Returns `None` when the resolved URL fails [`is_valid_video_url`].
pub fn resolve_url(candidate: &str, base_url: &str) -> Option<String> {
    if candidate.is_empty() {
        return None;
    }

    let resolved = if candidate.starts_with('/') {
        let base = format!("{}/", base_url.trim_end_matches('/'));
        let joined = Url::parse(&base)
            .ok()?
            .join(candidate.trim_start_matches('/'))
            .ok()?
            .to_string();
        debug!(candidate = %candidate, resolved = %joined, "relative path resolved against API base");
        joined
    } else {
        candidate.to_string()
    };

    is_valid_video_url(&resolved).then_some(resolved)
}

/// Whether a resolved candidate is a plausible, absolute video URL
#[must_use]
pub fn is_valid_video_url(url: &str) -> bool {
    if url.len() < 10 {
        return false;
    }
    if !url.starts_with("http://") && !url.starts_with("https://") {
        return false;
    }
    if !url.to_ascii_lowercase().contains(".mp4") {
        return false;
    }
    !url.chars().any(|c| FORBIDDEN_CHARS.contains(&c))
}

/// Truncated, char-boundary-safe prefix for diagnostics
pub(crate) fn snippet(text: &str) -> String {
    match text.char_indices().nth(SNIPPET_LEN) {
        Some((index, _)) => text[..index].to_string(),
        None => text.to_string(),
    }
}
