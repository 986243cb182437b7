//! Content-text extraction: scrape the video URL out of free-form message text

use regex::{Regex, RegexBuilder};
use std::sync::LazyLock;

/// Compile a fixed extraction pattern with the usual size limit
// Patterns are literals; compilation is exercised by the module tests.
#[allow(clippy::expect_used)]
fn compile(pattern: &str) -> Regex {
    RegexBuilder::new(pattern)
        .case_insensitive(true)
        .size_limit(1024 * 1024)
        .build()
        .expect("fixed extraction pattern")
}

static VIDEO_TAG: LazyLock<Regex> =
    LazyLock::new(|| compile(r#"<video[^>]*src=["']([^"'>]+)["'][^>]*>"#));

static SRC_ATTRIBUTE: LazyLock<Regex> =
    LazyLock::new(|| compile(r#"src=["']([^"'>]+\.mp4[^"'>]*)["']"#));

static BARE_URL: LazyLock<Regex> = LazyLock::new(|| {
    compile(r#"((?:https?://|/)[^\s<>"')\]\}]+\.mp4(?:\?[^\s<>"')\]\}]*)?)"#)
});

static MARKDOWN_LINK: LazyLock<Regex> =
    LazyLock::new(|| compile(r"!?\[[^\]]*\]\(([^\)]+\.mp4[^\)]*)\)"));

static MARKDOWN_REFERENCE: LazyLock<Regex> =
    LazyLock::new(|| compile(r"!?\[[^\]]*\]:\s*([^\s]+\.mp4[^\s]*)"));

/// HTML `<video src=...>` tag, or any `src` attribute pointing at an `.mp4`
pub(super) fn from_html_tag(content: &str) -> Option<String> {
    if !content.contains("<video") || !content.contains("src=") {
        return None;
    }
    for pattern in [&VIDEO_TAG, &SRC_ATTRIBUTE] {
        if let Some(captures) = pattern.captures(content) {
            return Some(captures[1].to_string());
        }
    }
    None
}

/// Bare `http(s)://` URL or absolute path ending in `.mp4`, optional query string
pub(super) fn direct_url(content: &str) -> Option<String> {
    BARE_URL
        .captures(content)
        .map(|captures| captures[1].to_string())
}

/// Markdown link, image, or reference-style definition pointing at an `.mp4`
pub(super) fn from_markdown(content: &str) -> Option<String> {
    for pattern in [&MARKDOWN_LINK, &MARKDOWN_REFERENCE] {
        if let Some(captures) = pattern.captures(content) {
            return Some(captures[1].to_string());
        }
    }
    None
}
