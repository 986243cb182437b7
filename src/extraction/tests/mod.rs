//! Extraction cascade tests: strategy precedence, resolution, validation

use super::*;
use crate::error::ExtractionError;
use serde_json::json;

const BASE: &str = "https://api.example.com";

fn chat_body(content: &str) -> serde_json::Value {
    json!({
        "choices": [{"message": {"content": content}}]
    })
}

// -----------------------------------------------------------------------
// Structured extraction
// -----------------------------------------------------------------------

#[test]
fn top_level_video_url_field_wins() {
    let body = json!({
        "video_url": "https://cdn.example.com/clip.mp4",
        "choices": [{"message": {"content": "see [video](/other.mp4)"}}]
    });
    assert_eq!(
        extract_video_url(&body, BASE).unwrap(),
        "https://cdn.example.com/clip.mp4"
    );
}

#[test]
fn attachments_entry_beats_conflicting_markdown_link() {
    let body = json!({
        "choices": [{
            "message": {
                "content": "Here you go: [video](/markdown/version.mp4)",
                "attachments": [
                    {"url": "https://cdn.example.com/structured.mp4"}
                ]
            }
        }]
    });
    assert_eq!(
        extract_video_url(&body, BASE).unwrap(),
        "https://cdn.example.com/structured.mp4"
    );
}

#[test]
fn media_and_files_fields_are_scanned() {
    for field in ["media", "files"] {
        let body = json!({
            "choices": [{
                "message": {
                    "content": "done",
                    field: [
                        {"url": "https://cdn.example.com/thumb.jpg"},
                        {"url": "https://cdn.example.com/result.MP4"}
                    ]
                }
            }]
        });
        assert_eq!(
            extract_video_url(&body, BASE).unwrap(),
            "https://cdn.example.com/result.MP4",
            "field {field} should yield its first .mp4 entry"
        );
    }
}

#[test]
fn structured_entry_without_mp4_extension_is_skipped() {
    let body = json!({
        "choices": [{
            "message": {
                "content": "fallback [video](/out/x.mp4)",
                "attachments": [{"url": "https://cdn.example.com/preview.gif"}]
            }
        }]
    });
    // The attachment is not a video, so the cascade falls through to markdown
    assert_eq!(
        extract_video_url(&body, BASE).unwrap(),
        format!("{BASE}/out/x.mp4")
    );
}

// -----------------------------------------------------------------------
// Content-text strategies, in cascade order
// -----------------------------------------------------------------------

#[test]
fn html_video_tag_resolves_against_base() {
    let body = chat_body(r#"<video src="/media/a.mp4"></video>"#);
    assert_eq!(
        extract_video_url(&body, BASE).unwrap(),
        format!("{BASE}/media/a.mp4")
    );
}

#[test]
fn src_attribute_without_video_tag_prefix_is_ignored() {
    // The html strategy gates on both "<video" and "src="; a bare img src
    // never reaches the tag patterns but the direct strategy may still hit.
    let body = chat_body(r#"<img src="/media/a.mp4">"#);
    assert_eq!(
        extract_video_url(&body, BASE).unwrap(),
        format!("{BASE}/media/a.mp4"),
        "direct strategy should pick up the path"
    );
}

#[test]
fn bare_url_with_query_string_is_kept() {
    let body = chat_body("Your clip: https://cdn.example.com/v/clip.mp4?expires=123 enjoy!");
    assert_eq!(
        extract_video_url(&body, BASE).unwrap(),
        "https://cdn.example.com/v/clip.mp4?expires=123"
    );
}

#[test]
fn absolute_path_is_joined_onto_base() {
    let body = chat_body("saved at /out/render.mp4 for you");
    assert_eq!(
        extract_video_url(&body, BASE).unwrap(),
        format!("{BASE}/out/render.mp4")
    );
}

#[test]
fn base_with_path_segment_keeps_the_segment() {
    let body = chat_body(r#"<video src="/media/a.mp4">"#);
    assert_eq!(
        extract_video_url(&body, "https://host.example.com/api").unwrap(),
        "https://host.example.com/api/media/a.mp4"
    );
}

#[test]
fn markdown_link_is_extracted() {
    let body = chat_body("Here: [video](/out/x.mp4)");
    assert_eq!(
        extract_video_url(&body, BASE).unwrap(),
        format!("{BASE}/out/x.mp4")
    );
}

#[test]
fn markdown_image_is_extracted() {
    let body = chat_body("![preview](https://cdn.example.com/x.mp4)");
    assert_eq!(
        extract_video_url(&body, BASE).unwrap(),
        "https://cdn.example.com/x.mp4"
    );
}

#[test]
fn markdown_reference_definition_is_extracted() {
    let body = chat_body("[result]: https://cdn.example.com/ref.mp4 here");
    assert_eq!(
        extract_video_url(&body, BASE).unwrap(),
        "https://cdn.example.com/ref.mp4"
    );
}

#[test]
fn html_strategy_outranks_direct_and_markdown() {
    let body = chat_body(concat!(
        r#"<video src="https://cdn.example.com/tag.mp4"></video> "#,
        "https://cdn.example.com/bare.mp4 ",
        "[md](https://cdn.example.com/md.mp4)"
    ));
    assert_eq!(
        extract_video_url(&body, BASE).unwrap(),
        "https://cdn.example.com/tag.mp4"
    );
}

// -----------------------------------------------------------------------
// Validation
// -----------------------------------------------------------------------

#[test]
fn validation_rejects_embedded_angle_bracket() {
    assert!(!is_valid_video_url("https://cdn.example.com/<a>.mp4"));
}

#[test]
fn validation_rejects_missing_video_extension() {
    assert!(!is_valid_video_url("https://cdn.example.com/video.webm"));
}

#[test]
fn validation_rejects_non_http_scheme_and_short_urls() {
    assert!(!is_valid_video_url("ftp://cdn.example.com/a.mp4"));
    assert!(!is_valid_video_url("/a.mp4"));
    assert!(!is_valid_video_url("http://a."));
}

#[test]
fn validation_rejects_control_characters() {
    assert!(!is_valid_video_url("https://cdn.example.com/a\n.mp4"));
    assert!(!is_valid_video_url("https://cdn.example.com/a\t.mp4"));
}

#[test]
fn validation_accepts_query_and_mixed_case_extension() {
    assert!(is_valid_video_url("https://cdn.example.com/a.MP4?sig=x"));
}

#[test]
fn direct_strategy_steps_over_quoted_junk() {
    // The quoted fragment cannot match (quotes break the URL character
    // class); the real URL further along is still found.
    let body = chat_body(r#"[x]("/broken".mp4) then https://cdn.example.com/good.mp4 done"#);
    assert_eq!(
        extract_video_url(&body, BASE).unwrap(),
        "https://cdn.example.com/good.mp4"
    );
}

// -----------------------------------------------------------------------
// Shape diagnostics and failure snippets
// -----------------------------------------------------------------------

#[test]
fn missing_choices_is_reported() {
    let body = json!({"id": "x"});
    assert_eq!(
        extract_video_url(&body, BASE).unwrap_err(),
        ExtractionError::MissingChoices
    );
}

#[test]
fn empty_choices_is_reported() {
    let body = json!({"choices": []});
    assert_eq!(
        extract_video_url(&body, BASE).unwrap_err(),
        ExtractionError::MissingChoices
    );
}

#[test]
fn missing_message_is_reported() {
    let body = json!({"choices": [{"index": 0}]});
    assert_eq!(
        extract_video_url(&body, BASE).unwrap_err(),
        ExtractionError::MissingMessage
    );
}

#[test]
fn non_string_content_is_reported() {
    let body = json!({"choices": [{"message": {"content": 42}}]});
    assert_eq!(
        extract_video_url(&body, BASE).unwrap_err(),
        ExtractionError::InvalidContent
    );
}

#[test]
fn no_url_failure_carries_truncated_snippet() {
    let long_content = "no video here ".repeat(50);
    let body = chat_body(&long_content);
    match extract_video_url(&body, BASE).unwrap_err() {
        ExtractionError::NoUrlFound { snippet } => {
            assert_eq!(snippet.chars().count(), 200);
            assert!(long_content.starts_with(&snippet));
        }
        other => panic!("expected NoUrlFound, got {other:?}"),
    }
}

#[test]
fn structured_video_url_of_wrong_shape_falls_through() {
    // A relative structured candidate that fails validation after resolution
    // must not mask a later valid content match.
    let body = json!({
        "video_url": "not-a-url",
        "choices": [{"message": {"content": "see https://cdn.example.com/ok.mp4"}}]
    });
    assert_eq!(
        extract_video_url(&body, BASE).unwrap(),
        "https://cdn.example.com/ok.mp4"
    );
}
