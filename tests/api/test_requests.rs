// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Tests for request parsing and validation

use promptgate::api::{
    ImageGenerationRequest, TextGenerationRequest, MAX_IMAGE_PROMPT_CHARS, MAX_TEXT_PROMPT_CHARS,
};
use serde_json::json;

#[test]
fn test_text_request_valid_prompt() {
    let req = TextGenerationRequest::from_value(&json!({"prompt": "write a haiku"})).unwrap();
    assert_eq!(req.prompt, "write a haiku");
}

#[test]
fn test_text_request_missing_prompt() {
    let err = TextGenerationRequest::from_value(&json!({})).unwrap_err();
    assert_eq!(err, "prompt required");
}

#[test]
fn test_text_request_non_string_prompt() {
    let err = TextGenerationRequest::from_value(&json!({"prompt": 42})).unwrap_err();
    assert_eq!(err, "prompt required");
}

#[test]
fn test_text_request_empty_prompt() {
    let err = TextGenerationRequest::from_value(&json!({"prompt": ""})).unwrap_err();
    assert_eq!(err, "prompt required");
}

#[test]
fn test_text_request_unparseable_body_is_missing_prompt() {
    // Bodies that were not valid JSON arrive here as Null
    let err = TextGenerationRequest::from_value(&serde_json::Value::Null).unwrap_err();
    assert_eq!(err, "prompt required");
}

#[test]
fn test_text_request_length_boundary() {
    let at_limit = "a".repeat(MAX_TEXT_PROMPT_CHARS);
    assert!(TextGenerationRequest::from_value(&json!({ "prompt": at_limit })).is_ok());

    let over = "a".repeat(MAX_TEXT_PROMPT_CHARS + 1);
    let err = TextGenerationRequest::from_value(&json!({ "prompt": over })).unwrap_err();
    assert!(err.contains("prompt too long"), "got: {err}");
}

#[test]
fn test_text_request_length_counts_characters_not_bytes() {
    // 2000 multi-byte characters are within the limit even though the
    // UTF-8 encoding is far larger
    let prompt = "あ".repeat(MAX_TEXT_PROMPT_CHARS);
    assert!(TextGenerationRequest::from_value(&json!({ "prompt": prompt })).is_ok());
}

#[test]
fn test_image_request_defaults_to_512() {
    let req = ImageGenerationRequest::from_value(&json!({"prompt": "a lighthouse"})).unwrap();
    assert_eq!(req.size.logical_units(), 512);
}

#[test]
fn test_image_request_accepts_768() {
    let req =
        ImageGenerationRequest::from_value(&json!({"prompt": "a lighthouse", "size": 768}))
            .unwrap();
    assert_eq!(req.size.logical_units(), 768);
}

#[test]
fn test_image_request_null_size_is_default() {
    let req =
        ImageGenerationRequest::from_value(&json!({"prompt": "a lighthouse", "size": null}))
            .unwrap();
    assert_eq!(req.size.logical_units(), 512);
}

#[test]
fn test_image_request_rejects_unlisted_size() {
    let err = ImageGenerationRequest::from_value(&json!({"prompt": "a lighthouse", "size": 1024}))
        .unwrap_err();
    assert_eq!(err, "invalid size");
}

#[test]
fn test_image_request_rejects_string_size() {
    // "512" as a string is not the enumerated number
    let err = ImageGenerationRequest::from_value(&json!({"prompt": "a lighthouse", "size": "512"}))
        .unwrap_err();
    assert_eq!(err, "invalid size");
}

#[test]
fn test_image_request_length_boundary() {
    let at_limit = "a".repeat(MAX_IMAGE_PROMPT_CHARS);
    assert!(ImageGenerationRequest::from_value(&json!({ "prompt": at_limit })).is_ok());

    let over = "a".repeat(MAX_IMAGE_PROMPT_CHARS + 1);
    let err = ImageGenerationRequest::from_value(&json!({ "prompt": over })).unwrap_err();
    assert!(err.contains("prompt too long"), "got: {err}");
}

#[test]
fn test_image_request_prompt_checked_before_size() {
    // Validation order: prompt presence, prompt length, then size
    let err = ImageGenerationRequest::from_value(&json!({"size": 1024})).unwrap_err();
    assert_eq!(err, "prompt required");

    let over = "a".repeat(MAX_IMAGE_PROMPT_CHARS + 1);
    let err =
        ImageGenerationRequest::from_value(&json!({"prompt": over, "size": 1024})).unwrap_err();
    assert!(err.contains("prompt too long"));
}
