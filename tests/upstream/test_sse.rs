// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Tests for SSE line reassembly and chat-chunk parsing

use promptgate::upstream::sse::{parse_sse_line, SseEvent, SseLineBuffer};
use promptgate::upstream::UpstreamError;

#[test]
fn test_line_buffer_reassembles_split_lines() {
    let mut buffer = SseLineBuffer::new();
    assert!(buffer.push(b"da").is_empty());
    assert!(buffer.push(b"ta: [DO").is_empty());
    let lines = buffer.push(b"NE]\n");
    assert_eq!(lines, vec!["data: [DONE]".to_string()]);
}

#[test]
fn test_line_buffer_yields_multiple_lines_per_chunk() {
    let mut buffer = SseLineBuffer::new();
    let lines = buffer.push(b"data: a\n\ndata: b\ndata: partial");
    assert_eq!(lines, vec!["data: a", "", "data: b"]);

    // The partial tail completes with the next chunk
    let lines = buffer.push(b" end\n");
    assert_eq!(lines, vec!["data: partial end"]);
}

#[test]
fn test_line_buffer_strips_crlf() {
    let mut buffer = SseLineBuffer::new();
    let lines = buffer.push(b"data: [DONE]\r\n");
    assert_eq!(lines, vec!["data: [DONE]"]);
}

#[test]
fn test_parse_delta_content_fragment() {
    let line = r#"data: {"choices":[{"delta":{"content":"Hi there"}}]}"#;
    assert_eq!(
        parse_sse_line(line).unwrap(),
        SseEvent::Fragment("Hi there".to_string())
    );
}

#[test]
fn test_parse_done_terminator() {
    assert_eq!(parse_sse_line("data: [DONE]").unwrap(), SseEvent::Done);
}

#[test]
fn test_blank_and_comment_lines_ignored() {
    assert_eq!(parse_sse_line("").unwrap(), SseEvent::Ignored);
    assert_eq!(parse_sse_line(": keep-alive").unwrap(), SseEvent::Ignored);
}

#[test]
fn test_delta_without_content_ignored() {
    // Role-announcement chunk at stream start carries no content
    let line = r#"data: {"choices":[{"delta":{"role":"assistant"}}]}"#;
    assert_eq!(parse_sse_line(line).unwrap(), SseEvent::Ignored);

    let line = r#"data: {"choices":[{"delta":{"content":""}}]}"#;
    assert_eq!(parse_sse_line(line).unwrap(), SseEvent::Ignored);
}

#[test]
fn test_empty_choices_ignored() {
    let line = r#"data: {"choices":[]}"#;
    assert_eq!(parse_sse_line(line).unwrap(), SseEvent::Ignored);
}

#[test]
fn test_malformed_data_line_is_an_error() {
    let err = parse_sse_line("data: {not json").unwrap_err();
    assert!(matches!(err, UpstreamError::Decode(_)));
}
