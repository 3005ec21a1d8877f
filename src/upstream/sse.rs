// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Server-sent-event parsing for the upstream chat completion stream
//!
//! The provider emits `data: {json}` lines terminated by `data: [DONE]`.
//! Transport chunks can split a line anywhere, so lines are reassembled
//! incrementally before parsing.

use serde::Deserialize;

use super::error::UpstreamError;

#[derive(Debug, Deserialize)]
struct ChatStreamChunk {
    choices: Vec<ChatStreamChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatStreamChoice {
    delta: ChatDelta,
}

#[derive(Debug, Deserialize)]
struct ChatDelta {
    content: Option<String>,
}

/// One parsed SSE line.
#[derive(Debug, PartialEq)]
pub enum SseEvent {
    /// A content fragment from a delta payload.
    Fragment(String),
    /// Stream terminator (`data: [DONE]`).
    Done,
    /// Blank lines, comments, deltas without content.
    Ignored,
}

/// Reassembles complete lines from arbitrarily split byte chunks.
pub struct SseLineBuffer {
    pending: Vec<u8>,
}

impl SseLineBuffer {
    pub fn new() -> Self {
        Self {
            pending: Vec::new(),
        }
    }

    /// Feed a transport chunk; returns every complete line it closed.
    /// A trailing partial line stays buffered for the next chunk.
    pub fn push(&mut self, chunk: &[u8]) -> Vec<String> {
        self.pending.extend_from_slice(chunk);

        let mut lines = Vec::new();
        while let Some(pos) = self.pending.iter().position(|&b| b == b'\n') {
            let mut line: Vec<u8> = self.pending.drain(..=pos).collect();
            line.pop(); // newline
            if line.last() == Some(&b'\r') {
                line.pop();
            }
            lines.push(String::from_utf8_lossy(&line).into_owned());
        }
        lines
    }
}

impl Default for SseLineBuffer {
    fn default() -> Self {
        Self::new()
    }
}

/// Parse one reassembled SSE line. Malformed `data:` payloads are an error:
/// the stream must terminate with that error rather than silently truncate.
pub fn parse_sse_line(line: &str) -> Result<SseEvent, UpstreamError> {
    let line = line.trim();
    let Some(data) = line.strip_prefix("data:") else {
        // Blank keep-alive lines and comment lines carry no payload.
        return Ok(SseEvent::Ignored);
    };
    let data = data.trim();

    if data == "[DONE]" {
        return Ok(SseEvent::Done);
    }

    let chunk: ChatStreamChunk = serde_json::from_str(data)
        .map_err(|e| UpstreamError::Decode(format!("bad stream chunk: {e}")))?;

    match chunk
        .choices
        .into_iter()
        .next()
        .and_then(|choice| choice.delta.content)
    {
        Some(content) if !content.is_empty() => Ok(SseEvent::Fragment(content)),
        _ => Ok(SseEvent::Ignored),
    }
}
