// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Text generation request parsing and validation

use serde_json::Value;

/// Ceiling for text prompts, in characters.
pub const MAX_TEXT_PROMPT_CHARS: usize = 2000;

/// A validated text generation request. Built once at pipeline entry,
/// immutable afterwards.
#[derive(Debug, Clone)]
pub struct TextGenerationRequest {
    pub prompt: String,
}

impl TextGenerationRequest {
    /// Parse and validate a raw JSON body. Checks run in a fixed order and
    /// short-circuit on the first failure: prompt present and a non-empty
    /// string, then prompt length.
    pub fn from_value(value: &Value) -> Result<Self, String> {
        let prompt = value
            .get("prompt")
            .and_then(Value::as_str)
            .filter(|p| !p.is_empty())
            .ok_or_else(|| "prompt required".to_string())?;

        if prompt.chars().count() > MAX_TEXT_PROMPT_CHARS {
            return Err(format!(
                "prompt too long: limit is {MAX_TEXT_PROMPT_CHARS} characters"
            ));
        }

        Ok(Self {
            prompt: prompt.to_string(),
        })
    }
}
