// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Image generation request parsing and validation

use serde_json::Value;

use crate::upstream::ImageSize;

/// Ceiling for image prompts, in characters. Tighter than the text ceiling
/// because image prompts are billed per request upstream.
pub const MAX_IMAGE_PROMPT_CHARS: usize = 300;

/// A validated image generation request.
#[derive(Debug, Clone)]
pub struct ImageGenerationRequest {
    pub prompt: String,
    pub size: ImageSize,
}

impl ImageGenerationRequest {
    /// Parse and validate a raw JSON body, short-circuiting on the first
    /// failure: prompt present, prompt length, then size. A missing size
    /// defaults to 512; anything present that is not exactly 512 or 768
    /// (including non-numeric values) is invalid.
    pub fn from_value(value: &Value) -> Result<Self, String> {
        let prompt = value
            .get("prompt")
            .and_then(Value::as_str)
            .filter(|p| !p.is_empty())
            .ok_or_else(|| "prompt required".to_string())?;

        if prompt.chars().count() > MAX_IMAGE_PROMPT_CHARS {
            return Err(format!(
                "prompt too long: limit is {MAX_IMAGE_PROMPT_CHARS} characters"
            ));
        }

        let size = match value.get("size") {
            None | Some(Value::Null) => ImageSize::default(),
            Some(v) => v
                .as_u64()
                .and_then(ImageSize::from_logical)
                .ok_or_else(|| "invalid size".to_string())?,
        };

        Ok(Self {
            prompt: prompt.to_string(),
            size,
        })
    }
}
