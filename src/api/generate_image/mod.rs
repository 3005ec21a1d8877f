// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Image generation endpoint: request validation and handler

mod handler;
mod request;

pub use handler::generate_image_handler;
pub use request::{ImageGenerationRequest, MAX_IMAGE_PROMPT_CHARS};
