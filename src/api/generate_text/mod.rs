// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Text generation endpoint: request validation and handler

mod handler;
mod request;

pub use handler::generate_text_handler;
pub use request::{TextGenerationRequest, MAX_TEXT_PROMPT_CHARS};
