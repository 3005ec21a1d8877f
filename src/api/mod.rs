// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
pub mod errors;
pub mod generate_image;
pub mod generate_text;
pub mod http_server;
pub mod rate_limiter;
pub mod server;
pub mod streaming;

pub use errors::{ApiError, ErrorResponse};
pub use generate_image::{generate_image_handler, ImageGenerationRequest, MAX_IMAGE_PROMPT_CHARS};
pub use generate_text::{generate_text_handler, TextGenerationRequest, MAX_TEXT_PROMPT_CHARS};
pub use http_server::{build_router, start_server, AppState, HealthResponse};
pub use rate_limiter::{Clock, FixedWindowLimiter, SystemClock};
pub use server::{ApiServer, ROUTE_IMAGE, ROUTE_TEXT};
pub use streaming::{relay, GenerationSession, SessionState};
