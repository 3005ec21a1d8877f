// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
pub mod api;
pub mod config;
pub mod safety;
pub mod upstream;

// Re-export main types
pub use api::{ApiError, ApiServer, ErrorResponse, FixedWindowLimiter};
pub use config::{GatewayConfig, RouteLimit};
pub use safety::{SafetyGate, SafetyVerdict};
pub use upstream::{
    GenerationBackend, ImageSize, TextStream, UpstreamClient, UpstreamError, UpstreamResult,
};
