// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Request pipeline: validation, rate limiting, safety gating, generation

use std::sync::Arc;
use tracing::{info, warn};
use uuid::Uuid;

use crate::config::RouteLimit;
use crate::safety::SafetyGate;
use crate::upstream::{GenerationBackend, TextStream};

use super::errors::ApiError;
use super::generate_image::ImageGenerationRequest;
use super::generate_text::TextGenerationRequest;
use super::rate_limiter::{Clock, FixedWindowLimiter};

/// Logical route names used for rate-limit keying.
pub const ROUTE_TEXT: &str = "text";
pub const ROUTE_IMAGE: &str = "image";

/// Orchestrates every inbound generation request through a fixed stage
/// order: validation → rate-limit → safety → generation. No stage is
/// skipped and no stage runs after an earlier one failed, so validation
/// failures never consume rate budget and rejected requests never reach
/// the backend.
pub struct ApiServer {
    rate_limiter: FixedWindowLimiter,
    safety_gate: SafetyGate,
    backend: Arc<dyn GenerationBackend>,
    text_limit: RouteLimit,
    image_limit: RouteLimit,
}

impl ApiServer {
    pub fn new(
        backend: Arc<dyn GenerationBackend>,
        text_limit: RouteLimit,
        image_limit: RouteLimit,
        extra_blocked_terms: Vec<String>,
    ) -> Self {
        Self {
            rate_limiter: FixedWindowLimiter::new(),
            safety_gate: SafetyGate::with_extra_terms(extra_blocked_terms),
            backend,
            text_limit,
            image_limit,
        }
    }

    /// Same as [`ApiServer::new`] but with an injected limiter clock, so
    /// tests can roll windows forward without sleeping.
    pub fn with_clock(
        backend: Arc<dyn GenerationBackend>,
        text_limit: RouteLimit,
        image_limit: RouteLimit,
        extra_blocked_terms: Vec<String>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            rate_limiter: FixedWindowLimiter::with_clock(clock),
            safety_gate: SafetyGate::with_extra_terms(extra_blocked_terms),
            backend,
            text_limit,
            image_limit,
        }
    }

    /// Whether the upstream provider currently answers.
    pub async fn upstream_healthy(&self) -> bool {
        self.backend.health_check().await
    }

    /// Handle one text generation request end to end, returning the live
    /// fragment stream on acceptance.
    pub async fn handle_text_request(
        &self,
        raw: &serde_json::Value,
        client_identity: &str,
    ) -> Result<TextStream, ApiError> {
        let request_id = Uuid::new_v4();
        let request =
            TextGenerationRequest::from_value(raw).map_err(ApiError::InvalidRequest)?;

        self.admit(&request.prompt, client_identity, ROUTE_TEXT, &self.text_limit)?;

        info!(
            %request_id,
            identity = client_identity,
            prompt_chars = request.prompt.chars().count(),
            "text generation admitted"
        );

        self.backend
            .generate_text(&request.prompt)
            .await
            .map_err(ApiError::from)
    }

    /// Handle one image generation request end to end, returning the
    /// complete decoded image on acceptance.
    pub async fn handle_image_request(
        &self,
        raw: &serde_json::Value,
        client_identity: &str,
    ) -> Result<Vec<u8>, ApiError> {
        let request_id = Uuid::new_v4();
        let request =
            ImageGenerationRequest::from_value(raw).map_err(ApiError::InvalidRequest)?;

        self.admit(
            &request.prompt,
            client_identity,
            ROUTE_IMAGE,
            &self.image_limit,
        )?;

        info!(
            %request_id,
            identity = client_identity,
            size = request.size.logical_units(),
            "image generation admitted"
        );

        let image = self
            .backend
            .generate_image(&request.prompt, request.size)
            .await?;

        info!(%request_id, bytes = image.len(), "image generation completed");
        Ok(image)
    }

    /// Rate-limit then safety-check an already-validated prompt. The order
    /// matters: a rejected prompt still consumes one unit of rate budget,
    /// which keeps the gate from being probed faster than the route allows.
    fn admit(
        &self,
        prompt: &str,
        identity: &str,
        route: &str,
        limit: &RouteLimit,
    ) -> Result<(), ApiError> {
        if !self
            .rate_limiter
            .check_and_consume(identity, route, limit.limit, limit.window_ms)
        {
            warn!(identity, route, "request rejected by rate limiter");
            return Err(ApiError::RateLimitExceeded);
        }

        let verdict = self.safety_gate.evaluate(prompt);
        if !verdict.safe {
            warn!(identity, route, "request rejected by safety gate");
            let reason = verdict
                .reason
                .unwrap_or_else(|| "prompt blocked by safety filter".to_string());
            return Err(ApiError::SafetyRejected(reason));
        }

        Ok(())
    }
}
