// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::upstream::UpstreamError;

/// JSON body returned for every failed request: `{"error": "..."}`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ErrorResponse {
    pub error: String,
}

/// Pipeline-boundary error taxonomy. Every stage-local failure is converted
/// to exactly one of these before reaching the caller; internal detail stays
/// in the logs.
#[derive(Debug, Clone)]
pub enum ApiError {
    /// Malformed, oversized, or invalid-enum input. Never retried
    /// automatically; the user must edit the prompt.
    InvalidRequest(String),
    /// This gateway's own limiter rejected the request.
    RateLimitExceeded,
    /// The safety gate or the provider's own safety system rejected the
    /// prompt; terminal for that prompt.
    SafetyRejected(String),
    /// The provider's own quota/billing limit, distinct from
    /// `RateLimitExceeded`.
    UpstreamQuotaExceeded,
    /// Anything else. The generic message goes to the caller; the detail is
    /// logged server-side only.
    InternalError(String),
}

impl ApiError {
    pub fn status_code(&self) -> u16 {
        match self {
            ApiError::InvalidRequest(_) => 400,
            ApiError::SafetyRejected(_) => 422,
            ApiError::RateLimitExceeded | ApiError::UpstreamQuotaExceeded => 429,
            ApiError::InternalError(_) => 500,
        }
    }

    /// User-facing response body. `InternalError` detail is deliberately
    /// replaced with a generic message.
    pub fn to_response(&self) -> ErrorResponse {
        let error = match self {
            ApiError::InvalidRequest(msg) => msg.clone(),
            ApiError::RateLimitExceeded => "rate limit reached, retry in 1 minute".to_string(),
            ApiError::SafetyRejected(reason) => reason.clone(),
            ApiError::UpstreamQuotaExceeded => {
                "upstream provider quota exceeded; check billing settings".to_string()
            }
            ApiError::InternalError(_) => "server error".to_string(),
        };
        ErrorResponse { error }
    }
}

impl From<UpstreamError> for ApiError {
    fn from(err: UpstreamError) -> Self {
        match err {
            UpstreamError::RateLimited(detail) => {
                tracing::warn!("upstream quota exhausted: {}", detail);
                ApiError::UpstreamQuotaExceeded
            }
            UpstreamError::SafetyRefused(detail) => {
                tracing::warn!("upstream safety refusal: {}", detail);
                ApiError::SafetyRejected(
                    "the request may violate generation safety guidelines; try different content"
                        .to_string(),
                )
            }
            other => {
                tracing::error!("upstream failure: {}", other);
                ApiError::InternalError(other.to_string())
            }
        }
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiError::InvalidRequest(msg) => write!(f, "Invalid request: {}", msg),
            ApiError::RateLimitExceeded => write!(f, "Rate limit exceeded"),
            ApiError::SafetyRejected(reason) => write!(f, "Safety rejection: {}", reason),
            ApiError::UpstreamQuotaExceeded => write!(f, "Upstream quota exceeded"),
            ApiError::InternalError(msg) => write!(f, "Internal error: {}", msg),
        }
    }
}

impl std::error::Error for ApiError {}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status =
            StatusCode::from_u16(self.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        (status, axum::response::Json(self.to_response())).into_response()
    }
}
