// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Error types for upstream provider calls

use thiserror::Error;

/// Failures reported by the upstream generative provider or the transport
/// to it. `RateLimited` is kept separate from every other variant so the
/// pipeline can distinguish the provider's own quota exhaustion from this
/// gateway's limiter.
#[derive(Debug, Error)]
pub enum UpstreamError {
    #[error("upstream provider rate limited the request: {0}")]
    RateLimited(String),

    #[error("upstream provider refused the prompt on safety grounds: {0}")]
    SafetyRefused(String),

    #[error("upstream response contained no decodable payload")]
    EmptyResult,

    #[error("failed to decode upstream payload: {0}")]
    Decode(String),

    #[error("upstream provider returned {status}: {body}")]
    Api { status: u16, body: String },

    #[error("upstream transport error: {0}")]
    Http(#[from] reqwest::Error),
}

impl UpstreamError {
    /// Classify a non-success provider response. 429 is the provider's own
    /// quota; a content-policy refusal keeps its own variant so the caller
    /// can answer with the safety status instead of a server error. OpenAI
    /// reports refusals as a 400 whose body carries the
    /// `content_policy_violation` code or a "safety system" message.
    pub fn from_status(status: u16, body: String) -> Self {
        if status == 429 {
            return UpstreamError::RateLimited(body);
        }
        let lowered = body.to_lowercase();
        if lowered.contains("content_policy_violation") || lowered.contains("safety") {
            return UpstreamError::SafetyRefused(body);
        }
        UpstreamError::Api { status, body }
    }
}

pub type UpstreamResult<T> = std::result::Result<T, UpstreamError>;
