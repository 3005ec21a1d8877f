// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Environment-driven gateway configuration

use std::env;

/// Admission budget for one logical route.
#[derive(Debug, Clone, Copy)]
pub struct RouteLimit {
    pub limit: u32,
    pub window_ms: u64,
}

#[derive(Debug, Clone)]
pub struct GatewayConfig {
    pub api_port: u16,
    pub upstream_endpoint: String,
    pub upstream_api_key: String,
    pub text_model: String,
    pub image_model: String,
    pub upstream_timeout_secs: u64,
    pub text_limit: RouteLimit,
    pub image_limit: RouteLimit,
    pub extra_blocked_terms: Vec<String>,
}

impl GatewayConfig {
    /// Read configuration from the environment, falling back to defaults
    /// for everything except the API key (which stays empty and triggers a
    /// startup warning; upstream calls will fail until it is set).
    pub fn from_env() -> Self {
        let api_port = env::var("API_PORT")
            .ok()
            .and_then(|v| v.parse::<u16>().ok())
            .unwrap_or(8080);

        let upstream_endpoint = env::var("UPSTREAM_ENDPOINT")
            .unwrap_or_else(|_| "https://api.openai.com".to_string());
        let upstream_api_key = env::var("UPSTREAM_API_KEY").unwrap_or_default();

        let text_model = env::var("TEXT_MODEL").unwrap_or_else(|_| "gpt-3.5-turbo".to_string());
        let image_model = env::var("IMAGE_MODEL").unwrap_or_else(|_| "dall-e-3".to_string());

        let upstream_timeout_secs = env::var("UPSTREAM_TIMEOUT_SECS")
            .ok()
            .and_then(|v| v.parse::<u64>().ok())
            .unwrap_or(120);

        let window_ms = env::var("RATE_LIMIT_WINDOW_MS")
            .ok()
            .and_then(|v| v.parse::<u64>().ok())
            .unwrap_or(60_000);
        let text_limit = RouteLimit {
            limit: env::var("TEXT_RATE_LIMIT")
                .ok()
                .and_then(|v| v.parse::<u32>().ok())
                .unwrap_or(5),
            window_ms,
        };
        let image_limit = RouteLimit {
            limit: env::var("IMAGE_RATE_LIMIT")
                .ok()
                .and_then(|v| v.parse::<u32>().ok())
                .unwrap_or(3),
            window_ms,
        };

        let extra_blocked_terms = env::var("EXTRA_BLOCKED_TERMS")
            .map(|v| {
                v.split(',')
                    .map(str::trim)
                    .filter(|t| !t.is_empty())
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default();

        Self {
            api_port,
            upstream_endpoint,
            upstream_api_key,
            text_model,
            image_model,
            upstream_timeout_secs,
            text_limit,
            image_limit,
            extra_blocked_terms,
        }
    }
}
