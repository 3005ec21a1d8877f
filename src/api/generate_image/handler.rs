// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! POST /v1/image/generate — single-shot image generation

use axum::body::{Body, Bytes};
use axum::extract::State;
use axum::http::{header, HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use tracing::error;

use crate::api::http_server::{client_identity, AppState};

/// Accepts `{"prompt": string, "size"?: 512|768}` and answers with raw PNG
/// bytes. The result is cacheable long-term. Unlike text generation there
/// is no mid-flight cancellation; an abandoned exchange just discards the
/// payload on arrival.
pub async fn generate_image_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let raw = serde_json::from_slice(&body).unwrap_or(serde_json::Value::Null);
    let identity = client_identity(&headers);

    match state.api_server.handle_image_request(&raw, &identity).await {
        Ok(image) => {
            let response = Response::builder()
                .status(StatusCode::OK)
                .header(header::CONTENT_TYPE, "image/png")
                .header(header::CACHE_CONTROL, "public, max-age=31536000")
                .body(Body::from(image));

            match response {
                Ok(resp) => resp,
                Err(e) => {
                    error!("failed to build image response: {}", e);
                    StatusCode::INTERNAL_SERVER_ERROR.into_response()
                }
            }
        }
        Err(e) => e.into_response(),
    }
}
