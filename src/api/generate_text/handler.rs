// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! POST /v1/text/generate — streamed text generation

use axum::body::{Body, Bytes};
use axum::extract::State;
use axum::http::{header, HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use tracing::error;

use crate::api::http_server::{client_identity, AppState};
use crate::api::streaming::relay;

/// Accepts `{"prompt": string}` and answers with an incrementally written
/// plain-text stream. The response is never cacheable; fragments are
/// forwarded as the provider produces them and the exchange ends early if
/// the client disconnects.
pub async fn generate_text_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let raw = serde_json::from_slice(&body).unwrap_or(serde_json::Value::Null);
    let identity = client_identity(&headers);

    match state.api_server.handle_text_request(&raw, &identity).await {
        Ok(stream) => {
            // Disconnect detection closes the relay; the abort handle is
            // only for callers that stop a stream independently.
            let (fragment_stream, _abort) = relay(stream);
            let response = Response::builder()
                .status(StatusCode::OK)
                .header(header::CONTENT_TYPE, "text/plain; charset=utf-8")
                .header(header::CACHE_CONTROL, "no-cache")
                .body(Body::from_stream(fragment_stream));

            match response {
                Ok(resp) => resp,
                Err(e) => {
                    error!("failed to build streaming response: {}", e);
                    StatusCode::INTERNAL_SERVER_ERROR.into_response()
                }
            }
        }
        Err(e) => e.into_response(),
    }
}
