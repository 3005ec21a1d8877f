// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Reqwest client for an OpenAI-compatible generation provider

use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use bytes::Bytes;
use futures::StreamExt;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use super::error::{UpstreamError, UpstreamResult};
use super::sse::{parse_sse_line, SseEvent, SseLineBuffer};
use super::{GenerationBackend, ImageSize, TextStream};

/// Buffer depth for the fragment channel between the upstream reader task
/// and the relay.
const FRAGMENT_CHANNEL_CAPACITY: usize = 64;

#[derive(Debug, Deserialize)]
struct ImageApiResponse {
    data: Vec<ImageApiData>,
}

#[derive(Debug, Deserialize)]
struct ImageApiData {
    b64_json: Option<String>,
}

/// Client for the upstream OpenAI-compatible API. Translates one validated
/// request into exactly one upstream call and normalizes the result shape.
pub struct UpstreamClient {
    client: Client,
    endpoint: String,
    api_key: String,
    text_model: String,
    image_model: String,
}

impl UpstreamClient {
    pub fn new(
        endpoint: &str,
        api_key: &str,
        text_model: &str,
        image_model: &str,
        timeout_secs: u64,
    ) -> UpstreamResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()?;

        let endpoint = endpoint.trim_end_matches('/').to_string();
        info!(
            "upstream client configured: endpoint={}, text_model={}, image_model={}",
            endpoint, text_model, image_model
        );

        Ok(Self {
            client,
            endpoint,
            api_key: api_key.to_string(),
            text_model: text_model.to_string(),
            image_model: image_model.to_string(),
        })
    }

    async fn classify_failure(response: reqwest::Response) -> UpstreamError {
        let status = response.status().as_u16();
        let body = response.text().await.unwrap_or_default();
        UpstreamError::from_status(status, body)
    }
}

#[async_trait]
impl GenerationBackend for UpstreamClient {
    /// Probe whether the upstream API answers at all.
    async fn health_check(&self) -> bool {
        match self
            .client
            .get(format!("{}/v1/models", self.endpoint))
            .bearer_auth(&self.api_key)
            .send()
            .await
        {
            Ok(resp) => resp.status().is_success(),
            Err(e) => {
                debug!("upstream health check failed: {}", e);
                false
            }
        }
    }

    async fn generate_text(&self, prompt: &str) -> UpstreamResult<TextStream> {
        let body = serde_json::json!({
            "model": self.text_model,
            "messages": [{"role": "user", "content": prompt}],
            "stream": true,
        });

        let url = format!("{}/v1/chat/completions", self.endpoint);
        debug!("text generation POST {}", url);

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(Self::classify_failure(response).await);
        }

        let (tx, rx) = mpsc::channel(FRAGMENT_CHANNEL_CAPACITY);
        let cancel = CancellationToken::new();
        let token = cancel.clone();
        let mut byte_stream = response.bytes_stream();

        tokio::spawn(async move {
            let mut lines = SseLineBuffer::new();
            loop {
                let chunk = tokio::select! {
                    _ = token.cancelled() => {
                        // Dropping the byte stream tears down the upstream
                        // connection, which is the only cancellation signal
                        // the provider understands.
                        debug!("text stream cancelled, releasing upstream connection");
                        return;
                    }
                    chunk = byte_stream.next() => chunk,
                };

                match chunk {
                    Some(Ok(bytes)) => {
                        for line in lines.push(&bytes) {
                            match parse_sse_line(&line) {
                                Ok(SseEvent::Fragment(text)) => {
                                    if tx.send(Ok(Bytes::from(text))).await.is_err() {
                                        return;
                                    }
                                }
                                Ok(SseEvent::Done) => return,
                                Ok(SseEvent::Ignored) => {}
                                Err(e) => {
                                    warn!("text stream decode error: {}", e);
                                    let _ = tx.send(Err(e)).await;
                                    return;
                                }
                            }
                        }
                    }
                    Some(Err(e)) => {
                        warn!("text stream transport error: {}", e);
                        let _ = tx.send(Err(UpstreamError::Http(e))).await;
                        return;
                    }
                    None => return,
                }
            }
        });

        Ok(TextStream::new(rx, cancel))
    }

    async fn generate_image(&self, prompt: &str, size: ImageSize) -> UpstreamResult<Vec<u8>> {
        let body = serde_json::json!({
            "model": self.image_model,
            "prompt": prompt,
            "n": 1,
            "size": size.upstream_size(),
            "response_format": "b64_json",
        });

        let url = format!("{}/v1/images/generations", self.endpoint);
        debug!(
            "image generation POST {} (logical size {})",
            url,
            size.logical_units()
        );

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(Self::classify_failure(response).await);
        }

        let api_response: ImageApiResponse = response.json().await?;
        let first = api_response
            .data
            .into_iter()
            .next()
            .ok_or(UpstreamError::EmptyResult)?;
        let b64 = first.b64_json.ok_or(UpstreamError::EmptyResult)?;

        BASE64
            .decode(b64)
            .map_err(|e| UpstreamError::Decode(format!("bad image payload: {e}")))
    }
}
