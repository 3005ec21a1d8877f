// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Adapter layer for the upstream generative provider

pub mod client;
pub mod error;
pub mod sse;

pub use client::UpstreamClient;
pub use error::{UpstreamError, UpstreamResult};

use async_trait::async_trait;
use bytes::Bytes;
use futures::stream::Stream;
use std::pin::Pin;
use std::task::{Context, Poll};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

/// Logical output sizes a caller may request for image generation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageSize {
    Square512,
    Square768,
}

impl ImageSize {
    /// Map a requested logical size onto a variant; anything outside the
    /// enumerated set is invalid.
    pub fn from_logical(value: u64) -> Option<Self> {
        match value {
            512 => Some(Self::Square512),
            768 => Some(Self::Square768),
            _ => None,
        }
    }

    pub fn logical_units(&self) -> u32 {
        match self {
            Self::Square512 => 512,
            Self::Square768 => 768,
        }
    }

    /// Size string sent upstream. The provider renders at a fixed native
    /// resolution, so both logical sizes currently map to the same request
    /// size; the logical selection is kept on the request for when the
    /// provider grows real resolution options.
    pub fn upstream_size(&self) -> &'static str {
        "1024x1024"
    }
}

impl Default for ImageSize {
    fn default() -> Self {
        Self::Square512
    }
}

/// Lazy, single-consumption sequence of generated text fragments.
///
/// Backed by an mpsc receiver fed by the producer task that reads the
/// upstream stream. Dropping the stream or calling [`TextStream::cancel`]
/// stops the producer and releases the upstream connection.
#[derive(Debug)]
pub struct TextStream {
    receiver: mpsc::Receiver<UpstreamResult<Bytes>>,
    cancel: CancellationToken,
}

impl TextStream {
    pub fn new(receiver: mpsc::Receiver<UpstreamResult<Bytes>>, cancel: CancellationToken) -> Self {
        Self { receiver, cancel }
    }

    /// Channel-backed stream for callers that produce fragments themselves
    /// (mock backends in tests).
    pub fn channel(buffer: usize) -> (mpsc::Sender<UpstreamResult<Bytes>>, Self) {
        let (tx, rx) = mpsc::channel(buffer);
        (tx, Self::new(rx, CancellationToken::new()))
    }

    /// Signal the producer to stop requesting further fragments.
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }

    /// Token observed by the producer side.
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }
}

impl Stream for TextStream {
    type Item = UpstreamResult<Bytes>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        self.receiver.poll_recv(cx)
    }
}

/// Seam between the pipeline and the upstream provider. One implementation
/// talks to the real provider; tests substitute their own.
#[async_trait]
pub trait GenerationBackend: Send + Sync {
    /// Start a streamed text generation. The returned stream yields UTF-8
    /// fragments in production order and terminates with an error on
    /// upstream failure rather than truncating silently.
    async fn generate_text(&self, prompt: &str) -> UpstreamResult<TextStream>;

    /// Generate a single image, returned as a complete decoded payload.
    async fn generate_image(&self, prompt: &str, size: ImageSize) -> UpstreamResult<Vec<u8>>;

    /// Liveness probe for the provider. Backends without a meaningful probe
    /// report healthy.
    async fn health_check(&self) -> bool {
        true
    }
}
