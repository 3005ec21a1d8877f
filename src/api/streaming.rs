// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Relay of upstream text fragments to the outbound response body

use bytes::Bytes;
use futures::StreamExt;
use tokio::sync::mpsc;
use tokio_stream::wrappers::ReceiverStream;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::upstream::TextStream;

/// Buffer between the relay task and the response body writer. Small on
/// purpose; fragments are forwarded as they arrive, not batched.
const RELAY_CHANNEL_CAPACITY: usize = 16;

/// Terminal and transitional states of one in-flight text exchange.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Pending,
    Streaming,
    Completed,
    Aborted,
    Failed,
}

/// One in-flight text generation exchange. Owned by the relay task and
/// destroyed when the HTTP exchange ends.
pub struct GenerationSession {
    state: SessionState,
    cancel: CancellationToken,
    fragments_sent: usize,
    bytes_sent: usize,
}

impl GenerationSession {
    pub fn new(cancel: CancellationToken) -> Self {
        Self {
            state: SessionState::Pending,
            cancel,
            fragments_sent: 0,
            bytes_sent: 0,
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn fragments_sent(&self) -> usize {
        self.fragments_sent
    }

    pub fn bytes_sent(&self) -> usize {
        self.bytes_sent
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }

    pub fn record_fragment(&mut self, fragment: &[u8]) {
        self.state = SessionState::Streaming;
        self.fragments_sent += 1;
        self.bytes_sent += fragment.len();
    }

    pub fn complete(&mut self) {
        self.state = SessionState::Completed;
    }

    /// Cancellation is a successful, user-initiated terminal state, not a
    /// failure.
    pub fn abort(&mut self) {
        self.state = SessionState::Aborted;
    }

    pub fn fail(&mut self) {
        self.state = SessionState::Failed;
    }
}

/// Forward upstream fragments to the outbound channel in arrival order,
/// honoring cancellation.
///
/// The returned stream feeds `axum::body::Body::from_stream`. The returned
/// token stops the relay without waiting for the client to go away; callers
/// that rely on disconnect alone may discard it. Cancellation comes from
/// two places and both stop the relay within one fragment cycle: the token,
/// and the receiver side being dropped when the client disconnects. Either
/// way the upstream stream is cancelled so the provider connection is
/// released, and the outbound channel closes without error. An upstream
/// error closes the outbound channel abnormally; fragments already written
/// stand.
pub fn relay(
    mut fragments: TextStream,
) -> (
    ReceiverStream<Result<Bytes, std::io::Error>>,
    CancellationToken,
) {
    let (tx, rx) = mpsc::channel(RELAY_CHANNEL_CAPACITY);
    let handle = CancellationToken::new();
    let cancel = handle.clone();

    tokio::spawn(async move {
        let mut session = GenerationSession::new(cancel.clone());

        loop {
            let next = tokio::select! {
                _ = cancel.cancelled() => {
                    fragments.cancel();
                    session.abort();
                    debug!("relay cancelled by caller");
                    break;
                }
                next = fragments.next() => next,
            };

            match next {
                Some(Ok(bytes)) => {
                    session.record_fragment(&bytes);
                    if tx.send(Ok(bytes)).await.is_err() {
                        // Outbound side is gone: the client disconnected.
                        fragments.cancel();
                        session.abort();
                        debug!("relay stopped: client disconnected");
                        break;
                    }
                }
                Some(Err(e)) => {
                    session.fail();
                    warn!(
                        fragments = session.fragments_sent(),
                        "upstream stream failed mid-relay: {}", e
                    );
                    let _ = tx
                        .send(Err(std::io::Error::new(
                            std::io::ErrorKind::Other,
                            e.to_string(),
                        )))
                        .await;
                    break;
                }
                None => {
                    session.complete();
                    break;
                }
            }
        }

        info!(
            state = ?session.state(),
            fragments = session.fragments_sent(),
            bytes = session.bytes_sent(),
            "text relay finished"
        );
    });

    (ReceiverStream::new(rx), handle)
}
