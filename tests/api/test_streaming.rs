// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Tests for the stream relay and generation session states

use bytes::Bytes;
use futures_util::StreamExt;
use promptgate::api::streaming::{relay, GenerationSession, SessionState};
use promptgate::upstream::{TextStream, UpstreamError};
use std::time::Duration;
use tokio_util::sync::CancellationToken;

#[tokio::test]
async fn test_relay_forwards_fragments_in_order() {
    let (tx, stream) = TextStream::channel(8);
    tokio::spawn(async move {
        for fragment in ["first ", "second ", "third"] {
            tx.send(Ok(Bytes::from(fragment))).await.unwrap();
        }
    });

    let (mut relayed, _abort) = relay(stream);

    let mut collected = String::new();
    while let Some(item) = relayed.next().await {
        collected.push_str(std::str::from_utf8(&item.unwrap()).unwrap());
    }
    assert_eq!(collected, "first second third");
}

#[tokio::test]
async fn test_cancellation_terminates_without_error() {
    let (tx, stream) = TextStream::channel(8);
    let upstream_token = stream.cancellation_token();

    tx.send(Ok(Bytes::from("partial "))).await.unwrap();

    let (mut relayed, cancel) = relay(stream);

    // Partial output arrives first
    let first = relayed.next().await.unwrap().unwrap();
    assert_eq!(&first[..], b"partial ");

    cancel.cancel();

    // The outbound channel ends cleanly: no error item, just termination
    while let Some(item) = relayed.next().await {
        assert!(item.is_ok(), "cancellation must not surface as an error");
    }

    // Cancellation propagated upstream so the provider stream is released
    tokio::time::timeout(Duration::from_secs(1), async {
        while !upstream_token.is_cancelled() {
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    })
    .await
    .expect("upstream stream should be cancelled");

    // No further fragments are consumed after cancellation was observed
    assert!(tx.send(Ok(Bytes::from("late"))).await.is_err() || relayed.next().await.is_none());
}

#[tokio::test]
async fn test_client_disconnect_cancels_upstream() {
    let (tx, stream) = TextStream::channel(8);
    let upstream_token = stream.cancellation_token();

    let (relayed, _abort) = relay(stream);
    drop(relayed); // client went away

    // The next fragment cannot be delivered; the relay must react by
    // cancelling the upstream stream.
    let _ = tx.send(Ok(Bytes::from("undeliverable"))).await;

    tokio::time::timeout(Duration::from_secs(1), async {
        while !upstream_token.is_cancelled() {
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    })
    .await
    .expect("upstream stream should be cancelled after disconnect");
}

#[tokio::test]
async fn test_upstream_error_closes_channel_abnormally() {
    let (tx, stream) = TextStream::channel(8);
    tokio::spawn(async move {
        tx.send(Ok(Bytes::from("sent before failure"))).await.unwrap();
        tx.send(Err(UpstreamError::Decode("bad chunk".to_string())))
            .await
            .unwrap();
    });

    let (mut relayed, _abort) = relay(stream);

    // Fragments already relayed are not retracted
    let first = relayed.next().await.unwrap().unwrap();
    assert_eq!(&first[..], b"sent before failure");

    let second = relayed.next().await.unwrap();
    assert!(second.is_err(), "upstream failure must close abnormally");
    assert!(relayed.next().await.is_none());
}

#[test]
fn test_session_state_transitions() {
    let mut session = GenerationSession::new(CancellationToken::new());
    assert_eq!(session.state(), SessionState::Pending);
    assert_eq!(session.fragments_sent(), 0);

    session.record_fragment(b"hello");
    assert_eq!(session.state(), SessionState::Streaming);
    assert_eq!(session.fragments_sent(), 1);
    assert_eq!(session.bytes_sent(), 5);

    session.complete();
    assert_eq!(session.state(), SessionState::Completed);
}

#[test]
fn test_session_abort_and_fail_are_distinct() {
    let mut aborted = GenerationSession::new(CancellationToken::new());
    aborted.abort();
    assert_eq!(aborted.state(), SessionState::Aborted);

    let mut failed = GenerationSession::new(CancellationToken::new());
    failed.fail();
    assert_eq!(failed.state(), SessionState::Failed);
}
