// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use futures::stream::StreamExt;
use futures::Stream;
use std::time::Duration;
use tokio::sync::mpsc::UnboundedReceiver;
use tokio::time::{sleep, timeout};

/// Panics if `stream` yields anything within `timeout_ms`.
pub async fn assert_no_element_emitted<S, T>(stream: &mut S, timeout_ms: u64)
where
    S: Stream<Item = T> + Unpin,
{
    tokio::select! {
        _item = stream.next() => {
            panic!("Unexpected element emitted, expected no output.");
        }
        _ = sleep(Duration::from_millis(timeout_ms)) => {
        }
    }
}

/// Receives the next message, or `None` once `timeout_ms` elapsed or the
/// channel closed.
pub async fn recv_within<T>(rx: &mut UnboundedReceiver<T>, timeout_ms: u64) -> Option<T> {
    timeout(Duration::from_millis(timeout_ms), rx.recv())
        .await
        .ok()
        .flatten()
}

/// Panics if a message arrives on `rx` within `timeout_ms`.
pub async fn assert_no_message_received<T>(rx: &mut UnboundedReceiver<T>, timeout_ms: u64) {
    if let Ok(Some(_)) = timeout(Duration::from_millis(timeout_ms), rx.recv()).await {
        panic!("Unexpected message received, expected silence.");
    }
}
