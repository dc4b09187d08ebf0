// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! Test utilities and fixtures for the rivulet workspace.
//!
//! Intended for development and testing only.
//!
//! # Key pieces
//!
//! - [`Recorder`]: a thread-safe sink to hand to `on_next` (or any callback)
//!   that tests can inspect and wait on
//! - [`transactions`]: the transaction fixture used across the workspace,
//!   `amount = tick * 150` and `origin = "Bank{tick % 3}"`, plus the expected
//!   output of the canonical filter/scale chain
//! - [`helpers`]: timeout-bounded receive and "nothing arrives" assertions
//! - [`test_channel`]: a sender plus a `StreamItem` stream for driving
//!   stream extensions by hand
//!
//! # Example
//!
//! ```rust
//! use rivulet_test_utils::Recorder;
//!
//! let recorder = Recorder::new();
//! let mut sink = recorder.sink();
//! sink(1);
//! sink(2);
//!
//! assert_eq!(recorder.values(), vec![1, 2]);
//! ```

#![allow(clippy::multiple_crate_versions, clippy::doc_markdown)]
pub mod helpers;
pub mod recorder;
pub mod transactions;

use futures::{Stream, StreamExt};
use rivulet_core::StreamItem;
use tokio::sync::mpsc;
use tokio_stream::wrappers::UnboundedReceiverStream;

pub use helpers::{assert_no_element_emitted, recv_within};
pub use recorder::Recorder;
pub use transactions::{transaction, InjectedError};

/// Creates a test channel that wraps every sent value in `StreamItem::Value`.
///
/// ```rust
/// use rivulet_test_utils::test_channel;
/// use futures::StreamExt;
///
/// # async fn example() {
/// let (tx, mut stream) = test_channel();
/// tx.send(42).unwrap();
/// let item = stream.next().await.unwrap();
/// assert_eq!(item.ok(), Some(42));
/// # }
/// ```
pub fn test_channel<T: Send + 'static>() -> (
    mpsc::UnboundedSender<T>,
    impl Stream<Item = StreamItem<T>> + Send,
) {
    let (tx, rx) = mpsc::unbounded_channel();
    let stream = UnboundedReceiverStream::new(rx).map(StreamItem::Value);
    (tx, stream)
}

/// Creates a test channel that accepts `StreamItem<T>` for error propagation tests.
pub fn test_channel_with_errors<T: Send + 'static>() -> (
    mpsc::UnboundedSender<StreamItem<T>>,
    impl Stream<Item = StreamItem<T>> + Send,
) {
    let (tx, rx) = mpsc::unbounded_channel();
    let stream = UnboundedReceiverStream::new(rx);
    (tx, stream)
}
