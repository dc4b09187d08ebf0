// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! Background task spawning with cooperative cancellation.

use crate::CancellationToken;
use std::future::Future;
use tokio::task::JoinHandle;

/// Task handle with automatic cancellation on drop.
///
/// The spawned future receives a [`CancellationToken`] it is expected to
/// check at every suspension point. Dropping the handle signals the token;
/// the task stops at its next checkpoint. Nothing is forcibly aborted.
///
/// # Example
///
/// ```rust
/// use rivulet_core::{CancellationToken, RivuletTask};
///
/// # #[tokio::main]
/// # async fn main() {
/// let token = CancellationToken::new();
/// let (done_tx, done_rx) = tokio::sync::oneshot::channel();
/// let task = RivuletTask::spawn_with(token.clone(), |cancel| async move {
///     cancel.cancelled().await;
///     let _ = done_tx.send(());
/// });
///
/// drop(task);
/// assert!(token.is_cancelled());
/// done_rx.await.unwrap();
/// # }
/// ```
#[derive(Debug)]
pub struct RivuletTask {
    cancel: CancellationToken,
    _handle: JoinHandle<()>,
}

impl RivuletTask {
    /// Spawn a background task bound to an existing cancellation token.
    ///
    /// Used when several tasks must stop on the same broadcast signal.
    pub fn spawn_with<F, Fut>(cancel: CancellationToken, f: F) -> Self
    where
        F: FnOnce(CancellationToken) -> Fut + Send + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        let future = f(cancel.clone());
        let handle = tokio::spawn(future);

        Self {
            cancel,
            _handle: handle,
        }
    }
}

impl Drop for RivuletTask {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}
