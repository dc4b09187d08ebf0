// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use rivulet_core::{Lifecycle, LifecycleState, RivuletTask};
use std::fmt;
use std::sync::Arc;

/// Handle to one active run of a pipeline.
///
/// The subscription owns the task driving the clock source; that task in turn
/// owns every sub-stream. All of them stop on the lifecycle's shared
/// cancellation token.
///
/// # Disposal
///
/// [`dispose`](Self::dispose) is idempotent and callable from any thread,
/// including from inside the subscriber's own callbacks. Once it returns no
/// `on_next`, `on_error` or `on_complete` call starts. Handler code already
/// running on a processor may finish, but its output is discarded.
///
/// Dropping the subscription disposes it.
pub struct Subscription {
    lifecycle: Arc<Lifecycle>,
    _driver: RivuletTask,
    quiesce: Arc<dyn Fn() + Send + Sync>,
}

impl Subscription {
    pub(crate) fn new<Q>(lifecycle: Arc<Lifecycle>, driver: RivuletTask, quiesce: Q) -> Self
    where
        Q: Fn() + Send + Sync + 'static,
    {
        Self {
            lifecycle,
            _driver: driver,
            quiesce: Arc::new(quiesce),
        }
    }

    /// Stops the run.
    ///
    /// Returns `true` if this call moved the run to `Disposed`, `false` if it
    /// had already terminated. Either way it waits for any terminal callback
    /// in flight on another thread before returning.
    pub fn dispose(&self) -> bool {
        let disposed = self.lifecycle.dispose();
        (self.quiesce)();
        if disposed {
            info!("subscription disposed");
        }
        disposed
    }

    pub fn state(&self) -> LifecycleState {
        self.lifecycle.state()
    }

    pub fn is_active(&self) -> bool {
        self.lifecycle.is_active()
    }

    pub fn is_disposed(&self) -> bool {
        self.lifecycle.state() == LifecycleState::Disposed
    }

    /// Resolves once the run reached a terminal state and its terminal
    /// callback, if any, returned.
    ///
    /// Waiting for a callback still running on another thread happens on
    /// Tokio's blocking pool, so a slow `on_next` never parks a runtime worker.
    pub async fn closed(&self) -> LifecycleState {
        let token = self.lifecycle.token();
        token.cancelled().await;

        let quiesce = Arc::clone(&self.quiesce);
        if tokio::task::spawn_blocking(move || quiesce()).await.is_err() {
            (self.quiesce)();
        }
        self.lifecycle.state()
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.dispose();
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("state", &self.state())
            .finish_non_exhaustive()
    }
}
