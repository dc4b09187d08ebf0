// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! Per-key processing loop.

use crate::merge::Merge;
use futures::channel::mpsc::UnboundedReceiver;
use futures::future::{select, Either};
use futures::StreamExt;
use rivulet_core::{panic_message, BoxError, CancellationToken, RivuletError};
use std::fmt::Debug;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::task::JoinHandle;

/// Handler applied to every value of one key's sub-stream.
///
/// Its output is forwarded to the merge point. A failure, returned or
/// panicked, is isolated to that single value.
pub type KeyHandler<K, T> = Arc<dyn Fn(&K, T) -> Result<T, BoxError> + Send + Sync>;

/// Spawns the processor owning `queue`.
///
/// The task dequeues in FIFO order until the queue is closed and drained or
/// `cancel` fires, then raises `completed`.
pub(crate) fn spawn_processor<T, K>(
    key: K,
    mut queue: UnboundedReceiver<T>,
    handler: KeyHandler<K, T>,
    merge: Arc<Merge<T>>,
    cancel: CancellationToken,
    completed: Arc<AtomicBool>,
) -> JoinHandle<()>
where
    T: Send + 'static,
    K: Debug + Send + Sync + 'static,
{
    tokio::spawn(async move {
        while let Either::Left((Some(value), _)) = select(queue.next(), cancel.cancelled()).await {
            if cancel.is_cancelled() {
                break;
            }

            match catch_unwind(AssertUnwindSafe(|| handler(&key, value))) {
                Ok(Ok(output)) => {
                    merge.emit(output);
                }
                Ok(Err(e)) => merge.report(RivuletError::handler_error(format!("{key:?}"), e)),
                Err(panic) => merge.report(RivuletError::handler_error(
                    format!("{key:?}"),
                    format!("handler panicked: {}", panic_message(panic.as_ref())),
                )),
            }
        }

        completed.store(true, Ordering::Release);
        debug!("processor for key {:?} exited", key);
    })
}
