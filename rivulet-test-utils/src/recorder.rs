// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! Shared sink for callback-driven tests.

use parking_lot::Mutex;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::{sleep, Instant};

/// Records every value handed to its sinks, in call order.
///
/// Clones share the same storage.
#[derive(Debug)]
pub struct Recorder<T> {
    values: Arc<Mutex<Vec<T>>>,
}

impl<T: Send + 'static> Recorder<T> {
    pub fn new() -> Self {
        Self {
            values: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// A callback appending to this recorder.
    pub fn sink(&self) -> impl FnMut(T) + Send + 'static {
        let values = Arc::clone(&self.values);
        move |value| values.lock().push(value)
    }

    pub fn len(&self) -> usize {
        self.values.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.lock().is_empty()
    }

    /// Polls until at least `count` values were recorded.
    ///
    /// Returns `false` if `timeout_ms` elapsed first. Under a paused Tokio
    /// clock the wait advances virtual time.
    pub async fn wait_for_len(&self, count: usize, timeout_ms: u64) -> bool {
        let deadline = Instant::now() + Duration::from_millis(timeout_ms);
        loop {
            if self.len() >= count {
                return true;
            }
            if Instant::now() >= deadline {
                return false;
            }
            sleep(Duration::from_millis(1)).await;
        }
    }
}

impl<T: Clone + Send + 'static> Recorder<T> {
    /// Snapshot of the recorded values.
    pub fn values(&self) -> Vec<T> {
        self.values.lock().clone()
    }
}

impl<T> Clone for Recorder<T> {
    fn clone(&self) -> Self {
        Self {
            values: Arc::clone(&self.values),
        }
    }
}

impl<T: Send + 'static> Default for Recorder<T> {
    fn default() -> Self {
        Self::new()
    }
}
