// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! Fan-in point serializing every per-key processor onto the terminal callbacks.
//!
//! [`Merge`] owns the only handles to `on_next`, `on_error` and `on_complete`.
//! All three are invoked while holding one reentrant lock, so:
//!
//! - `on_next` is never called concurrently, whichever processor emits
//! - a terminal transition and its callback are atomic with respect to
//!   [`quiesce`](Merge::quiesce); once `quiesce` returns after the lifecycle
//!   left `Active`, no terminal callback runs again
//! - a callback may dispose its own subscription without deadlocking
//!
//! Handler failures never reach `on_error`. They go through
//! [`report`](Merge::report) to the log and the optional observer.

use parking_lot::ReentrantMutex;
use rivulet_core::{panic_message, Lifecycle, RivuletError};
use std::cell::RefCell;
use std::fmt;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

type NextFn<T> = Box<dyn FnMut(T) + Send>;
type ErrorFn = Box<dyn FnOnce(RivuletError) + Send>;
type CompleteFn = Box<dyn FnOnce() + Send>;

/// Observer of isolated handler failures.
pub type ErrorObserver = Arc<dyn Fn(&RivuletError) + Send + Sync>;

struct Callbacks<T> {
    on_next: NextFn<T>,
    on_error: Option<ErrorFn>,
    on_complete: Option<CompleteFn>,
}

/// Serialized delivery of merged output to one subscriber.
pub struct Merge<T> {
    lifecycle: Arc<Lifecycle>,
    callbacks: ReentrantMutex<RefCell<Callbacks<T>>>,
    error_observer: Option<ErrorObserver>,
    delivered: AtomicU64,
}

impl<T> Merge<T> {
    pub fn new<N, E>(lifecycle: Arc<Lifecycle>, on_next: N, on_error: E) -> Self
    where
        N: FnMut(T) + Send + 'static,
        E: FnOnce(RivuletError) + Send + 'static,
    {
        Self {
            lifecycle,
            callbacks: ReentrantMutex::new(RefCell::new(Callbacks {
                on_next: Box::new(on_next),
                on_error: Some(Box::new(on_error)),
                on_complete: None,
            })),
            error_observer: None,
            delivered: AtomicU64::new(0),
        }
    }

    #[must_use]
    pub fn with_on_complete<C>(mut self, on_complete: C) -> Self
    where
        C: FnOnce() + Send + 'static,
    {
        self.callbacks.get_mut().get_mut().on_complete = Some(Box::new(on_complete));
        self
    }

    #[must_use]
    pub fn with_error_observer(mut self, observer: Option<ErrorObserver>) -> Self {
        self.error_observer = observer;
        self
    }

    pub fn lifecycle(&self) -> &Arc<Lifecycle> {
        &self.lifecycle
    }

    /// Delivers one value to `on_next`.
    ///
    /// Returns `false` without calling anything when the run is no longer
    /// active, or when called re-entrantly from inside `on_next`. A panicking
    /// `on_next` fails the run with [`RivuletError::Task`].
    pub fn emit(&self, value: T) -> bool {
        let guard = self.callbacks.lock();
        if !self.lifecycle.is_active() {
            return false;
        }
        let Ok(mut callbacks) = guard.try_borrow_mut() else {
            return false;
        };
        let outcome = catch_unwind(AssertUnwindSafe(|| (callbacks.on_next)(value)));
        drop(callbacks);

        match outcome {
            Ok(()) => {
                self.delivered.fetch_add(1, Ordering::Relaxed);
                true
            }
            Err(panic) => {
                let message = panic_message(panic.as_ref());
                self.fail(RivuletError::task_error(format!("on_next panicked: {message}")));
                false
            }
        }
    }

    /// Terminates the run with a fatal error.
    ///
    /// Only the first terminal transition wins; `on_error` runs at most once.
    pub fn fail(&self, error: RivuletError) -> bool {
        let guard = self.callbacks.lock();
        if !self.lifecycle.fail() {
            return false;
        }
        error!("pipeline failed: {}", error);
        let on_error = guard
            .try_borrow_mut()
            .ok()
            .and_then(|mut callbacks| callbacks.on_error.take());
        if let Some(on_error) = on_error {
            on_error(error);
        }
        true
    }

    /// Terminates the run normally after a bounded source drained.
    pub fn complete(&self) -> bool {
        let guard = self.callbacks.lock();
        if !self.lifecycle.complete() {
            return false;
        }
        info!("pipeline completed after {} deliveries", self.delivered());
        let on_complete = guard
            .try_borrow_mut()
            .ok()
            .and_then(|mut callbacks| callbacks.on_complete.take());
        if let Some(on_complete) = on_complete {
            on_complete();
        }
        true
    }

    /// Side channel for isolated failures; the run keeps going.
    pub fn report(&self, error: RivuletError) {
        if !self.lifecycle.is_active() {
            return;
        }
        warn!("{}", error);
        if let Some(observer) = &self.error_observer {
            observer(&error);
        }
    }

    /// Waits for any callback in flight on another thread to return.
    ///
    /// Reentrant: a no-op when called from inside a callback.
    pub fn quiesce(&self) {
        drop(self.callbacks.lock());
    }

    /// Number of values handed to `on_next` so far.
    pub fn delivered(&self) -> u64 {
        self.delivered.load(Ordering::Relaxed)
    }
}

impl<T> fmt::Debug for Merge<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Merge")
            .field("state", &self.lifecycle.state())
            .field("delivered", &self.delivered())
            .finish_non_exhaustive()
    }
}
