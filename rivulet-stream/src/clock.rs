// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! Periodic clock source, the only originator of data in a pipeline.
//!
//! A [`ClockSource`] pairs a period with a generator `g(tick) -> T`. Its
//! [`ticks`](ClockSource::ticks) stream yields `g(0)`, `g(1)`, ... one per
//! period, the first one period after the stream is created.
//!
//! ## Characteristics
//!
//! - **Cold**: every call to `ticks` starts again from tick 0
//! - **Infinite** unless [`with_limit`](ClockSource::with_limit) bounds it
//! - **Fail-fast**: a generator failure is yielded once as
//!   `StreamItem::Error(RivuletError::Source { .. })` and the stream ends
//! - **Cancellable**: the stream ends as soon as the token is cancelled, even
//!   while waiting for the next tick
//!
//! ## Example
//!
//! ```
//! use rivulet_core::{CancellationToken, StreamItem};
//! use rivulet_stream::ClockSource;
//! use futures::StreamExt;
//! use std::time::Duration;
//!
//! # #[tokio::main(flavor = "current_thread", start_paused = true)]
//! # async fn main() {
//! let source = ClockSource::new(Duration::from_millis(100), |tick| tick * 150).with_limit(3);
//!
//! let amounts: Vec<u64> = source
//!     .ticks(CancellationToken::new())
//!     .filter_map(|item| async move { item.ok() })
//!     .collect()
//!     .await;
//!
//! assert_eq!(amounts, vec![0, 150, 300]);
//! # }
//! ```

use futures::future::{select, Either};
use futures::{stream, Stream};
use rivulet_core::{BoxError, CancellationToken, RivuletError, StreamItem};
use std::fmt;
use std::pin::pin;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::{self, Instant, Interval};

type Generator<T> = Arc<dyn Fn(u64) -> Result<T, BoxError> + Send + Sync>;

/// Smallest period the timer accepts.
const MIN_PERIOD: Duration = Duration::from_nanos(1);

/// Fixed-period generator of values.
pub struct ClockSource<T> {
    period: Duration,
    generator: Generator<T>,
    limit: Option<u64>,
}

impl<T: Send + 'static> ClockSource<T> {
    /// Source with an infallible generator.
    pub fn new<F>(period: Duration, generator: F) -> Self
    where
        F: Fn(u64) -> T + Send + Sync + 'static,
    {
        Self {
            period,
            generator: Arc::new(move |tick| -> Result<T, BoxError> { Ok(generator(tick)) }),
            limit: None,
        }
    }

    /// Source whose generator may fail; the first failure ends the stream.
    pub fn try_new<F, E>(period: Duration, generator: F) -> Self
    where
        F: Fn(u64) -> Result<T, E> + Send + Sync + 'static,
        E: Into<BoxError>,
    {
        Self {
            period,
            generator: Arc::new(move |tick| -> Result<T, BoxError> {
                generator(tick).map_err(Into::into)
            }),
            limit: None,
        }
    }

    /// Bounds the source to ticks `0..limit`, after which it completes.
    #[must_use]
    pub fn with_limit(mut self, limit: u64) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn period(&self) -> Duration {
        self.period
    }

    pub fn limit(&self) -> Option<u64> {
        self.limit
    }

    /// Starts the timer and returns the stream of generated values.
    ///
    /// Must be called inside a Tokio runtime with the time driver enabled.
    pub fn ticks(
        &self,
        cancel: CancellationToken,
    ) -> impl Stream<Item = StreamItem<T>> + Send + 'static {
        let period = self.period.max(MIN_PERIOD);
        let state = TickState {
            ticker: time::interval_at(Instant::now() + period, period),
            next: 0,
            limit: self.limit,
            generator: Arc::clone(&self.generator),
            cancel,
            halted: false,
        };

        stream::unfold(state, |mut state| async move {
            if state.halted || state.limit.is_some_and(|limit| state.next >= limit) {
                return None;
            }

            {
                let tick = pin!(state.ticker.tick());
                let cancelled = pin!(state.cancel.cancelled());
                if let Either::Right(_) = select(tick, cancelled).await {
                    return None;
                }
            }
            if state.cancel.is_cancelled() {
                return None;
            }

            let tick = state.next;
            state.next += 1;
            match (state.generator)(tick) {
                Ok(value) => {
                    debug!("clock emitted tick {}", tick);
                    Some((StreamItem::Value(value), state))
                }
                Err(e) => {
                    state.halted = true;
                    let error = RivuletError::source_error(tick, e);
                    Some((StreamItem::Error(error), state))
                }
            }
        })
    }
}

impl<T> Clone for ClockSource<T> {
    fn clone(&self) -> Self {
        Self {
            period: self.period,
            generator: Arc::clone(&self.generator),
            limit: self.limit,
        }
    }
}

impl<T> fmt::Debug for ClockSource<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClockSource")
            .field("period", &self.period)
            .field("limit", &self.limit)
            .finish_non_exhaustive()
    }
}

struct TickState<T> {
    ticker: Interval,
    next: u64,
    limit: Option<u64>,
    generator: Generator<T>,
    cancel: CancellationToken,
    halted: bool,
}
