// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! Pipeline configuration and subscription.
//!
//! A [`Pipeline`] is pure configuration: a clock source, an operator chain, a
//! key function and a per-key handler. Nothing runs until
//! [`subscribe`](Pipeline::subscribe), and every subscription is an
//! independent run starting again from tick 0.
//!
//! # Example
//!
//! ```
//! use rivulet_core::{Event, RivuletError};
//! use rivulet_exec::Pipeline;
//! use std::time::Duration;
//!
//! # #[tokio::main(flavor = "current_thread", start_paused = true)]
//! # async fn main() -> Result<(), RivuletError> {
//! let pipeline = Pipeline::builder(Duration::from_millis(100), |tick| {
//!     Event::new(tick, tick as f64 * 150.0, format!("Bank{}", tick % 3))
//! })
//! .filter(|event: &Event| event.amount() > 500.0)
//! .map(|event: Event| event.with_amount(event.amount() * 0.1))
//! .limit(10)
//! .group_by(|event: &Event| event.origin().to_string())
//! .process(|_origin: &String, event: Event| event)?;
//!
//! let subscription = pipeline.subscribe(
//!     |event: Event| println!("{event}"),
//!     |error: RivuletError| eprintln!("{error}"),
//! );
//! subscription.closed().await;
//! # Ok(())
//! # }
//! ```

use crate::subscription::Subscription;
use futures::FutureExt;
use futures::StreamExt;
use rivulet_core::{
    panic_message, BoxError, CancellationToken, Lifecycle, Result, RivuletError, RivuletTask,
    StreamItem,
};
use rivulet_stream::{
    ClockSource, ErrorObserver, KeyFn, KeyHandler, KeyedFanOut, Merge, OperatorChain,
    OperatorChainExt, Stage,
};
use std::fmt::{self, Debug};
use std::hash::Hash;
use std::panic::AssertUnwindSafe;
use std::pin::pin;
use std::sync::Arc;
use std::time::Duration;

/// Fully configured, not yet running pipeline.
pub struct Pipeline<T, K> {
    source: ClockSource<T>,
    chain: OperatorChain<T>,
    key_fn: KeyFn<T, K>,
    handler: KeyHandler<K, T>,
    error_observer: Option<ErrorObserver>,
}

impl<T: Send + 'static> Pipeline<T, ()> {
    /// Starts configuring a pipeline around an infallible generator.
    pub fn builder<G>(period: Duration, generator: G) -> PipelineBuilder<T>
    where
        G: Fn(u64) -> T + Send + Sync + 'static,
    {
        PipelineBuilder::new(ClockSource::new(period, generator))
    }

    /// Starts configuring a pipeline around a generator that may fail.
    pub fn try_builder<G, E>(period: Duration, generator: G) -> PipelineBuilder<T>
    where
        G: Fn(u64) -> std::result::Result<T, E> + Send + Sync + 'static,
        E: Into<BoxError>,
    {
        PipelineBuilder::new(ClockSource::try_new(period, generator))
    }
}

impl<T, K> Pipeline<T, K>
where
    T: Send + 'static,
    K: Eq + Hash + Clone + Debug + Send + Sync + 'static,
{
    /// Registers an observer for isolated handler failures.
    ///
    /// Every handler failure is logged at warn level whether or not an
    /// observer is set.
    #[must_use]
    pub fn on_handler_error<F>(mut self, observer: F) -> Self
    where
        F: Fn(&RivuletError) + Send + Sync + 'static,
    {
        self.error_observer = Some(Arc::new(observer));
        self
    }

    pub fn period(&self) -> Duration {
        self.source.period()
    }

    pub fn chain(&self) -> &OperatorChain<T> {
        &self.chain
    }

    /// Starts a run delivering merged output to `on_next`.
    ///
    /// `on_error` fires at most once, and only for a fatal source or stage
    /// failure. `on_next` is never invoked concurrently.
    ///
    /// # Panics
    ///
    /// Panics if called outside a Tokio runtime.
    pub fn subscribe<N, E>(&self, on_next: N, on_error: E) -> Subscription
    where
        N: FnMut(T) + Send + 'static,
        E: FnOnce(RivuletError) + Send + 'static,
    {
        self.start(Merge::new(Arc::new(Lifecycle::new()), on_next, on_error))
    }

    /// Like [`subscribe`](Self::subscribe), with a callback fired once when a
    /// bounded source finished and every sub-stream drained.
    pub fn subscribe_with_completion<N, E, C>(
        &self,
        on_next: N,
        on_error: E,
        on_complete: C,
    ) -> Subscription
    where
        N: FnMut(T) + Send + 'static,
        E: FnOnce(RivuletError) + Send + 'static,
        C: FnOnce() + Send + 'static,
    {
        let merge = Merge::new(Arc::new(Lifecycle::new()), on_next, on_error);
        self.start(merge.with_on_complete(on_complete))
    }

    fn start(&self, merge: Merge<T>) -> Subscription {
        let merge = Arc::new(merge.with_error_observer(self.error_observer.clone()));
        let lifecycle = Arc::clone(merge.lifecycle());
        lifecycle.activate();
        info!("subscribing pipeline with {} stages", self.chain.len());

        let source = self.source.clone();
        let chain = self.chain.clone();
        let key_fn = Arc::clone(&self.key_fn);
        let handler = Arc::clone(&self.handler);
        let driver_merge = Arc::clone(&merge);

        let driver = RivuletTask::spawn_with(lifecycle.token(), move |cancel| async move {
            let merge = Arc::clone(&driver_merge);
            let fan_out = KeyedFanOut::new(key_fn, handler, Arc::clone(&merge), cancel.clone());
            let run = AssertUnwindSafe(drive(source, chain, fan_out, merge, cancel));
            if let Err(panic) = run.catch_unwind().await {
                let message = panic_message(panic.as_ref());
                let error = RivuletError::task_error(format!("pipeline task panicked: {message}"));
                driver_merge.fail(error);
            }
        });

        Subscription::new(lifecycle, driver, move || merge.quiesce())
    }
}

/// Source → chain → fan-out loop run on the clock's task.
async fn drive<T, K>(
    source: ClockSource<T>,
    chain: OperatorChain<T>,
    mut fan_out: KeyedFanOut<T, K>,
    merge: Arc<Merge<T>>,
    cancel: CancellationToken,
) where
    T: Send + 'static,
    K: Eq + Hash + Clone + Debug + Send + Sync + 'static,
{
    let mut upstream = pin!(source.ticks(cancel.clone()).apply_chain(chain));

    while let Some(item) = upstream.next().await {
        if cancel.is_cancelled() {
            return;
        }
        match item {
            StreamItem::Value(value) => fan_out.route(value),
            StreamItem::Error(e) => {
                merge.fail(e);
                return;
            }
        }
    }

    if cancel.is_cancelled() {
        return;
    }
    debug!("source exhausted, draining {} sub-streams", fan_out.len());
    fan_out.close().await;
    merge.complete();
}

impl<T, K> Clone for Pipeline<T, K> {
    fn clone(&self) -> Self {
        Self {
            source: self.source.clone(),
            chain: self.chain.clone(),
            key_fn: Arc::clone(&self.key_fn),
            handler: Arc::clone(&self.handler),
            error_observer: self.error_observer.clone(),
        }
    }
}

impl<T, K> Debug for Pipeline<T, K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Pipeline")
            .field("source", &self.source)
            .field("chain", &self.chain)
            .finish_non_exhaustive()
    }
}

/// Fluent configuration of the source and operator chain.
pub struct PipelineBuilder<T> {
    source: ClockSource<T>,
    chain: OperatorChain<T>,
}

impl<T: Send + 'static> PipelineBuilder<T> {
    fn new(source: ClockSource<T>) -> Self {
        Self {
            source,
            chain: OperatorChain::new(),
        }
    }

    #[must_use]
    pub fn stage(mut self, stage: Stage<T>) -> Self {
        self.chain = self.chain.stage(stage);
        self
    }

    #[must_use]
    pub fn map<F>(self, f: F) -> Self
    where
        F: Fn(T) -> T + Send + Sync + 'static,
    {
        self.stage(Stage::map(f))
    }

    #[must_use]
    pub fn try_map<F, E>(self, f: F) -> Self
    where
        F: Fn(T) -> std::result::Result<T, E> + Send + Sync + 'static,
        E: Into<BoxError>,
    {
        self.stage(Stage::try_map(f))
    }

    #[must_use]
    pub fn filter<P>(self, predicate: P) -> Self
    where
        P: Fn(&T) -> bool + Send + Sync + 'static,
    {
        self.stage(Stage::filter(predicate))
    }

    #[must_use]
    pub fn tap<F>(self, f: F) -> Self
    where
        F: Fn(&T) + Send + Sync + 'static,
    {
        self.stage(Stage::tap(f))
    }

    #[must_use]
    pub fn try_tap<F, E>(self, f: F) -> Self
    where
        F: Fn(&T) -> std::result::Result<(), E> + Send + Sync + 'static,
        E: Into<BoxError>,
    {
        self.stage(Stage::try_tap(f))
    }

    /// Bounds the source to `ticks` emissions so the run can complete.
    #[must_use]
    pub fn limit(mut self, ticks: u64) -> Self {
        self.source = self.source.with_limit(ticks);
        self
    }

    /// Splits the chain's output by `key_fn`.
    pub fn group_by<K, F>(self, key_fn: F) -> GroupedBuilder<T, K>
    where
        F: Fn(&T) -> K + Send + Sync + 'static,
    {
        GroupedBuilder {
            source: self.source,
            chain: self.chain,
            key_fn: Arc::new(key_fn),
        }
    }
}

impl<T> Debug for PipelineBuilder<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PipelineBuilder")
            .field("source", &self.source)
            .field("chain", &self.chain)
            .finish()
    }
}

/// Builder state after `group_by`; a handler completes the pipeline.
pub struct GroupedBuilder<T, K> {
    source: ClockSource<T>,
    chain: OperatorChain<T>,
    key_fn: KeyFn<T, K>,
}

impl<T, K> GroupedBuilder<T, K>
where
    T: Send + 'static,
    K: Eq + Hash + Clone + Debug + Send + Sync + 'static,
{
    /// Attaches an infallible per-key handler.
    ///
    /// # Errors
    ///
    /// Returns [`RivuletError::InvalidConfig`] for a zero period.
    pub fn process<H>(self, handler: H) -> Result<Pipeline<T, K>>
    where
        H: Fn(&K, T) -> T + Send + Sync + 'static,
    {
        self.finish(Arc::new(move |key: &K, value: T| -> std::result::Result<T, BoxError> {
            Ok(handler(key, value))
        }))
    }

    /// Attaches a per-key handler whose failures are isolated per event.
    ///
    /// # Errors
    ///
    /// Returns [`RivuletError::InvalidConfig`] for a zero period.
    pub fn try_process<H, E>(self, handler: H) -> Result<Pipeline<T, K>>
    where
        H: Fn(&K, T) -> std::result::Result<T, E> + Send + Sync + 'static,
        E: Into<BoxError>,
    {
        self.finish(Arc::new(move |key: &K, value: T| -> std::result::Result<T, BoxError> {
            handler(key, value).map_err(Into::into)
        }))
    }

    fn finish(self, handler: KeyHandler<K, T>) -> Result<Pipeline<T, K>> {
        if self.source.period().is_zero() {
            return Err(RivuletError::invalid_config("clock period must be greater than zero"));
        }
        Ok(Pipeline {
            source: self.source,
            chain: self.chain,
            key_fn: self.key_fn,
            handler,
            error_observer: None,
        })
    }
}

impl<T, K> Debug for GroupedBuilder<T, K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GroupedBuilder")
            .field("source", &self.source)
            .field("chain", &self.chain)
            .finish_non_exhaustive()
    }
}

/// Assembles a pipeline from an explicit stage list.
///
/// Equivalent to the fluent [`Pipeline::try_builder`] chain; pure
/// configuration, nothing runs until subscribed.
///
/// # Errors
///
/// Returns [`RivuletError::InvalidConfig`] for a zero period.
pub fn build_pipeline<T, K, G, GE, KF, H, HE>(
    period: Duration,
    generator: G,
    stages: Vec<Stage<T>>,
    key_fn: KF,
    handler: H,
) -> Result<Pipeline<T, K>>
where
    T: Send + 'static,
    K: Eq + Hash + Clone + Debug + Send + Sync + 'static,
    G: Fn(u64) -> std::result::Result<T, GE> + Send + Sync + 'static,
    GE: Into<BoxError>,
    KF: Fn(&T) -> K + Send + Sync + 'static,
    H: Fn(&K, T) -> std::result::Result<T, HE> + Send + Sync + 'static,
    HE: Into<BoxError>,
{
    let initial = Pipeline::try_builder(period, generator);
    let builder = stages.into_iter().fold(initial, PipelineBuilder::stage);
    builder.group_by(key_fn).try_process(handler)
}
