// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! Operator chain: map, filter and tap stages held as data.
//!
//! A chain is an ordered list of [`Stage`] variants evaluated by a single
//! interpreter loop in [`OperatorChain::apply`]. Stages run synchronously, in
//! declaration order, on whichever task hands the value in.
//!
//! # Failure contract
//!
//! - **map / tap**: fail-fast. The first failing stage aborts evaluation and the
//!   value is not emitted. The error names the failing stage's position.
//! - **filter**: total. A predicate returning `false` drops the value.
//!
//! # Example
//!
//! ```
//! use rivulet_core::Event;
//! use rivulet_stream::OperatorChain;
//!
//! let chain = OperatorChain::new()
//!     .filter(|event: &Event| event.amount() > 500.0)
//!     .map(|event: Event| event.with_amount(event.amount() * 0.1));
//!
//! let kept = chain.apply(Event::new(4, 600.0, "Bank1")).unwrap();
//! assert!(kept.is_some_and(|e| (e.amount() - 60.0).abs() < 1e-9));
//!
//! let dropped = chain.apply(Event::new(3, 450.0, "Bank0")).unwrap();
//! assert!(dropped.is_none());
//! ```

use futures::future::ready;
use futures::{Stream, StreamExt};
use rivulet_core::{BoxError, Result, RivuletError, StreamItem};
use std::fmt;
use std::sync::Arc;

type MapFn<T> = Arc<dyn Fn(T) -> std::result::Result<T, BoxError> + Send + Sync>;
type FilterFn<T> = Arc<dyn Fn(&T) -> bool + Send + Sync>;
type TapFn<T> = Arc<dyn Fn(&T) -> std::result::Result<(), BoxError> + Send + Sync>;

/// One step of an operator chain.
pub enum Stage<T> {
    /// Replace the value with the function's output
    Map(MapFn<T>),
    /// Keep the value only when the predicate holds
    Filter(FilterFn<T>),
    /// Observe the value and pass it through unchanged
    Tap(TapFn<T>),
}

impl<T: 'static> Stage<T> {
    /// Infallible map stage.
    pub fn map<F>(f: F) -> Self
    where
        F: Fn(T) -> T + Send + Sync + 'static,
    {
        Self::Map(Arc::new(move |value: T| -> std::result::Result<T, BoxError> { Ok(f(value)) }))
    }

    /// Map stage whose failure aborts the pipeline.
    pub fn try_map<F, E>(f: F) -> Self
    where
        F: Fn(T) -> std::result::Result<T, E> + Send + Sync + 'static,
        E: Into<BoxError>,
    {
        Self::Map(Arc::new(move |value: T| -> std::result::Result<T, BoxError> {
            f(value).map_err(Into::into)
        }))
    }

    pub fn filter<P>(predicate: P) -> Self
    where
        P: Fn(&T) -> bool + Send + Sync + 'static,
    {
        Self::Filter(Arc::new(predicate))
    }

    /// Infallible side effect.
    pub fn tap<F>(f: F) -> Self
    where
        F: Fn(&T) + Send + Sync + 'static,
    {
        Self::Tap(Arc::new(move |value: &T| -> std::result::Result<(), BoxError> {
            f(value);
            Ok(())
        }))
    }

    /// Side effect whose failure aborts the pipeline.
    pub fn try_tap<F, E>(f: F) -> Self
    where
        F: Fn(&T) -> std::result::Result<(), E> + Send + Sync + 'static,
        E: Into<BoxError>,
    {
        Self::Tap(Arc::new(move |value: &T| -> std::result::Result<(), BoxError> {
            f(value).map_err(Into::into)
        }))
    }
}

impl<T> Stage<T> {
    /// Variant name used in logs and error messages.
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Map(_) => "map",
            Self::Filter(_) => "filter",
            Self::Tap(_) => "tap",
        }
    }
}

impl<T> Clone for Stage<T> {
    fn clone(&self) -> Self {
        match self {
            Self::Map(f) => Self::Map(Arc::clone(f)),
            Self::Filter(p) => Self::Filter(Arc::clone(p)),
            Self::Tap(f) => Self::Tap(Arc::clone(f)),
        }
    }
}

impl<T> fmt::Debug for Stage<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Stage").field(&self.kind()).finish()
    }
}

/// Ordered list of stages.
///
/// Cloning is cheap: stage functions are shared.
pub struct OperatorChain<T> {
    stages: Vec<Stage<T>>,
}

impl<T: 'static> OperatorChain<T> {
    /// An empty chain passes every value through.
    pub fn new() -> Self {
        Self { stages: Vec::new() }
    }

    #[must_use]
    pub fn stage(mut self, stage: Stage<T>) -> Self {
        self.stages.push(stage);
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
}

impl<T> OperatorChain<T> {
    pub fn len(&self) -> usize {
        self.stages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stages.is_empty()
    }

    pub fn stages(&self) -> &[Stage<T>] {
        &self.stages
    }

    /// Runs `value` through every stage in order.
    ///
    /// Returns `Ok(None)` when a filter dropped the value.
    ///
    /// # Errors
    ///
    /// Returns [`RivuletError::Stage`] carrying the index of the first map or
    /// tap stage that failed. Later stages are not evaluated.
    pub fn apply(&self, value: T) -> Result<Option<T>> {
        let mut current = value;
        for (index, stage) in self.stages.iter().enumerate() {
            match stage {
                Stage::Map(f) => {
                    current = f(current).map_err(|e| RivuletError::stage_error(index, "map", e))?;
                }
                Stage::Filter(predicate) => {
                    if !predicate(&current) {
                        return Ok(None);
                    }
                }
                Stage::Tap(f) => {
                    f(&current).map_err(|e| RivuletError::stage_error(index, "tap", e))?;
                }
            }
        }
        Ok(Some(current))
    }
}

impl<T: 'static> Default for OperatorChain<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Clone for OperatorChain<T> {
    fn clone(&self) -> Self {
        Self {
            stages: self.stages.clone(),
        }
    }
}

impl<T> fmt::Debug for OperatorChain<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list()
            .entries(self.stages.iter().map(Stage::kind))
            .finish()
    }
}

impl<T> From<Vec<Stage<T>>> for OperatorChain<T> {
    fn from(stages: Vec<Stage<T>>) -> Self {
        Self { stages }
    }
}

/// Extension trait running an [`OperatorChain`] over any stream of [`StreamItem`]s.
pub trait OperatorChainExt<T>: Stream<Item = StreamItem<T>> + Sized {
    /// Applies `chain` to every value.
    ///
    /// # Behavior
    ///
    /// - Values dropped by a filter are skipped
    /// - The first stage failure is emitted as `StreamItem::Error`; nothing is
    ///   emitted after it
    /// - Upstream errors pass through and also halt the stream
    fn apply_chain(self, chain: OperatorChain<T>) -> impl Stream<Item = StreamItem<T>> + Send
    where
        Self: Send + 'static,
        T: Send + 'static;
}

impl<S, T> OperatorChainExt<T> for S
where
    S: Stream<Item = StreamItem<T>>,
{
    fn apply_chain(self, chain: OperatorChain<T>) -> impl Stream<Item = StreamItem<T>> + Send
    where
        Self: Send + 'static,
        T: Send + 'static,
    {
        let mut halted = false;
        self.filter_map(move |item| {
            let output = if halted {
                None
            } else {
                match item {
                    StreamItem::Value(value) => match chain.apply(value) {
                        Ok(Some(value)) => Some(StreamItem::Value(value)),
                        Ok(None) => None,
                        Err(e) => {
                            halted = true;
                            Some(StreamItem::Error(e))
                        }
                    },
                    StreamItem::Error(e) => {
                        halted = true;
                        Some(StreamItem::Error(e))
                    }
                }
            };
            ready(output)
        })
    }
}
